//! Document renderers: turn a retailored resume record into file bytes

use crate::config::DocumentFormat;
use crate::error::{Result, RetailorError};
use crate::output::outline::{Block, DocumentOutline};
use askama::Template;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use pulldown_cmark::{html, Event, Parser};
use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;

/// Trait for rendering a resume record into a document
pub trait DocumentRenderer {
    fn render_document(&self, resume: &Value) -> Result<Vec<u8>>;
    fn supports_format(&self) -> DocumentFormat;
}

/// Markdown renderer, also the source for HTML output
pub struct MarkdownRenderer;

/// HTML renderer with an embedded stylesheet
pub struct HtmlRenderer {
    include_styles: bool,
}

/// PDF renderer using the PDF builtin Helvetica faces
pub struct PdfRenderer {
    font_size: f32,
}

/// Pretty-printed JSON, for piping into other tools
pub struct JsonRenderer {
    pretty: bool,
}

/// Renderer registry keyed by output format
pub struct DocumentGenerator {
    markdown_renderer: MarkdownRenderer,
    html_renderer: HtmlRenderer,
    pdf_renderer: PdfRenderer,
    json_renderer: JsonRenderer,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.5;
            color: #222;
            max-width: 820px;
            margin: 0 auto;
            padding: 32px 24px;
        }
        h1 {
            margin-bottom: 4px;
            border-bottom: 3px solid #007acc;
            padding-bottom: 8px;
        }
        h2 {
            color: #007acc;
            border-bottom: 1px solid #e9ecef;
            padding-bottom: 4px;
            margin-top: 28px;
        }
        h3 {
            margin: 16px 0 4px;
        }
        ul {
            margin-top: 4px;
        }
        p {
            margin: 4px 0;
        }
    </style>
    {% endif %}
</head>
<body>
{{ body_html | safe }}
</body>
</html>"#, ext = "html")]
struct ResumeHtmlTemplate<'a> {
    title: &'a str,
    include_styles: bool,
    body_html: &'a str,
}

impl MarkdownRenderer {
    pub fn to_markdown(&self, outline: &DocumentOutline) -> String {
        let mut out = String::new();

        if let Some(title) = &outline.title {
            out.push_str(&format!("# {}\n\n", escape_markdown(title)));
        }

        for section in &outline.sections {
            out.push_str(&format!("## {}\n\n", escape_markdown(&section.heading)));
            let mut in_list = false;

            for block in &section.blocks {
                let is_bullet = matches!(block, Block::Bullet { .. });
                if in_list && !is_bullet {
                    out.push('\n');
                }
                in_list = is_bullet;

                match block {
                    Block::Subheading(text) => out.push_str(&format!("### {}\n\n", escape_markdown(text))),
                    Block::Paragraph(text) => out.push_str(&format!("{}\n\n", escape_markdown(text))),
                    Block::Label(label) => out.push_str(&format!("**{}:**\n\n", escape_markdown(label))),
                    Block::Field { label, value } => out.push_str(&format!(
                        "**{}:** {}\n\n",
                        escape_markdown(label),
                        escape_markdown(value)
                    )),
                    Block::Bullet { depth, text } => {
                        out.push_str(&format!("{}- {}\n", "  ".repeat(*depth), escape_markdown(text)));
                    }
                }
            }
            if in_list {
                out.push('\n');
            }
        }

        out
    }
}

// inline syntax that is escaped wherever it appears
const MARKDOWN_INLINE: &[char] = &['\\', '`', '*', '_', '[', ']', '<', '>', '|', '~', '&'];

/// Backslash-escape Markdown syntax so resume text reads literally.
/// Whitespace runs, newlines included, collapse to one space.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        for c in word.chars() {
            if MARKDOWN_INLINE.contains(&c) {
                out.push('\\');
            }
            out.push(c);
        }
    }

    // block syntax only counts at the start of a line
    if out.starts_with(['#', '+', '-', '=']) {
        out.insert(0, '\\');
    }
    let digits = out.chars().take_while(char::is_ascii_digit).count();
    if (1..=9).contains(&digits) && out[digits..].starts_with(['.', ')']) {
        out.insert(digits, '\\');
    }
    out
}

impl DocumentRenderer for MarkdownRenderer {
    fn render_document(&self, resume: &Value) -> Result<Vec<u8>> {
        let outline = DocumentOutline::from_resume(resume);
        Ok(self.to_markdown(&outline).into_bytes())
    }

    fn supports_format(&self) -> DocumentFormat {
        DocumentFormat::Markdown
    }
}

impl HtmlRenderer {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }
}

impl DocumentRenderer for HtmlRenderer {
    fn render_document(&self, resume: &Value) -> Result<Vec<u8>> {
        let outline = DocumentOutline::from_resume(resume);
        let markdown = MarkdownRenderer.to_markdown(&outline);

        // raw HTML in resume text is shown literally, never interpreted
        let parser = Parser::new(&markdown).map(|event| match event {
            Event::Html(raw) => Event::Text(raw),
            other => other,
        });
        let mut body_html = String::new();
        html::push_html(&mut body_html, parser);

        let template = ResumeHtmlTemplate {
            title: outline.title.as_deref().unwrap_or("Resume"),
            include_styles: self.include_styles,
            body_html: &body_html,
        };
        let page = template.render().map_err(|e| RetailorError::Rendering(e.to_string()))?;
        Ok(page.into_bytes())
    }

    fn supports_format(&self) -> DocumentFormat {
        DocumentFormat::Html
    }
}

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;
// average Helvetica glyph width as a fraction of the font size
const AVG_CHAR_WIDTH: f32 = 0.5;

struct PdfPageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    cursor_mm: f32,
    pages: usize,
}

impl PdfPageWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RetailorError::Rendering(format!("Failed to load font: {:?}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RetailorError::Rendering(format!("Failed to load font: {:?}", e)))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            cursor_mm: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        })
    }

    fn line_height(font_size: f32) -> f32 {
        font_size * PT_TO_MM * 1.4
    }

    fn ensure_space(&mut self, needed_mm: f32) {
        if self.cursor_mm - needed_mm < MARGIN_MM {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.cursor_mm = PAGE_HEIGHT_MM - MARGIN_MM;
            self.pages += 1;
        }
    }

    fn gap(&mut self, mm: f32) {
        self.cursor_mm -= mm;
    }

    fn write_wrapped(&mut self, text: &str, font_size: f32, bold: bool, indent_mm: f32) {
        let usable_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM - indent_mm;
        let max_chars = (usable_mm / (font_size * PT_TO_MM * AVG_CHAR_WIDTH)).floor().max(10.0) as usize;
        let line_height = Self::line_height(font_size);

        for line in wrap_text(text, max_chars) {
            self.ensure_space(line_height);
            self.cursor_mm -= line_height;
            let font = if bold { &self.bold } else { &self.regular };
            self.layer.use_text(line, font_size, Mm(MARGIN_MM + indent_mm), Mm(self.cursor_mm), font);
        }
    }

    fn finish(self) -> Result<Vec<u8>> {
        log::debug!("Rendered PDF with {} page(s)", self.pages);
        self.doc
            .save_to_bytes()
            .map_err(|e| RetailorError::Rendering(format!("Failed to write PDF: {:?}", e)))
    }
}

impl PdfRenderer {
    pub fn new(font_size: f32) -> Self {
        Self { font_size }
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render_document(&self, resume: &Value) -> Result<Vec<u8>> {
        let outline = DocumentOutline::from_resume(resume);
        let unsupported = unsupported_pdf_chars(&outline);
        if !unsupported.is_empty() {
            let shown: Vec<String> = unsupported.iter().map(|c| format!("'{}'", c)).collect();
            return Err(RetailorError::Rendering(format!(
                "the built-in PDF fonts cannot show {}; use --format html or --format markdown",
                shown.join(", ")
            )));
        }

        let title = outline.title.clone().unwrap_or_else(|| "Resume".to_string());
        let body = self.font_size;
        let mut writer = PdfPageWriter::new(&title)?;

        if outline.title.is_some() {
            writer.write_wrapped(&title, body * 1.8, true, 0.0);
            writer.gap(3.0);
        }

        for section in &outline.sections {
            writer.gap(3.0);
            // keep a heading together with at least one body line
            writer.ensure_space(PdfPageWriter::line_height(body * 1.3) + PdfPageWriter::line_height(body));
            writer.write_wrapped(&section.heading.to_uppercase(), body * 1.3, true, 0.0);
            writer.gap(1.0);

            for block in &section.blocks {
                match block {
                    Block::Subheading(text) => {
                        writer.gap(1.5);
                        writer.write_wrapped(text, body * 1.1, true, 0.0);
                    }
                    Block::Paragraph(text) => writer.write_wrapped(text, body, false, 0.0),
                    Block::Label(label) => writer.write_wrapped(&format!("{}:", label), body, true, 0.0),
                    Block::Field { label, value } => {
                        writer.write_wrapped(&format!("{}: {}", label, value), body, false, 0.0)
                    }
                    Block::Bullet { depth, text } => {
                        let indent = 4.0 + 5.0 * *depth as f32;
                        writer.write_wrapped(&format!("- {}", text), body, false, indent);
                    }
                }
            }
        }

        writer.finish()
    }

    fn supports_format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }
}

// cp1252 additions in 0x80..=0x9F; the rest of WinAnsi is printable ASCII and Latin-1
const WIN_ANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

/// Whether Helvetica under WinAnsiEncoding has a glyph for `c`.
fn is_win_ansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}') || WIN_ANSI_EXTRAS.contains(c)
}

/// Characters in the outline, as the PDF would write them, that have no
/// WinAnsi code. printpdf drops these silently, so they are caught first.
fn unsupported_pdf_chars(outline: &DocumentOutline) -> Vec<char> {
    let mut texts: Vec<String> = outline.title.iter().cloned().collect();
    for section in &outline.sections {
        texts.push(section.heading.to_uppercase());
        for block in &section.blocks {
            match block {
                Block::Subheading(text) | Block::Paragraph(text) | Block::Label(text) | Block::Bullet { text, .. } => {
                    texts.push(text.clone())
                }
                Block::Field { label, value } => {
                    texts.push(label.clone());
                    texts.push(value.clone());
                }
            }
        }
    }

    let mut found = Vec::new();
    for c in texts.iter().flat_map(|t| t.chars()) {
        if !c.is_whitespace() && !is_win_ansi(c) && !found.contains(&c) {
            found.push(c);
        }
    }
    found
}

/// Greedy word wrap counting grapheme clusters; words longer than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let graphemes: Vec<&str> = word.graphemes(true).collect();

        if current_len > 0 && current_len + 1 + graphemes.len() > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        for chunk in graphemes.chunks(max_chars) {
            if current_len > 0 && current_len + 1 + chunk.len() > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(&chunk.concat());
            current_len += chunk.len();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

impl JsonRenderer {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl DocumentRenderer for JsonRenderer {
    fn render_document(&self, resume: &Value) -> Result<Vec<u8>> {
        if self.pretty {
            Ok(serde_json::to_vec_pretty(resume)?)
        } else {
            Ok(serde_json::to_vec(resume)?)
        }
    }

    fn supports_format(&self) -> DocumentFormat {
        DocumentFormat::Json
    }
}

impl DocumentGenerator {
    pub fn new() -> Self {
        Self {
            markdown_renderer: MarkdownRenderer,
            html_renderer: HtmlRenderer::new(true),
            pdf_renderer: PdfRenderer::new(10.5),
            json_renderer: JsonRenderer::new(true),
        }
    }

    pub fn renderer(&self, format: DocumentFormat) -> &dyn DocumentRenderer {
        match format {
            DocumentFormat::Markdown => &self.markdown_renderer,
            DocumentFormat::Html => &self.html_renderer,
            DocumentFormat::Pdf => &self.pdf_renderer,
            DocumentFormat::Json => &self.json_renderer,
        }
    }

    pub fn generate(&self, resume: &Value, format: DocumentFormat) -> Result<Vec<u8>> {
        self.renderer(format).render_document(resume)
    }
}

impl Default for DocumentGenerator {
    fn default() -> Self {
        Self::new()
    }
}
