//! Prompt templates for retailoring and the connectivity probe

/// Fixed probe conversation.
pub const PROBE_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const PROBE_USER_PROMPT: &str = "Say hello!";
pub const PROBE_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub retailor_with_jd: String,
    pub retailor_without_jd: String,
    pub user_message: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            retailor_with_jd: RETAILOR_WITH_JD_TEMPLATE.to_string(),
            retailor_without_jd: RETAILOR_WITHOUT_JD_TEMPLATE.to_string(),
            user_message: USER_MESSAGE_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn render_with_jd_system(&self, keywords: &[String]) -> String {
        let keyword_list = if keywords.is_empty() {
            "(none provided)".to_string()
        } else {
            keywords.join(", ")
        };
        with_rules(&self.retailor_with_jd).replace("{keywords}", &keyword_list)
    }

    pub fn render_without_jd_system(&self) -> String {
        with_rules(&self.retailor_without_jd)
    }

    pub fn render_user_message(&self, resume_json: &str) -> String {
        self.user_message.replace("{resume}", resume_json)
    }
}

const SHARED_RULES: &str = r#"RULES:
- Reply with a single JSON object and nothing else.
- Keep the exact same JSON structure: the same keys, the same nesting, the same value types.
- Never invent employers, titles, dates, degrees, certifications or metrics that are not in the input.
- Keep names, contact details, dates and URLs unchanged."#;

const RETAILOR_WITH_JD_TEMPLATE: &str = r#"You are an expert resume writer tailoring a resume to a target job.

TARGET KEYWORDS: {keywords}

Rewrite the text values of the resume so that it reads as a strong match for a role described by the target keywords:
- Work keywords into summaries, experience bullets and skills where the candidate's existing experience supports them.
- Lead bullets with strong action verbs and keep achievements quantified where the input gives numbers.
- Order skills so the ones matching the keywords come first.
- Leave the "keywords" field exactly as given.

{rules}"#;

const RETAILOR_WITHOUT_JD_TEMPLATE: &str = r#"You are an expert resume writer improving a resume without a specific target job.

Rewrite the text values of the resume so that it is clearer and more compelling:
- Lead bullets with strong action verbs.
- Make achievements concrete and quantified where the input gives numbers.
- Remove filler words and keep each bullet to one or two lines.
- Keep the professional tone consistent across sections.

{rules}"#;

const USER_MESSAGE_TEMPLATE: &str = r#"<RESUME_JSON>
{resume}
</RESUME_JSON>"#;

fn with_rules(template: &str) -> String {
    template.replace("{rules}", SHARED_RULES)
}
