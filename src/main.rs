//! Resume retailor: rewrite resume JSON with a hosted LLM and render it as a document

use clap::error::ErrorKind;
use clap::Parser;
use log::{debug, error, info};
use resume_retailor::cli::{self, Cli, Commands, ConfigAction};
use resume_retailor::config::{Config, DocumentFormat};
use resume_retailor::error::RetailorError;
use resume_retailor::llm::azure::AzureOpenAiClient;
use resume_retailor::llm::probe::{run_probe, FAILURE_HINT};
use resume_retailor::output::console::{error_json, format_result, Console};
use resume_retailor::output::emitter::DocumentEmitter;
use resume_retailor::retailor::coverage::KeywordCoverage;
use resume_retailor::retailor::engine::Retailor;
use resume_retailor::retailor::keywords::{apply_keywords, load_keywords_file};
use resume_retailor::retailor::resume::{base_name, load_resume};
use resume_retailor::retailor::Mode;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse CLI arguments; usage errors exit with 1, help/version with 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                return ExitCode::FAILURE;
            }
        },
    };

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let console = Console::new(config.output.color_output);

    match cli.command {
        Commands::Probe => probe_command(&config).await,
        Commands::Retailor {
            resume,
            mode,
            format,
            output_dir,
            keywords,
            no_document,
            compact,
        } => {
            let options = RetailorOptions {
                resume,
                mode,
                format,
                output_dir,
                keywords,
                no_document,
                compact,
            };
            retailor_command(options, &config, &console).await
        }
        Commands::Config { action } => config_command(action, cli.config.as_deref(), &config),
    }
}

async fn probe_command(config: &Config) -> ExitCode {
    let client = match AzureOpenAiClient::new(&config.azure) {
        Ok(client) => client,
        Err(e) => return probe_failed(&e),
    };

    println!("Testing Azure OpenAI connection with deployment: {}", config.azure.deployment);
    match run_probe(&client).await {
        Ok(reply) => {
            println!("Connection successful! Response:");
            println!("{}", reply);
            ExitCode::SUCCESS
        }
        Err(e) => probe_failed(&e),
    }
}

fn probe_failed(err: &RetailorError) -> ExitCode {
    println!("Connection failed: {}", err);
    println!("{}", FAILURE_HINT);
    ExitCode::FAILURE
}

struct RetailorOptions {
    resume: PathBuf,
    mode: Mode,
    format: Option<String>,
    output_dir: Option<PathBuf>,
    keywords: Option<PathBuf>,
    no_document: bool,
    compact: bool,
}

async fn retailor_command(options: RetailorOptions, config: &Config, console: &Console) -> ExitCode {
    let format = match options.format.as_deref().map(cli::parse_document_format) {
        None => config.output.format,
        Some(Ok(format)) => format,
        Some(Err(e)) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut resume = match load_resume(&options.resume) {
        Ok(resume) => resume,
        Err(RetailorError::FileNotFound(path)) => {
            eprintln!("Error: File not found: {}", path.display());
            return ExitCode::FAILURE;
        }
        Err(e @ RetailorError::InvalidJson(_)) => {
            println!("{}", error_json(&e.to_string()));
            return ExitCode::FAILURE;
        }
        Err(e) => {
            println!("{}", error_json(&format!("Invalid JSON input: {}", e)));
            return ExitCode::FAILURE;
        }
    };

    console.info(&format!("📄 Loaded resume: {}", options.resume.display()));

    // Inject the keyword list for 'jd' mode
    let mut keywords = Vec::new();
    if options.mode == Mode::Jd {
        keywords = match &options.keywords {
            Some(path) => match load_keywords_file(path) {
                Ok(list) => list,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            },
            None => config.retailor.keywords.clone(),
        };
        if let Err(e) = apply_keywords(&mut resume, &keywords) {
            println!("{}", error_json(&e.to_string()));
            return ExitCode::FAILURE;
        }
        console.keywords(&keywords);
    }

    let client = match AzureOpenAiClient::new(&config.azure) {
        Ok(client) => client,
        Err(e) => {
            console.failure(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let retailor = Retailor::new(&client, &config.retailor);
    let spinner = console.spinner(&format!("Retailoring resume ({} mode)...", options.mode));
    let outcome = retailor.dispatch(options.mode, &resume).await;
    spinner.finish_and_clear();

    let retailored = match outcome {
        Ok(result) => result,
        Err(e) => {
            let context = match options.mode {
                Mode::Jd => "Failed to retailor resume with JD",
                Mode::Nojd => "Failed to retailor resume without JD",
            };
            println!("{}", error_json(&format!("{}: {}", context, e)));
            return ExitCode::FAILURE;
        }
    };

    console.banner("RETAILORED RESUME JSON OUTPUT");
    let pretty = config.output.pretty_json && !options.compact;
    match format_result(&retailored, pretty) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            println!("{}", error_json(&format!("Failed to serialize result: {}", e)));
            return ExitCode::FAILURE;
        }
    }

    if options.mode == Mode::Jd {
        match KeywordCoverage::measure(&keywords, &retailored) {
            Ok(coverage) => console.coverage(&coverage),
            Err(e) => debug!("Skipping keyword coverage: {}", e),
        }
    }

    if options.no_document {
        info!("Document generation skipped");
        return ExitCode::SUCCESS;
    }

    let output_dir = options.output_dir.clone().unwrap_or_else(|| config.output_dir());
    emit_document(&retailored, &options, format, output_dir, console)
}

fn emit_document(
    retailored: &serde_json::Value,
    options: &RetailorOptions,
    format: DocumentFormat,
    output_dir: PathBuf,
    console: &Console,
) -> ExitCode {
    console.banner(&format!("GENERATING {} FILE", format.extension().to_uppercase()));

    let emitter = DocumentEmitter::new(output_dir, format);
    match emitter.emit(retailored, &base_name(&options.resume), options.mode) {
        Ok(path) => {
            console.success(&format!("Document generated successfully: {}", path.display()));
            ExitCode::SUCCESS
        }
        Err(e) => {
            console.failure(&format!("Error generating document: {}", e));
            ExitCode::FAILURE
        }
    }
}

fn config_command(action: Option<ConfigAction>, explicit_path: Option<&Path>, config: &Config) -> ExitCode {
    let path = explicit_path.map(Path::to_path_buf).unwrap_or_else(Config::config_path);

    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let mut shown = config.clone();
            shown.azure.api_key = config.azure.masked_key();
            match toml::to_string_pretty(&shown) {
                Ok(text) => {
                    println!("# {}", path.display());
                    println!("{}", text);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("Failed to serialize config: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        ConfigAction::Reset => match Config::default().save(&path) {
            Ok(()) => {
                println!("✅ Configuration reset: {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to reset configuration: {}", e);
                ExitCode::FAILURE
            }
        },
        ConfigAction::Path => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
    }
}
