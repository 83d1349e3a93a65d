//! Blueprint compiler CLI.
//!
//! Compiles an annotated types module into Blueprint JSON, or checks one
//! without writing anything.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use blueprint_compiler::{
    compile_blueprint, compile_file, parse_types_module_file, CompileError, CompileWarning,
    ProjectConfig, COMPILER_VERSION,
};
use blueprint_telemetry::{LogFormat, TelemetryConfig};

#[derive(Parser, Debug)]
#[command(name = "blueprint", about = "Blueprint compiler", version = COMPILER_VERSION)]
struct Cli {
    /// Log level filter (RUST_LOG takes precedence).
    #[arg(long, global = true, env = "BLUEPRINT_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Log output format (json or pretty).
    #[arg(long, global = true, env = "BLUEPRINT_LOG_FORMAT", default_value = "json")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a types module into Blueprint JSON.
    Compile {
        /// Types module bundle (YAML or JSON).
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the Blueprint JSON.
        #[arg(short, long)]
        output: PathBuf,

        /// Project configuration (blueprint.yaml).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Check types module(s) without writing a Blueprint.
    ///
    /// Runs the full compile pipeline except sample rendering.
    Validate {
        /// Types module bundle(s) (YAML or JSON).
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Project configuration (blueprint.yaml).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Validation result for a single types module.
#[derive(serde::Serialize)]
struct ValidationResult {
    file: String,
    valid: bool,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

#[derive(serde::Serialize)]
struct ValidationIssue {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl ValidationIssue {
    fn from_error(file: &str, error: &CompileError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
            location: Some(file.to_string()),
        }
    }

    fn from_warning(file: &str, warning: &CompileWarning) -> Self {
        Self {
            code: warning.code.clone(),
            message: warning.message.clone(),
            location: Some(match &warning.location {
                Some(location) => format!("{}:{}", file, location),
                None => file.to_string(),
            }),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ProjectConfig, CompileError> {
    match path {
        Some(path) => ProjectConfig::load(path),
        None => Ok(ProjectConfig::default()),
    }
}

/// Run the validate command.
fn run_validate(inputs: &[PathBuf], config: Option<&Path>, format: OutputFormat) -> ExitCode {
    let config = match load_config(config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };
    let options = config.compile_options();

    let mut results = Vec::new();
    for input in inputs {
        let file = input.display().to_string();

        if !input.exists() {
            results.push(ValidationResult {
                file: file.clone(),
                valid: false,
                errors: vec![ValidationIssue {
                    code: "E1000".to_string(),
                    message: format!("file not found: {}", file),
                    location: None,
                }],
                warnings: Vec::new(),
            });
            continue;
        }

        let compiled = parse_types_module_file(input)
            .map_err(CompileError::from)
            .and_then(|module| compile_blueprint(&module, &options));

        let result = match compiled {
            Ok(compiled) => ValidationResult {
                file: file.clone(),
                valid: true,
                errors: Vec::new(),
                warnings: compiled
                    .warnings
                    .iter()
                    .map(|w| ValidationIssue::from_warning(&file, w))
                    .collect(),
            },
            Err(e) => ValidationResult {
                file: file.clone(),
                valid: false,
                errors: vec![ValidationIssue::from_error(&file, &e)],
                warnings: Vec::new(),
            },
        };
        results.push(result);
    }

    let valid_count = results.iter().filter(|r| r.valid).count();
    let total = results.len();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "results": results,
                "summary": {
                    "total": total,
                    "valid": valid_count,
                    "invalid": total - valid_count,
                }
            });
            match serde_json::to_string_pretty(&output) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("error: {}", e);
                    return ExitCode::from(1);
                }
            }
        }
        OutputFormat::Text => {
            for result in &results {
                if result.valid && result.warnings.is_empty() {
                    eprintln!("✓ {} is valid", result.file);
                } else if result.valid {
                    eprintln!(
                        "✓ {} is valid (with {} warning(s))",
                        result.file,
                        result.warnings.len()
                    );
                } else {
                    eprintln!("✗ {} has {} error(s)", result.file, result.errors.len());
                }

                for err in &result.errors {
                    match &err.location {
                        Some(loc) => eprintln!("  {} [{}]: {}", err.code, loc, err.message),
                        None => eprintln!("  {}: {}", err.code, err.message),
                    }
                }
                for warn in &result.warnings {
                    match &warn.location {
                        Some(loc) => {
                            eprintln!("  {} [{}]: {} (warning)", warn.code, loc, warn.message)
                        }
                        None => eprintln!("  {}: {} (warning)", warn.code, warn.message),
                    }
                }
            }

            eprintln!();
            eprintln!(
                "validated {} module(s): {} valid, {} invalid",
                total,
                valid_count,
                total - valid_count
            );
        }
    }

    if valid_count == total {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Run the compile command.
async fn run_compile(input: &Path, output: &Path, config: Option<&Path>, pretty: bool) -> ExitCode {
    if !input.exists() {
        eprintln!("error: input file not found: {}", input.display());
        return ExitCode::from(1);
    }

    let config = match load_config(config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    let options = config.compile_options();
    let context = config.render_context();

    match compile_file(input, output, &options, &context, pretty).await {
        Ok(result) => {
            blueprint_telemetry::log_output_written!(
                path = %output.display(),
                routes = result.blueprint.routes.len(),
                warnings = result.warnings.len(),
                "blueprint written"
            );
            for warning in &result.warnings {
                match &warning.location {
                    Some(loc) => eprintln!(
                        "warning: {} [{}]: {}",
                        warning.code, loc, warning.message
                    ),
                    None => eprintln!("warning: {}: {}", warning.code, warning.message),
                }
            }
            eprintln!(
                "compiled {} to {} ({} routes, {} resources, {} warning(s))",
                input.display(),
                output.display(),
                result.blueprint.routes.len(),
                result.blueprint.resources.len(),
                result.warnings.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: compilation failed: {}", e);
            ExitCode::from(1)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_format = match cli.log_format.parse::<LogFormat>() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };
    let telemetry = TelemetryConfig::new()
        .with_log_level(cli.log_level)
        .with_log_format(log_format)
        .with_ansi(std::io::stderr().is_terminal());
    if let Err(e) = blueprint_telemetry::init(&telemetry) {
        eprintln!("error: {}", e);
        return ExitCode::from(1);
    }

    match cli.command {
        Commands::Compile {
            input,
            output,
            config,
            pretty,
        } => run_compile(&input, &output, config.as_deref(), pretty).await,
        Commands::Validate {
            input,
            config,
            format,
        } => run_validate(&input, config.as_deref(), format),
    }
}
