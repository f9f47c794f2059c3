use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sysforge::cli::commands;

#[derive(Parser)]
#[command(name = "sysforge")]
#[command(
    version,
    about = "Turn a one-line idea into a reviewed, deployable web project"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Refine a free-text idea into a structured specification
    Refine {
        #[arg(help = "What you want to build")]
        prompt: String,
        #[arg(long, help = "Extra context for the refiner")]
        context: Option<String>,
        #[arg(long, short, help = "Record the result under this project")]
        project: Option<String>,
        #[arg(long, short, help = "Write the specification JSON here")]
        out: Option<PathBuf>,
    },

    /// Compose an implementation plan from a specification
    Plan {
        #[arg(help = "Specification JSON file ('-' for stdin)")]
        spec: PathBuf,
        #[arg(long, short, help = "Record the plan under this existing project")]
        project: Option<String>,
        #[arg(long, short, help = "Write the plan JSON here")]
        out: Option<PathBuf>,
    },

    /// Generate, review and refactor project files
    Generate {
        #[arg(long, help = "Plan JSON file")]
        plan: PathBuf,
        #[arg(long, help = "Specification JSON file")]
        spec: PathBuf,
        #[arg(long, short, help = "Project to store the files under")]
        project: Option<String>,
        #[arg(long, short, help = "Also write the files into this directory")]
        out: Option<PathBuf>,
    },

    /// Run every stage from idea to files
    Run {
        #[arg(help = "What you want to build")]
        prompt: String,
        #[arg(long, help = "Extra context for the refiner")]
        context: Option<String>,
        #[arg(long, short, help = "Save results under this project")]
        project: Option<String>,
        #[arg(long, short, help = "Write the files into this directory")]
        out: Option<PathBuf>,
    },

    /// Write a project's stored files into a directory
    Export {
        #[arg(help = "Project name")]
        project: String,
        #[arg(long, short, help = "Output directory")]
        out: PathBuf,
    },

    /// Show backend and database status
    Status {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
        #[arg(long, help = "Also ask the backend whether it is reachable")]
        check: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31msysforge encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Refine {
            prompt,
            context,
            project,
            out,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::refine::run(commands::refine::RefineOptions {
                prompt,
                context,
                project,
                out,
            }))?;
        }
        Commands::Plan { spec, project, out } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::plan::run(spec, project, out))?;
        }
        Commands::Generate {
            plan,
            spec,
            project,
            out,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::generate::run(commands::generate::GenerateOptions {
                plan,
                spec,
                project,
                out,
            }))?;
        }
        Commands::Run {
            prompt,
            context,
            project,
            out,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::run::run(commands::run::RunOptions {
                prompt,
                context,
                project,
                out,
            }))?;
        }
        Commands::Export { project, out } => {
            commands::export::run(&project, &out)?;
        }
        Commands::Status { format, check } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::status::run(&format, check))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                commands::config::show(global, &format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    commands::config::init_global(force)?;
                } else {
                    commands::config::init_project()?;
                }
            }
        },
    }

    Ok(())
}
