use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use toneweave::cli::commands;
use toneweave::cli::{CommandContext, OutputFormat};

#[derive(Parser)]
#[command(name = "toneweave")]
#[command(version, about = "Analyze the tone of text and suggest enhanced rewrites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, help = "Config file (skips global/project resolution)")]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the tone of a text with the generation backend
    Analyze {
        #[arg(help = "Text to analyze (max 1000 characters)")]
        text: String,
        #[arg(long, help = "Optional context, e.g. 'email to a client'")]
        context: Option<String>,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: OutputFormat,
        #[arg(long = "no-save", help = "Do not store the analysis in history")]
        no_save: bool,
    },

    /// List supported tone categories
    Tones {
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: OutputFormat,
    },

    /// Check backend availability and engine state
    Health {
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: OutputFormat,
    },

    /// Browse stored analyses
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List stored analyses, newest first
    List {
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: OutputFormat,
    },
    /// Show a stored analysis
    Show {
        #[arg(help = "Conversation id")]
        id: String,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: OutputFormat,
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
        eprintln!("\x1b[31mtoneweave encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        eprintln!("\n\x1b[33mPlease report this issue at:\x1b[0m");
        eprintln!("  https://github.com/junyeong-ai/toneweave/issues");
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
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
        Commands::Analyze {
            text,
            context,
            format,
            no_save,
        } => {
            let ctx = CommandContext::load(cli.config.as_deref())?;
            let rt = Runtime::new()?;
            rt.block_on(commands::analyze::run(ctx, text, context, format, no_save))?;
        }
        Commands::Tones { format } => {
            commands::tones::run(format)?;
        }
        Commands::Health { format } => {
            let ctx = CommandContext::load(cli.config.as_deref())?;
            let rt = Runtime::new()?;
            rt.block_on(commands::health::run(ctx, format))?;
        }
        Commands::History { action } => {
            let ctx = CommandContext::load(cli.config.as_deref())?;
            match action {
                HistoryAction::List { format } => commands::history::list(&ctx, format)?,
                HistoryAction::Show { id, format } => commands::history::show(&ctx, &id, format)?,
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                let ctx = CommandContext::load(cli.config.as_deref())?;
                commands::config::show(&ctx, format)?;
            }
            ConfigAction::Path => {
                let ctx = CommandContext::load(cli.config.as_deref())?;
                commands::config::path(&ctx)?;
            }
            ConfigAction::Init { global, force } => {
                commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
