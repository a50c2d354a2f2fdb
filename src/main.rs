use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agentx::cli::commands::{self, run::RunOptions};

/// Multi-agent AI consultancy: role-specialized agents collaborate on a client request
#[derive(Parser)]
#[command(name = "agentx", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run a consultation and write the Markdown report
    Run {
        /// Client request text
        #[arg(long, short, conflicts_with = "input_file")]
        input: Option<String>,
        /// Read the client request from a file
        #[arg(long)]
        input_file: Option<PathBuf>,
        /// Report output path
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// LLM provider (openai, ollama)
        #[arg(long, env = "AGENTX_PROVIDER")]
        provider: Option<String>,
        /// Model used by every agent
        #[arg(long)]
        model: Option<String>,
        /// Let the Markdown output agent format the report
        #[arg(long)]
        polish: bool,
        /// Save each agent's transcript as JSON
        #[arg(long)]
        save_transcripts: bool,
    },

    /// List the agent roster and routing interests
    Agents,

    /// Show the topics and recipients for a message
    Classify { text: String },

    /// Inspect or create configuration files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the merged configuration
    Show {
        /// toml or json
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// Print configuration file locations
    Path,
    /// Write a config template
    Init {
        /// Write to the user config directory instead of the project
        #[arg(long, short)]
        global: bool,
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    fn log_filter(&self) -> EnvFilter {
        let level = match (self.verbose, self.quiet) {
            (true, _) => "debug",
            (false, true) => "error",
            (false, false) => "info",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }

    fn dispatch(self) -> agentx::Result<()> {
        match self.command {
            Command::Run {
                input,
                input_file,
                output,
                provider,
                model,
                polish,
                save_transcripts,
            } => commands::run::run(RunOptions {
                input,
                input_file,
                output,
                provider,
                model,
                polish,
                save_transcripts,
                quiet: self.quiet,
            }),
            Command::Agents => commands::agents::run(),
            Command::Classify { text } => commands::classify::run(&text),
            Command::Config { action } => match action {
                ConfigAction::Show { format } => commands::config::show(&format),
                ConfigAction::Path => commands::config::path(),
                ConfigAction::Init { global, force } => commands::config::init(global, force),
            },
        }
    }
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());

        eprintln!("\n{}", style("agentx crashed").red().bold());
        eprintln!("  {}", payload);
        if let Some(location) = info.location() {
            eprintln!("  {}", style(format!("at {}", location)).dim());
        }
        previous(info);
    }));
}

fn main() -> ExitCode {
    install_panic_hook();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red(), e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(cli.log_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli.dispatch()?;
    Ok(())
}
