mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;
use triage_core::types::ModeFlag;

#[derive(Parser)]
#[command(
    name = "triage",
    about = "Request router and delegation planner — classify requests, render documents, plan and dispatch delegated work",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: current directory)
    #[arg(long, global = true, env = "TRIAGE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a free-text request into a category
    Classify {
        /// The raw request text (trailing -s/-q/-p flags are parsed)
        text: String,
    },

    /// Classify a request and render it into a structured document
    New {
        /// The raw request text
        text: String,

        /// Disambiguation answer when classification is ambiguous
        #[arg(long)]
        category: Option<String>,

        /// Short title summary (5-10 words; defaults to the request text)
        #[arg(long)]
        summary: Option<String>,

        /// Extracted field value as name=value (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Version of the tool the request is about, for Environment fields
        #[arg(long)]
        tool_version: Option<String>,
    },

    /// Compute a dispatch plan for a batch of work items
    Plan {
        /// Request text; trailing -s/-q/-p flags adjust mode and sequencing
        request: Option<String>,

        /// Host session mode
        #[arg(long, value_parser = parse_mode, default_value = "executing")]
        mode: ModeFlag,

        /// YAML file holding the work items
        #[arg(long)]
        items: PathBuf,

        /// Cap on parallel group size
        #[arg(long)]
        max_parallel: Option<usize>,

        /// Never parallelize, even for independent items
        #[arg(long)]
        sequential: bool,
    },

    /// Plan in executing mode and dispatch to a worker command
    Run {
        /// YAML file holding the work items
        #[arg(long)]
        items: PathBuf,

        /// Worker command; receives the description on stdin. Omitted means
        /// a dry run: every item is marked successful without doing work.
        #[arg(long)]
        worker_cmd: Option<String>,

        /// Extra argument for the worker command (repeatable)
        #[arg(long = "worker-arg")]
        worker_args: Vec<String>,

        /// Per-worker timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Cap on parallel group size
        #[arg(long)]
        max_parallel: Option<usize>,

        /// Never parallelize, even for independent items
        #[arg(long)]
        sequential: bool,
    },

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn parse_mode(s: &str) -> Result<ModeFlag, String> {
    s.parse::<ModeFlag>().map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        // stdout is reserved for command output (`--json` in particular);
        // logs go to stderr.
        .with_writer(std::io::stderr)
        .init();

    let root = cli
        .root
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let result = match cli.command {
        Commands::Classify { text } => cmd::classify::run(&root, &text, cli.json),
        Commands::New {
            text,
            category,
            summary,
            fields,
            tool_version,
        } => cmd::new::run(
            &root,
            &text,
            category.as_deref(),
            summary.as_deref(),
            &fields,
            tool_version.as_deref(),
            cli.json,
        ),
        Commands::Plan {
            request,
            mode,
            items,
            max_parallel,
            sequential,
        } => cmd::plan::run(
            mode,
            request.as_deref(),
            &items,
            max_parallel,
            sequential,
            cli.json,
        ),
        Commands::Run {
            items,
            worker_cmd,
            worker_args,
            timeout_secs,
            max_parallel,
            sequential,
        } => cmd::run::run(
            &items,
            worker_cmd.as_deref(),
            &worker_args,
            timeout_secs,
            max_parallel,
            sequential,
            cli.json,
        ),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
