use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use facadex_cli::OutputFormat;
use facadex_cli::commands::{self, facades::FacadeOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "facadex")]
#[command(author, version)]
#[command(
    about = "Find third-party embeds that could be lazy-loaded behind a facade",
    long_about = "facadex reads a HAR capture of a page load, attributes every third-party request \
                  to the organization and product that caused it, and reports the embeds (video \
                  players, chat widgets, ...) that have a known lightweight facade together with \
                  the bytes and main-thread blocking time they cost."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Report third-party products that could be replaced by a facade
    Facades {
        /// Path to the HAR file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// JSON list of main-thread tasks ({url, duration, nested}) for blocking time
        #[arg(long, env = "FACADEX_TASKS")]
        tasks: Option<PathBuf>,

        /// Knowledge base JSON replacing the bundled one
        #[arg(long, env = "FACADEX_ENTITIES")]
        entities: Option<PathBuf>,

        /// URL of the page's main document (default: first HTML response)
        #[arg(long)]
        main_url: Option<String>,

        /// Multiplier applied to task durations
        #[arg(long, default_value_t = 1.0)]
        cpu_multiplier: f64,
    },

    /// List the third-party entities and products that can be recognized
    Entities {
        /// Knowledge base JSON replacing the bundled one
        #[arg(long, env = "FACADEX_ENTITIES")]
        entities: Option<PathBuf>,

        /// Only show products with a known facade
        #[arg(long)]
        facadable_only: bool,
    },

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:\n  bash, zsh, fish, powershell, elvish\n\n\
                            INSTALLATION:\n  \
                            bash: facadex completion --shell bash >> ~/.bashrc\n  \
                            zsh:  facadex completion --shell zsh > \"${fpath[1]}/_facadex\"\n  \
                            fish: facadex completion --shell fish > ~/.config/fish/completions/facadex.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match cli.command {
        Commands::Facades {
            file,
            tasks,
            entities,
            main_url,
            cpu_multiplier,
        } => {
            let options = FacadeOptions {
                tasks,
                entities,
                main_url,
                cpu_multiplier,
            };
            commands::facades::execute(&file, &options, cli.format)
        }
        Commands::Entities {
            entities,
            facadable_only,
        } => commands::entities::execute(entities.as_deref(), facadable_only, cli.format),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            commands::completion::execute(shell, &mut cmd)
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("facadex=debug,facadex_cli=debug,facadex_core=debug,facadex_detectors=debug")
    } else {
        EnvFilter::new("facadex=info,facadex_cli=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
