//! SocialTrade CLI — entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use socialtrade_cli::config::Settings;
use socialtrade_cli::report::{connections_report, users_report, AuditReport};

#[derive(Parser)]
#[command(
    name = "socialtrade",
    about = "Recover typed user records from social-feed and portfolio text exports",
    version
)]
struct Cli {
    /// Directory of social-feed exports (<id>.txt).
    #[arg(long, global = true)]
    social_dir: Option<String>,

    /// Directory of portfolio exports (<id>Web3.txt).
    #[arg(long, global = true)]
    portfolio_dir: Option<String>,

    /// Connection loads in flight at once.
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered users (default).
    Users,

    /// Print a user's parsed record as JSON.
    Show {
        /// User id.
        id: String,

        /// Single-line JSON.
        #[arg(long)]
        compact: bool,
    },

    /// Load a user's connections and summarize them.
    Connections {
        /// User id.
        id: String,

        /// Only users mentioned in this user's posts.
        #[arg(long)]
        mentioned: bool,
    },

    /// Count dropped fragments for every registered user.
    ///
    /// Exits with status 1 when any user fails to load.
    Audit,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   socialtrade completions bash > ~/.local/share/bash-completion/completions/socialtrade
    ///   socialtrade completions zsh > ~/.zfunc/_socialtrade
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode.
    Repl,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::resolve(
        cli.social_dir.as_deref(),
        cli.portfolio_dir.as_deref(),
        cli.jobs,
    );

    match cli.command.unwrap_or(Commands::Users) {
        Commands::Users => {
            let loader = settings.open_loader()?;
            println!("{}", serde_json::to_string_pretty(&users_report(&loader))?);
        }

        Commands::Show { id, compact } => {
            let loader = settings.open_loader()?;
            let record = loader.load(&id)?;
            let out = if compact {
                serde_json::to_string(&record)?
            } else {
                serde_json::to_string_pretty(&record)?
            };
            println!("{out}");
        }

        Commands::Connections { id, mentioned } => {
            let loader = settings.open_loader()?;
            let record = loader.load(&id)?;
            let connections = if mentioned {
                loader.load_mentioned_connections(&record)
            } else {
                loader.load_connections(&record)
            };
            let report = connections_report(&id, &connections, mentioned);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Audit => {
            let loader = settings.open_loader()?;
            let report = AuditReport::collect(&loader);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.has_failures() {
                eprintln!("{} users failed to load", report.failures.len());
                std::process::exit(1);
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "socialtrade", &mut std::io::stdout());
        }

        Commands::Repl => {
            socialtrade_cli::repl::run(&settings)?;
        }
    }

    Ok(())
}
