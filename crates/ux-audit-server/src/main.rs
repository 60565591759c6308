//! UX Optimizer server — entry point.

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use ux_audit_server::rest::{self, AnalyzeResponse, AppState};
use ux_audit_server::ServerConfig;

#[derive(Parser)]
#[command(
    name = "ux-audit-server",
    about = "UX Optimizer — UX/SEO audit of a single web page",
    version
)]
struct Cli {
    /// Gemini API key (overrides GEMINI_API_KEY).
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API (default).
    Serve {
        /// Listen address (host:port). Also reads UX_AUDIT_ADDR.
        #[arg(long)]
        addr: Option<String>,
    },

    /// Audit one URL and print the API response as JSON.
    Audit {
        /// Page to audit; `https://` is assumed when no scheme is given.
        url: String,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve { addr: None }) {
        Commands::Serve { addr } => {
            let config = ServerConfig::from_env().with_overrides(addr, cli.api_key);
            tracing::info!("UX Optimizer v{}", env!("CARGO_PKG_VERSION"));
            let state = Arc::new(AppState::from_config(&config).await);
            rest::start(&config.addr, state).await?;
        }

        Commands::Audit { url } => {
            let config = ServerConfig::from_env().with_overrides(None, cli.api_key);
            let state = AppState::from_config(&config).await;
            let result = state.auditor.run(&url).await;
            let response = AnalyzeResponse::from_result(&url, result);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ux-audit-server", &mut std::io::stdout());
        }
    }

    Ok(())
}
