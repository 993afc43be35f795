use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use claims_assistant::adk::model::GenerationConfig;
use claims_assistant::claims::config::Config;
use claims_assistant::claims::context::AppContext;
use claims_assistant::claims::server;
use claims_assistant::claims::store::{ClaimsStore, PgClaimsStore};
use claims_assistant::claims::workflow::{Applicant, OhipWorkflow};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Bind host (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// YAML applicant profile used for "apply for OHIP" queries
        #[arg(short, long)]
        applicant: Option<PathBuf>,

        /// Start even if the agent cannot be initialized; /ask then answers 503
        #[arg(long)]
        allow_degraded: bool,
    },
    /// Answer a single query the way /ask would
    Ask {
        /// The query to send
        query: String,
    },
    /// Run the OHIP application workflow and print the final state
    Apply {
        /// YAML applicant profile
        #[arg(short, long)]
        applicant: Option<PathBuf>,
    },
}

fn load_applicant(path: Option<&Path>) -> anyhow::Result<Applicant> {
    match path {
        None => Ok(Applicant::default()),
        Some(path) => {
            let yaml = std::fs::read_to_string(path)
                .with_context(|| format!("reading applicant file {}", path.display()))?;
            Applicant::from_yaml(&yaml)
                .with_context(|| format!("parsing applicant file {}", path.display()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let mut config = Config::from_env()?;

    match args.command {
        Commands::Serve {
            host,
            port,
            applicant,
            allow_degraded,
        } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            let applicant = load_applicant(applicant.as_deref())?;

            let ctx = match AppContext::initialize(&config, applicant).await {
                Ok(ctx) => ctx,
                Err(e) if allow_degraded => {
                    log::error!("Error during startup: {}; serving in degraded mode", e);
                    AppContext::unavailable()
                }
                Err(e) => {
                    log::error!("Error during startup: {}", e);
                    return Err(e.into());
                }
            };

            server::serve(Arc::new(ctx), &config.bind_addr()).await?;
        }
        Commands::Ask { query } => {
            let ctx = AppContext::initialize(&config, Applicant::default()).await?;
            let response = ctx.answer(&query).await?;
            println!("{}", response);
        }
        Commands::Apply { applicant } => {
            let applicant = load_applicant(applicant.as_deref())?;
            let store: Arc<dyn ClaimsStore> = Arc::new(
                PgClaimsStore::connect(&config.database_url, config.database_max_connections)
                    .await?,
            );
            let workflow = OhipWorkflow::new(
                store,
                None,
                GenerationConfig::with_temperature(config.temperature),
            )?;

            let run = workflow.run_with_trace(applicant).await?;
            log::info!("Visited: {}", run.path.join(" -> "));
            println!("{}", serde_json::to_string_pretty(&run.state)?);
        }
    }

    Ok(())
}
