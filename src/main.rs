//! Sociograph - Social Graph Persistence and Query Layer

use clap::{Parser, Subcommand};

use sociograph::config::Config;
use sociograph::context::Context;
use sociograph::di::FromRef;
use sociograph::graph;
use sociograph::services::SocialGraphService;

#[derive(Parser)]
#[command(name = "sociograph")]
#[command(about = "Social graph persistence and query layer over Neo4j")]
struct Cli {
    /// Run in verbose mode
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check connectivity with a round trip
    Ping,
    /// Show a user by id
    User {
        /// The user id to look up
        id: i64,
    },
    /// List the followers of a user
    Followers {
        /// The followed user's id
        id: i64,
        /// Page size (0 selects the default)
        #[arg(long, default_value_t = 0)]
        limit: u32,
        /// Rows to skip before the page starts
        #[arg(long, default_value_t = 0)]
        skip: u32,
    },
    /// List the users a user follows
    Following {
        /// The follower's id
        id: i64,
        /// Page size (0 selects the default)
        #[arg(long, default_value_t = 0)]
        limit: u32,
        /// Rows to skip before the page starts
        #[arg(long, default_value_t = 0)]
        skip: u32,
    },
    /// Show global node and edge counts
    Stats,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = Config::load()?;

    // Connect to Neo4j (lazily; failures surface on first use)
    tracing::info!("Connecting to Neo4j at {}", config.graph.uri);
    let graph = graph::connect(&config.graph).await?;

    let ctx = Context::new(graph, config);
    let service = SocialGraphService::from_ref(&ctx);

    match cli.command {
        Command::Ping => {
            graph::ping(&ctx.graph).await?;
            tracing::info!("Neo4j answered");
        }
        Command::User { id } => match service.user_by_id(id).await? {
            Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
            None => tracing::warn!("No user with id {}", id),
        },
        Command::Followers { id, limit, skip } => {
            let users = service.followers_by_id(id, limit, skip).await?;
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
        Command::Following { id, limit, skip } => {
            let users = service.following_by_id(id, limit, skip).await?;
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
        Command::Stats => {
            let stats = service.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
