use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use devgraph_core::{
    explore::{self, Direction},
    Config, DataProvider, Error, GitHubProvider, RelationSort,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

#[derive(Parser)]
#[command(name = "devgraph")]
#[command(version, about = "Explore GitHub developer networks from the terminal", long_about = None)]
struct Cli {
    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Keep favorites in memory only (nothing touches disk)
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Print JSON instead of text where supported
    #[arg(long, global = true)]
    json: bool,

    /// How many network neighbours to look at for relations and recommendations
    #[arg(long, global = true, default_value_t = 5)]
    fan_out: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show a developer's profile card with tags and activity
    Profile { login: String },
    /// List who a developer follows (or their followers)
    Relations {
        login: String,
        /// followers | common
        #[arg(long, default_value = "followers")]
        sort: RelationSort,
        /// List followers instead of following
        #[arg(long)]
        followers: bool,
    },
    /// Suggest developers and repositories
    Recommend { login: String },
    /// Compare two developers' networks
    Compare { a: String, b: String },
    /// Search developers (recorded in history)
    Search { query: String },
    /// Save a developer
    SaveDev { login: String },
    /// Save a repository
    SaveRepo {
        /// owner/name
        name: String,
    },
    /// Remove a saved developer by id
    UnsaveDev { id: u64 },
    /// Remove a saved repository by id
    UnsaveRepo { id: u64 },
    /// Show saved developers and repositories
    Saved,
    /// Show recent searches
    History {
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devgraph=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<Error>() {
            Some(e @ Error::RateLimitExceeded { .. }) => {
                eprintln!("{}. A GITHUB_TOKEN raises the limit.", e)
            }
            _ => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load config")?;
    if cli.token.is_some() {
        config.github.token = cli.token.clone();
    }

    let provider = GitHubProvider::new(config.client_config())?;
    let favorites = config.open_favorites(cli.ephemeral)?;

    match cli.command {
        Commands::Profile { login } => {
            tracing::info!("Loading profile: {}", login);
            let overview = explore::developer_overview(&provider, &login, Utc::now()).await?;
            let saved = favorites.is_developer_saved(overview.profile.id);
            output::print_overview(&overview, saved);
        }
        Commands::Relations {
            login,
            sort,
            followers,
        } => {
            let direction = if followers {
                Direction::Followers
            } else {
                Direction::Following
            };
            let list = explore::relations(&provider, &login, direction, sort, cli.fan_out).await?;
            output::print_relations(&list);
        }
        Commands::Recommend { login } => {
            let developers =
                explore::developer_recommendations(&provider, &login, cli.fan_out).await?;
            let repos =
                explore::repository_recommendations(&provider, &login, cli.fan_out, Utc::now())
                    .await?;
            output::print_recommendations(&developers, &repos);
        }
        Commands::Compare { a, b } => {
            let comparison = explore::compare_developers(&provider, &a, &b).await?;
            output::print_comparison(&comparison);
        }
        Commands::Search { query } => {
            favorites.record_query(&query);
            let users = provider.search_users(&query).await?;
            output::print_users(&users);
        }
        Commands::SaveDev { login } => {
            let profile = provider.user(&login).await?;
            if favorites.save_developer(&profile) {
                println!("Saved {} ({})", profile.login, profile.id);
            } else {
                println!("{} is already saved (or could not be written)", profile.login);
            }
        }
        Commands::SaveRepo { name } => {
            let Some((owner, repo_name)) = name.split_once('/') else {
                bail!("expected owner/name, got '{}'", name);
            };
            let repo = provider.repo(owner, repo_name).await?;
            if favorites.save_repo(&repo) {
                println!("Saved {} ({})", repo.full_name, repo.id);
            } else {
                println!("{} is already saved (or could not be written)", repo.full_name);
            }
        }
        Commands::UnsaveDev { id } => {
            if !favorites.remove_developer(id) {
                println!("No saved developer with id {}", id);
            }
        }
        Commands::UnsaveRepo { id } => {
            if !favorites.remove_repo(id) {
                println!("No saved repository with id {}", id);
            }
        }
        Commands::Saved => {
            let developers = favorites.saved_developers();
            let repos = favorites.saved_repos();
            if cli.json {
                let value = serde_json::json!({ "developers": developers, "repos": repos });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                output::print_saved(&developers, &repos);
            }
        }
        Commands::History { clear } => {
            if clear {
                favorites.clear_search_history();
            } else {
                for query in favorites.search_history() {
                    println!("{}", query);
                }
            }
        }
    }

    Ok(())
}
