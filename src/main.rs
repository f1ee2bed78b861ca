use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use team_registration::api::{ApiClient, ApiError};
use team_registration::config::ClientConfig;
use team_registration::effects::Effect;
use team_registration::search::{SearchOutcome, ToggleOutcome};
use team_registration::session::{
    SessionBootstrap, SessionState, SessionStore, StaticIdentityProvider,
};
use team_registration::types::{AccessToken, Identity, Session};
use team_registration::workflow::{TeamFormationEngine, WorkflowError};

#[derive(Parser)]
#[command(name = "team-register")]
#[command(about = "Form a team and register it for a tournament")]
struct Cli {
    /// Backend root URL (overrides TEAM_REG_API_BASE_URL)
    #[arg(long)]
    api_base_url: Option<String>,

    /// Access token issued by the identity provider
    #[arg(long, env = "TEAM_REG_TOKEN", hide_env_values = true)]
    token: String,

    /// Id of the signed-in user
    #[arg(long, env = "TEAM_REG_USER_ID")]
    user_id: String,

    /// Username of the signed-in user
    #[arg(long, env = "TEAM_REG_USERNAME")]
    username: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a team, add members, and finalize the registration
    Register {
        /// Tournament slug
        #[arg(long)]
        slug: String,

        /// Name of the new team
        #[arg(long)]
        team_name: String,

        /// Username (or fragment) of a teammate to add; repeatable
        #[arg(long = "member")]
        members: Vec<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("search for {query:?} failed: {message}")]
    Search { query: String, message: String },

    #[error("no user matches {query:?}")]
    NoMatch { query: String },

    #[error("{query:?} matches several users: {candidates}")]
    Ambiguous { query: String, candidates: String },

    #[error("{username} is already on the team")]
    AlreadyOnTeam { username: String },

    #[error("team is full, cannot add {username}")]
    TeamFull { username: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "team_registration=info,team_register=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Registration failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_base_url {
        config.api_base_url = url;
    }
    let api = Arc::new(ApiClient::from_config(&config)?);

    let session = Session::new(
        AccessToken::new(cli.token),
        Identity::new(cli.user_id, cli.username),
    );
    let provider = Arc::new(StaticIdentityProvider::new(Some(session)));
    let store = SessionStore::new();
    let (outbox_tx, mut outbox) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();
    let bootstrap = tokio::spawn(
        SessionBootstrap::new(Arc::clone(&api), provider, store.clone())
            .run(outbox_tx, shutdown.clone()),
    );

    let state = store.wait_for(SessionState::is_profile_resolved).await;
    while let Ok(effect) = outbox.try_recv() {
        if effect == Effect::PromptProfileSetup {
            warn!("No profile yet; complete it in the web client to show it on the roster");
        }
    }

    let result = match cli.command {
        Command::Register {
            slug,
            team_name,
            members,
        } => register(api, &state, &config, &slug, team_name, &members).await,
    };

    shutdown.cancel();
    if let Err(e) = bootstrap.await {
        warn!(error = %e, "Session bootstrap task failed");
    }
    result
}

async fn register(
    api: Arc<ApiClient>,
    session: &SessionState,
    config: &ClientConfig,
    slug: &str,
    team_name: String,
    members: &[String],
) -> Result<(), CliError> {
    let mut engine = TeamFormationEngine::load(api, session, slug, &config.search).await?;

    engine.set_team_name(team_name)?;
    let team = engine.create_team().await?;
    println!("Created team {} ({})", team.name, team.id);

    for query in members {
        add_member(&mut engine, query).await?;
    }

    engine.continue_to_summary()?;
    if let Some(summary) = engine.summary() {
        println!("{} / {}", summary.tournament_name, summary.team_name);
        for entry in &summary.entries {
            println!("  {:<8} {}", format!("{:?}", entry.role), entry.display_name);
        }
    }

    for effect in engine.finalize().await? {
        if let Effect::Navigate(route) = effect {
            info!(path = %route.path(), "Registration complete");
            println!("Registration complete: {}", route.path());
        }
    }
    Ok(())
}

/// Searches for `query` and adds the exact username match, or the only result.
async fn add_member(
    engine: &mut TeamFormationEngine<ApiClient>,
    query: &str,
) -> Result<(), CliError> {
    engine.set_search_query(query)?;
    if let Some(SearchOutcome::Failed { message, .. }) = engine.settle_search().await {
        return Err(CliError::Search {
            query: query.to_string(),
            message,
        });
    }

    let candidates = engine.visible_candidates();
    let wanted = query.trim();
    let pick = match candidates
        .iter()
        .find(|c| c.display_name.eq_ignore_ascii_case(wanted))
    {
        Some(exact) => exact.clone(),
        None => match candidates.as_slice() {
            [only] => only.clone(),
            [] => {
                return Err(CliError::NoMatch {
                    query: query.to_string(),
                });
            }
            several => {
                let names: Vec<&str> = several.iter().map(|c| c.display_name.as_str()).collect();
                return Err(CliError::Ambiguous {
                    query: query.to_string(),
                    candidates: names.join(", "),
                });
            }
        },
    };

    let full = || CliError::TeamFull {
        username: pick.display_name.clone(),
    };
    match engine.toggle_candidate(&pick)? {
        ToggleOutcome::Selected => {}
        ToggleOutcome::LimitReached { .. } => return Err(full()),
        ToggleOutcome::Deselected | ToggleOutcome::Unavailable => {
            return Err(CliError::AlreadyOnTeam {
                username: pick.display_name.clone(),
            });
        }
    }
    if engine.confirm_selection()?.is_rejected() {
        return Err(full());
    }
    println!("Added {}", pick.display_name);
    Ok(())
}
