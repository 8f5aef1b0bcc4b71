//! Faceboard CLI
//!
//! Terminal front end for the faceboard dashboard. Each subcommand is one
//! page: it loads the store list, selects a store, loads the page and
//! prints it as text or JSON.
//!
//! # Configuration
//!
//! - `--config <toml>`, else the default locations (see `faceboard config`)
//! - `FACEBOARD_*` environment variables override the file
//! - `RUST_LOG` overrides `[logging] level`

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use faceboard::config::{generate_default_config, Config, LoadedConfig, LoggingConfig};
use faceboard::pages::{
    self, AnalyticsPage, AnalyticsParams, Dashboard, LiveSessions, PageOutcome, PagedList,
    PeopleSource, PersonDetails, RecentVisitors, SearchPage, SessionDetails, SessionsSource,
};
use faceboard::pages::list::ListSource;
use faceboard::store::{StoreContext, StoreSource};
use faceboard::{render, SearchType};

#[derive(Parser)]
#[command(name = "faceboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Facial-recognition analytics dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store list: path or http(s) URL of config.json
    #[arg(long, global = true)]
    pub stores: Option<String>,

    /// Store id to use instead of the default store
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured stores
    Stores,

    /// Check the selected store's health
    Health,

    /// Keep checking health until interrupted
    Watch,

    /// Headline metrics, live sessions and recent visitors
    Dashboard,

    /// List sessions
    Sessions {
        /// Load pages 0 through N
        #[arg(short, long, default_value = "0")]
        page: usize,
        /// Case-insensitive session name filter
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show one session
    Session {
        /// Session name
        name: String,
    },

    /// List people
    People {
        /// Load pages 0 through N
        #[arg(short, long, default_value = "0")]
        page: usize,
        /// Case-insensitive person id filter
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show one person
    Person {
        /// Person id
        id: String,
    },

    /// Store analytics and business breakdowns
    Analytics {
        /// Date to break down (YYYY-MM-DD); also picks the calendar month
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Look up a session name or person id exactly
    Search {
        query: String,
        /// all, sessions or people
        #[arg(short = 't', long = "type", default_value = "all")]
        search_type: SearchType,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_deref());
    }

    let found = match &cli.config {
        Some(path) => LoadedConfig {
            config: Config::load_with_env(path)?,
            source: Some(path.clone()),
            skipped: Vec::new(),
        },
        None => Config::load_default(),
    };
    init_logging(&found.config.logging)?;
    found.log();
    let mut config = found.config;

    if let Some(source) = &cli.stores {
        config.stores.source = source.clone();
    }
    if let Some(store) = &cli.store {
        config.stores.store = Some(store.clone());
    }

    let ctx = StoreContext::from_config(&config)?;
    let loaded = ctx
        .load_config(&StoreSource::from(config.stores.source.as_str()))
        .await;

    if let Commands::Stores = cli.command {
        return emit(cli.format, &ctx.snapshot(), render::stores);
    }
    loaded.with_context(|| format!("loading stores from {}", config.stores.source))?;

    if let Some(id) = &config.stores.store {
        if !ctx.switch_store(id).await {
            bail!("Store '{}' does not exist or is not active", id);
        }
    }

    // Cancelled on Ctrl-C so in-flight loads are discarded
    let view = CancellationToken::new();
    {
        let view = view.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                view.cancel();
            }
        });
    }

    let api = ctx.api()?;
    let now = Utc::now();
    let page_size = config.pages.page_size as usize;
    let recent_limit = config.pages.recent_limit as usize;

    match cli.command {
        // Both handled before a store is selected
        Commands::Stores | Commands::Config { .. } => {}

        Commands::Health => {
            let state = ctx.snapshot();
            emit(cli.format, &state.connection, |status| {
                render::connection(status, state.last_health_check, now)
            })?;
            if !state.connection.is_online() {
                std::process::exit(1);
            }
        }

        Commands::Watch => watch(&ctx, cli.format, &view).await?,

        Commands::Dashboard => {
            let connection = ctx.connection_status();
            let (dashboard, live, recent) = tokio::join!(
                pages::load::<Dashboard>(&api, &connection, &view),
                pages::load::<LiveSessions>(&api, &recent_limit, &view),
                pages::load::<RecentVisitors>(&api, &recent_limit, &view),
            );
            let (Some(dashboard), Some(live), Some(recent)) =
                (dashboard.into_model(), live.into_model(), recent.into_model())
            else {
                bail!("Interrupted");
            };

            #[derive(Serialize)]
            struct DashboardView {
                #[serde(flatten)]
                dashboard: Dashboard,
                live_sessions: LiveSessions,
                recent_visitors: RecentVisitors,
            }
            let page = DashboardView {
                dashboard,
                live_sessions: live,
                recent_visitors: recent,
            };
            emit(cli.format, &page, |v| {
                render::dashboard(&v.dashboard, &v.live_sessions, &v.recent_visitors, now)
            })?;
        }

        Commands::Sessions { page, filter } => {
            let list = load_list::<SessionsSource>(&api, page_size, page, filter, &view).await?;
            emit(cli.format, &list, |l| render::session_list(l, now))?;
        }

        Commands::People { page, filter } => {
            let list = load_list::<PeopleSource>(&api, page_size, page, filter, &view).await?;
            emit(cli.format, &list, |l| render::people_list(l, now))?;
        }

        Commands::Session { name } => {
            let details = finish(pages::load::<SessionDetails>(&api, &name, &view).await)?;
            emit(cli.format, &details, |d| render::session_details(d, now))?;
        }

        Commands::Person { id } => {
            let details = finish(pages::load::<PersonDetails>(&api, &id, &view).await)?;
            emit(cli.format, &details, |d| render::person_details(d, now))?;
        }

        Commands::Analytics { date } => {
            let mut params = AnalyticsParams::for_month_of(now.date_naive());
            if let Some(date) = date {
                params = AnalyticsParams::for_month_of(date).select(date);
            }
            let page = finish(pages::load::<AnalyticsPage>(&api, &params, &view).await)?;
            emit(cli.format, &page, render::analytics)?;
        }

        Commands::Search { query, search_type } => {
            let params = (query, search_type);
            let page = finish(pages::load::<SearchPage>(&api, &params, &view).await)?;
            emit(cli.format, &page, |p| render::search(p, now))?;
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("faceboard={}", logging.level).into());

    // Logs go to stderr (or a file) so stdout stays clean for page output
    let writer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let fmt_layer = if logging.format == "json" {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(writer).boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();
    Ok(())
}

async fn load_list<S: ListSource>(
    api: &faceboard::ApiClient,
    page_size: usize,
    last_page: usize,
    filter: Option<String>,
    view: &CancellationToken,
) -> anyhow::Result<PagedList<S>> {
    let mut list = PagedList::<S>::new(page_size);
    if let Some(filter) = filter {
        list.set_filter(filter);
    }
    finish(list.load_through(api, last_page, view).await)?;
    Ok(list)
}

async fn watch(
    ctx: &StoreContext,
    format: OutputFormat,
    view: &CancellationToken,
) -> anyhow::Result<()> {
    let mut changes = ctx.subscribe();
    ctx.start_health_monitor();

    let print = |format| {
        let state = ctx.snapshot();
        let name = state
            .current
            .as_ref()
            .map(|store| store.name.clone())
            .unwrap_or_default();
        emit(format, &state.connection, |status| {
            format!(
                "{}\n{}",
                name,
                render::connection(status, state.last_health_check, Utc::now())
            )
        })
    };
    print(format)?;

    loop {
        tokio::select! {
            _ = view.cancelled() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                print(format)?;
            }
        }
    }

    ctx.stop_health_monitor();
    Ok(())
}

/// Unwrap a page outcome; fallbacks were already logged and still render
fn finish<M>(outcome: PageOutcome<M>) -> anyhow::Result<M> {
    match outcome.into_model() {
        Some(model) => Ok(model),
        None => bail!("Interrupted"),
    }
}

fn emit<T: Serialize>(
    format: OutputFormat,
    model: &T,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print!("{}", text(model)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(model)?),
    }
    Ok(())
}

fn write_default_config(output: Option<&std::path::Path>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }
    Ok(())
}
