//! Academic Forum Directory server
//!
//! Serves the organization hierarchy and contact directory over HTTP.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forum_directory::{
    routes, AppState, Config, ContactStore, HierarchyStore, InMemoryContactStore,
    InMemoryHierarchyStore, InMemoryUserStore, SqliteStore, UserStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forum_directory=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(?config, "Loaded configuration");

    let catalog = config.load_catalog()?;
    tracing::info!(schools = catalog.schools().len(), "Loaded catalog");

    match &config.database {
        Some(path) => {
            let store = Arc::new(SqliteStore::open(path)?);
            tracing::info!(path = %path, "Opened SQLite store");
            serve(&config, catalog, Arc::clone(&store), Arc::clone(&store), store).await
        }
        None => {
            tracing::warn!("No FORUM_DATABASE set, data will not survive a restart");
            serve(
                &config,
                catalog,
                Arc::new(InMemoryHierarchyStore::new()),
                Arc::new(InMemoryContactStore::new()),
                Arc::new(InMemoryUserStore::new()),
            )
            .await
        }
    }
}

async fn serve<H, C, U>(
    config: &Config,
    catalog: forum_core::Catalog,
    hierarchy: Arc<H>,
    contacts: Arc<C>,
    users: Arc<U>,
) -> Result<()>
where
    H: HierarchyStore + 'static,
    C: ContactStore + 'static,
    U: UserStore + 'static,
{
    let state = Arc::new(AppState::new(
        catalog,
        config.hierarchy_settings(),
        &config.admin_emails,
        hierarchy,
        contacts,
        users,
    ));

    let app = routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Directory listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
