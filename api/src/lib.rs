use std::sync::Arc;

use tracing::info;

use abi::config::Config;
use abi::errors::Result;
use db::{DbRepo, RelationService};

use crate::stream::{ChatTokenIssuer, StreamTokenIssuer};

mod api_utils;
pub(crate) mod handlers;
pub(crate) mod routes;
pub mod stream;

pub use routes::app_routes;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: DbRepo,
    pub relation: RelationService,
    pub chat: Arc<dyn ChatTokenIssuer>,
    pub jwt_secret: String,
    pub jwt_expires_days: i64,
    pub cookie_secure: bool,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self> {
        let db = DbRepo::new(config).await?;
        let chat = Arc::new(StreamTokenIssuer::new(&config.stream));
        Ok(Self::from_parts(config, db, chat))
    }

    /// build the state around an existing store and chat-token issuer
    pub fn from_parts(config: &Config, db: DbRepo, chat: Arc<dyn ChatTokenIssuer>) -> Self {
        Self {
            relation: RelationService::new(&db),
            db,
            chat,
            jwt_secret: config.jwt.secret.clone(),
            jwt_expires_days: config.jwt.expires_days,
            cookie_secure: config.server.cookie_secure,
        }
    }
}

pub async fn start(config: Config) -> Result<()> {
    let state = AppState::new(&config).await?;
    let app = app_routes(state, &config.cors);
    let listener = tokio::net::TcpListener::bind(&config.server.server_url()).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
