mod friend;
pub mod memory;
pub mod postgres;
mod relation;
mod user;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use abi::config::{Config, DbDriver};
use abi::errors::Result;

pub use friend::FriendRepo;
pub use relation::RelationService;
pub use user::UserRepo;

/// the repositories the rest of the app talks to, behind trait objects so the
/// backing store is picked by config
#[derive(Clone, Debug)]
pub struct DbRepo {
    pub user: Arc<dyn UserRepo>,
    pub friend: Arc<dyn FriendRepo>,
}

impl DbRepo {
    pub async fn new(config: &Config) -> Result<Self> {
        match config.db.driver {
            DbDriver::Memory => {
                info!("using in-memory relationship store");
                Ok(Self::memory())
            }
            DbDriver::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.db.max_connections)
                    .connect(&config.db.url())
                    .await?;
                if config.db.migrate {
                    sqlx::migrate!("./migrations").run(&pool).await?;
                    info!("database migrations applied");
                }

                Ok(Self {
                    user: Arc::new(postgres::PostgresUser::new(pool.clone())),
                    friend: Arc::new(postgres::PostgresFriend::new(pool)),
                })
            }
        }
    }

    /// both repos share one store so friendship edges are visible to user queries
    pub fn memory() -> Self {
        let store = Arc::new(memory::MemoryStore::new());
        Self {
            user: store.clone(),
            friend: store,
        }
    }
}
