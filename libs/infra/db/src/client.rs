// [libs/infra/db/src/client.rs]
use crate::errors::DbError;
use crate::schema::apply_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{info, instrument};

/// Handle to the libSQL database. Cloneable and cheap — each call site
/// grabs its own [`Connection`] from the shared driver rather than
/// sharing one across tasks.
#[derive(Clone)]
pub struct DbClient {
    driver: Arc<Database>,
    /// Keeps an in-memory database alive for the process lifetime.
    /// Without this anchor, an in-memory libSQL database is dropped (and
    /// its schema with it) the moment the connection that created it
    /// goes out of scope.
    _memory_anchor: Option<Arc<Connection>>,
}

impl DbClient {
    #[instrument(skip(auth_token))]
    pub async fn connect(database_url: &str, auth_token: Option<String>) -> Result<Self, DbError> {
        if database_url.is_empty() {
            return Err(DbError::Configuration("DATABASE_URL is empty".into()));
        }

        let is_remote = database_url.starts_with("libsql://") || database_url.starts_with("https://");
        let is_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        let driver = if is_remote {
            let token = auth_token
                .ok_or_else(|| DbError::Configuration("remote database URL requires an auth token".into()))?;
            Builder::new_remote(database_url.to_string(), token).build().await
        } else {
            Builder::new_local(database_url).build().await
        }
        .map_err(|e| DbError::Connection(e.to_string()))?;

        let driver = Arc::new(driver);
        let anchor = if is_memory {
            let conn = driver.connect().map_err(|e| DbError::Connection(e.to_string()))?;
            apply_schema(&conn).await?;
            Some(Arc::new(conn))
        } else {
            let conn = driver.connect().map_err(|e| DbError::Connection(e.to_string()))?;
            apply_schema(&conn).await?;
            None
        };

        info!("connected to {database_url}");
        Ok(Self { driver, _memory_anchor: anchor })
    }

    pub fn connection(&self) -> Result<Connection, DbError> {
        self.driver.connect().map_err(|e| DbError::Connection(e.to_string()))
    }
}
