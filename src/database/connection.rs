use crate::config::DatabaseConfig;
use crate::error::AppResult;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;

/// 各服务共享的连接句柄
pub type DbPool = Arc<DatabaseConnection>;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut opts = ConnectOptions::new(config.url.clone());
    opts.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .sqlx_logging(false);

    let pool = Database::connect(opts).await?;

    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &DatabaseConnection) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::DbPool;
    use sea_orm::{DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    pub trait IntoPool {
        fn into_pool(self) -> DbPool;
    }

    impl IntoPool for MockDatabase {
        fn into_pool(self) -> DbPool {
            Arc::new(self.into_connection())
        }
    }

    /// 取回 mock 连接记录的 SQL，调用前需先释放持有连接的服务
    pub fn transaction_log(pool: DbPool) -> String {
        let conn: DatabaseConnection = Arc::try_unwrap(pool)
            .ok()
            .expect("mock connection is still shared");
        format!("{:?}", conn.into_transaction_log())
    }
}
