use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::{error, info, Instrument};

use super::{Result, StoreResult, SubscriberRecord, SubscriberStore, ValidSubscriber};
use crate::config::DbConfig;

/// PostgreSQL backed store. Records live in the `subscribers` table which is indexed on `source`.
#[derive(Clone, Debug)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    /// Connects to the database and runs the migrations.
    ///
    /// If the first connection attempt fails the error is logged and a lazily connecting pool is
    /// installed, so the service still starts and every insert fails until the database is back.
    pub async fn init(config: &DbConfig) -> Result<Self> {
        info!("{:<20} - Initializing the DB pool", "init_db");
        let con_opts = config.connection_options()?;
        let pool_opts = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout());

        Self::connect(pool_opts, con_opts).await
    }

    async fn connect(pool_opts: PgPoolOptions, con_opts: PgConnectOptions) -> Result<Self> {
        let db = match pool_opts.clone().connect_with(con_opts.clone()).await {
            Ok(db) => {
                info!("{:<20} - Connected to the database", "init_db");
                sqlx::migrate!("./migrations").run(&db).await?;
                db
            }
            Err(er) => {
                error!("{:<20} - Database connection error: {er}", "init_db");
                pool_opts.connect_lazy_with(con_opts)
            }
        };

        Ok(Self { db })
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }
}

#[async_trait]
impl SubscriberStore for PgStore {
    async fn insert_valid(&self, subscriber: ValidSubscriber) -> StoreResult<SubscriberRecord> {
        let record = SubscriberRecord::new(subscriber, Utc::now());

        let q_span = tracing::info_span!("Adding subscriber to the database");
        sqlx::query(
            r#"
            INSERT INTO subscribers
                (id, email, source, user_agent, ip, page_url, referrer, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
        )
        .bind(record.id)
        .bind(&record.email)
        .bind(&record.source)
        .bind(record.metadata.user_agent.as_deref())
        .bind(record.metadata.ip.as_deref())
        .bind(record.metadata.page_url.as_deref())
        .bind(record.metadata.referrer.as_deref())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.db)
        .instrument(q_span)
        .await?;

        Ok(record)
    }
}
