//! PostgreSQL store with connection pooling

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::loader::{BatchStore, BatchTransaction, NewRow};
use crate::domain::user::{Article, ArticleId, User, UserId, UserStore};
use crate::domain::DomainError;

const USERS_SELECT: &str = "SELECT id, name FROM users";
const USER_BY_ID_SELECT: &str = "SELECT id, name FROM users WHERE id = $1";
const USERS_BY_NAME_SELECT: &str = "SELECT id, name FROM users WHERE name = $1";
const USER_ARTICLES_SELECT: &str =
    "SELECT id, title, text, user_id FROM articles WHERE user_id = $1";
const USER_IDS_SELECT: &str = "SELECT id FROM users";

// One round trip per batch: the queued values travel as parallel arrays
const USERS_BATCH_INSERT: &str = "INSERT INTO users (name) SELECT * FROM UNNEST($1::text[])";
const ARTICLES_BATCH_INSERT: &str = "INSERT INTO articles (user_id, title, text) \
     SELECT * FROM UNNEST($1::uuid[], $2::text[], $3::text[])";

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        title TEXT NOT NULL,
        text TEXT,
        user_id UUID NOT NULL REFERENCES users (id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS users_name_idx ON users (name)",
    "CREATE INDEX IF NOT EXISTS articles_user_id_idx ON articles (user_id)",
];

/// PostgreSQL connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Pool acquire timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/app".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

/// Users and articles tables behind one sqlx pool
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        info!(
            max_connections = config.max_connections,
            "PostgreSQL connection pool established"
        );

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the users and articles tables if they do not exist
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to create schema: {}", e)))?;
        }

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn fetch_users(&self, query: &str, bind: Option<Bind<'_>>) -> Result<Vec<User>, DomainError> {
        let mut query = sqlx::query(query);
        query = match bind {
            Some(Bind::Uuid(id)) => query.bind(id),
            Some(Bind::Text(text)) => query.bind(text),
            None => query,
        };

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("DB query failed: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }
}

enum Bind<'a> {
    Uuid(Uuid),
    Text(&'a str),
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let id: Uuid = row.try_get("id").map_err(parse_error)?;
    let name: String = row.try_get("name").map_err(parse_error)?;

    Ok(User::new(UserId::new(id), name))
}

fn row_to_article(row: &PgRow) -> Result<Article, DomainError> {
    Ok(Article {
        id: ArticleId::new(row.try_get("id").map_err(parse_error)?),
        user_id: UserId::new(row.try_get("user_id").map_err(parse_error)?),
        title: row.try_get("title").map_err(parse_error)?,
        text: row.try_get("text").map_err(parse_error)?,
    })
}

fn parse_error(e: sqlx::Error) -> DomainError {
    DomainError::storage(format!("failed to parse the received result: {}", e))
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn find_users_by_id(&self, id: &UserId) -> Result<Vec<User>, DomainError> {
        self.fetch_users(USER_BY_ID_SELECT, Some(Bind::Uuid(*id.as_uuid())))
            .await
    }

    async fn find_users_by_name(&self, name: &str) -> Result<Vec<User>, DomainError> {
        self.fetch_users(USERS_BY_NAME_SELECT, Some(Bind::Text(name)))
            .await
    }

    async fn find_all_users(&self) -> Result<Vec<User>, DomainError> {
        self.fetch_users(USERS_SELECT, None).await
    }

    async fn find_articles_by_user(&self, user_id: &UserId) -> Result<Vec<Article>, DomainError> {
        let rows = sqlx::query(USER_ARTICLES_SELECT)
            .bind(*user_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("DB query failed: {}", e)))?;

        rows.iter().map(row_to_article).collect()
    }
}

#[async_trait]
impl BatchStore for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn BatchTransaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("failed to start a DB transaction: {}", e)))?;

        Ok(Box::new(PostgresBatchTransaction {
            tx,
            pending: Vec::new(),
        }))
    }

    async fn fetch_user_ids(&self) -> Result<Vec<UserId>, DomainError> {
        let rows = sqlx::query(USER_IDS_SELECT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("failed to get the users IDs from the DB: {}", e))
            })?;

        rows.iter()
            .map(|row| row.try_get::<Uuid, _>("id").map(UserId::new).map_err(parse_error))
            .collect()
    }
}

/// Open transaction buffering rows until the next batch submission
pub struct PostgresBatchTransaction {
    tx: Transaction<'static, Postgres>,
    pending: Vec<NewRow>,
}

impl Debug for PostgresBatchTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresBatchTransaction")
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Queued rows split into the column arrays of each insert
#[derive(Debug, Default, PartialEq)]
struct BatchColumns {
    user_names: Vec<String>,
    article_user_ids: Vec<Uuid>,
    article_titles: Vec<String>,
    article_texts: Vec<Option<String>>,
}

impl BatchColumns {
    fn from_rows(rows: Vec<NewRow>) -> Self {
        let mut columns = Self::default();

        for row in rows {
            match row {
                NewRow::User(user) => columns.user_names.push(user.name),
                NewRow::Article(article) => {
                    columns.article_user_ids.push(*article.user_id.as_uuid());
                    columns.article_titles.push(article.title);
                    columns.article_texts.push(article.text);
                }
            }
        }

        columns
    }
}

#[async_trait]
impl BatchTransaction for PostgresBatchTransaction {
    fn queue(&mut self, row: NewRow) {
        self.pending.push(row);
    }

    fn queued(&self) -> usize {
        self.pending.len()
    }

    async fn submit_batch(&mut self) -> Result<(), DomainError> {
        let queued = self.pending.len();
        let columns = BatchColumns::from_rows(std::mem::take(&mut self.pending));

        if !columns.user_names.is_empty() {
            sqlx::query(USERS_BATCH_INSERT)
                .bind(&columns.user_names)
                .execute(&mut *self.tx)
                .await
                .map_err(|e| DomainError::storage(format!("failed to send the batch: {}", e)))?;
        }

        if !columns.article_user_ids.is_empty() {
            sqlx::query(ARTICLES_BATCH_INSERT)
                .bind(&columns.article_user_ids)
                .bind(&columns.article_titles)
                .bind(&columns.article_texts)
                .execute(&mut *self.tx)
                .await
                .map_err(|e| DomainError::storage(format!("failed to send the batch: {}", e)))?;
        }

        debug!(rows = queued, "batch sent");
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let PostgresBatchTransaction { tx, .. } = *self;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("failed to finish the transaction: {}", e)))
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        let PostgresBatchTransaction { tx, .. } = *self;

        tx.rollback().await.map_err(|e| {
            DomainError::storage(format!("failed to rollback the transaction: {}", e))
        })
    }
}
