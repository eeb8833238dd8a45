//! In-memory store implementation

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::loader::{BatchStore, BatchTransaction, NewRow};
use crate::domain::user::{Article, ArticleId, User, UserId, UserStore};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    articles: Vec<Article>,
}

/// Rejects the `batch`-th submission (1-based) that writes to `table`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectedFailure {
    pub table: &'static str,
    pub batch: usize,
}

/// A successfully submitted batch, committed or not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRecord {
    pub table: &'static str,
    pub rows: usize,
}

#[derive(Debug, Default)]
struct Inner {
    tables: RwLock<Tables>,
    failure: Mutex<Option<InjectedFailure>>,
    batches: Mutex<Vec<BatchRecord>>,
    /// Submissions seen per table
    attempts: Mutex<HashMap<&'static str, usize>>,
}

/// Thread-safe in-memory users/articles store
///
/// Useful for testing and development. Data is lost when the process
/// terminates. Transactions stage their rows privately and apply them on
/// commit, enforcing the articles → users foreign key.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

fn poisoned<T>(_: T) -> DomainError {
    DomainError::storage("in-memory store lock poisoned")
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DomainError> {
    mutex.lock().map_err(poisoned)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with users. Duplicate ids are kept as
    /// given, which allows reproducing integrity violations.
    pub fn with_users(users: Vec<User>) -> Self {
        let store = Self::new();
        if let Ok(mut tables) = store.inner.tables.write() {
            tables.users = users;
        }
        store
    }

    /// Makes the `batch`-th submission touching `table` fail
    pub fn fail_on_batch(&self, table: &'static str, batch: usize) -> Result<(), DomainError> {
        *lock(&self.inner.failure)? = Some(InjectedFailure { table, batch });
        Ok(())
    }

    pub fn user_count(&self) -> Result<usize, DomainError> {
        Ok(self.inner.tables.read().map_err(poisoned)?.users.len())
    }

    pub fn articles(&self) -> Result<Vec<Article>, DomainError> {
        Ok(self.inner.tables.read().map_err(poisoned)?.articles.clone())
    }

    /// Successful batch submissions in order
    pub fn batches(&self) -> Result<Vec<BatchRecord>, DomainError> {
        Ok(lock(&self.inner.batches)?.clone())
    }

    fn read_users<F>(&self, filter: F) -> Result<Vec<User>, DomainError>
    where
        F: Fn(&User) -> bool,
    {
        let tables = self.inner.tables.read().map_err(poisoned)?;
        Ok(tables.users.iter().filter(|u| filter(u)).cloned().collect())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_users_by_id(&self, id: &UserId) -> Result<Vec<User>, DomainError> {
        self.read_users(|u| u.id == *id)
    }

    async fn find_users_by_name(&self, name: &str) -> Result<Vec<User>, DomainError> {
        self.read_users(|u| u.name == name)
    }

    async fn find_all_users(&self) -> Result<Vec<User>, DomainError> {
        self.read_users(|_| true)
    }

    async fn find_articles_by_user(&self, user_id: &UserId) -> Result<Vec<Article>, DomainError> {
        let tables = self.inner.tables.read().map_err(poisoned)?;
        Ok(tables
            .articles
            .iter()
            .filter(|a| a.user_id == *user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BatchStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn BatchTransaction>, DomainError> {
        Ok(Box::new(InMemoryTransaction {
            inner: Arc::clone(&self.inner),
            pending: Vec::new(),
            staged: Vec::new(),
        }))
    }

    async fn fetch_user_ids(&self) -> Result<Vec<UserId>, DomainError> {
        let tables = self.inner.tables.read().map_err(poisoned)?;
        Ok(tables.users.iter().map(|u| u.id).collect())
    }
}

/// Transaction over [`InMemoryStore`]
#[derive(Debug)]
pub struct InMemoryTransaction {
    inner: Arc<Inner>,
    pending: Vec<NewRow>,
    staged: Vec<NewRow>,
}

impl InMemoryTransaction {
    fn check_injected_failure(&self, table: &'static str) -> Result<(), DomainError> {
        let attempt = {
            let mut attempts = lock(&self.inner.attempts)?;
            let count = attempts.entry(table).or_insert(0);
            *count += 1;
            *count
        };

        match *lock(&self.inner.failure)? {
            Some(failure) if failure.table == table && failure.batch == attempt => {
                Err(DomainError::storage(format!(
                    "failed to send the batch: injected failure on {} batch {}",
                    table, attempt
                )))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl BatchTransaction for InMemoryTransaction {
    fn queue(&mut self, row: NewRow) {
        self.pending.push(row);
    }

    fn queued(&self) -> usize {
        self.pending.len()
    }

    async fn submit_batch(&mut self) -> Result<(), DomainError> {
        let Some(first) = self.pending.first() else {
            return Ok(());
        };
        let table = first.table();

        self.check_injected_failure(table)?;

        let rows = self.pending.len();
        self.staged.append(&mut self.pending);
        lock(&self.inner.batches)?.push(BatchRecord { table, rows });

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let InMemoryTransaction { inner, staged, .. } = *self;
        let mut tables = inner.tables.write().map_err(poisoned)?;
        let mut users = Vec::new();
        let mut articles = Vec::new();

        for row in staged {
            match row {
                NewRow::User(user) => users.push(User::new(UserId::new(Uuid::new_v4()), user.name)),
                NewRow::Article(article) => articles.push(Article {
                    id: ArticleId::new(Uuid::new_v4()),
                    user_id: article.user_id,
                    title: article.title,
                    text: article.text,
                }),
            }
        }

        let owner_exists = |id: &UserId| {
            tables.users.iter().any(|u| u.id == *id) || users.iter().any(|u| u.id == *id)
        };
        if let Some(orphan) = articles.iter().find(|a| !owner_exists(&a.user_id)) {
            return Err(DomainError::storage(format!(
                "insert on table \"articles\" violates foreign key: user {} does not exist",
                orphan.user_id
            )));
        }

        tables.users.extend(users);
        tables.articles.extend(articles);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::loader::{NewArticle, NewUser};

    fn new_user(name: &str) -> NewRow {
        NewUser {
            name: name.to_string(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_rows_invisible_until_commit() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        tx.queue(new_user("Ann"));
        assert_eq!(tx.queued(), 1);
        tx.submit_batch().await.unwrap();
        assert_eq!(tx.queued(), 0);
        assert_eq!(store.user_count().unwrap(), 0);

        tx.commit().await.unwrap();
        assert_eq!(store.user_count().unwrap(), 1);
        assert_eq!(store.find_users_by_name("Ann").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unsubmitted_rows_are_not_committed() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        tx.queue(new_user("Ann"));
        tx.commit().await.unwrap();

        assert_eq!(store.user_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rollback_discards_rows() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        tx.queue(new_user("Ann"));
        tx.submit_batch().await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.user_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = InMemoryStore::new();
        store.fail_on_batch("users", 2).unwrap();
        let mut tx = store.begin().await.unwrap();

        tx.queue(new_user("Ann"));
        tx.submit_batch().await.unwrap();
        tx.queue(new_user("Bob"));
        assert!(tx.submit_batch().await.is_err());
    }

    #[tokio::test]
    async fn test_injected_failure_counts_per_table() {
        let store = InMemoryStore::new();
        store.fail_on_batch("articles", 2).unwrap();
        let mut tx = store.begin().await.unwrap();

        for name in ["Ann", "Bob", "Cyd"] {
            tx.queue(new_user(name));
            tx.submit_batch().await.unwrap();
        }

        let article = || -> NewRow {
            NewArticle {
                user_id: UserId::new(Uuid::new_v4()),
                title: "Loafer Helium".to_string(),
                text: None,
            }
            .into()
        };
        tx.queue(article());
        tx.submit_batch().await.unwrap();
        tx.queue(article());
        assert!(tx.submit_batch().await.is_err());

        let attempts = lock(&store.inner.attempts).unwrap();
        assert_eq!(attempts.get("users"), Some(&3));
        assert_eq!(attempts.get("articles"), Some(&2));
    }

    #[tokio::test]
    async fn test_foreign_key_enforced() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        tx.queue(
            NewArticle {
                user_id: UserId::new(Uuid::new_v4()),
                title: "Loafer Helium".to_string(),
                text: None,
            }
            .into(),
        );
        tx.submit_batch().await.unwrap();

        assert!(tx.commit().await.is_err());
        assert!(store.articles().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_returned() {
        let id = UserId::new(Uuid::new_v4());
        let store = InMemoryStore::with_users(vec![User::new(id, "Ann"), User::new(id, "Ann")]);

        assert_eq!(store.find_users_by_id(&id).await.unwrap().len(), 2);
    }
}
