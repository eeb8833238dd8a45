//! Rows produced by the bulk loader

use crate::domain::user::UserId;

/// Insert of a user; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
}

/// Insert of an article owned by an already committed user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub user_id: UserId,
    pub title: String,
    pub text: Option<String>,
}

/// One queued insert statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewRow {
    User(NewUser),
    Article(NewArticle),
}

impl NewRow {
    /// Target table, used for logs and metric labels
    pub fn table(&self) -> &'static str {
        match self {
            NewRow::User(_) => "users",
            NewRow::Article(_) => "articles",
        }
    }
}

impl From<NewUser> for NewRow {
    fn from(row: NewUser) -> Self {
        NewRow::User(row)
    }
}

impl From<NewArticle> for NewRow {
    fn from(row: NewArticle) -> Self {
        NewRow::Article(row)
    }
}
