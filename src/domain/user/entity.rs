//! User and article entities

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// User identifier assigned by the store at insert time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse an id from its textual form
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|e| {
                DomainError::invalid_argument(format!("invalid user id '{}': {}", value, e))
            })
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Article identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(Uuid);

impl ArticleId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Article owned by a user; never outlives or precedes its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub user_id: UserId,
    pub title: String,
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_parse_roundtrip() {
        let raw = Uuid::new_v4();
        let id = UserId::parse(&raw.to_string()).unwrap();
        assert_eq!(id.as_uuid(), &raw);
        assert_eq!(id.to_string(), raw.to_string());
    }

    #[test]
    fn test_user_id_parse_invalid() {
        let err = UserId::parse("not-a-uuid").unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));
        assert!(!err.is_not_found());
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_user_serializes_id_as_text() {
        let id = UserId::new(Uuid::nil());
        let json = serde_json::to_value(User::new(id, "Ann")).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["name"], "Ann");
    }

    #[test]
    fn test_article_without_text() {
        let article = Article {
            id: ArticleId::new(Uuid::new_v4()),
            user_id: UserId::new(Uuid::new_v4()),
            title: "Sneaker Helium".to_string(),
            text: None,
        };
        let json = serde_json::to_string(&article).unwrap();
        let back: Article = serde_json::from_str(&json).unwrap();
        assert_eq!(back, article);
        assert!(json.contains("\"text\":null"));
    }
}
