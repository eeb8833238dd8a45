//! Cache keys for the cached read shapes

use std::fmt;

use crate::domain::user::UserId;

/// Key of a cached read, derived deterministically from the read shape and
/// its parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    User(UserId),
    UsersByName(String),
    UserArticles(UserId),
}

impl CacheKey {
    /// Namespace prefix of the key, also used as the metrics label
    pub fn namespace(&self) -> &'static str {
        match self {
            CacheKey::User(_) => "user",
            CacheKey::UsersByName(_) => "users-name",
            CacheKey::UserArticles(_) => "user-articles",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::User(id) | CacheKey::UserArticles(id) => {
                write!(f, "{}:{}", self.namespace(), id)
            }
            CacheKey::UsersByName(name) => write!(f, "{}:{}", self.namespace(), name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_user_key() {
        let id = UserId::new(Uuid::nil());
        assert_eq!(
            CacheKey::User(id).to_string(),
            "user:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_users_by_name_key() {
        let key = CacheKey::UsersByName("Ann Lee".to_string());
        assert_eq!(key.to_string(), "users-name:Ann Lee");
        assert_eq!(key.namespace(), "users-name");
    }

    #[test]
    fn test_shapes_do_not_collide() {
        let id = UserId::new(Uuid::new_v4());
        assert_ne!(
            CacheKey::User(id).to_string(),
            CacheKey::UserArticles(id).to_string()
        );
    }
}
