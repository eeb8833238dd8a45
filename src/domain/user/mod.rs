//! User domain
//!
//! Users, the articles they own, and the read ports over them.

mod entity;
mod repository;

pub use entity::{Article, ArticleId, User, UserId};
pub use repository::{UserRepository, UserStore};

#[cfg(test)]
pub use repository::{MockUserRepository, MockUserStore};
