//! Bulk loader domain - synthetic rows, reference data and the batch-write port

mod generator;
mod random;
mod reference;
mod row;
mod store;

pub use generator::{ArticleRowGenerator, RowGenerator, UserRowGenerator};
pub use random::random_index;
pub use reference::{ReferencePools, pick};
pub use row::{NewArticle, NewRow, NewUser};
pub use store::{BatchStore, BatchTransaction};
