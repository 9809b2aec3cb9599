//! Reader and publisher for a small article archive that keeps working offline.

pub mod article;
pub mod config;
pub mod gateway;
pub mod reader;
pub mod seed;
pub mod store;
pub mod view;

pub(crate) mod utils;

pub use article::{Article, ArticleId, Draft};
pub use gateway::{FailToGetArticle, Gateway, Latency};
pub use reader::Reader;
pub use store::FallbackStore;
