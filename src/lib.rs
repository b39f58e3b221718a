pub mod app;
pub mod cli;
pub mod compose;
pub mod config;
pub mod feed;
pub mod highlight;
pub mod session;
pub mod source;
pub mod ui;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use session::{ConnectionState, FeedSession, SessionOptions};
pub use source::{ApiError, SearchResponse, SearchSource};
