pub mod config;
pub mod logger;
pub mod error;
pub mod server;
pub mod proxy;
pub mod upstream;
pub mod record;
pub mod snapshot;
pub mod loader;
pub mod navigation;
pub mod filter;
pub mod card;
pub mod article;
mod text_utils;
mod query_string;
mod paginator;
mod view;
