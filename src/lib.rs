//! Freight Quoting Service Library

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod quoting;
pub mod tables;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use quoting::QuoteEngine;
pub use tables::TableSet;
