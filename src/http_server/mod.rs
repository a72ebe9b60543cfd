//! # HTTP Server Module
//!
//! # Endpoints
//!
//! - `GET /health`, `GET /metrics`
//! - `GET|PUT|DELETE /billing/:id`, `POST /billing`
//! - `POST /archive`, `POST /archive/sync`, `POST /restore/:id`, `GET /stats`

pub mod archive_routes;
pub mod billing_routes;
pub mod config;
pub mod observability_routes;
pub mod responses;
pub mod server;
pub mod state;

pub use config::HttpServerConfig;
pub use server::HttpServer;
pub use state::AppState;
