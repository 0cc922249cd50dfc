//! keyfind server: HTTP API over the key search.
//!
//! `GET /kdbFind/{pattern}` compiles the path tail as a regular expression
//! and answers with the JSON array of matching key names, in key database
//! order. A malformed pattern is a `400`; a key database failure is a `500`.
//! Error bodies have the shape `{"error": {"code": ..., "message": ...}}`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /kdbFind/{pattern}` - Key names matching `pattern`

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
