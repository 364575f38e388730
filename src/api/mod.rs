//! Laboratory REST API.
//!
//! Routes are nested under `/api/` and served with permissive CORS for
//! the browser client. `api_router()` returns a composable `Router`;
//! `server` owns the listener lifecycle.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ApiServer, ApiSession};
pub use types::ApiContext;
