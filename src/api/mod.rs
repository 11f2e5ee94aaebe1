//! HTTP API.
//!
//! Routes are nested under `/api/`. Handlers borrow the shared
//! connection from [`ApiContext`], call a repository or service
//! function, and map failures through [`error::ApiError`].

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ApiServer, ServerSession};
pub use types::ApiContext;
