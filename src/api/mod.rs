//! Web surface: the assessment form and a small JSON API.
//!
//! `build_router()` returns a `Router` that can be served by any axum
//! listener; `serve()` binds the configured address and runs it.

pub mod endpoints;
pub mod error;
pub mod pages;
pub mod router;
pub mod server;
pub mod types;

pub use router::build_router;
pub use server::serve;
pub use types::AppContext;
