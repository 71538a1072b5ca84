//! HTTP surface of the analyzer.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /` | liveness message |
//! | `POST /create-user` | register a user (form: `name`, `email`) |
//! | `POST /analyze` | multipart upload (`user_id`, `file`, optional `query`) |
//! | `GET /result/:job_id` | stored job record |
//!
//! The router is composable: [`api_router`] returns a `Router` that can be
//! served directly ([`server::serve`]) or driven in tests with `oneshot`.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use types::ApiContext;
