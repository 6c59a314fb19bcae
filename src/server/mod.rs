//! HTTP server layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │          GET /{v1,v2}/{bucket}/{object}[/=s{N}]                 │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │        handlers          │  │           routes            │  │
//! │  │ (parse, serve, respond)  │  │  (versions, CORS, tracing)  │  │
//! │  └──────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    empty_path_handler, health_handler, image_handler, AppState, HandlerError, HealthResponse,
};
pub use routes::{create_router, RouterConfig, API_VERSIONS};
