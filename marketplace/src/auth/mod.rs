//! Session authentication for HTTP handlers.

pub mod middleware;

pub use middleware::SessionUser;
