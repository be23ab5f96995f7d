pub mod config;
pub mod error;
pub mod models;
pub mod openapi;
pub mod rate_limit;
pub mod repo;
pub mod routes;
pub mod security;
pub mod session;
pub mod store;
pub mod sweeper;
pub mod telemetry;
pub mod validation;
#[cfg(feature = "embed-frontend")]
pub mod frontend;

// Re-export commonly used items for tests / external users
pub use routes::{config, AppState};
pub use security::SecurityHeaders;
pub use session::SESSION_HEADER;
