//! Server Module
//!
//! Server-side setup: configuration, application state and initialization.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - ServerConfig, TOML overlay, database loading
//! └── init.rs         - App creation and the lease sweeper
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: environment, then the optional TOML overlay
//! 2. **Storage Selection**: PostgreSQL when reachable, in-memory otherwise
//! 3. **Background Tasks**: periodic sweep of expired leases
//! 4. **Router Creation**: plan routes, auth middleware, request tracing
//!
//! # Example
//!
//! ```rust,no_run
//! use tripcollab::backend::server::{config::ServerConfig, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::builder().jwt_secret("dev-secret").build()?;
//! let app = create_app(config).await;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::ServerConfig;
pub use init::create_app;
pub use state::AppState;
