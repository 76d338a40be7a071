//! Authentication Module
//!
//! Identity for plan requests. Accounts, passwords and token issuance live in
//! an external service; this module verifies the bearer tokens it issues and
//! reads users for invitations and writer names.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model, UserDirectory trait, PostgreSQL lookups
//! └── sessions.rs     - JWT verification
//! ```

/// User model and directory
pub mod users;

/// JWT token verification
pub mod sessions;

pub use sessions::{create_token, verify_token, Claims, TokenError};
pub use users::{PgUserDirectory, User, UserDirectory};
