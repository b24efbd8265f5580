//! Client identity for Gladius.
//!
//! This crate answers two questions during login:
//!
//! 1. **Is this a usable username?** — [`validate_username`]
//! 2. **Is anybody else already using it?** — [`ClientRegistry`]
//!
//! # How it fits in the stack
//!
//! ```text
//! Arena Layer (above)  ← pairs logged-in clients into battles
//!     ↕
//! Session Layer (this crate)  ← username → connected client
//!     ↕
//! Protocol Layer (below)  ← provides PlayerId
//! ```

mod error;
mod registry;
mod validation;

pub use error::SessionError;
pub use registry::{ClientEntry, ClientRegistry};
pub use validation::validate_username;
