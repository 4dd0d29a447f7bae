//! FZU ICS Core Library
//!
//! This library provides core functionality for generating ICS calendar files
//! from FZU lecture data: portal authentication with session reuse, lecture
//! retrieval, and calendar synthesis.

pub mod auth;
pub mod error;
pub mod geo;
pub mod ics;
pub mod portal;
pub mod session;
pub mod types;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{auth::*, geo::*, ics::*, portal::*, session::*, types::*};
}
