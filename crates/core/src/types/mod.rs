//! Core value types for LuxeShopy.
//!
//! Type-safe wrappers for identifiers, money, emails and statuses.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CURRENCY_CODE, Price};
pub use status::*;
