//! Session-backed models for the storefront.

pub mod session;

pub use session::{load_cart, save_cart, session_keys};
