//! LuxeShopy Admin library.
//!
//! The admin dashboard as a library, so the binary, the CLI and the tests
//! share one implementation.
//!
//! - Dashboard statistics, sales chart and insights
//! - Order, product, customer and invoice management
//! - Realtime order notifications over SSE, fed by Postgres `LISTEN`
//! - English, French and Arabic UI strings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod routes;
pub mod state;
pub mod storage;
