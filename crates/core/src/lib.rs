//! LuxeShopy Core - Shared domain types and business rules.
//!
//! This crate is used by every LuxeShopy component:
//! - `storefront` - Public shop (catalog, cart, checkout, contact)
//! - `admin` - Administration dashboard
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions: no I/O, no database
//! access, no HTTP clients. Rows are fetched by the binaries and handed here
//! for validation and derived statistics.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, TND prices, emails and statuses
//! - [`product`] / [`catalog`] - Products, product forms, shop-page browsing
//! - [`cart`] / [`order`] - Session cart, orders and checkout validation
//! - [`customer`] - Customers aggregated from order history
//! - [`stats`] - Revenue rule and dashboard statistics
//! - [`token`] - Admin session token
//! - [`envelope`] - `{success, data, error}` action results

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod envelope;
pub mod order;
pub mod product;
pub mod stats;
pub mod token;
pub mod types;

pub use cart::{Cart, CartLine};
pub use catalog::{CatalogQuery, CategoryFilter, SortOrder};
pub use customer::Customer;
pub use envelope::ActionResult;
pub use order::{CheckoutError, CheckoutForm, NewOrder, Order, OrderItem};
pub use product::{Category, ImageSource, Product, ProductForm, ProductInput, ProductPatch};
pub use token::AdminToken;
pub use types::*;
