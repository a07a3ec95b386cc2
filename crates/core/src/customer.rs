//! Customers derived from order history.
//!
//! There is no customer table. A customer is every order sharing a phone
//! number, or the same name when no phone was given.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::order::Order;
use crate::types::Price;

/// Aggregated view of one customer's orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    /// Grouping key: the phone number, or the name when there is no phone.
    pub key: String,
    pub name: String,
    pub phone: String,
    /// Address from the most recent order that had one.
    pub address: String,
    pub total_orders: u32,
    pub total_spent: Price,
    /// True only when every one of the customer's orders is paid.
    pub is_paid: bool,
    pub last_order: DateTime<Utc>,
}

fn customer_key(order: &Order) -> Option<String> {
    let phone = order.phone.as_deref().map(str::trim).unwrap_or_default();
    if !phone.is_empty() {
        return Some(phone.to_string());
    }
    let name = order.customer_name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Group orders into customers, highest total spend first.
///
/// Orders with neither a phone nor a name are skipped.
#[must_use]
pub fn aggregate_customers(orders: &[Order]) -> Vec<Customer> {
    let mut by_key: HashMap<String, Customer> = HashMap::new();

    for order in orders {
        let Some(key) = customer_key(order) else {
            continue;
        };
        let address = order.address.clone().unwrap_or_default();

        by_key
            .entry(key.clone())
            .and_modify(|c| {
                c.total_orders += 1;
                c.total_spent = c.total_spent + order.total_price;
                c.is_paid &= order.is_paid();
                if order.created_at > c.last_order {
                    c.last_order = order.created_at;
                    if !address.is_empty() {
                        c.address.clone_from(&address);
                    }
                }
            })
            .or_insert_with(|| Customer {
                key,
                name: if order.customer_name.trim().is_empty() {
                    "Unknown".to_string()
                } else {
                    order.customer_name.trim().to_string()
                },
                phone: order.phone.clone().unwrap_or_default(),
                address,
                total_orders: 1,
                total_spent: order.total_price,
                is_paid: order.is_paid(),
                last_order: order.created_at,
            });
    }

    let mut customers: Vec<Customer> = by_key.into_values().collect();
    customers.sort_by(|a, b| {
        b.total_spent
            .cmp(&a.total_spent)
            .then_with(|| b.last_order.cmp(&a.last_order))
    });
    customers
}

/// Filter by case-insensitive name match or phone substring.
#[must_use]
pub fn search<'a>(customers: &'a [Customer], term: &str) -> Vec<&'a Customer> {
    let term = term.trim();
    if term.is_empty() {
        return customers.iter().collect();
    }
    let lower = term.to_lowercase();
    customers
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&lower) || c.phone.contains(term))
        .collect()
}

/// Orders belonging to the customer with `key`, newest first.
#[must_use]
pub fn orders_for<'a>(orders: &'a [Order], key: &str) -> Vec<&'a Order> {
    let mut matched: Vec<&Order> = orders
        .iter()
        .filter(|o| customer_key(o).as_deref() == Some(key))
        .collect();
    matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matched
}
