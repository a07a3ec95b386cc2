//! Shopping cart kept in the shopper's session.
//!
//! A cart line is a product in a particular size and color. Adding the same
//! combination again bumps the quantity instead of creating a second line.

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::{Price, ProductId};

/// Build the line id for a product/size/color combination.
///
/// Missing parts are left empty, so `abc::40::` is a size-40 line with no color.
#[must_use]
pub fn line_id(product_id: ProductId, size: Option<i32>, color: Option<&str>) -> String {
    format!(
        "{product_id}::{}::{}",
        size.map(|s| s.to_string()).unwrap_or_default(),
        color.unwrap_or_default()
    )
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub line_id: String,
    pub product_id: ProductId,
    pub title: String,
    pub price: Price,
    pub quantity: u32,
    pub size: Option<i32>,
    pub color: Option<String>,
    pub image_url: Option<String>,
}

impl CartLine {
    /// Price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price * self.quantity
    }
}

/// The shopper's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `product` in the given size and color.
    pub fn add(&mut self, product: &Product, size: Option<i32>, color: Option<&str>) {
        let id = line_id(product.id, size, color);
        if let Some(line) = self.lines.iter_mut().find(|l| l.line_id == id) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }
        self.lines.push(CartLine {
            line_id: id,
            product_id: product.id,
            title: product.title.clone(),
            price: product.price,
            quantity: 1,
            size,
            color: color.map(ToString::to_string),
            image_url: product.image_url.clone(),
        });
    }

    /// Remove a line. Unknown ids are ignored.
    pub fn remove(&mut self, line_id: &str) {
        self.lines.retain(|l| l.line_id != line_id);
    }

    /// Set a line's quantity; zero or less removes the line.
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove(line_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.lines.iter_mut().find(|l| l.line_id == line_id) {
            line.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line subtotals, rounded to two decimals.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum::<Price>().rounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Category;
    use crate::product::tests::product;

    #[test]
    fn test_line_id_format() {
        let id = ProductId::random();
        assert_eq!(line_id(id, Some(41), Some("Red")), format!("{id}::41::Red"));
        assert_eq!(line_id(id, None, None), format!("{id}::::"));
    }

    #[test]
    fn test_same_line_increments_quantity() {
        let shoe = product("Derby", 350, Category::Men);
        let mut cart = Cart::new();
        cart.add(&shoe, Some(42), Some("Black"));
        cart.add(&shoe, Some(42), Some("Black"));
        cart.add(&shoe, Some(43), Some("Black"));

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Price::from_dinars(1050));
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let shoe = product("Mule", 200, Category::Women);
        let mut cart = Cart::new();
        cart.add(&shoe, Some(38), None);
        let id = line_id(shoe.id, Some(38), None);

        cart.update_quantity(&id, 4);
        assert_eq!(cart.total_items(), 4);

        cart.update_quantity(&id, -2);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_unknown_line_is_noop() {
        let shoe = product("Mule", 200, Category::Women);
        let mut cart = Cart::new();
        cart.add(&shoe, None, None);
        cart.remove("missing");
        assert_eq!(cart.total_items(), 1);
        cart.clear();
        assert!(cart.is_empty());
    }
}
