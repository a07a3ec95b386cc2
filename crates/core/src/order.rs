//! Orders and checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::cart::{Cart, CartLine};
use crate::types::{OrderId, OrderStatus, PaymentStatus, Price, ProductId};

/// The 24 governorates of Tunisia, in the order shown on the checkout form.
pub const GOVERNORATES: [&str; 24] = [
    "Ariana",
    "Béja",
    "Ben Arous",
    "Bizerte",
    "Gabès",
    "Gafsa",
    "Jendouba",
    "Kairouan",
    "Kasserine",
    "Kebili",
    "Kef",
    "Mahdia",
    "Manouba",
    "Medenine",
    "Monastir",
    "Nabeul",
    "Sfax",
    "Sidi Bouzid",
    "Siliana",
    "Sousse",
    "Tataouine",
    "Tozeur",
    "Tunis",
    "Zaghouan",
];

/// A purchased line, stored in the order's `items` JSON array.
///
/// Older orders stored whole cart lines (`id`, `name`, `lineId`, ...), and
/// quantities written by JavaScript may come back as `1.0`; both read fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(alias = "id")]
    pub product_id: ProductId,
    #[serde(alias = "name")]
    pub title: String,
    pub price: Price,
    #[serde(deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<i32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "image_url")]
    pub image: Option<String>,
}

impl OrderItem {
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price * self.quantity
    }
}

/// Accept a quantity written as an integer, a float or a numeric string.
fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
    }

    let quantity = match Raw::deserialize(deserializer)? {
        Raw::Int(n) => u32::try_from(n).ok(),
        Raw::Float(f) => Decimal::from_f64_retain(f).and_then(|d| d.round().to_u32()),
        Raw::Text(s) => s.trim().parse::<Decimal>().ok().and_then(|d| d.round().to_u32()),
    };
    quantity.ok_or_else(|| de::Error::custom("quantity must be a non-negative number"))
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            title: line.title.clone(),
            price: line.price,
            quantity: line.quantity,
            size: line.size,
            color: line.color.clone(),
            image: line.image_url.clone(),
        }
    }
}

/// An order as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub total_price: Price,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Short invoice reference: first 8 characters of the id, uppercased.
    #[must_use]
    pub fn invoice_number(&self) -> String {
        self.id.to_string().chars().take(8).collect::<String>().to_uppercase()
    }

    /// Name to show in lists, `Guest` when the name is blank.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.customer_name.trim();
        if name.is_empty() { "Guest" } else { name }
    }

    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// A validated order ready to insert. Status starts as pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub total_price: Price,
    pub items: Vec<OrderItem>,
}

/// Reasons checkout is refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Please enter your full name")]
    NameTooShort,
    #[error("Please enter a valid phone number")]
    PhoneTooShort,
    #[error("Please enter your street address")]
    StreetTooShort,
    #[error("Please enter your city")]
    CityTooShort,
    #[error("Please select a governorate")]
    UnknownGovernorate,
}

/// Delivery details submitted on the checkout page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub governorate: String,
}

impl CheckoutForm {
    /// Validate the form against the cart and build the order to insert.
    ///
    /// The address is stored as `street, city, governorate` and the total is
    /// the cart total rounded to two decimals.
    ///
    /// # Errors
    ///
    /// Returns the first [`CheckoutError`] found.
    pub fn validate(&self, cart: &Cart) -> Result<NewOrder, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let name = self.name.trim();
        let phone = self.phone.trim();
        let street = self.street.trim();
        let city = self.city.trim();
        let governorate = self.governorate.trim();

        if name.chars().count() < 2 {
            return Err(CheckoutError::NameTooShort);
        }
        if phone.chars().count() < 8 {
            return Err(CheckoutError::PhoneTooShort);
        }
        if street.chars().count() < 5 {
            return Err(CheckoutError::StreetTooShort);
        }
        if city.chars().count() < 2 {
            return Err(CheckoutError::CityTooShort);
        }
        if !GOVERNORATES.contains(&governorate) {
            return Err(CheckoutError::UnknownGovernorate);
        }

        Ok(NewOrder {
            customer_name: name.to_string(),
            phone: phone.to_string(),
            address: format!("{street}, {city}, {governorate}"),
            total_price: cart.total_price(),
            items: cart.lines().iter().map(OrderItem::from).collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use chrono::Duration;

    use super::*;
    use crate::product::Category;
    use crate::product::tests::product;

    pub(crate) fn order(
        name: &str,
        phone: Option<&str>,
        total: i64,
        status: OrderStatus,
        payment: PaymentStatus,
        age_days: i64,
    ) -> Order {
        Order {
            id: OrderId::random(),
            customer_name: name.to_string(),
            phone: phone.map(ToString::to_string),
            address: Some(format!("1 Rue {name}, Tunis, Tunis")),
            total_price: Price::from_dinars(total),
            items: Vec::new(),
            status,
            payment_status: payment,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: " Amira Ben Salah ".to_string(),
            phone: "22 123 456".to_string(),
            street: "12 Rue de Marseille".to_string(),
            city: "Tunis".to_string(),
            governorate: "Tunis".to_string(),
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(&product("Air Max", 549, Category::Men), Some(42), Some("Red"));
        cart
    }

    #[test]
    fn test_valid_checkout_builds_order() {
        let new_order = form().validate(&cart()).unwrap();
        assert_eq!(new_order.customer_name, "Amira Ben Salah");
        assert_eq!(new_order.address, "12 Rue de Marseille, Tunis, Tunis");
        assert_eq!(new_order.total_price, Price::from_dinars(549));
        assert_eq!(new_order.items.len(), 1);
        assert_eq!(new_order.items[0].size, Some(42));
    }

    #[test]
    fn test_checkout_rules_in_order() {
        assert_eq!(form().validate(&Cart::new()), Err(CheckoutError::EmptyCart));

        let mut f = form();
        f.name = "A".to_string();
        assert_eq!(f.validate(&cart()), Err(CheckoutError::NameTooShort));

        let mut f = form();
        f.phone = "1234567".to_string();
        assert_eq!(f.validate(&cart()), Err(CheckoutError::PhoneTooShort));

        let mut f = form();
        f.street = "Rue".to_string();
        assert_eq!(f.validate(&cart()), Err(CheckoutError::StreetTooShort));

        let mut f = form();
        f.city = "T".to_string();
        assert_eq!(f.validate(&cart()), Err(CheckoutError::CityTooShort));

        let mut f = form();
        f.governorate = "Paris".to_string();
        assert_eq!(f.validate(&cart()), Err(CheckoutError::UnknownGovernorate));
    }

    #[test]
    fn test_accented_governorates_accepted() {
        let mut f = form();
        f.governorate = "Gabès".to_string();
        assert!(f.validate(&cart()).is_ok());
    }

    #[test]
    fn test_invoice_number_and_guest_name() {
        let mut o = order("", None, 10, OrderStatus::Pending, PaymentStatus::Unpaid, 0);
        assert_eq!(o.display_name(), "Guest");
        let number = o.invoice_number();
        assert_eq!(number.len(), 8);
        assert_eq!(number, number.to_uppercase());
        o.customer_name = "Sami".to_string();
        assert_eq!(o.display_name(), "Sami");
    }

    #[test]
    fn test_items_json_accepts_storefront_shape() {
        let id = ProductId::random();
        let json = serde_json::json!([{
            "productId": id,
            "name": "Nike Air Max (Red)",
            "price": "549",
            "quantity": 2,
            "size": 41
        }]);
        let items: Vec<OrderItem> = serde_json::from_value(json).unwrap();
        assert_eq!(items[0].title, "Nike Air Max (Red)");
        assert_eq!(items[0].subtotal(), Price::from_dinars(1098));
        assert_eq!(items[0].color, None);
    }

    #[test]
    fn test_items_read_stored_cart_lines() {
        let id = ProductId::random();
        let items: Vec<OrderItem> = serde_json::from_value(serde_json::json!([{
            "id": id.to_string(),
            "lineId": format!("{id}::42::Red"),
            "name": "Nike Air Max",
            "price": 549,
            "quantity": 1.0,
            "size": 42,
            "color": "Red"
        }]))
        .unwrap();
        assert_eq!(items[0].product_id, id);
        assert_eq!(items[0].title, "Nike Air Max");
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].subtotal(), Price::from_dinars(549));
    }

    #[test]
    fn test_item_quantity_forms() {
        let item = |quantity: serde_json::Value| {
            serde_json::from_value::<OrderItem>(serde_json::json!({
                "productId": ProductId::random().to_string(),
                "title": "Silk Pump",
                "price": "799.00",
                "quantity": quantity
            }))
        };
        assert_eq!(item(serde_json::json!(3)).unwrap().quantity, 3);
        assert_eq!(item(serde_json::json!(2.0)).unwrap().quantity, 2);
        assert_eq!(item(serde_json::json!("4")).unwrap().quantity, 4);
        assert!(item(serde_json::json!(-1)).is_err());
        assert!(item(serde_json::json!("many")).is_err());
    }
}
