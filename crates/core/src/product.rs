//! Products in the footwear catalog.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId, StatusParseError};

/// Catalog department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Men,
    Women,
}

impl Category {
    pub const ALL: [Self; 2] = [Self::Men, Self::Women];

    /// Lowercase stored value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Men => "men",
            Self::Women => "women",
        }
    }

    /// Display label, e.g. `Men`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Men => "Men",
            Self::Women => "Women",
        }
    }

    /// Heading for the category landing page.
    #[must_use]
    pub const fn collection_title(&self) -> &'static str {
        match self {
            Self::Men => "Men's Collection",
            Self::Women => "Women's Collection",
        }
    }

    /// Read a stored category. Anything that is not `women` is filed under men.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Option<Self> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        if value.eq_ignore_ascii_case("women") {
            Some(Self::Women)
        } else {
            Some(Self::Men)
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "men" => Ok(Self::Men),
            "women" => Ok(Self::Women),
            _ => Err(StatusParseError(s.to_string())),
        }
    }
}

/// Where a product image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// An external URL pasted by the admin.
    #[default]
    Url,
    /// A file uploaded to the storage bucket.
    Upload,
}

impl ImageSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Upload => "upload",
        }
    }

    /// Read a stored value; anything other than `upload` is a URL.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("upload") => Self::Upload,
            _ => Self::Url,
        }
    }
}

/// A product as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub description: String,
    pub image_url: Option<String>,
    pub sizes: Vec<i32>,
    pub color: Option<String>,
    pub category: Option<Category>,
    pub cost_price: Price,
    pub compare_at_price: Price,
    pub image_source: ImageSource,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether a higher "compare at" price should be shown struck through.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price > self.price
    }

    /// Whole-number discount against the compare-at price, if on sale.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        if !self.is_on_sale() {
            return None;
        }
        let off = (self.compare_at_price.amount() - self.price.amount())
            / self.compare_at_price.amount()
            * Decimal::ONE_HUNDRED;
        off.round().to_u32()
    }

    /// Gross margin per unit, when a cost price is recorded.
    #[must_use]
    pub fn unit_margin(&self) -> Option<Price> {
        (self.cost_price > Price::ZERO)
            .then(|| Price::new(self.price.amount() - self.cost_price.amount()))
    }

    /// Case-insensitive match against title, description, category, color and id.
    #[must_use]
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        if needle_lower.is_empty() {
            return true;
        }
        let contains = |hay: &str| hay.to_lowercase().contains(needle_lower);
        contains(&self.title)
            || contains(&self.description)
            || self.category.is_some_and(|c| c.as_str().contains(needle_lower))
            || self.color.as_deref().is_some_and(contains)
            || self.id.to_string().contains(needle_lower)
    }

    /// Whether `size` is one of the available sizes.
    #[must_use]
    pub fn has_size(&self, size: i32) -> bool {
        self.sizes.contains(&size)
    }
}

/// A validated product ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub title: String,
    pub price: Price,
    pub description: String,
    pub image_url: Option<String>,
    pub sizes: Vec<i32>,
    pub color: Option<String>,
    pub category: Category,
    pub cost_price: Price,
    pub compare_at_price: Price,
    pub image_source: ImageSource,
}

/// A partial product update. `None` leaves the stored value untouched; an
/// empty `image_url` or `color` reads back as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub price: Option<Price>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub sizes: Option<Vec<i32>>,
    pub color: Option<String>,
    pub category: Option<Category>,
    pub cost_price: Option<Price>,
    pub compare_at_price: Option<Price>,
    pub image_source: Option<ImageSource>,
}

/// Reasons a product form is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductInputError {
    #[error("Title is required")]
    MissingTitle,
    #[error("{field} must be a valid non-negative number")]
    InvalidAmount { field: &'static str },
    #[error("Sizes must be whole numbers separated by commas")]
    InvalidSizes,
    #[error("Category must be men or women")]
    InvalidCategory,
}

/// Raw product form fields as submitted by the admin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    /// Comma-separated, e.g. `39, 40, 41`.
    #[serde(default)]
    pub sizes: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub cost_price: String,
    #[serde(default)]
    pub compare_at_price: String,
    #[serde(default)]
    pub image_type: String,
}

impl ProductForm {
    /// Validate a form for product creation.
    ///
    /// Cost and compare-at prices default to zero and the image source to
    /// [`ImageSource::Url`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ProductInputError`] found.
    pub fn into_input(self) -> Result<ProductInput, ProductInputError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ProductInputError::MissingTitle);
        }
        let price = parse_amount(&self.price, "Price")?.unwrap_or(Price::ZERO);
        let category: Category = self
            .category
            .parse()
            .map_err(|_| ProductInputError::InvalidCategory)?;

        Ok(ProductInput {
            title,
            price,
            description: self.description.trim().to_string(),
            image_url: non_blank(&self.image_url),
            sizes: parse_sizes(&self.sizes)?,
            color: non_blank(&self.color),
            category,
            cost_price: parse_amount(&self.cost_price, "Cost price")?.unwrap_or(Price::ZERO),
            compare_at_price: parse_amount(&self.compare_at_price, "Compare at price")?
                .unwrap_or(Price::ZERO),
            image_source: ImageSource::from_stored(non_blank(&self.image_type).as_deref()),
        })
    }

    /// Validate the edit form.
    ///
    /// A blank title, price, category, sizes or image type leaves the stored
    /// value unchanged. The remaining fields are written as submitted, so
    /// blanking them clears the value (prices back to zero).
    ///
    /// # Errors
    ///
    /// Returns the first [`ProductInputError`] found among non-blank fields.
    pub fn into_patch(self) -> Result<ProductPatch, ProductInputError> {
        let category = match non_blank(&self.category) {
            Some(raw) => Some(
                raw.parse::<Category>()
                    .map_err(|_| ProductInputError::InvalidCategory)?,
            ),
            None => None,
        };
        let sizes = match non_blank(&self.sizes) {
            Some(raw) => Some(parse_sizes(&raw)?),
            None => None,
        };

        Ok(ProductPatch {
            title: non_blank(&self.title),
            price: parse_amount(&self.price, "Price")?,
            description: Some(self.description.trim().to_string()),
            image_url: Some(self.image_url.trim().to_string()),
            sizes,
            color: Some(self.color.trim().to_string()),
            category,
            cost_price: Some(
                parse_amount(&self.cost_price, "Cost price")?.unwrap_or(Price::ZERO),
            ),
            compare_at_price: Some(
                parse_amount(&self.compare_at_price, "Compare at price")?.unwrap_or(Price::ZERO),
            ),
            image_source: non_blank(&self.image_type)
                .map(|v| ImageSource::from_stored(Some(&v))),
        })
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_amount(raw: &str, field: &'static str) -> Result<Option<Price>, ProductInputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let amount: Decimal = trimmed
        .parse()
        .map_err(|_| ProductInputError::InvalidAmount { field })?;
    let price = Price::new(amount);
    if price.is_negative() {
        return Err(ProductInputError::InvalidAmount { field });
    }
    Ok(Some(price))
}

fn parse_sizes(raw: &str) -> Result<Vec<i32>, ProductInputError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i32>().map_err(|_| ProductInputError::InvalidSizes))
        .collect()
}

/// The starter catalog inserted into an empty store.
#[must_use]
pub fn example_products() -> Vec<ProductInput> {
    vec![
        ProductInput {
            title: "Nike Air Max (Red)".to_string(),
            price: Price::from_dinars(549),
            description: "Iconic cushioning and bold style.".to_string(),
            image_url: Some(
                "https://images.unsplash.com/photo-1542291026-7eec264c27ff".to_string(),
            ),
            sizes: vec![39, 40, 41, 42],
            color: Some("Red/White".to_string()),
            category: Category::Men,
            cost_price: Price::ZERO,
            compare_at_price: Price::ZERO,
            image_source: ImageSource::Url,
        },
        ProductInput {
            title: "Adidas UltraBOOST".to_string(),
            price: Price::from_dinars(599),
            description: "Premium cushioned sneaker.".to_string(),
            image_url: Some(
                "https://images.unsplash.com/photo-1519861297062-a1eec154f81a".to_string(),
            ),
            sizes: vec![39, 40, 41, 42],
            color: Some("White/Black".to_string()),
            category: Category::Women,
            cost_price: Price::ZERO,
            compare_at_price: Price::ZERO,
            image_source: ImageSource::Url,
        },
    ]
}
