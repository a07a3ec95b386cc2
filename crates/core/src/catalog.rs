//! Shop page browsing: search, category filter and sort.

use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Category tabs on the shop page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryFilter {
    #[default]
    All,
    Men,
    Women,
    Accessories,
    NewArrivals,
}

impl CategoryFilter {
    pub const TABS: [Self; 5] = [
        Self::All,
        Self::Men,
        Self::Women,
        Self::Accessories,
        Self::NewArrivals,
    ];

    /// Query-string value.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Men => "men",
            Self::Women => "women",
            Self::Accessories => "accessories",
            Self::NewArrivals => "new-arrivals",
        }
    }

    /// Tab label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Men => "Men",
            Self::Women => "Women",
            Self::Accessories => "Accessories",
            Self::NewArrivals => "New Arrivals",
        }
    }

    /// Parse a query-string value, falling back to `All`.
    #[must_use]
    pub fn from_slug(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::All;
        };
        let normalized = value.trim().to_lowercase().replace(' ', "-");
        Self::TABS
            .into_iter()
            .find(|tab| tab.slug() == normalized)
            .unwrap_or_default()
    }

    /// Whether a product belongs under this tab.
    ///
    /// Products only carry a men/women department, so the accessories and
    /// new-arrivals tabs match nothing until the catalog grows those
    /// categories.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let category = product.category.map(|c| c.as_str());
        match self {
            Self::All => true,
            Self::Men | Self::Women => category == Some(self.slug()),
            Self::Accessories | Self::NewArrivals => false,
        }
    }
}

/// Sort order on the shop page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
}

impl SortOrder {
    pub const ALL: [Self; 3] = [Self::Newest, Self::PriceLow, Self::PriceHigh];

    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
        }
    }

    #[must_use]
    pub fn from_slug(value: Option<&str>) -> Self {
        value
            .and_then(|v| Self::ALL.into_iter().find(|s| s.slug() == v.trim()))
            .unwrap_or_default()
    }
}

/// A shop page request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: String,
    pub category: CategoryFilter,
    pub sort: SortOrder,
}

/// Products matching a [`CatalogQuery`].
#[derive(Debug, Clone)]
pub struct CatalogPage<'a> {
    pub products: Vec<&'a Product>,
    /// Search hits hidden by the selected category tab. Only counted when a
    /// search term is present and a specific tab is selected.
    pub matches_in_other_categories: usize,
}

impl CatalogQuery {
    /// Apply search, then category, then sort.
    ///
    /// `newest` orders by creation time, most recent first.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> CatalogPage<'a> {
        let needle = self.search.trim().to_lowercase();
        let searched = products.iter().filter(|p| p.matches_search(&needle));

        let mut hits: Vec<&Product> = searched
            .clone()
            .filter(|p| self.category.matches(p))
            .collect();

        match self.sort {
            SortOrder::Newest => hits.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::PriceLow => hits.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceHigh => hits.sort_by(|a, b| b.price.cmp(&a.price)),
        }

        let matches_in_other_categories =
            if needle.is_empty() || self.category == CategoryFilter::All {
                0
            } else {
                searched.filter(|p| !self.category.matches(p)).count()
            };

        CatalogPage {
            products: hits,
            matches_in_other_categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::product::Category;
    use crate::product::tests::product;

    fn catalog() -> Vec<Product> {
        let now = Utc::now();
        let mut a = product("Air Runner", 549, Category::Men);
        a.created_at = now - Duration::days(2);
        let mut b = product("Silk Pump", 799, Category::Women);
        b.created_at = now - Duration::days(1);
        let mut c = product("Trail Runner", 399, Category::Women);
        c.created_at = now;
        vec![a, b, c]
    }

    #[test]
    fn test_newest_first_by_default() {
        let products = catalog();
        let page = CatalogQuery::default().apply(&products);
        let titles: Vec<_> = page.products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Trail Runner", "Silk Pump", "Air Runner"]);
    }

    #[test]
    fn test_price_sorts() {
        let products = catalog();
        let low = CatalogQuery {
            sort: SortOrder::PriceLow,
            ..CatalogQuery::default()
        }
        .apply(&products);
        assert_eq!(low.products.first().map(|p| p.title.as_str()), Some("Trail Runner"));

        let high = CatalogQuery {
            sort: SortOrder::PriceHigh,
            ..CatalogQuery::default()
        }
        .apply(&products);
        assert_eq!(high.products.first().map(|p| p.title.as_str()), Some("Silk Pump"));
    }

    #[test]
    fn test_search_with_category_reports_other_matches() {
        let products = catalog();
        let page = CatalogQuery {
            search: "RUNNER".to_string(),
            category: CategoryFilter::Men,
            sort: SortOrder::Newest,
        }
        .apply(&products);
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.matches_in_other_categories, 1);
    }

    #[test]
    fn test_no_other_count_without_search_or_on_all() {
        let products = catalog();
        let page = CatalogQuery {
            category: CategoryFilter::Women,
            ..CatalogQuery::default()
        }
        .apply(&products);
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.matches_in_other_categories, 0);

        let page = CatalogQuery {
            search: "runner".to_string(),
            ..CatalogQuery::default()
        }
        .apply(&products);
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.matches_in_other_categories, 0);
    }

    #[test]
    fn test_accessories_tab_is_empty() {
        let products = catalog();
        let page = CatalogQuery {
            search: "runner".to_string(),
            category: CategoryFilter::Accessories,
            sort: SortOrder::Newest,
        }
        .apply(&products);
        assert!(page.products.is_empty());
        assert_eq!(page.matches_in_other_categories, 2);
    }

    #[test]
    fn test_slug_parsing() {
        assert_eq!(
            CategoryFilter::from_slug(Some("New Arrivals")),
            CategoryFilter::NewArrivals
        );
        assert_eq!(CategoryFilter::from_slug(Some("kids")), CategoryFilter::All);
        assert_eq!(SortOrder::from_slug(Some("price-high")), SortOrder::PriceHigh);
        assert_eq!(SortOrder::from_slug(None), SortOrder::Newest);
    }
}
