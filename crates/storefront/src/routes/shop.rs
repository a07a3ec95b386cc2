//! Shop and category pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use luxeshopy_core::{CatalogQuery, Category, CategoryFilter, Product, SortOrder};

use crate::filters;
use crate::routes::{Chrome, ProductCardView};
use crate::state::AppState;

/// Shop page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ShopQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
    pub sort: Option<String>,
}

impl ShopQuery {
    fn to_catalog_query(&self) -> CatalogQuery {
        CatalogQuery {
            search: self.q.trim().to_string(),
            category: CategoryFilter::from_slug(self.category.as_deref()),
            sort: SortOrder::from_slug(self.sort.as_deref()),
        }
    }
}

/// A category tab link.
#[derive(Debug, Clone)]
pub struct TabView {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// A sort `<option>`.
#[derive(Debug, Clone)]
pub struct SortOptionView {
    pub slug: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Build the `/shop` URL for a search, tab and sort.
fn shop_href(search: &str, category: CategoryFilter, sort: SortOrder) -> String {
    let mut params = Vec::new();
    if !search.is_empty() {
        params.push(format!("q={}", urlencoding::encode(search)));
    }
    if category != CategoryFilter::All {
        params.push(format!("category={}", category.slug()));
    }
    if sort != SortOrder::default() {
        params.push(format!("sort={}", sort.slug()));
    }
    if params.is_empty() {
        "/shop".to_string()
    } else {
        format!("/shop?{}", params.join("&"))
    }
}

/// Shop page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub chrome: Chrome,
    pub search: String,
    pub tabs: Vec<TabView>,
    pub sorts: Vec<SortOptionView>,
    pub products: Vec<ProductCardView>,
    /// Link to the same search across all categories.
    pub all_categories_href: String,
    pub matches_in_other_categories: usize,
    pub load_failed: bool,
}

impl ShopTemplate {
    fn new(chrome: Chrome, query: &CatalogQuery, products: &[Product], load_failed: bool) -> Self {
        let page = query.apply(products);
        Self {
            chrome,
            search: query.search.clone(),
            tabs: CategoryFilter::TABS
                .iter()
                .map(|tab| TabView {
                    label: tab.label(),
                    href: shop_href(&query.search, *tab, query.sort),
                    active: *tab == query.category,
                })
                .collect(),
            sorts: SortOrder::ALL
                .iter()
                .map(|sort| SortOptionView {
                    slug: sort.slug(),
                    label: sort.label(),
                    selected: *sort == query.sort,
                })
                .collect(),
            products: page.products.into_iter().map(ProductCardView::from).collect(),
            all_categories_href: shop_href(&query.search, CategoryFilter::All, query.sort),
            matches_in_other_categories: page.matches_in_other_categories,
            load_failed,
        }
    }

    /// Selected category slug, for the hidden input that keeps it across searches.
    #[must_use]
    pub fn category_slug(&self) -> &'static str {
        CategoryFilter::TABS
            .iter()
            .zip(&self.tabs)
            .find(|(_, view)| view.active)
            .map_or(CategoryFilter::All.slug(), |(tab, _)| tab.slug())
    }
}

/// Display the shop page.
#[instrument(skip(state, session))]
pub async fn shop(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ShopQuery>,
) -> impl IntoResponse {
    let chrome = Chrome::load(&state, &session, "shop").await;
    let (products, load_failed) = match state.catalog().products().await {
        Ok(products) => (products, false),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load shop products");
            (Default::default(), true)
        }
    };

    ShopTemplate::new(chrome, &query.to_catalog_query(), &products, load_failed)
}

/// Category landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "category.html")]
pub struct CategoryTemplate {
    pub chrome: Chrome,
    pub title: &'static str,
    pub audience: &'static str,
    pub products: Vec<ProductCardView>,
    pub load_failed: bool,
}

/// Resolve a category path segment. Unknown names show every product.
fn resolve_category(name: &str) -> Option<Category> {
    match name.trim().to_lowercase().as_str() {
        "men" => Some(Category::Men),
        "women" => Some(Category::Women),
        _ => None,
    }
}

/// Products for a category page, oldest first.
fn category_products(products: &[Product], category: Option<Category>) -> Vec<ProductCardView> {
    products
        .iter()
        .rev()
        .filter(|p| category.is_none() || p.category == category)
        .map(ProductCardView::from)
        .collect()
}

/// Display a category page: `men` and `women` get their collection, any other
/// name lists the whole catalog.
#[instrument(skip(state, session))]
pub async fn category(
    State(state): State<AppState>,
    session: Session,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let chrome = Chrome::load(&state, &session, "category").await;
    let category = resolve_category(&name);

    let (products, load_failed) = match state.catalog().products().await {
        Ok(products) => (category_products(&products, category), false),
        Err(e) => {
            tracing::error!(error = %e, category = %name, "Failed to load category products");
            (Vec::new(), true)
        }
    };

    CategoryTemplate {
        chrome,
        title: category.map_or("Category", |c| c.collection_title()),
        audience: match category {
            Some(Category::Men) => "him",
            Some(Category::Women) => "her",
            None => "you",
        },
        products,
        load_failed,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::routes::tests::product;

    fn chrome() -> Chrome {
        Chrome {
            nav: "shop",
            cart_count: 0,
            whatsapp_link: None,
        }
    }

    #[test]
    fn test_shop_href() {
        assert_eq!(
            shop_href("", CategoryFilter::All, SortOrder::default()),
            "/shop"
        );
        assert_eq!(
            shop_href("air max", CategoryFilter::Men, SortOrder::PriceLow),
            "/shop?q=air%20max&category=men&sort=price-low"
        );
    }

    #[test]
    fn test_shop_query_defaults() {
        let query = ShopQuery::default().to_catalog_query();
        assert_eq!(query, CatalogQuery::default());
    }

    #[test]
    fn test_shop_template_reports_other_categories() {
        let products = vec![
            product("Air Runner", 549, Some(Category::Men)),
            product("Trail Runner", 399, Some(Category::Women)),
        ];
        let query = CatalogQuery {
            search: "runner".to_string(),
            category: CategoryFilter::Women,
            sort: SortOrder::default(),
        };
        let page = ShopTemplate::new(chrome(), &query, &products, false);
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.matches_in_other_categories, 1);
        assert_eq!(page.category_slug(), "women");
        assert_eq!(page.all_categories_href, "/shop?q=runner");
        assert!(page.tabs.iter().filter(|t| t.active).count() == 1);
    }

    #[test]
    fn test_resolve_category() {
        assert_eq!(resolve_category("MEN"), Some(Category::Men));
        assert_eq!(resolve_category("women"), Some(Category::Women));
        assert_eq!(resolve_category("kids"), None);
    }

    #[test]
    fn test_category_products_filter_and_order() {
        // Catalog is newest first; category pages list oldest first.
        let products = vec![
            product("Newest Men", 500, Some(Category::Men)),
            product("Women", 500, Some(Category::Women)),
            product("Oldest Men", 500, Some(Category::Men)),
        ];
        let men = category_products(&products, Some(Category::Men));
        let titles: Vec<_> = men.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Oldest Men", "Newest Men"]);
        assert_eq!(category_products(&products, None).len(), 3);
    }

    #[test]
    fn test_shop_page_renders() {
        let products = vec![product("Air Runner", 549, Some(Category::Men))];
        let html = ShopTemplate::new(chrome(), &CatalogQuery::default(), &products, false)
            .render()
            .unwrap();
        assert!(html.contains("Air Runner"));
        assert!(html.contains("549.00 TND"));
    }
}
