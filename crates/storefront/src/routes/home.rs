//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::routes::{Chrome, ProductCardView};
use crate::state::AppState;

/// A selling point shown under the product grid.
#[derive(Debug, Clone, Copy)]
pub struct TrustSignal {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub const TRUST_SIGNALS: [TrustSignal; 4] = [
    TrustSignal {
        icon: "truck",
        title: "Free Delivery",
        description: "Free delivery across Tunisia",
    },
    TrustSignal {
        icon: "lock",
        title: "Secure Payment",
        description: "100% secure transactions",
    },
    TrustSignal {
        icon: "headset",
        title: "24/7 Support",
        description: "Always here to help you",
    },
    TrustSignal {
        icon: "gem",
        title: "Premium Quality",
        description: "Authentic luxury products",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub chrome: Chrome,
    pub products: Vec<ProductCardView>,
    pub trust_signals: &'static [TrustSignal],
    pub load_failed: bool,
}

/// Display the home page: hero, the full catalog (oldest first) and trust
/// signals. An empty store is seeded with the example catalog.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let chrome = Chrome::load(&state, &session, "home").await;

    let (products, load_failed) = match state.catalog().products_seeding_if_empty().await {
        Ok(products) => (
            products.iter().rev().map(ProductCardView::from).collect(),
            false,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load home page products");
            (Vec::new(), true)
        }
    };

    HomeTemplate {
        chrome,
        products,
        trust_signals: &TRUST_SIGNALS,
        load_failed,
    }
}
