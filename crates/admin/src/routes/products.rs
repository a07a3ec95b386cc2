//! Product management.
//!
//! Create and edit forms are posted as `multipart/form-data` so an image can
//! be attached. When `image_type` is `upload` the file goes to object storage
//! and its public URL replaces any pasted `image_url`.

use askama::Template;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use luxeshopy_core::{Category, ImageSource, Product, ProductForm, ProductId};

use crate::db::{ProductRepository, RepositoryError};
use crate::error::PageError;
use crate::filters;
use crate::i18n::Strings;
use crate::middleware::RequireAdmin;
use crate::middleware::auth::{UNAUTHORIZED_MESSAGE, admin_from_headers};
use crate::models::Flash;
use crate::routes::{Page, format_date, render};
use crate::state::AppState;
use crate::storage::{MAX_UPLOAD_BYTES, StorageError};

const PRODUCTS_PATH: &str = "/admin/products";

/// Room for the text fields on top of the largest image.
const FORM_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

/// Product row for the list.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub discount: Option<u32>,
    pub margin: Option<String>,
    pub category: &'static str,
    pub sizes: String,
    pub color: String,
    pub created: String,
}

fn join_sizes(sizes: &[i32]) -> String {
    sizes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ProductRowView {
    fn new(product: &Product, t: &Strings, offset: &chrono::FixedOffset) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            image_url: product.image_url.clone(),
            price: product.price.to_string(),
            compare_at_price: product
                .is_on_sale()
                .then(|| product.compare_at_price.to_string()),
            discount: product.discount_percent(),
            margin: product.unit_margin().map(|m| m.to_string()),
            category: product.category.map_or("", |c| t.category(c)),
            sizes: join_sizes(&product.sizes),
            color: product.color.clone().unwrap_or_default(),
            created: format_date(product.created_at, offset),
        }
    }
}

/// Product list query.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    #[serde(default)]
    pub q: String,
}

/// Product list template.
#[derive(Template)]
#[template(path = "products/list.html")]
pub struct ProductsListTemplate {
    pub page: Page,
    pub query: String,
    pub products: Vec<ProductRowView>,
}

/// A category `<option>`.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Create/edit form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub page: Page,
    /// `None` when creating.
    pub product_id: Option<String>,
    pub form: ProductForm,
    pub categories: Vec<CategoryOption>,
    pub uploads_enabled: bool,
}

impl ProductFormTemplate {
    fn new(page: Page, product_id: Option<String>, form: ProductForm, uploads_enabled: bool) -> Self {
        let selected = form.category.parse::<Category>().ok();
        let categories = Category::ALL
            .iter()
            .map(|c| CategoryOption {
                value: c.as_str(),
                label: page.t.category(*c),
                selected: selected == Some(*c),
            })
            .collect();
        Self {
            page,
            product_id,
            form,
            categories,
            uploads_enabled,
        }
    }

    /// Form action URL.
    #[must_use]
    pub fn action(&self) -> String {
        self.product_id
            .as_ref()
            .map_or_else(|| PRODUCTS_PATH.to_string(), |id| format!("{PRODUCTS_PATH}/{id}"))
    }

    #[must_use]
    pub fn is_upload(&self) -> bool {
        self.form.image_type == ImageSource::Upload.as_str()
    }
}

/// Pre-fill an edit form from the stored product.
fn form_from_product(product: &Product) -> ProductForm {
    let amount = |p: luxeshopy_core::Price| {
        if p > luxeshopy_core::Price::ZERO {
            p.amount_string()
        } else {
            String::new()
        }
    };
    ProductForm {
        title: product.title.clone(),
        price: product.price.amount_string(),
        description: product.description.clone(),
        image_url: product.image_url.clone().unwrap_or_default(),
        sizes: join_sizes(&product.sizes),
        color: product.color.clone().unwrap_or_default(),
        category: product.category.map(|c| c.as_str().to_string()).unwrap_or_default(),
        cost_price: amount(product.cost_price),
        compare_at_price: amount(product.compare_at_price),
        image_type: product.image_source.as_str().to_string(),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(PRODUCTS_PATH, get(index).post(create))
        .route("/admin/products/new", get(new_form))
        .route("/admin/products/{id}/edit", get(edit_form))
        .route("/admin/products/{id}", post(update))
        .route("/admin/products/{id}/delete", post(delete))
        .layer(DefaultBodyLimit::max(FORM_BODY_LIMIT))
}

/// Product list page.
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ProductsQuery>,
) -> Html<String> {
    let mut page = Page::load(&session, admin, PRODUCTS_PATH).await;
    let products = ProductRepository::new(state.pool())
        .list_all()
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch products");
            page.flash = Some(Flash::error("Failed to load products"));
            Vec::new()
        });

    let needle = query.q.trim().to_lowercase();
    let offset = state.config().shop_offset;
    let t = page.t;
    let rows = products
        .iter()
        .filter(|p| p.matches_search(&needle))
        .map(|p| ProductRowView::new(p, t, &offset))
        .collect();

    render(&ProductsListTemplate {
        page,
        query: query.q,
        products: rows,
    })
}

/// Empty create form.
#[instrument(skip(admin, state, session))]
pub async fn new_form(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Html<String> {
    let page = Page::load(&session, admin, PRODUCTS_PATH).await;
    let form = ProductForm {
        category: Category::Men.as_str().to_string(),
        image_type: ImageSource::Url.as_str().to_string(),
        ..ProductForm::default()
    };
    render(&ProductFormTemplate::new(
        page,
        None,
        form,
        state.storage().is_some(),
    ))
}

/// Edit form for an existing product.
#[instrument(skip(admin, state, session))]
pub async fn edit_form(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let product_id = id
        .parse::<ProductId>()
        .map_err(|_| PageError::NotFound("Product"))?;
    let product = ProductRepository::new(state.pool())
        .get_by_id(product_id)
        .await
        .map_err(PageError::load("Product"))?
        .ok_or(PageError::NotFound("Product"))?;

    let page = Page::load(&session, admin, PRODUCTS_PATH).await;
    Ok(render(&ProductFormTemplate::new(
        page,
        Some(product.id.to_string()),
        form_from_product(&product),
        state.storage().is_some(),
    )))
}

/// An image file attached to the form.
struct ImageFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Errors reading or completing a product form.
#[derive(Debug, thiserror::Error)]
enum SubmitError {
    #[error("Invalid form data: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error("Image uploads are not configured")]
    UploadsDisabled,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SubmitError {
    fn user_message(&self) -> String {
        match self {
            Self::Storage(StorageError::InvalidFile(message)) => message.clone(),
            Self::Storage(_) => "Image upload failed, please try again".to_string(),
            other => other.to_string(),
        }
    }
}

/// Read text fields into a [`ProductForm`] and keep the first non-empty file.
async fn read_form(mut multipart: Multipart) -> Result<(ProductForm, Option<ImageFile>), SubmitError> {
    let mut form = ProductForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image_file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await?;
            if !bytes.is_empty() && image.is_none() {
                image = Some(ImageFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await?;
        let slot = match name.as_str() {
            "title" => &mut form.title,
            "price" => &mut form.price,
            "description" => &mut form.description,
            "image_url" => &mut form.image_url,
            "sizes" => &mut form.sizes,
            "color" => &mut form.color,
            "category" => &mut form.category,
            "cost_price" => &mut form.cost_price,
            "compare_at_price" => &mut form.compare_at_price,
            "image_type" => &mut form.image_type,
            _ => continue,
        };
        *slot = value;
    }

    Ok((form, image))
}

/// Upload the attached image when the form asks for one.
async fn apply_upload(
    state: &AppState,
    form: &mut ProductForm,
    image: Option<ImageFile>,
) -> Result<(), SubmitError> {
    if form.image_type != ImageSource::Upload.as_str() {
        return Ok(());
    }
    let Some(image) = image else {
        return Ok(());
    };
    let storage = state.storage().ok_or(SubmitError::UploadsDisabled)?;
    form.image_url = storage
        .upload_image(&image.file_name, &image.content_type, image.bytes)
        .await?;
    Ok(())
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE).into_response()
}

/// Re-render the form with an error.
async fn form_error(
    state: &AppState,
    session: &Session,
    admin: String,
    product_id: Option<String>,
    form: ProductForm,
    message: String,
) -> Response {
    let page = Page::load(session, admin, PRODUCTS_PATH)
        .await
        .with_error(message);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        render(&ProductFormTemplate::new(
            page,
            product_id,
            form,
            state.storage().is_some(),
        )),
    )
        .into_response()
}

/// Create a product.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let Some(admin) = admin_from_headers(&headers) else {
        return unauthorized();
    };

    let (mut form, image) = match read_form(multipart).await {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable product form");
            return (StatusCode::BAD_REQUEST, e.user_message()).into_response();
        }
    };
    if let Err(e) = apply_upload(&state, &mut form, image).await {
        tracing::error!(error = %e, "Product image upload failed");
        return form_error(&state, &session, admin, None, form, e.user_message()).await;
    }

    let input = match form.clone().into_input() {
        Ok(input) => input,
        Err(e) => return form_error(&state, &session, admin, None, form, e.to_string()).await,
    };

    match ProductRepository::new(state.pool()).create(&input).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, title = %product.title, "Product created");
            Flash::success("Product created").store(&session).await;
            Redirect::to(PRODUCTS_PATH).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create product");
            form_error(
                &state,
                &session,
                admin,
                None,
                form,
                "Failed to save product".to_string(),
            )
            .await
        }
    }
}

/// Update a product. Blank fields keep their stored value.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    let Some(admin) = admin_from_headers(&headers) else {
        return unauthorized();
    };
    let Ok(product_id) = id.parse::<ProductId>() else {
        return (StatusCode::NOT_FOUND, "Product not found").into_response();
    };

    let (mut form, image) = match read_form(multipart).await {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable product form");
            return (StatusCode::BAD_REQUEST, e.user_message()).into_response();
        }
    };
    if let Err(e) = apply_upload(&state, &mut form, image).await {
        tracing::error!(error = %e, "Product image upload failed");
        return form_error(&state, &session, admin, Some(id), form, e.user_message()).await;
    }

    let patch = match form.clone().into_patch() {
        Ok(patch) => patch,
        Err(e) => {
            return form_error(&state, &session, admin, Some(id), form, e.to_string()).await;
        }
    };
    match ProductRepository::new(state.pool())
        .update(product_id, &patch)
        .await
    {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "Product updated");
            Flash::success("Product updated").store(&session).await;
            Redirect::to(PRODUCTS_PATH).into_response()
        }
        Err(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, "Product not found").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update product");
            form_error(
                &state,
                &session,
                admin,
                Some(id),
                form,
                "Failed to save product".to_string(),
            )
            .await
        }
    }
}

/// Delete a product.
#[instrument(skip(state, session, headers))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if admin_from_headers(&headers).is_none() {
        return unauthorized();
    }
    let Ok(product_id) = id.parse::<ProductId>() else {
        Flash::error("Product not found").store(&session).await;
        return Redirect::to(PRODUCTS_PATH).into_response();
    };

    let flash = match ProductRepository::new(state.pool()).delete(product_id).await {
        Ok(()) => {
            tracing::info!(product_id = %product_id, "Product deleted");
            Flash::success("Product deleted")
        }
        Err(RepositoryError::NotFound) => Flash::error("Product not found"),
        Err(e) => {
            tracing::error!(product_id = %product_id, error = %e, "Failed to delete product");
            Flash::error("Failed to delete product")
        }
    };
    flash.store(&session).await;
    Redirect::to(PRODUCTS_PATH).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use luxeshopy_core::Price;

    fn product() -> Product {
        Product {
            id: ProductId::random(),
            title: "Classic Oxford".to_string(),
            price: Price::from_dinars(420),
            description: "Leather".to_string(),
            image_url: None,
            sizes: vec![40, 41, 42],
            color: Some("Brown".to_string()),
            category: Some(Category::Men),
            cost_price: Price::ZERO,
            compare_at_price: Price::from_dinars(500),
            image_source: ImageSource::Url,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_form_from_product_round_trips_through_patch() {
        let form = form_from_product(&product());
        assert_eq!(form.sizes, "40, 41, 42");
        assert_eq!(form.cost_price, "");
        assert_eq!(form.category, "men");
        let patch = form.into_patch().unwrap();
        assert_eq!(patch.sizes, Some(vec![40, 41, 42]));
        assert_eq!(patch.price, Some(Price::from_dinars(420)));
        assert_eq!(patch.cost_price, Some(Price::ZERO));
        assert_eq!(patch.color.as_deref(), Some("Brown"));
        assert_eq!(patch.image_url.as_deref(), Some(""));
    }

    #[test]
    fn test_row_view_shows_sale_only_when_discounted() {
        let offset = chrono::FixedOffset::east_opt(3600).unwrap();
        let t = crate::i18n::Language::En.strings();
        let row = ProductRowView::new(&product(), t, &offset);
        assert_eq!(row.compare_at_price.as_deref(), Some("500.00 TND"));
        assert_eq!(row.discount, Some(16));
        assert!(row.margin.is_none());

        let mut plain = product();
        plain.compare_at_price = Price::ZERO;
        let row = ProductRowView::new(&plain, t, &offset);
        assert!(row.compare_at_price.is_none());
    }

    #[test]
    fn test_upload_errors_hide_storage_details() {
        let err = SubmitError::Storage(StorageError::Rejected {
            status: 403,
            body: "bucket policy".to_string(),
        });
        assert_eq!(err.user_message(), "Image upload failed, please try again");
        let err = SubmitError::Storage(StorageError::InvalidFile("Image is too large".to_string()));
        assert_eq!(err.user_message(), "Image is too large");
        assert_eq!(
            SubmitError::UploadsDisabled.user_message(),
            "Image uploads are not configured"
        );
    }
}
