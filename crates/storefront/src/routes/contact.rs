//! Contact form route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use luxeshopy_core::Email;

use crate::db::{ContactRepository, NewContactMessage};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::routes::Chrome;
use crate::state::AppState;

const SENT: &str = "Message sent! We will get back to you soon.";
const NOT_SENT: &str = "Failed to send message. Please try again.";

/// Contact form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// Validate the submission.
    ///
    /// # Errors
    ///
    /// Returns a message for the shopper when a field is missing or the email
    /// is malformed.
    pub fn validate(&self) -> Result<NewContactMessage, String> {
        let name = self.name.trim();
        let message = self.message.trim();
        if name.is_empty() {
            return Err("Please enter your name".to_string());
        }
        let email = Email::parse(&self.email).map_err(|e| e.to_string())?;
        if message.is_empty() {
            return Err("Please enter a message".to_string());
        }
        Ok(NewContactMessage {
            name: name.to_string(),
            email,
            message: message.to_string(),
        })
    }
}

/// A one-off notice shown above the form.
#[derive(Debug, Clone)]
pub struct Toast {
    pub success: bool,
    pub message: String,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub chrome: Chrome,
    pub form: ContactForm,
    pub toast: Option<Toast>,
}

/// Display the contact form.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    ContactTemplate {
        chrome: Chrome::load(&state, &session, "contact").await,
        form: ContactForm::default(),
        toast: None,
    }
}

/// Store a contact message.
///
/// On success the form is cleared; on failure the entered values are kept.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactForm>,
) -> Response {
    let chrome = Chrome::load(&state, &session, "contact").await;

    let message = match form.validate() {
        Ok(message) => message,
        Err(error) => {
            let page = ContactTemplate {
                chrome,
                form,
                toast: Some(Toast {
                    success: false,
                    message: error,
                }),
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, page).into_response();
        }
    };

    match ContactRepository::new(state.pool()).create(&message).await {
        Ok(id) => {
            add_breadcrumb("contact", "Message sent", None);
            tracing::info!(contact_id = %id, "Contact message stored");
            ContactTemplate {
                chrome,
                form: ContactForm::default(),
                toast: Some(Toast {
                    success: true,
                    message: SENT.to_string(),
                }),
            }
            .into_response()
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Failed to store contact message");
            let page = ContactTemplate {
                chrome,
                form,
                toast: Some(Toast {
                    success: false,
                    message: NOT_SENT.to_string(),
                }),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, page).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let msg = form(" Sami ", " sami@example.tn ", " Do you ship to Sousse? ")
            .validate()
            .unwrap();
        assert_eq!(msg.name, "Sami");
        assert_eq!(msg.email.as_str(), "sami@example.tn");
        assert_eq!(msg.message, "Do you ship to Sousse?");
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        assert_eq!(
            form("", "sami@example.tn", "Hi").validate().unwrap_err(),
            "Please enter your name"
        );
        assert_eq!(
            form("Sami", "not-an-email", "Hi").validate().unwrap_err(),
            "Please enter a valid email address"
        );
        assert_eq!(
            form("Sami", "sami@example.tn", "   ").validate().unwrap_err(),
            "Please enter a message"
        );
    }

    #[test]
    fn test_toast_renders() {
        let html = ContactTemplate {
            chrome: Chrome {
                nav: "contact",
                cart_count: 0,
                whatsapp_link: None,
            },
            form: ContactForm::default(),
            toast: Some(Toast {
                success: true,
                message: SENT.to_string(),
            }),
        }
        .render()
        .unwrap();
        assert!(html.contains(SENT));
    }

    #[test]
    fn test_layout_shows_cart_badge_only_when_filled() {
        let page = |cart_count| ContactTemplate {
            chrome: Chrome {
                nav: "contact",
                cart_count,
                whatsapp_link: None,
            },
            form: ContactForm::default(),
            toast: None,
        };
        let html = page(3).render().unwrap();
        assert!(html.contains(r#"<span class="cart-count">3</span>"#));
        let html = page(0).render().unwrap();
        assert!(!html.contains(r#"class="cart-count""#));
    }
}
