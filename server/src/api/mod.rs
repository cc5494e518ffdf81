//! # HTTP interface
//!
//! Pages are rendered on the server; form submissions and small actions are AJAX endpoints
//! answering with JSON.

use std::{ops::Deref, path::Path, sync::Arc};

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    http::header,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer, sensitive_headers::SetSensitiveHeadersLayer, trace::TraceLayer,
};
use url::Url;

use crate::{
    auth::oauth::{AuthPurpose, Provider, Providers},
    config::Config,
    db::interface::DatabaseClient,
    models::MAX_ATTACHMENT_BYTES,
    ui::new_static_server,
};

mod attachments;
mod auth;
mod error;
mod inforequests;
mod language;
mod oauth;
mod obligees;
mod pages;
mod profile;
mod session;

#[cfg(all(test, feature = "sqlite3"))]
mod tests;

pub use error::{ApiError, LocalizedError};
pub use session::{CurrentSession, SESSION_COOKIE};

/// Maximum request payload size in bytes
const MAX_REQUEST_PAYLOAD_BYTES: usize = 16 * 1024; // 16 KiB

/// Maximum payload of an attachment upload in bytes
const MAX_UPLOAD_PAYLOAD_BYTES: usize = MAX_ATTACHMENT_BYTES + 16 * 1024;

/// Context string for deriving the cookie signing key from the session secret
const COOKIE_KEY_CONTEXT: &str = "chcemvediet 2025-03-01 session cookie signing key";

pub struct AppStateInner {
    pub db: Arc<dyn DatabaseClient>,
    pub providers: Providers,
    pub cookie_key: Key,
    /// Public base URL, used to build OAuth redirect URIs
    pub app_url: Url,
    pub secure_cookies: bool,
    /// Domain of the per-request addresses obligees reply to
    pub inforequest_email_domain: String,
}

/// Shared state of all handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState(Arc<AppStateInner>);

impl AppState {
    pub fn new(db: Arc<dyn DatabaseClient>, providers: Providers, config: &Config) -> Self {
        Self(Arc::new(AppStateInner {
            db,
            providers,
            cookie_key: derive_cookie_key(config.session_secret.0.as_bytes()),
            app_url: config.app_url.clone(),
            secure_cookies: config.secure_cookies(),
            inforequest_email_domain: config.inforequest_email_domain.clone(),
        }))
    }

    /// Absolute URL the provider sends the visitor back to.
    pub fn redirect_uri(
        &self,
        purpose: AuthPurpose,
        provider: Provider,
    ) -> Result<Url, url::ParseError> {
        self.app_url.join(&purpose.return_path(provider))
    }
}

impl Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Stretches the configured secret to the 64 bytes a cookie [`Key`] needs.
fn derive_cookie_key(secret: &[u8]) -> Key {
    let mut hasher = blake3::Hasher::new_derive_key(COOKIE_KEY_CONTEXT);
    hasher.update(secret);
    let mut key = [0u8; 64];
    hasher.finalize_xof().fill(&mut key);
    Key::from(&key)
}

/// Builds the router for the whole site.
pub fn new_router(state: AppState, static_dir: &Path) -> Router<()> {
    let site = Router::new()
        .route("/", get(pages::index))
        .route("/why-register", get(pages::why_register))
        .route("/health", get(async || ()))
        .route("/login", get(pages::login).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/register", get(pages::register).post(auth::register))
        .route("/login/{provider}", get(oauth::start_login))
        .route("/login/{provider}/return", get(oauth::finish_login))
        .route("/register/{provider}", get(oauth::start_registration))
        .route("/register/{provider}/return", get(oauth::finish_registration))
        .route("/change-language", post(language::change_language))
        .route("/search/obligees", get(obligees::search))
        .route("/obligees", get(obligees::index))
        .route("/profile", get(pages::profile).post(profile::update_profile))
        .route("/inforequests", get(inforequests::index))
        .route(
            "/inforequests/create",
            get(inforequests::create_form).post(inforequests::create),
        )
        .route(
            "/inforequests/create/{draft_id}",
            get(inforequests::edit_draft_form).post(inforequests::create_from_draft),
        )
        .route(
            "/inforequests/delete-draft/{draft_id}",
            post(inforequests::delete_draft),
        )
        .route("/inforequests/detail/{id}", get(inforequests::detail))
        .route(
            "/inforequests/{id}/obligee-action",
            post(inforequests::obligee_action),
        )
        .route(
            "/inforequests/{id}/clarification-response",
            post(inforequests::clarification_response),
        )
        .route("/inforequests/{id}/appeal", post(inforequests::appeal))
        .route(
            "/inforequests/{id}/extend-deadline/{action_id}",
            post(inforequests::extend_deadline),
        )
        .route(
            "/inforequests/attachments/{id}",
            get(attachments::download),
        )
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_PAYLOAD_BYTES));

    let uploads = Router::new()
        .route("/inforequests/attachments", post(attachments::upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_PAYLOAD_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_PAYLOAD_BYTES));

    Router::new()
        .merge(site)
        .merge(uploads)
        .nest_service("/public", new_static_server(static_dir))
        .fallback(pages::not_found)
        .with_state(state)
        .layer(
            // order is top to bottom
            ServiceBuilder::new()
                .layer(SetSensitiveHeadersLayer::new(vec![
                    header::COOKIE,
                    header::SET_COOKIE,
                ]))
                .layer(TraceLayer::new_for_http()),
        )
}
