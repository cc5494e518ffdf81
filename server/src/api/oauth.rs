//! Sign-in through external identity providers.
//!
//! `/login/{provider}` and `/register/{provider}` both start an authorization code flow;
//! their `/return` routes share [`finish()`] and differ only in where a failure lands.

use axum::{
    extract::{Path, Query, State, rejection::QueryRejection},
    response::Redirect,
};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    api::{AppState, ApiError, CurrentSession, LocalizedError, auth::log_in, error::Localize},
    auth::oauth::{
        AuthPurpose, IdentityProvider, Pkce, Provider, ProviderError, ProviderProfile,
        random_token,
    },
    db::interface::DatabaseError,
    models::{PendingAuthorization, RegistrationInfo},
};

type Response = Result<(SignedCookieJar, Redirect), LocalizedError>;

pub async fn start_login(
    state: State<AppState>,
    provider: Path<String>,
    session: CurrentSession,
) -> Response {
    start(AuthPurpose::Login, state, provider, session).await
}

pub async fn start_registration(
    state: State<AppState>,
    provider: Path<String>,
    session: CurrentSession,
) -> Response {
    start(AuthPurpose::Register, state, provider, session).await
}

pub async fn finish_login(
    state: State<AppState>,
    provider: Path<String>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
    session: CurrentSession,
) -> Response {
    finish(AuthPurpose::Login, state, provider, query, session).await
}

pub async fn finish_registration(
    state: State<AppState>,
    provider: Path<String>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
    session: CurrentSession,
) -> Response {
    finish(AuthPurpose::Register, state, provider, query, session).await
}

/// Looks up an enabled provider by its URL slug.
fn enabled_provider<'a>(
    state: &'a AppState,
    slug: &str,
) -> Result<(Provider, &'a dyn IdentityProvider), ApiError> {
    let provider: Provider = slug.parse().map_err(|_| ApiError::NotFound)?;
    let identity_provider = state.providers.get(provider).ok_or(ApiError::NotFound)?;
    Ok((provider, identity_provider.as_ref()))
}

async fn start(
    purpose: AuthPurpose,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    mut session: CurrentSession,
) -> Response {
    let language = session.language();
    let (provider, identity_provider) = enabled_provider(&state, &slug).localize(language)?;
    let redirect_uri = state.redirect_uri(purpose, provider).localize(language)?;

    let pkce = Pkce::generate();
    let csrf_state = random_token();
    let authorize_url = identity_provider.authorize_url(&redirect_uri, &csrf_state, &pkce.challenge);
    session.data.pending_authorization = Some(PendingAuthorization {
        provider,
        purpose,
        state: csrf_state,
        pkce_verifier: pkce.verifier,
    });
    let jar = session.commit(state.db.as_ref()).await.localize(language)?;
    Ok((jar, Redirect::to(authorize_url.as_str())))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the visitor denied consent
    pub error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum CallbackError {
    #[error("provider reported an error: {0}")]
    Denied(String),

    #[error("malformed callback: {0}")]
    Malformed(String),

    #[error("no authorization in progress for this provider")]
    NoPendingAuthorization,

    #[error("state parameter does not match")]
    StateMismatch,

    #[error("authorization code missing")]
    MissingCode,

    #[error("invalid redirect URI: {0}")]
    RedirectUri(#[from] url::ParseError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

async fn finish(
    purpose: AuthPurpose,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
    mut session: CurrentSession,
) -> Response {
    let language = session.language();
    let (provider, identity_provider) = enabled_provider(&state, &slug).localize(language)?;
    let failure = Redirect::to(&purpose.failure_redirect(provider));

    let pending = session.data.pending_authorization.take();
    let profile = match authenticate(&state, identity_provider, purpose, pending, query).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(%provider, "provider sign-in failed: {e}");
            let jar = session.commit(state.db.as_ref()).await.localize(language)?;
            return Ok((jar, failure));
        }
    };

    let auth_token = provider.auth_token(&profile.subject);
    match state.db.get_user_by_auth_token(&auth_token).await {
        Ok(user) => {
            let jar = log_in(&state, session, user).await.localize(language)?;
            Ok((jar, Redirect::to("/")))
        }
        Err(DatabaseError::NotFound) => {
            info!(%provider, "unknown identity, continuing to registration");
            session.data.registration_info = Some(RegistrationInfo {
                provider,
                auth_token,
                profile,
            });
            let jar = session.commit(state.db.as_ref()).await.localize(language)?;
            Ok((jar, Redirect::to("/register")))
        }
        Err(e) => {
            error!(%provider, "failed to look up provider identity: {e}");
            let jar = session.commit(state.db.as_ref()).await.localize(language)?;
            Ok((jar, failure))
        }
    }
}

/// Validates the callback against the pending authorization and fetches the profile.
async fn authenticate(
    state: &AppState,
    identity_provider: &dyn IdentityProvider,
    purpose: AuthPurpose,
    pending: Option<PendingAuthorization>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Result<ProviderProfile, CallbackError> {
    let Query(query) = query.map_err(|e| CallbackError::Malformed(e.body_text()))?;
    if let Some(error) = query.error {
        return Err(CallbackError::Denied(error));
    }
    let provider = identity_provider.provider();
    let pending = pending
        .filter(|p| p.provider == provider && p.purpose == purpose)
        .ok_or(CallbackError::NoPendingAuthorization)?;
    if query.state.as_deref() != Some(pending.state.as_str()) {
        return Err(CallbackError::StateMismatch);
    }
    let code = query.code.ok_or(CallbackError::MissingCode)?;
    let redirect_uri = state.redirect_uri(purpose, provider)?;
    Ok(identity_provider
        .fetch_profile(&code, &redirect_uri, &pending.pkce_verifier)
        .await?)
}
