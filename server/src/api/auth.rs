use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{
    api::{AppState, ApiError, CurrentSession, LocalizedError, error::Localize},
    auth::password,
    db::interface::DatabaseError,
    models::{User, UserCreate},
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    session: CurrentSession,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<(SignedCookieJar, Json<Value>), LocalizedError> {
    let language = session.language();
    let Form(form) = form.localize(language)?;
    let user = match state.db.get_user_by_email(form.email.trim()).await {
        Ok(user) => user,
        Err(DatabaseError::NotFound) => return Err(ApiError::LoginFailed.localized(language)),
        Err(e) => return Err(ApiError::LoginError(e).localized(language)),
    };
    // accounts created through a provider have no password
    let Some(hash) = user.password.clone() else {
        return Err(ApiError::LoginFailed.localized(language));
    };
    if !password::verify_async(form.password, hash)
        .await
        .localize(language)?
    {
        warn!("wrong password for {}", user.email);
        return Err(ApiError::LoginFailed.localized(language));
    }

    let jar = log_in(&state, session, user).await.localize(language)?;
    Ok((jar, Json(json!({ "success": true }))))
}

/// Stores `user` as the session identity under a fresh session ID.
pub(super) async fn log_in(
    state: &AppState,
    mut session: CurrentSession,
    user: User,
) -> Result<SignedCookieJar, DatabaseError> {
    info!("user {} logged in", user.email);
    session.rotate(state.db.as_ref()).await?;
    session.data.registration_info = None;
    session.data.pending_authorization = None;
    session.data.user = Some(user);
    session.commit(state.db.as_ref()).await
}

pub async fn logout(
    State(state): State<AppState>,
    mut session: CurrentSession,
) -> Result<(SignedCookieJar, StatusCode), LocalizedError> {
    let language = session.language();
    // the chosen language outlives the login
    if session.data.user.take().is_some() {
        session.data.language = Some(language);
    }
    session.data.registration_info = None;
    let jar = session.commit(state.db.as_ref()).await.localize(language)?;
    Ok((jar, StatusCode::NO_CONTENT))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
}

/// Returns the trimmed value if it is present and not blank.
fn filled(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn register(
    State(state): State<AppState>,
    mut session: CurrentSession,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<(SignedCookieJar, Json<Value>), LocalizedError> {
    let language = session.language();
    let Form(form) = form.localize(language)?;
    let pending = session.data.registration_info.clone();

    let (Some(email), Some(first_name), Some(last_name), Some(street), Some(city), Some(zip)) = (
        filled(form.email),
        filled(form.first_name),
        filled(form.last_name),
        filled(form.street),
        filled(form.city),
        filled(form.zip),
    ) else {
        return Err(ApiError::MissingFormData.localized(language));
    };

    // passwords are taken verbatim, only checked for presence
    let password = form.password.filter(|p| !p.is_empty());
    if password.is_none() && pending.is_none() {
        return Err(ApiError::MissingFormData.localized(language));
    }
    if let (Some(password), Some(confirmation)) = (&password, &form.password_confirmation) {
        if password != confirmation {
            return Err(ApiError::PasswordMismatch.localized(language));
        }
    }

    let password = match password {
        Some(password) => Some(password::hash_async(password).await.localize(language)?),
        None => None,
    };
    let new_user = UserCreate {
        email,
        password,
        first_name,
        last_name,
        street,
        city,
        zip,
        auth_token: pending.map(|info| info.auth_token),
        language,
    };
    let user = match state.db.create_user(&new_user).await {
        Ok(user) => user,
        Err(DatabaseError::UniquenessViolation { field }) => {
            warn!(?field, "registration of {} rejected", new_user.email);
            // a provider account may only back one user
            let error = if field.as_deref() == Some("auth_token") {
                ApiError::AccountAlreadyRegistered
            } else {
                ApiError::EmailAlreadyInUse
            };
            return Err(error.localized(language));
        }
        Err(e) => return Err(ApiError::RegistrationError(e).localized(language)),
    };
    info!("registered user {}", user.email);

    session.data.language = None;
    let jar = log_in(&state, session, user).await.localize(language)?;
    Ok((jar, Json(json!({ "success": true }))))
}
