use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    api::{AppState, CurrentSession, LocalizedError, error::Localize},
    i18n::Language,
    models::UserUpdate,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeLanguageQuery {
    pub code: Option<String>,
}

/// Switches the display language.
///
/// A logged-in user's preference is stored in their account; a guest's lives in the session.
/// Unknown codes are ignored.
pub async fn change_language(
    State(state): State<AppState>,
    mut session: CurrentSession,
    query: Result<Query<ChangeLanguageQuery>, QueryRejection>,
) -> Result<(SignedCookieJar, Json<Value>), LocalizedError> {
    let current = session.language();
    let Query(query) = query.localize(current)?;
    let Some(language) = query.code.as_deref().and_then(Language::from_code) else {
        debug!(code = ?query.code, "ignoring unknown language code");
        return Ok((session.into_jar(), Json(json!({}))));
    };

    if let Some(user) = &session.data.user {
        let update = UserUpdate::new().with_language(language);
        let user = state
            .db
            .update_user(&user.email, &update)
            .await
            .localize(current)?;
        session.data.user = Some(user);
    } else {
        session.data.language = Some(language);
    }
    let jar = session.commit(state.db.as_ref()).await.localize(language)?;
    Ok((jar, Json(json!({}))))
}
