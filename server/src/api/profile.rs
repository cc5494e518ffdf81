use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    api::{AppState, ApiError, CurrentSession, LocalizedError, error::Localize},
    models::UserUpdate,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
}

impl ProfileForm {
    /// Blank fields are left unchanged.
    fn into_update(self) -> UserUpdate {
        let filled = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        UserUpdate {
            first_name: filled(self.first_name),
            last_name: filled(self.last_name),
            street: filled(self.street),
            city: filled(self.city),
            zip: filled(self.zip),
            language: None,
        }
    }
}

pub async fn update_profile(
    State(state): State<AppState>,
    mut session: CurrentSession,
    form: Result<Form<ProfileForm>, FormRejection>,
) -> Result<(SignedCookieJar, Json<Value>), LocalizedError> {
    let language = session.language();
    let Form(form) = form.localize(language)?;
    let Some(email) = session.user().map(|u| u.email.clone()) else {
        return Err(ApiError::NotLoggedIn.localized(language));
    };

    let update = form.into_update();
    if update.is_empty() {
        return Ok((session.into_jar(), Json(json!({ "success": true }))));
    }
    let user = state
        .db
        .update_user(&email, &update)
        .await
        .localize(language)?;
    info!("user {email} updated their profile");

    session.data.user = Some(user);
    let jar = session.commit(state.db.as_ref()).await.localize(language)?;
    Ok((jar, Json(json!({ "success": true }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_skipped() {
        let form = ProfileForm {
            first_name: Some(" Mária ".to_string()),
            last_name: Some(String::new()),
            ..ProfileForm::default()
        };
        let update = form.into_update();
        assert_eq!(update.first_name.as_deref(), Some("Mária"));
        assert_eq!(update.last_name, None);
        assert!(!update.is_empty());
        assert!(ProfileForm::default().into_update().is_empty());
    }
}
