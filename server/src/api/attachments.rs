//! Uploading and downloading attachments. Files are only ever served to their owner.

use axum::{
    Json,
    extract::{
        Multipart, Path, State,
        multipart::MultipartRejection,
        rejection::PathRejection,
    },
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::debug;

use crate::{
    api::{AppState, ApiError, CurrentSession, LocalizedError, error::Localize},
    db::interface::DatabaseError,
    models::{AttachmentCreate, MAX_ATTACHMENT_BYTES},
};

/// Multipart field carrying the uploaded files
const FILES_FIELD: &str = "files";

#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub id: i64,
    pub name: String,
    pub size: i64,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub files: Vec<UploadedFile>,
}

/// Stores every file of the `files` field. The uploads stay unattached until a draft or an
/// action lists their IDs.
pub async fn upload(
    State(state): State<AppState>,
    session: CurrentSession,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, LocalizedError> {
    let language = session.language();
    let Some(user) = session.user() else {
        return Err(ApiError::NotLoggedIn.localized(language));
    };
    let mut multipart = multipart.localize(language)?;

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.localize(language)? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let content = field.bytes().await.localize(language)?;
        if content.len() > MAX_ATTACHMENT_BYTES {
            return Err(ApiError::PayloadTooLarge.localized(language));
        }

        let create = AttachmentCreate::new(
            user.email.clone(),
            &name,
            content_type.as_deref(),
            content.to_vec(),
        );
        let attachment = state
            .db
            .create_attachment(&create)
            .await
            .localize(language)?;
        debug!(
            "user {} uploaded attachment {} ({} bytes)",
            user.email, attachment.id, attachment.size
        );
        files.push(UploadedFile {
            url: attachment.url(),
            id: attachment.id,
            name: attachment.name,
            size: attachment.size,
        });
    }

    if files.is_empty() {
        return Err(ApiError::InvalidAttachment.localized(language));
    }
    Ok(Json(UploadResponse { files }))
}

pub async fn download(
    State(state): State<AppState>,
    session: CurrentSession,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, LocalizedError> {
    let language = session.language();
    let Some(user) = session.user() else {
        return Err(ApiError::NotLoggedIn.localized(language));
    };
    let Path(id) = path.localize(language)?;
    let file = match state.db.get_attachment(&user.email, id).await {
        Ok(file) => file,
        Err(DatabaseError::NotFound) => return Err(ApiError::NotFound.localized(language)),
        Err(e) => return Err(ApiError::from(e).localized(language)),
    };

    let disposition = format!(
        "attachment; filename=\"{}\"",
        quoted_file_name(&file.attachment.name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.content,
    )
        .into_response())
}

/// Printable ASCII rendering of a file name for a quoted header parameter.
fn quoted_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_file_name() {
        assert_eq!(quoted_file_name("zmluva 2025.pdf"), "zmluva 2025.pdf");
        assert_eq!(quoted_file_name("účet \"A\".pdf"), "__et _A_.pdf");
        assert_eq!(quoted_file_name("a\r\nb"), "a__b");
    }
}
