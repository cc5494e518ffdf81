use std::{borrow::Cow, pin::Pin};

use chrono::{DateTime, Utc};

use crate::models::{
    Action, ActionCreate, Attachment, AttachmentContent, AttachmentCreate, DraftContent,
    EncodableHash, InfoRequest, InfoRequestCreate, InfoRequestDraft, Obligee, ObligeeCreate,
    Session, SessionData, User, UserCreate, UserUpdate,
};

pub trait DatabaseClient: Send + Sync + 'static {
    // User repository

    /// Inserts a new user. Fails with [`DatabaseError::UniquenessViolation`] if the email
    /// or auth token is already taken.
    fn create_user<'user>(
        &self,
        user: &'user UserCreate,
    ) -> Pin<Box<dyn Future<Output = Result<User, DatabaseError>> + Send + 'user>>;

    fn get_user_by_email<'email>(
        &self,
        email: &'email str,
    ) -> Pin<Box<dyn Future<Output = Result<User, DatabaseError>> + Send + 'email>>;

    fn get_user_by_auth_token<'token>(
        &self,
        auth_token: &'token str,
    ) -> Pin<Box<dyn Future<Output = Result<User, DatabaseError>> + Send + 'token>>;

    /// Writes exactly the fields present in `update`.
    fn update_user<'arg>(
        &self,
        email: &'arg str,
        update: &'arg UserUpdate,
    ) -> Pin<Box<dyn Future<Output = Result<User, DatabaseError>> + Send + 'arg>>;

    // Obligee repository

    fn create_obligee<'a>(
        &self,
        obligee: &'a ObligeeCreate,
    ) -> Pin<Box<dyn Future<Output = Result<Obligee, DatabaseError>> + Send + 'a>>;

    /// Finds obligees whose name, street or city contain every word of `term`, ignoring
    /// case and diacritics. Best-scoring obligees come first.
    fn find_obligees<'term>(
        &self,
        term: &'term str,
        limit: Option<u32>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Obligee>, DatabaseError>> + Send + 'term>>;

    fn get_obligee(
        &self,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Obligee, DatabaseError>> + Send + 'static>>;

    /// One page of obligees in alphabetical order.
    fn list_obligees(
        &self,
        offset: u32,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Obligee>, DatabaseError>> + Send + 'static>>;

    fn count_obligees(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<u32, DatabaseError>> + Send + 'static>>;

    // Draft repository
    //
    // Drafts are only ever visible to their applicant: every lookup is scoped by email and
    // a draft of somebody else is reported as [`DatabaseError::NotFound`].

    /// Creates a draft and attaches `content.attachment_ids` to it.
    fn create_draft<'a>(
        &self,
        applicant_email: &'a str,
        content: &'a DraftContent,
    ) -> Pin<Box<dyn Future<Output = Result<InfoRequestDraft, DatabaseError>> + Send + 'a>>;

    /// Overwrites a draft. Attachments no longer listed are detached.
    fn update_draft<'a>(
        &self,
        applicant_email: &'a str,
        id: i64,
        content: &'a DraftContent,
    ) -> Pin<Box<dyn Future<Output = Result<InfoRequestDraft, DatabaseError>> + Send + 'a>>;

    fn get_draft<'a>(
        &self,
        applicant_email: &'a str,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<InfoRequestDraft, DatabaseError>> + Send + 'a>>;

    fn list_drafts<'a>(
        &self,
        applicant_email: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<InfoRequestDraft>, DatabaseError>> + Send + 'a>>;

    fn delete_draft<'a>(
        &self,
        applicant_email: &'a str,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<(), DatabaseError>> + Send + 'a>>;

    // Information request repository

    /// Atomically stores the request with its first action, moves the listed attachments
    /// to that action and deletes the draft it came from.
    ///
    /// Fails with [`DatabaseError::UniquenessViolation`] on field `unique_email` if the
    /// address is taken, and with [`DatabaseError::NotFound`] if an attachment does not
    /// belong to the applicant or is already attached to an action.
    fn create_inforequest<'a>(
        &self,
        inforequest: &'a InfoRequestCreate,
    ) -> Pin<Box<dyn Future<Output = Result<InfoRequest, DatabaseError>> + Send + 'a>>;

    fn get_inforequest<'a>(
        &self,
        applicant_email: &'a str,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<InfoRequest, DatabaseError>> + Send + 'a>>;

    /// Requests of one applicant, newest first.
    fn list_inforequests<'a>(
        &self,
        applicant_email: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<InfoRequest>, DatabaseError>> + Send + 'a>>;

    /// Requests of all applicants which are not closed yet.
    fn list_open_inforequests(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<InfoRequest>, DatabaseError>> + Send + 'static>>;

    fn close_inforequest(
        &self,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<(), DatabaseError>> + Send + 'static>>;

    // Action repository

    /// Appends an action and attaches `action.attachment_ids` to it. The attachments must
    /// belong to the request's applicant.
    fn add_action<'a>(
        &self,
        inforequest_id: i64,
        action: &'a ActionCreate,
    ) -> Pin<Box<dyn Future<Output = Result<Action, DatabaseError>> + Send + 'a>>;

    /// Actions of a request in the order they took effect.
    fn list_actions(
        &self,
        inforequest_id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Action>, DatabaseError>> + Send + 'static>>;

    fn extend_deadline(
        &self,
        action_id: i64,
        extension: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Action, DatabaseError>> + Send + 'static>>;

    // Attachment repository

    fn create_attachment<'a>(
        &self,
        attachment: &'a AttachmentCreate,
    ) -> Pin<Box<dyn Future<Output = Result<Attachment, DatabaseError>> + Send + 'a>>;

    fn get_attachment<'a>(
        &self,
        owner_email: &'a str,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<AttachmentContent, DatabaseError>> + Send + 'a>>;

    fn list_draft_attachments(
        &self,
        draft_id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Attachment>, DatabaseError>> + Send + 'static>>;

    /// Attachments of every action of a request.
    fn list_inforequest_attachments(
        &self,
        inforequest_id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Attachment>, DatabaseError>> + Send + 'static>>;

    /// Deletes attachments created before `before` which belong to no draft and no action.
    fn delete_orphaned_attachments(
        &self,
        before: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<u64, DatabaseError>> + Send + 'static>>;

    // Session repository

    fn create_session<'a>(
        &self,
        session: &'a Session,
    ) -> Pin<Box<dyn Future<Output = Result<(), DatabaseError>> + Send + 'a>>;

    fn get_session_by_id_hash<'id>(
        &self,
        id_hash: &'id EncodableHash,
    ) -> Pin<Box<dyn Future<Output = Result<Session, DatabaseError>> + Send + 'id>>;

    /// Replaces the session payload and extends its lifetime.
    fn update_session_data<'a>(
        &self,
        id_hash: &'a EncodableHash,
        data: &'a SessionData,
    ) -> Pin<Box<dyn Future<Output = Result<(), DatabaseError>> + Send + 'a>>;

    fn delete_session_by_id_hash<'id>(
        &self,
        id_hash: &'id EncodableHash,
    ) -> Pin<Box<dyn Future<Output = Result<(), DatabaseError>> + Send + 'id>>;

    /// Deletes expired sessions, returning how many were removed.
    fn delete_expired_sessions(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<u64, DatabaseError>> + Send + 'static>>;
}

/// Error type for database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("row/resource not found")]
    NotFound,

    #[error(
        "uniqueness violation {}{}",
        if field.is_some() { "on field " } else { "(field unknown)" },
        field.as_deref().unwrap_or("")
    )]
    UniquenessViolation {
        /// The field that caused the uniqueness violation, if known
        field: Option<Cow<'static, str>>,
    },

    #[error("the update request contains no changes")]
    EmptyUpdate,

    #[error("query failed: {0}")]
    Query(Box<dyn std::error::Error + Send + Sync + 'static>),
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(e) if e.is_unique_violation() => {
                // SQLite reports "UNIQUE constraint failed: users.email"
                let field = e
                    .message()
                    .rsplit_once('.')
                    .map(|(_, column)| Cow::Owned(column.to_string()));
                Self::UniquenessViolation { field }
            }
            other => Self::Query(Box::new(other)),
        }
    }
}
