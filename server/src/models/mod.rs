mod attachment;
mod inforequest;
mod json;
mod obligee;
mod session;
mod user;

pub use attachment::{Attachment, AttachmentContent, AttachmentCreate, MAX_ATTACHMENT_BYTES};
pub use inforequest::{
    Action, ActionCreate, ActionKind, Applicant, DisclosureLevel, DraftContent, InfoRequest,
    InfoRequestCreate, InfoRequestDraft, InfoRequestStatus, UNIQUE_EMAIL_TOKEN_LEN,
    next_actions, readable_token, request_letter,
};
pub use json::JsonText;
pub use obligee::{Obligee, ObligeeCreate};
pub use session::{
    EncodableHash, PendingAuthorization, RegistrationInfo, SESSION_DURATION, Session,
    SessionData, SessionId,
};
pub use user::{User, UserCreate, UserUpdate};
