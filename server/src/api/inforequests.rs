//! Composing, submitting and tracking information requests.
//!
//! Everything here belongs to the logged-in applicant. Pages send guests to the login
//! page, AJAX endpoints answer them with [`ApiError::NotLoggedIn`], and requests or drafts
//! of other applicants do not exist as far as these handlers are concerned.

use std::{borrow::Cow, ops::RangeInclusive};

use axum::{
    Form, Json,
    extract::{
        Path, State,
        rejection::{FormRejection, PathRejection},
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
    api::{AppState, ApiError, CurrentSession, LocalizedError, error::Localize, pages::page},
    db::interface::DatabaseError,
    models::{
        Action, ActionCreate, ActionKind, Applicant, DisclosureLevel, DraftContent,
        InfoRequest, InfoRequestCreate, InfoRequestStatus, Obligee, UNIQUE_EMAIL_TOKEN_LEN,
        User, readable_token, request_letter,
    },
    views::{self, InfoRequestDetail, InfoRequestSummary},
    workdays,
};

/// Working days a deadline is extended by when the form does not say
const DEFAULT_EXTENSION: i64 = 5;

const EXTENSION_DAYS: RangeInclusive<i64> = 2..=100;

/// Format of `<input type="date">` values
const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

fn not_found_page(session: &CurrentSession) -> Response {
    (StatusCode::NOT_FOUND, Html(views::not_found(&page(session)))).into_response()
}

fn applicant_email(session: &CurrentSession) -> Result<String, LocalizedError> {
    session
        .user()
        .map(|user| user.email.clone())
        .ok_or_else(|| ApiError::NotLoggedIn.localized(session.language()))
}

fn redirect_to(url: String) -> Json<Value> {
    Json(json!({ "success": true, "redirect": url }))
}

fn action_redirect(action: &Action) -> Json<Value> {
    redirect_to(format!(
        "/inforequests/detail/{}#action-{}",
        action.inforequest_id, action.id
    ))
}

/// Maps a missing row to [`ApiError::NotFound`].
fn found<T>(result: Result<T, DatabaseError>) -> Result<T, ApiError> {
    result.map_err(|e| match e {
        DatabaseError::NotFound => ApiError::NotFound,
        e => e.into(),
    })
}

/// Maps a missing row to [`ApiError::InvalidAttachment`]; attaching is the only lookup
/// left once the request or draft has been found.
fn attached<T>(result: Result<T, DatabaseError>) -> Result<T, ApiError> {
    result.map_err(|e| match e {
        DatabaseError::NotFound => ApiError::InvalidAttachment,
        e => e.into(),
    })
}

fn trimmed(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parses the comma-separated IDs collected by the upload widget.
fn attachment_ids(value: &str) -> Result<Vec<i64>, ApiError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse().map_err(|_| ApiError::InvalidAttachment))
        .collect()
}

async fn find_obligee(state: &AppState, id: &str) -> Result<Obligee, ApiError> {
    let id: i64 = id.parse().map_err(|_| ApiError::UnknownObligee)?;
    match state.db.get_obligee(id).await {
        Ok(obligee) => Ok(obligee),
        Err(DatabaseError::NotFound) => Err(ApiError::UnknownObligee),
        Err(e) => Err(e.into()),
    }
}

pub async fn index(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Response, LocalizedError> {
    let language = session.language();
    let Some(user) = session.user() else {
        return Ok(Redirect::to("/login").into_response());
    };

    let today = workdays::today();
    let mut summaries = Vec::new();
    for inforequest in state
        .db
        .list_inforequests(&user.email)
        .await
        .localize(language)?
    {
        let obligee = state
            .db
            .get_obligee(inforequest.obligee_id)
            .await
            .localize(language)?;
        let actions = state
            .db
            .list_actions(inforequest.id)
            .await
            .localize(language)?;
        let status = InfoRequestStatus::of(&actions, inforequest.closed, today);
        summaries.push(InfoRequestSummary {
            inforequest,
            obligee,
            status,
        });
    }
    let drafts = state.db.list_drafts(&user.email).await.localize(language)?;

    Ok(Html(views::inforequest_index(&page(&session), &summaries, &drafts)).into_response())
}

pub async fn create_form(session: CurrentSession) -> Response {
    if session.user().is_none() {
        return Redirect::to("/login").into_response();
    }
    Html(views::inforequest_form(&page(&session), None, None, &[])).into_response()
}

pub async fn edit_draft_form(
    State(state): State<AppState>,
    session: CurrentSession,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, LocalizedError> {
    let language = session.language();
    let Some(user) = session.user() else {
        return Ok(Redirect::to("/login").into_response());
    };
    let Ok(Path(draft_id)) = path else {
        return Ok(not_found_page(&session));
    };
    let draft = match state.db.get_draft(&user.email, draft_id).await {
        Ok(draft) => draft,
        Err(DatabaseError::NotFound) => return Ok(not_found_page(&session)),
        Err(e) => return Err(ApiError::from(e).localized(language)),
    };
    let obligee = match draft.obligee_id {
        Some(id) => Some(state.db.get_obligee(id).await.localize(language)?),
        None => None,
    };
    let attachments = state
        .db
        .list_draft_attachments(draft.id)
        .await
        .localize(language)?;

    Ok(Html(views::inforequest_form(
        &page(&session),
        Some(&draft),
        obligee.as_ref(),
        &attachments,
    ))
    .into_response())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InfoRequestForm {
    /// `draft` saves a draft, anything else submits the request
    pub button: Option<String>,
    pub obligee: Option<String>,
    pub subject: String,
    pub content: String,
    /// Comma-separated attachment IDs
    pub attachments: String,
}

impl InfoRequestForm {
    fn saves_draft(&self) -> bool {
        self.button.as_deref() == Some("draft")
    }
}

pub async fn create(
    state: State<AppState>,
    session: CurrentSession,
    form: Result<Form<InfoRequestForm>, FormRejection>,
) -> Result<Json<Value>, LocalizedError> {
    save_or_submit(state, session, None, form).await
}

pub async fn create_from_draft(
    state: State<AppState>,
    session: CurrentSession,
    path: Result<Path<i64>, PathRejection>,
    form: Result<Form<InfoRequestForm>, FormRejection>,
) -> Result<Json<Value>, LocalizedError> {
    let Path(draft_id) = path.localize(session.language())?;
    save_or_submit(state, session, Some(draft_id), form).await
}

async fn save_or_submit(
    State(state): State<AppState>,
    session: CurrentSession,
    draft_id: Option<i64>,
    form: Result<Form<InfoRequestForm>, FormRejection>,
) -> Result<Json<Value>, LocalizedError> {
    let language = session.language();
    let Some(user) = session.user() else {
        return Err(ApiError::NotLoggedIn.localized(language));
    };
    let Form(form) = form.localize(language)?;

    let obligee = match form.obligee.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => Some(find_obligee(&state, id).await.localize(language)?),
        None => None,
    };
    let attachment_ids = attachment_ids(&form.attachments).localize(language)?;
    if let Some(id) = draft_id {
        found(state.db.get_draft(&user.email, id).await).localize(language)?;
    }

    if form.saves_draft() {
        let content = DraftContent {
            obligee_id: obligee.map(|o| o.id),
            subject: form.subject.trim().to_string(),
            content: form.content,
            attachment_ids,
        };
        let saved = match draft_id {
            Some(id) => state.db.update_draft(&user.email, id, &content).await,
            None => state.db.create_draft(&user.email, &content).await,
        };
        let draft = attached(saved).localize(language)?;
        info!("user {} saved draft {}", user.email, draft.id);
        return Ok(redirect_to("/inforequests".to_string()));
    }

    let (Some(obligee), Some(subject), Some(content)) =
        (obligee, trimmed(&form.subject), trimmed(&form.content))
    else {
        return Err(ApiError::MissingFormData.localized(language));
    };
    let inforequest = submit(&state, user, &obligee, subject, &content, attachment_ids, draft_id)
        .await
        .localize(language)?;
    Ok(redirect_to(format!(
        "/inforequests/detail/{}",
        inforequest.id
    )))
}

/// Stores a new request under the first free unique email address, trying longer tokens
/// as shorter ones run out.
async fn submit(
    state: &AppState,
    user: &User,
    obligee: &Obligee,
    subject: String,
    content: &str,
    attachment_ids: Vec<i64>,
    draft_id: Option<i64>,
) -> Result<InfoRequest, ApiError> {
    let applicant = Applicant::from_user(user);
    let today = workdays::today();
    for length in UNIQUE_EMAIL_TOKEN_LEN {
        let unique_email = format!(
            "{}@{}",
            readable_token(length),
            state.inforequest_email_domain
        );
        let letter = request_letter(obligee, &applicant, content, &unique_email, today);
        let create = InfoRequestCreate {
            applicant_email: user.email.clone(),
            obligee_id: obligee.id,
            subject: subject.clone(),
            applicant: applicant.clone(),
            unique_email,
            submission_date: today,
            request: ActionCreate::new(ActionKind::Request, today)
                .with_text(subject.clone(), letter)
                .with_attachments(attachment_ids.clone()),
            draft_id,
        };
        match state.db.create_inforequest(&create).await {
            Ok(inforequest) => {
                info!(
                    "user {} submitted request {} to obligee {}",
                    user.email, inforequest.id, obligee.id
                );
                return Ok(inforequest);
            }
            Err(DatabaseError::UniquenessViolation { field })
                if field.as_deref() == Some("unique_email") =>
            {
                debug!(length, "unique email address taken");
            }
            Err(DatabaseError::NotFound) => return Err(ApiError::InvalidAttachment),
            Err(e) => return Err(e.into()),
        }
    }
    warn!("no free unique email address left");
    Err(DatabaseError::UniquenessViolation {
        field: Some(Cow::Borrowed("unique_email")),
    }
    .into())
}

pub async fn delete_draft(
    State(state): State<AppState>,
    session: CurrentSession,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, LocalizedError> {
    let language = session.language();
    let email = applicant_email(&session)?;
    let Path(id) = path.localize(language)?;
    found(state.db.delete_draft(&email, id).await).localize(language)?;
    info!("user {email} deleted draft {id}");
    Ok(redirect_to("/inforequests".to_string()))
}

pub async fn detail(
    State(state): State<AppState>,
    session: CurrentSession,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, LocalizedError> {
    let language = session.language();
    let Some(user) = session.user() else {
        return Ok(Redirect::to("/login").into_response());
    };
    let Ok(Path(id)) = path else {
        return Ok(not_found_page(&session));
    };
    let inforequest = match state.db.get_inforequest(&user.email, id).await {
        Ok(inforequest) => inforequest,
        Err(DatabaseError::NotFound) => return Ok(not_found_page(&session)),
        Err(e) => return Err(ApiError::from(e).localized(language)),
    };
    let obligee = state
        .db
        .get_obligee(inforequest.obligee_id)
        .await
        .localize(language)?;
    let actions = state.db.list_actions(id).await.localize(language)?;
    let attachments = state
        .db
        .list_inforequest_attachments(id)
        .await
        .localize(language)?;

    let detail = InfoRequestDetail {
        inforequest: &inforequest,
        obligee: &obligee,
        actions: &actions,
        attachments: &attachments,
        today: workdays::today(),
    };
    Ok(Html(views::inforequest_detail(&page(&session), &detail)).into_response())
}

/// A recorded action. Fields which do not apply to the action are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionForm {
    pub kind: Option<ActionKind>,
    /// `YYYY-MM-DD`
    pub effective_date: Option<String>,
    pub disclosure_level: Option<DisclosureLevel>,
    pub subject: String,
    pub content: String,
    /// Comma-separated attachment IDs
    pub attachments: String,
}

impl ActionForm {
    /// A response received from the obligee.
    fn into_obligee_action(self) -> Result<ActionCreate, ApiError> {
        let kind = self.kind.ok_or(ApiError::MissingFormData)?;
        if !kind.is_obligee_action() {
            return Err(ApiError::ActionNotAllowed);
        }
        let effective_date = self
            .effective_date
            .as_deref()
            .map(str::trim)
            .filter(|date| !date.is_empty())
            .ok_or(ApiError::MissingFormData)?;
        let effective_date = NaiveDate::parse_from_str(effective_date, FORM_DATE_FORMAT)
            .map_err(|_| ApiError::InvalidDate)?;

        let mut action = ActionCreate::new(kind, effective_date)
            .with_text(self.subject.trim().to_string(), self.content)
            .with_attachments(attachment_ids(&self.attachments)?);
        if kind == ActionKind::Disclosure {
            let level = self.disclosure_level.ok_or(ApiError::MissingFormData)?;
            action = action.with_disclosure_level(level);
        }
        Ok(action)
    }

    /// A letter the applicant sends today.
    fn into_applicant_action(
        self,
        kind: ActionKind,
        today: NaiveDate,
    ) -> Result<ActionCreate, ApiError> {
        let content = trimmed(&self.content).ok_or(ApiError::MissingFormData)?;
        Ok(ActionCreate::new(kind, today)
            .with_text(self.subject.trim().to_string(), content)
            .with_attachments(attachment_ids(&self.attachments)?))
    }
}

/// The applicant's request with its actions, provided it is still open.
async fn open_inforequest(
    state: &AppState,
    email: &str,
    id: i64,
) -> Result<(InfoRequest, Vec<Action>), ApiError> {
    let inforequest = found(state.db.get_inforequest(email, id).await)?;
    if inforequest.closed {
        return Err(ApiError::ActionNotAllowed);
    }
    let actions = state.db.list_actions(id).await?;
    Ok((inforequest, actions))
}

/// Appends `action` to the request after checking it may follow the last action.
async fn record(
    state: &AppState,
    email: &str,
    id: i64,
    action: ActionCreate,
) -> Result<Action, ApiError> {
    let (_, actions) = open_inforequest(state, email, id).await?;
    let today = workdays::today();
    let last = actions.last().ok_or(ApiError::ActionNotAllowed)?;
    if !action.kind.can_follow(last, today) {
        return Err(ApiError::ActionNotAllowed);
    }
    if action.effective_date < last.effective_date || action.effective_date > today {
        return Err(ApiError::InvalidDate);
    }

    let added = attached(state.db.add_action(id, &action).await)?;
    info!(inforequest = id, kind = ?added.kind, "recorded action {}", added.id);
    Ok(added)
}

pub async fn obligee_action(
    State(state): State<AppState>,
    session: CurrentSession,
    path: Result<Path<i64>, PathRejection>,
    form: Result<Form<ActionForm>, FormRejection>,
) -> Result<Json<Value>, LocalizedError> {
    let language = session.language();
    let email = applicant_email(&session)?;
    let Path(id) = path.localize(language)?;
    let Form(form) = form.localize(language)?;
    let action = form.into_obligee_action().localize(language)?;
    let action = record(&state, &email, id, action).await.localize(language)?;
    Ok(action_redirect(&action))
}

pub async fn clarification_response(
    state: State<AppState>,
    session: CurrentSession,
    path: Result<Path<i64>, PathRejection>,
    form: Result<Form<ActionForm>, FormRejection>,
) -> Result<Json<Value>, LocalizedError> {
    applicant_action(ActionKind::ClarificationResponse, state, session, path, form).await
}

pub async fn appeal(
    state: State<AppState>,
    session: CurrentSession,
    path: Result<Path<i64>, PathRejection>,
    form: Result<Form<ActionForm>, FormRejection>,
) -> Result<Json<Value>, LocalizedError> {
    applicant_action(ActionKind::Appeal, state, session, path, form).await
}

async fn applicant_action(
    kind: ActionKind,
    State(state): State<AppState>,
    session: CurrentSession,
    path: Result<Path<i64>, PathRejection>,
    form: Result<Form<ActionForm>, FormRejection>,
) -> Result<Json<Value>, LocalizedError> {
    let language = session.language();
    let email = applicant_email(&session)?;
    let Path(id) = path.localize(language)?;
    let Form(form) = form.localize(language)?;
    let action = form
        .into_applicant_action(kind, workdays::today())
        .localize(language)?;
    let action = record(&state, &email, id, action).await.localize(language)?;
    Ok(action_redirect(&action))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtendDeadlineForm {
    /// Working days from today
    pub extension: Option<String>,
}

fn extension_days(value: Option<&str>) -> Result<i64, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(DEFAULT_EXTENSION),
        Some(value) => value
            .parse::<i64>()
            .ok()
            .filter(|days| EXTENSION_DAYS.contains(days))
            .ok_or(ApiError::InvalidExtension),
    }
}

/// Moves a missed obligee deadline of the last action to `days` working days from today.
pub async fn extend_deadline(
    State(state): State<AppState>,
    session: CurrentSession,
    path: Result<Path<(i64, i64)>, PathRejection>,
    form: Result<Form<ExtendDeadlineForm>, FormRejection>,
) -> Result<Json<Value>, LocalizedError> {
    let language = session.language();
    let email = applicant_email(&session)?;
    let Path((id, action_id)) = path.localize(language)?;
    let Form(form) = form.localize(language)?;
    let days = extension_days(form.extension.as_deref()).localize(language)?;
    let action = extend(&state, &email, id, action_id, days)
        .await
        .localize(language)?;
    Ok(action_redirect(&action))
}

async fn extend(
    state: &AppState,
    email: &str,
    id: i64,
    action_id: i64,
    days: i64,
) -> Result<Action, ApiError> {
    let (_, actions) = open_inforequest(state, email, id).await?;
    if !actions.iter().any(|a| a.id == action_id) {
        return Err(ApiError::NotFound);
    }
    let today = workdays::today();
    let last = actions
        .last()
        .filter(|last| last.id == action_id)
        .filter(|last| last.has_obligee_deadline() && last.deadline_missed(today))
        .ok_or(ApiError::ActionNotAllowed)?;
    let extension = last
        .extension_until(today, days)
        .ok_or(ApiError::ActionNotAllowed)?;

    let action = state.db.extend_deadline(action_id, extension).await?;
    info!(inforequest = id, "extended deadline of action {action_id} to {days} working days from today");
    Ok(action)
}
