//! # Server-rendered pages
//!
//! Pages are plain HTML strings. Interactive behavior is attached by
//! `/public/js/chcemvediet.js` through CSS classes and `data-*` attributes.

use chrono::NaiveDate;

use crate::{
    auth::oauth::Provider,
    i18n::{Language, Message},
    models::{
        Action, ActionKind, Attachment, DisclosureLevel, InfoRequest, InfoRequestDraft,
        InfoRequestStatus, Obligee, RegistrationInfo, User, next_actions,
    },
};

/// Dates are shown the Slovak way in both languages.
const DATE_FORMAT: &str = "%-d. %-m. %Y";

/// Per-request context every page is rendered with.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub language: Language,
    pub user: Option<&'a User>,
}

impl Page<'_> {
    fn t(&self, message: Message) -> &'static str {
        message.text(self.language)
    }
}

/// Escapes text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn layout(page: &Page<'_>, title: &str, body: &str) -> String {
    let site_title = page.t(Message::SiteTitle);
    let nav = match page.user {
        Some(user) => format!(
            r#"<a href="/inforequests">{my_requests}</a>
        <a href="/obligees">{obligees}</a>
        <span class="user">{logged_in_as} <a href="/profile">{name}</a></span>
        <button type="button" class="logout">{log_out}</button>"#,
            my_requests = page.t(Message::MyRequests),
            obligees = page.t(Message::Obligees),
            logged_in_as = page.t(Message::LoggedInAs),
            name = escape(&user.display_name()),
            log_out = page.t(Message::LogOut),
        ),
        None => format!(
            r#"<a href="/obligees">{obligees}</a>
        <a href="/login">{log_in}</a>
        <a href="/register">{register}</a>
        <a href="/why-register">{why}</a>"#,
            obligees = page.t(Message::Obligees),
            log_in = page.t(Message::LogIn),
            register = page.t(Message::Register),
            why = page.t(Message::WhyRegister),
        ),
    };
    let languages: String = Language::ALL
        .into_iter()
        .filter(|l| *l != page.language)
        .map(|l| {
            format!(
                r##"<a href="#" class="change-language" data-code="{code}"><img src="{icon}" alt=""> {name}</a>"##,
                code = l.code(),
                icon = l.icon(),
                name = l.name(),
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} | {site_title}</title>
  <link rel="stylesheet" href="/public/css/site.css">
</head>
<body>
  <header>
    <a class="brand" href="/">{site_title}</a>
    <nav>
        {nav}
    </nav>
    <div class="languages">{languages}</div>
  </header>
  <div class="alert" role="alert" hidden></div>
  <main>
{body}
  </main>
  <script src="/public/js/chcemvediet.js"></script>
</body>
</html>
"#,
        lang = page.language.code(),
        title = escape(title),
    )
}

/// A labelled form input. Required inputs carry the message shown when left empty.
fn field(
    page: &Page<'_>,
    label: Message,
    name: &str,
    input_type: &str,
    value: &str,
    missing: Option<Message>,
) -> String {
    let required = match missing {
        Some(missing) => format!(r#" required data-missing="{}""#, page.t(missing)),
        None => String::new(),
    };
    format!(
        r#"    <label>{label}
      <input type="{input_type}" name="{name}" value="{value}"{required}>
    </label>
"#,
        label = page.t(label),
        value = escape(value),
    )
}

fn provider_links(page: &Page<'_>, providers: &[Provider], route: &str, text: Message) -> String {
    providers
        .iter()
        .map(|p| {
            format!(
                r#"    <a class="provider provider-{slug}" href="/{route}/{slug}">{text} {name}</a>
"#,
                slug = p.slug(),
                text = page.t(text),
                name = p.name(),
            )
        })
        .collect()
}

pub fn index(page: &Page<'_>) -> String {
    let body = format!(
        r##"    <h1>{title}</h1>
    <p class="tagline">{tagline}</p>
    <section class="search">
      <h2>{search}</h2>
      <input type="search" class="obligee-search" placeholder="{placeholder}"
             data-results="#obligee-results" data-empty="{empty}" autocomplete="off">
      <ul id="obligee-results"></ul>
    </section>
"##,
        title = page.t(Message::SiteTitle),
        tagline = page.t(Message::Tagline),
        search = page.t(Message::SearchObligees),
        placeholder = page.t(Message::SearchPlaceholder),
        empty = page.t(Message::NoObligeesFound),
    );
    layout(page, page.t(Message::Tagline), &body)
}

pub fn why_register(page: &Page<'_>) -> String {
    let body = format!(
        r#"    <h1>{title}</h1>
    <p>{text}</p>
    <p><a href="/register">{register}</a></p>
"#,
        title = page.t(Message::WhyRegister),
        text = page.t(Message::WhyRegisterText),
        register = page.t(Message::Register),
    );
    layout(page, page.t(Message::WhyRegister), &body)
}

pub fn login(page: &Page<'_>, providers: &[Provider], failed: Option<Provider>) -> String {
    let failure = match failed {
        Some(provider) => format!(
            r#"    <p class="alert alert-error">{} {}</p>
"#,
            page.t(Message::ProviderLoginFailed),
            provider.name()
        ),
        None => String::new(),
    };
    let body = format!(
        r#"    <h1>{title}</h1>
{failure}  <form class="ajax-form" novalidate action="/login" method="post" data-redirect="/">
{email}{password}    <button type="submit">{title}</button>
  </form>
  <div class="providers">
{providers}  </div>
"#,
        title = page.t(Message::LogIn),
        email = field(page, Message::Email, "email", "email", "", Some(Message::EmailMissing)),
        password = field(
            page,
            Message::Password,
            "password",
            "password",
            "",
            Some(Message::PasswordMissing)
        ),
        providers = provider_links(page, providers, "login", Message::LogInWith),
    );
    layout(page, page.t(Message::LogIn), &body)
}

/// Registration form, pre-filled from a pending provider sign-in if there is one.
pub fn register(
    page: &Page<'_>,
    providers: &[Provider],
    pending: Option<&RegistrationInfo>,
) -> String {
    let profile = pending.map(|info| &info.profile);
    let email = profile.and_then(|p| p.email.clone()).unwrap_or_default();
    let first_name = profile.and_then(|p| p.given_name.clone()).unwrap_or_default();
    let last_name = profile.and_then(|p| p.last_name()).unwrap_or_default();

    let (intro, passwords, providers) = match pending {
        Some(info) => (
            format!(
                r#"    <p class="registering-with">{} {}</p>
"#,
                page.t(Message::RegisteringWith),
                info.provider.name()
            ),
            String::new(),
            String::new(),
        ),
        None => (
            String::new(),
            field(
                page,
                Message::Password,
                "password",
                "password",
                "",
                Some(Message::PasswordMissing),
            ) + &field(
                page,
                Message::PasswordConfirmation,
                "passwordConfirmation",
                "password",
                "",
                None,
            ),
            provider_links(page, providers, "register", Message::RegisterWith),
        ),
    };

    let body = format!(
        r#"    <h1>{title}</h1>
{intro}  <form class="ajax-form" novalidate action="/register" method="post" data-redirect="/">
{email}{passwords}{first_name}{last_name}{street}{city}{zip}    <button type="submit">{title}</button>
  </form>
  <p><a href="/why-register">{why}</a></p>
  <div class="providers">
{providers}  </div>
"#,
        title = page.t(Message::Register),
        email = field(page, Message::Email, "email", "email", &email, Some(Message::EmailMissing)),
        first_name = field(
            page,
            Message::FirstName,
            "firstName",
            "text",
            &first_name,
            Some(Message::FirstNameMissing)
        ),
        last_name = field(
            page,
            Message::LastName,
            "lastName",
            "text",
            &last_name,
            Some(Message::LastNameMissing)
        ),
        street = field(page, Message::Street, "street", "text", "", Some(Message::StreetMissing)),
        city = field(page, Message::City, "city", "text", "", Some(Message::CityMissing)),
        zip = field(page, Message::Zip, "zip", "text", "", Some(Message::ZipMissing)),
        why = page.t(Message::WhyRegister),
    );
    layout(page, page.t(Message::Register), &body)
}

pub fn profile(page: &Page<'_>, user: &User) -> String {
    let body = format!(
        r#"    <h1>{title}</h1>
  <p class="email">{email}</p>
  <form class="ajax-form" novalidate action="/profile" method="post" data-success="{saved}">
{first_name}{last_name}{street}{city}{zip}    <button type="submit">{save}</button>
  </form>
"#,
        title = page.t(Message::Profile),
        email = escape(&user.email),
        saved = page.t(Message::ProfileSaved),
        first_name = field(page, Message::FirstName, "firstName", "text", &user.first_name, None),
        last_name = field(page, Message::LastName, "lastName", "text", &user.last_name, None),
        street = field(page, Message::Street, "street", "text", &user.street, None),
        city = field(page, Message::City, "city", "text", &user.city, None),
        zip = field(page, Message::Zip, "zip", "text", &user.zip, None),
        save = page.t(Message::SaveProfile),
    );
    layout(page, page.t(Message::Profile), &body)
}

pub fn not_found(page: &Page<'_>) -> String {
    let body = format!(
        r#"    <h1>{}</h1>
    <p><a href="/">{}</a></p>
"#,
        page.t(Message::PageNotFound),
        page.t(Message::SiteTitle)
    );
    layout(page, page.t(Message::PageNotFound), &body)
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn textarea(page: &Page<'_>, label: Message, name: &str, value: &str, missing: Option<Message>) -> String {
    let required = match missing {
        Some(missing) => format!(r#" required data-missing="{}""#, page.t(missing)),
        None => String::new(),
    };
    format!(
        r#"    <label>{label}
      <textarea name="{name}" rows="8"{required}>{value}</textarea>
    </label>
"#,
        label = page.t(label),
        value = escape(value),
    )
}

fn attachment_links<'a>(attachments: impl IntoIterator<Item = &'a Attachment>) -> String {
    attachments
        .into_iter()
        .map(|a| format!(r#"<li><a href="{}">{}</a></li>"#, a.url(), escape(&a.name)))
        .collect()
}

/// File input which uploads on change and collects the IDs in a hidden `attachments` input.
fn attachment_picker(page: &Page<'_>, id: &str, attachments: &[Attachment]) -> String {
    let ids: Vec<String> = attachments.iter().map(|a| a.id.to_string()).collect();
    format!(
        r##"    <label>{label}
      <input type="file" class="attachment-upload" multiple data-ids="#{id}-ids" data-list="#{id}-list">
    </label>
    <input type="hidden" name="attachments" id="{id}-ids" value="{ids}">
    <ul class="attachments" id="{id}-list">{links}</ul>
"##,
        label = page.t(Message::Attachments),
        ids = ids.join(","),
        links = attachment_links(attachments),
    )
}

fn with_deadline(page: &Page<'_>, text: Message, deadline: Option<NaiveDate>, missed: bool) -> String {
    let Some(deadline) = deadline else {
        return page.t(text).to_string();
    };
    let missed = if missed {
        format!(", {}", page.t(Message::DeadlineMissed))
    } else {
        String::new()
    };
    format!(
        "{} ({} {}{missed})",
        page.t(text),
        page.t(Message::Deadline),
        format_date(deadline)
    )
}

fn status_text(page: &Page<'_>, status: InfoRequestStatus) -> String {
    match status {
        InfoRequestStatus::AwaitingObligee { deadline, missed } => {
            with_deadline(page, Message::StatusAwaitingObligee, deadline, missed)
        }
        InfoRequestStatus::AwaitingApplicant { deadline, missed } => {
            with_deadline(page, Message::StatusAwaitingApplicant, deadline, missed)
        }
        InfoRequestStatus::Disclosed => page.t(Message::StatusDisclosed).to_string(),
        InfoRequestStatus::Refused => page.t(Message::StatusRefused).to_string(),
        InfoRequestStatus::Closed => page.t(Message::StatusClosed).to_string(),
    }
}

/// A submitted request as listed on the index page.
#[derive(Debug, Clone)]
pub struct InfoRequestSummary {
    pub inforequest: InfoRequest,
    pub obligee: Obligee,
    pub status: InfoRequestStatus,
}

pub fn inforequest_index(
    page: &Page<'_>,
    inforequests: &[InfoRequestSummary],
    drafts: &[InfoRequestDraft],
) -> String {
    let list = if inforequests.is_empty() {
        format!(
            r#"    <p class="empty">{}</p>
"#,
            page.t(Message::NoRequests)
        )
    } else {
        let rows: String = inforequests
            .iter()
            .map(|summary| {
                format!(
                    r#"      <li><a href="/inforequests/detail/{id}">{subject}</a>
        <span class="obligee">{obligee}</span>
        <span class="date">{date}</span>
        <span class="status">{status}</span></li>
"#,
                    id = summary.inforequest.id,
                    subject = escape(&summary.inforequest.subject),
                    obligee = escape(&summary.obligee.name),
                    date = format_date(summary.inforequest.submission_date),
                    status = status_text(page, summary.status),
                )
            })
            .collect();
        format!(
            r#"    <ul class="inforequests">
{rows}    </ul>
"#
        )
    };

    let drafts = if drafts.is_empty() {
        String::new()
    } else {
        let rows: String = drafts
            .iter()
            .map(|draft| {
                let subject = if draft.subject.trim().is_empty() {
                    page.t(Message::UntitledDraft).to_string()
                } else {
                    escape(&draft.subject)
                };
                format!(
                    r#"      <li><a href="/inforequests/create/{id}">{subject}</a>
        <form class="ajax-form" novalidate action="/inforequests/delete-draft/{id}" method="post">
          <button type="submit">{delete}</button>
        </form></li>
"#,
                    id = draft.id,
                    delete = page.t(Message::DeleteDraft),
                )
            })
            .collect();
        format!(
            r#"    <h2>{title}</h2>
    <ul class="drafts">
{rows}    </ul>
"#,
            title = page.t(Message::Drafts),
        )
    };

    let body = format!(
        r#"    <h1>{title}</h1>
    <p><a class="button" href="/inforequests/create">{new}</a></p>
{list}{drafts}"#,
        title = page.t(Message::MyRequests),
        new = page.t(Message::NewRequest),
    );
    layout(page, page.t(Message::MyRequests), &body)
}

/// Form composing a new request, or continuing `draft`.
pub fn inforequest_form(
    page: &Page<'_>,
    draft: Option<&InfoRequestDraft>,
    obligee: Option<&Obligee>,
    attachments: &[Attachment],
) -> String {
    let action = match draft {
        Some(draft) => format!("/inforequests/create/{}", draft.id),
        None => "/inforequests/create".to_string(),
    };
    let body = format!(
        r##"    <h1>{title}</h1>
  <form class="ajax-form" novalidate action="{action}" method="post">
    <label>{obligee_label}
      <input type="search" class="obligee-search" placeholder="{placeholder}" autocomplete="off"
             data-results="#obligee-choices" data-empty="{empty}"
             data-pick="#obligee-id" data-chosen="#obligee-chosen">
    </label>
    <ul id="obligee-choices"></ul>
    <p class="obligee-chosen" id="obligee-chosen">{obligee_name}</p>
    <input type="hidden" name="obligee" id="obligee-id" value="{obligee_id}">
{subject}{content}{attachments}    <button type="submit" name="button" value="submit">{submit}</button>
    <button type="submit" name="button" value="draft" formnovalidate>{save}</button>
  </form>
"##,
        title = page.t(Message::NewRequest),
        obligee_label = page.t(Message::Obligee),
        placeholder = page.t(Message::SearchPlaceholder),
        empty = page.t(Message::NoObligeesFound),
        obligee_name = obligee.map(|o| escape(&o.name)).unwrap_or_default(),
        obligee_id = obligee.map(|o| o.id.to_string()).unwrap_or_default(),
        subject = field(
            page,
            Message::Subject,
            "subject",
            "text",
            draft.map_or("", |d| d.subject.as_str()),
            Some(Message::SubjectMissing)
        ),
        content = textarea(
            page,
            Message::Content,
            "content",
            draft.map_or("", |d| d.content.as_str()),
            Some(Message::ContentMissing)
        ),
        attachments = attachment_picker(page, "request-attachments", attachments),
        submit = page.t(Message::SubmitRequest),
        save = page.t(Message::SaveDraft),
    );
    layout(page, page.t(Message::NewRequest), &body)
}

/// Everything the detail page of a request shows.
#[derive(Debug, Clone, Copy)]
pub struct InfoRequestDetail<'a> {
    pub inforequest: &'a InfoRequest,
    pub obligee: &'a Obligee,
    pub actions: &'a [Action],
    pub attachments: &'a [Attachment],
    pub today: NaiveDate,
}

fn action_item(page: &Page<'_>, detail: &InfoRequestDetail<'_>, action: &Action, last: bool) -> String {
    let mut parts = Vec::new();
    if let Some(level) = action.disclosure_level {
        parts.push(format!(
            r#"<p class="disclosure">{}: {}</p>"#,
            page.t(Message::DisclosureLevelLabel),
            page.t(Message::Disclosure(level))
        ));
    }
    if !action.subject.is_empty() {
        parts.push(format!(r#"<p class="subject">{}</p>"#, escape(&action.subject)));
    }
    if !action.content.is_empty() {
        parts.push(format!(r#"<pre class="content">{}</pre>"#, escape(&action.content)));
    }
    if let Some(deadline) = action.deadline_date() {
        let missed = if action.deadline_missed(detail.today) {
            format!(r#" <span class="missed">{}</span>"#, page.t(Message::DeadlineMissed))
        } else {
            String::new()
        };
        parts.push(format!(
            r#"<p class="deadline">{} {}{missed}</p>"#,
            page.t(Message::Deadline),
            format_date(deadline)
        ));
    }
    let attachments: Vec<&Attachment> = detail
        .attachments
        .iter()
        .filter(|a| a.action_id == Some(action.id))
        .collect();
    if !attachments.is_empty() {
        parts.push(format!(
            r#"<ul class="attachments">{}</ul>"#,
            attachment_links(attachments)
        ));
    }
    // only the deadline the obligee is currently missing can be extended
    if last
        && !detail.inforequest.closed
        && action.has_obligee_deadline()
        && action.deadline_missed(detail.today)
    {
        parts.push(format!(
            r#"<form class="ajax-form" novalidate action="/inforequests/{id}/extend-deadline/{action_id}" method="post">
        <label>{days} <input type="number" name="extension" value="5" min="2" max="100"></label>
        <button type="submit">{extend}</button>
      </form>"#,
            id = detail.inforequest.id,
            action_id = action.id,
            days = page.t(Message::ExtendBy),
            extend = page.t(Message::ExtendDeadline),
        ));
    }

    format!(
        r#"    <li class="action action-{code}" id="action-{id}">
      <h3>{kind} <span class="date">{date}</span></h3>
      {parts}
    </li>
"#,
        code = action.kind.code(),
        id = action.id,
        kind = page.t(Message::Action(action.kind)),
        date = format_date(action.effective_date),
        parts = parts.join("\n      "),
    )
}

fn obligee_action_form(page: &Page<'_>, detail: &InfoRequestDetail<'_>, kinds: &[ActionKind]) -> String {
    let kinds: String = kinds
        .iter()
        .map(|kind| {
            format!(
                r#"<option value="{}">{}</option>"#,
                kind.code(),
                page.t(Message::Action(*kind))
            )
        })
        .collect();
    let levels: String = DisclosureLevel::ALL
        .into_iter()
        .map(|level| {
            format!(
                r#"<option value="{}">{}</option>"#,
                level.code(),
                page.t(Message::Disclosure(level))
            )
        })
        .collect();
    let today = detail.today.format("%Y-%m-%d");
    format!(
        r#"    <section class="record-obligee-action">
  <h2>{title}</h2>
  <form class="ajax-form" novalidate action="/inforequests/{id}/obligee-action" method="post">
    <label>{kind_label} <select name="kind">{kinds}</select></label>
    <label>{date_label} <input type="date" name="effectiveDate" value="{today}" max="{today}" required data-missing="{invalid_date}"></label>
    <label>{level_label} <select name="disclosureLevel">{levels}</select></label>
{subject}{content}{attachments}    <button type="submit">{record}</button>
  </form>
    </section>
"#,
        title = page.t(Message::RecordObligeeAction),
        id = detail.inforequest.id,
        kind_label = page.t(Message::ActionKindLabel),
        date_label = page.t(Message::EffectiveDate),
        invalid_date = page.t(Message::InvalidDate),
        level_label = page.t(Message::DisclosureLevelLabel),
        subject = field(page, Message::Subject, "subject", "text", "", None),
        content = textarea(page, Message::Content, "content", "", None),
        attachments = attachment_picker(page, "obligee-action-attachments", &[]),
        record = page.t(Message::Record),
    )
}

/// Form for a clarification response or an appeal, posted to `/inforequests/{id}/{route}`.
fn applicant_action_form(page: &Page<'_>, detail: &InfoRequestDetail<'_>, kind: ActionKind, route: &str) -> String {
    format!(
        r#"    <section class="{route}">
  <h2>{title}</h2>
  <form class="ajax-form" novalidate action="/inforequests/{id}/{route}" method="post">
{subject}{content}{attachments}    <button type="submit">{record}</button>
  </form>
    </section>
"#,
        title = page.t(Message::Action(kind)),
        id = detail.inforequest.id,
        subject = field(page, Message::Subject, "subject", "text", "", None),
        content = textarea(page, Message::Content, "content", "", Some(Message::ContentMissing)),
        attachments = attachment_picker(page, &format!("{route}-attachments"), &[]),
        record = page.t(Message::Record),
    )
}

pub fn inforequest_detail(page: &Page<'_>, detail: &InfoRequestDetail<'_>) -> String {
    let inforequest = detail.inforequest;
    let status = InfoRequestStatus::of(detail.actions, inforequest.closed, detail.today);
    let next = next_actions(detail.actions, inforequest.closed, detail.today);

    let history: String = detail
        .actions
        .iter()
        .enumerate()
        .map(|(i, action)| action_item(page, detail, action, i + 1 == detail.actions.len()))
        .collect();

    let obligee_kinds: Vec<ActionKind> = next
        .iter()
        .copied()
        .filter(|kind| kind.is_obligee_action())
        .collect();
    let mut forms = String::new();
    if !obligee_kinds.is_empty() {
        forms.push_str(&obligee_action_form(page, detail, &obligee_kinds));
    }
    if next.contains(&ActionKind::ClarificationResponse) {
        forms.push_str(&applicant_action_form(
            page,
            detail,
            ActionKind::ClarificationResponse,
            "clarification-response",
        ));
    }
    if next.contains(&ActionKind::Appeal) {
        forms.push_str(&applicant_action_form(page, detail, ActionKind::Appeal, "appeal"));
    }

    let body = format!(
        r#"    <h1>{subject}</h1>
    <dl class="inforequest">
      <dt>{obligee_label}</dt><dd>{obligee}</dd>
      <dt>{submitted_label}</dt><dd>{submitted}</dd>
      <dt>{replies_label}</dt><dd>{unique_email}</dd>
    </dl>
    <p class="status">{status}</p>
    <h2>{history_label}</h2>
    <ol class="actions">
{history}    </ol>
{forms}"#,
        subject = escape(&inforequest.subject),
        obligee_label = page.t(Message::Obligee),
        obligee = escape(&detail.obligee.name),
        submitted_label = page.t(Message::SubmittedOn),
        submitted = format_date(inforequest.submission_date),
        replies_label = page.t(Message::RepliesTo),
        unique_email = escape(&inforequest.unique_email),
        status = status_text(page, status),
        history_label = page.t(Message::History),
    );
    layout(page, &inforequest.subject, &body)
}

/// One page of the obligee index. `number` is 1-based.
pub fn obligee_index(page: &Page<'_>, obligees: &[Obligee], number: u32, page_count: u32) -> String {
    let rows: String = obligees
        .iter()
        .map(|obligee| {
            format!(
                r#"      <tr><td>{name}</td><td>{street}, {zip} {city}</td><td>{emails}</td></tr>
"#,
                name = escape(&obligee.name),
                street = escape(&obligee.street),
                zip = escape(&obligee.zip),
                city = escape(&obligee.city),
                emails = escape(&obligee.emails.join(", ")),
            )
        })
        .collect();
    let previous = if number > 1 {
        format!(
            r#"<a class="previous" href="/obligees?page={}">{}</a> "#,
            number - 1,
            page.t(Message::PreviousPage)
        )
    } else {
        String::new()
    };
    let next = if number < page_count {
        format!(
            r#" <a class="next" href="/obligees?page={}">{}</a>"#,
            number + 1,
            page.t(Message::NextPage)
        )
    } else {
        String::new()
    };
    let body = format!(
        r#"    <h1>{title}</h1>
    <table class="obligees">
{rows}    </table>
    <p class="pagination">{previous}<span>{page_label} {number} / {page_count}</span>{next}</p>
"#,
        title = page.t(Message::Obligees),
        page_label = page.t(Message::PageNumber),
    );
    layout(page, page.t(Message::Obligees), &body)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        auth::oauth::ProviderProfile,
        models::{Applicant, JsonText},
    };

    const GUEST: Page<'static> = Page {
        language: Language::En,
        user: None,
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn user() -> User {
        User {
            email: "jana@example.sk".to_string(),
            password: None,
            first_name: "Jana".to_string(),
            last_name: "Nováková".to_string(),
            street: "Hlavná 1".to_string(),
            city: "Košice".to_string(),
            zip: "04001".to_string(),
            auth_token: None,
            language: Language::En,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn obligee() -> Obligee {
        Obligee {
            id: 7,
            name: "Mesto Žilina".to_string(),
            street: "Námestie obetí komunizmu 1".to_string(),
            city: "Žilina".to_string(),
            zip: "01131".to_string(),
            emails: JsonText(vec!["podatelna@zilina.sk".to_string()]),
            score: 0,
        }
    }

    fn inforequest() -> InfoRequest {
        InfoRequest {
            id: 3,
            applicant_email: "jana@example.sk".to_string(),
            obligee_id: 7,
            subject: "Zmluvy o dielo".to_string(),
            applicant: Applicant::from_user(&user()),
            unique_email: "kamo@mail.chcemvediet.sk".to_string(),
            submission_date: date(2025, 3, 3),
            closed: false,
            created_at: Utc::now(),
        }
    }

    fn request_action() -> Action {
        Action {
            id: 11,
            inforequest_id: 3,
            kind: ActionKind::Request,
            subject: "Zmluvy o dielo".to_string(),
            content: "Žiadam o zmluvy.".to_string(),
            effective_date: date(2025, 3, 3),
            deadline: Some(8),
            extension: None,
            disclosure_level: None,
            created_at: Utc::now(),
        }
    }

    /// Number of AJAX forms and how many of them leave validation to the script.
    fn ajax_forms(html: &str) -> (usize, usize) {
        (
            html.matches(r#"class="ajax-form""#).count(),
            html.matches(r#"class="ajax-form" novalidate"#).count(),
        )
    }

    #[test]
    fn test_ajax_forms_leave_validation_to_script() {
        let user = user();
        let page = Page {
            language: Language::En,
            user: Some(&user),
        };
        let inforequest = inforequest();
        let obligee = obligee();
        let actions = [request_action()];
        let detail = InfoRequestDetail {
            inforequest: &inforequest,
            obligee: &obligee,
            actions: &actions,
            attachments: &[],
            today: date(2025, 4, 1),
        };
        for html in [
            login(&GUEST, &[], None),
            register(&GUEST, &[], None),
            profile(&page, &user),
            inforequest_form(&page, None, None, &[]),
            inforequest_detail(&page, &detail),
        ] {
            let (forms, novalidate) = ajax_forms(&html);
            assert!(forms > 0);
            assert_eq!(forms, novalidate);
        }
    }

    #[test]
    fn test_detail_offers_extension_of_missed_deadline() {
        let user = user();
        let page = Page {
            language: Language::En,
            user: Some(&user),
        };
        let inforequest = inforequest();
        let obligee = obligee();
        let actions = [request_action()];
        let mut detail = InfoRequestDetail {
            inforequest: &inforequest,
            obligee: &obligee,
            actions: &actions,
            attachments: &[],
            today: date(2025, 3, 5),
        };
        let html = inforequest_detail(&page, &detail);
        assert!(html.contains("Waiting for the obligee (Deadline 13. 3. 2025)"));
        assert!(!html.contains("/extend-deadline/"));
        assert!(html.contains(r#"<option value="confirmation">Confirmation</option>"#));
        assert!(!html.contains(r#"action="/inforequests/3/appeal""#));

        detail.today = date(2025, 4, 1);
        let html = inforequest_detail(&page, &detail);
        assert!(html.contains(r#"action="/inforequests/3/extend-deadline/11""#));
        assert!(html.contains("Waiting for the obligee (Deadline 13. 3. 2025, missed)"));
        // a silent obligee can be appealed against
        assert!(html.contains(r#"action="/inforequests/3/appeal""#));
    }

    #[test]
    fn test_detail_lists_action_attachments() {
        let inforequest = inforequest();
        let obligee = obligee();
        let actions = [request_action()];
        let attachments = [Attachment {
            id: 5,
            owner_email: "jana@example.sk".to_string(),
            draft_id: None,
            action_id: Some(11),
            name: "<plné znenie>.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size: 3,
            created_at: Utc::now(),
        }];
        let detail = InfoRequestDetail {
            inforequest: &inforequest,
            obligee: &obligee,
            actions: &actions,
            attachments: &attachments,
            today: date(2025, 3, 5),
        };
        let html = inforequest_detail(&GUEST, &detail);
        assert!(html.contains(
            r#"<a href="/inforequests/attachments/5">&lt;plné znenie&gt;.pdf</a>"#
        ));
        assert!(html.contains("kamo@mail.chcemvediet.sk"));
    }

    #[test]
    fn test_inforequest_form_continues_draft() {
        let draft = InfoRequestDraft {
            id: 4,
            applicant_email: "jana@example.sk".to_string(),
            obligee_id: Some(7),
            subject: "Rozpočet".to_string(),
            content: "Rozpočet mesta na rok 2025".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let obligee = obligee();
        let html = inforequest_form(&GUEST, Some(&draft), Some(&obligee), &[]);
        assert!(html.contains(r#"action="/inforequests/create/4""#));
        assert!(html.contains(r#"name="obligee" id="obligee-id" value="7""#));
        assert!(html.contains(r#"name="subject" value="Rozpočet""#));
        assert!(html.contains(">Rozpočet mesta na rok 2025</textarea>"));
        assert!(html.contains(r#"value="draft" formnovalidate"#));
    }

    #[test]
    fn test_inforequest_index() {
        let summary = InfoRequestSummary {
            inforequest: inforequest(),
            obligee: obligee(),
            status: InfoRequestStatus::Disclosed,
        };
        let html = inforequest_index(&GUEST, &[summary], &[]);
        assert!(html.contains(r#"<a href="/inforequests/detail/3">Zmluvy o dielo</a>"#));
        assert!(html.contains("Information disclosed"));
        assert!(!html.contains("Drafts"));

        let html = inforequest_index(&GUEST, &[], &[]);
        assert!(html.contains("You have not submitted any requests yet"));
    }

    #[test]
    fn test_obligee_index_pagination() {
        let obligees = [obligee()];
        let html = obligee_index(&GUEST, &obligees, 1, 3);
        assert!(html.contains("Page 1 / 3"));
        assert!(html.contains(r#"href="/obligees?page=2""#));
        assert!(!html.contains(r#"class="previous""#));
        assert!(html.contains("podatelna@zilina.sk"));

        let html = obligee_index(&GUEST, &obligees, 3, 3);
        assert!(html.contains(r#"href="/obligees?page=2""#));
        assert!(!html.contains(r#"class="next""#));
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_register_prefills_provider_profile() {
        let info = RegistrationInfo {
            provider: Provider::Facebook,
            auth_token: "facebook:42".to_string(),
            profile: ProviderProfile {
                subject: "42".to_string(),
                email: Some("jan@example.sk".to_string()),
                given_name: Some("Ján".to_string()),
                middle_name: Some("Pavol".to_string()),
                family_name: Some("Horák".to_string()),
                display_name: None,
            },
        };
        let html = register(&GUEST, &[Provider::Facebook], Some(&info));
        assert!(html.contains(r#"name="email" value="jan@example.sk""#));
        assert!(html.contains(r#"name="firstName" value="Ján""#));
        assert!(html.contains(r#"name="lastName" value="Pavol Horák""#));
        assert!(html.contains("You are registering with Facebook"));
        // the provider takes the place of a password
        assert!(!html.contains(r#"name="password""#));
    }

    #[test]
    fn test_register_without_provider_asks_for_password() {
        let html = register(&GUEST, &[Provider::Google], None);
        assert!(html.contains(r#"name="password""#));
        assert!(html.contains(r#"data-missing="Password missing""#));
        assert!(html.contains(r#"href="/register/google""#));
    }

    #[test]
    fn test_layout_follows_language() {
        let html = index(&Page {
            language: Language::Sk,
            user: None,
        });
        assert!(html.contains(r#"<html lang="sk">"#));
        assert!(html.contains("Prihlásiť sa"));
        // only the other language is offered
        assert!(html.contains(r#"data-code="en""#));
        assert!(!html.contains(r#"data-code="sk""#));
    }

    #[test]
    fn test_user_names_are_escaped() {
        let user = User {
            email: "x@example.sk".to_string(),
            password: None,
            first_name: "<script>".to_string(),
            last_name: String::new(),
            street: String::new(),
            city: String::new(),
            zip: String::new(),
            auth_token: None,
            language: Language::En,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let page = Page {
            language: Language::En,
            user: Some(&user),
        };
        let html = profile(&page, &user);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
