//! Information requests, their drafts and the actions recorded on them.
//!
//! An information request is a sequence of [`Action`]s. The first is always the applicant's
//! [`ActionKind::Request`]; every later action must be allowed to follow the one before it
//! (see [`ActionKind::can_follow()`]). Deadlines run in working days from an action's
//! effective date.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    models::{Obligee, User},
    workdays,
};

/// Shortest and longest token in a request's unique email address.
pub const UNIQUE_EMAIL_TOKEN_LEN: std::ops::RangeInclusive<usize> = 4..=10;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    // sent by the applicant
    Request,
    ClarificationResponse,
    Appeal,
    // received from the obligee
    Confirmation,
    Extension,
    Advancement,
    ClarificationRequest,
    Disclosure,
    Refusal,
    Affirmation,
    Reversion,
    Remandment,
    // added when a deadline runs out
    Expiration,
    AppealExpiration,
}

/// How much of the requested information a [`ActionKind::Disclosure`] contained.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DisclosureLevel {
    None,
    Partial,
    Full,
}

impl DisclosureLevel {
    pub const ALL: [DisclosureLevel; 3] = [
        DisclosureLevel::None,
        DisclosureLevel::Partial,
        DisclosureLevel::Full,
    ];

    /// Name used in forms and in the database.
    pub fn code(self) -> &'static str {
        match self {
            DisclosureLevel::None => "none",
            DisclosureLevel::Partial => "partial",
            DisclosureLevel::Full => "full",
        }
    }
}

impl ActionKind {
    pub const ALL: [ActionKind; 14] = [
        ActionKind::Request,
        ActionKind::ClarificationResponse,
        ActionKind::Appeal,
        ActionKind::Confirmation,
        ActionKind::Extension,
        ActionKind::Advancement,
        ActionKind::ClarificationRequest,
        ActionKind::Disclosure,
        ActionKind::Refusal,
        ActionKind::Affirmation,
        ActionKind::Reversion,
        ActionKind::Remandment,
        ActionKind::Expiration,
        ActionKind::AppealExpiration,
    ];

    /// Name used in forms and in the database.
    pub fn code(self) -> &'static str {
        match self {
            ActionKind::Request => "request",
            ActionKind::ClarificationResponse => "clarification_response",
            ActionKind::Appeal => "appeal",
            ActionKind::Confirmation => "confirmation",
            ActionKind::Extension => "extension",
            ActionKind::Advancement => "advancement",
            ActionKind::ClarificationRequest => "clarification_request",
            ActionKind::Disclosure => "disclosure",
            ActionKind::Refusal => "refusal",
            ActionKind::Affirmation => "affirmation",
            ActionKind::Reversion => "reversion",
            ActionKind::Remandment => "remandment",
            ActionKind::Expiration => "expiration",
            ActionKind::AppealExpiration => "appeal_expiration",
        }
    }

    pub fn is_applicant_action(self) -> bool {
        matches!(
            self,
            ActionKind::Request | ActionKind::ClarificationResponse | ActionKind::Appeal
        )
    }

    pub fn is_obligee_action(self) -> bool {
        !self.is_applicant_action() && !self.is_automatic()
    }

    pub fn is_automatic(self) -> bool {
        matches!(self, ActionKind::Expiration | ActionKind::AppealExpiration)
    }

    /// The obligee has to respond before the deadline of this action runs out.
    pub fn has_obligee_deadline(self) -> bool {
        matches!(
            self,
            ActionKind::Request
                | ActionKind::ClarificationResponse
                | ActionKind::Appeal
                | ActionKind::Confirmation
                | ActionKind::Extension
                | ActionKind::Remandment
        )
    }

    /// The applicant may react before the deadline of this action runs out.
    pub fn has_applicant_deadline(self) -> bool {
        matches!(
            self,
            ActionKind::Advancement
                | ActionKind::ClarificationRequest
                | ActionKind::Disclosure
                | ActionKind::Refusal
                | ActionKind::Expiration
        )
    }

    /// Statutory deadline in working days.
    pub fn default_deadline(self, disclosure_level: Option<DisclosureLevel>) -> Option<i64> {
        match self {
            ActionKind::Request | ActionKind::ClarificationResponse | ActionKind::Confirmation => {
                Some(8)
            }
            ActionKind::Appeal => Some(30),
            ActionKind::Extension => Some(10),
            ActionKind::Advancement | ActionKind::Expiration => Some(60),
            ActionKind::ClarificationRequest => Some(7),
            ActionKind::Disclosure if disclosure_level == Some(DisclosureLevel::Full) => None,
            ActionKind::Disclosure | ActionKind::Refusal => Some(15),
            ActionKind::Remandment => Some(13),
            ActionKind::Affirmation | ActionKind::Reversion | ActionKind::AppealExpiration => None,
        }
    }

    /// Whether an action of this kind may be added after `last`.
    pub fn can_follow(self, last: &Action, today: NaiveDate) -> bool {
        use ActionKind::{
            Advancement, Affirmation, Appeal, AppealExpiration, ClarificationRequest,
            ClarificationResponse, Confirmation, Disclosure, Expiration, Extension, Refusal,
            Remandment, Request, Reversion,
        };
        let awaits_decision = matches!(
            last.kind,
            Request | ClarificationResponse | Confirmation | Extension | Remandment
        );
        match self {
            Request => false,
            ClarificationResponse => last.kind == ClarificationRequest,
            Appeal => {
                (last.kind == Disclosure && last.disclosure_level != Some(DisclosureLevel::Full))
                    || (awaits_decision && last.deadline_missed(today))
                    || matches!(last.kind, Refusal | Advancement | Expiration)
            }
            Confirmation => last.kind == Request,
            Extension => matches!(
                last.kind,
                Request | Confirmation | ClarificationResponse | Remandment
            ),
            Advancement => matches!(last.kind, Request | ClarificationResponse | Confirmation),
            ClarificationRequest => matches!(
                last.kind,
                Request | ClarificationResponse | Confirmation | ClarificationRequest
            ),
            Disclosure | Refusal => awaits_decision,
            Affirmation | Reversion | Remandment => last.kind == Appeal,
            Expiration => awaits_decision && last.deadline_missed(today),
            AppealExpiration => last.kind == Appeal && last.deadline_missed(today),
        }
    }
}

/// Frozen copy of the applicant's name and address, as printed on the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Applicant {
    #[cfg_attr(feature = "sqlx", sqlx(rename = "applicant_name"))]
    pub name: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "applicant_street"))]
    pub street: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "applicant_city"))]
    pub city: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "applicant_zip"))]
    pub zip: String,
}

impl Applicant {
    pub fn from_user(user: &User) -> Self {
        Self {
            name: format!("{} {}", user.first_name, user.last_name)
                .trim()
                .to_string(),
            street: user.street.clone(),
            city: user.city.clone(),
            zip: user.zip.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct InfoRequest {
    pub id: i64,
    pub applicant_email: String,
    pub obligee_id: i64,
    pub subject: String,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub applicant: Applicant,
    /// Address the obligee replies to, `{token}@{domain}`
    pub unique_email: String,
    pub submission_date: NaiveDate,
    pub closed: bool,
    pub created_at: DateTime<Utc>,
}

/// A submitted request together with its first action.
#[derive(Debug, Clone)]
pub struct InfoRequestCreate {
    pub applicant_email: String,
    pub obligee_id: i64,
    pub subject: String,
    pub applicant: Applicant,
    pub unique_email: String,
    pub submission_date: NaiveDate,
    /// The [`ActionKind::Request`] carrying the letter and its attachments
    pub request: ActionCreate,
    /// Draft the request was composed in, deleted on submission
    pub draft_id: Option<i64>,
}

/// An unsubmitted request. Every part of it is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct InfoRequestDraft {
    pub id: i64,
    pub applicant_email: String,
    pub obligee_id: Option<i64>,
    pub subject: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contents written to a draft on create and on every save.
#[derive(Debug, Clone, Default)]
pub struct DraftContent {
    pub obligee_id: Option<i64>,
    pub subject: String,
    pub content: String,
    /// Replaces the attachments of the draft
    pub attachment_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: i64,
    pub inforequest_id: i64,
    pub kind: ActionKind,
    pub subject: String,
    pub content: String,
    pub effective_date: NaiveDate,
    /// Working days from the effective date
    pub deadline: Option<i64>,
    /// Working days added to the deadline by the applicant
    pub extension: Option<i64>,
    pub disclosure_level: Option<DisclosureLevel>,
    pub created_at: DateTime<Utc>,
}

impl Action {
    /// Last day of the deadline, extension included.
    pub fn deadline_date(&self) -> Option<NaiveDate> {
        self.deadline.map(|deadline| {
            workdays::add(
                self.effective_date,
                deadline + self.extension.unwrap_or(0),
            )
        })
    }

    /// Working days elapsed since the effective date.
    pub fn days_passed(&self, today: NaiveDate) -> i64 {
        workdays::between(self.effective_date, today)
    }

    /// Working days left until the deadline; negative once it has been missed.
    pub fn deadline_remaining(&self, today: NaiveDate) -> Option<i64> {
        self.deadline
            .map(|deadline| deadline + self.extension.unwrap_or(0) - self.days_passed(today))
    }

    pub fn deadline_missed(&self, today: NaiveDate) -> bool {
        self.deadline_remaining(today).is_some_and(|remaining| remaining < 0)
    }

    pub fn has_obligee_deadline(&self) -> bool {
        self.kind.has_obligee_deadline() && self.deadline.is_some()
    }

    pub fn has_applicant_deadline(&self) -> bool {
        self.kind.has_applicant_deadline() && self.deadline.is_some()
    }

    /// Extension which moves the deadline to `days` working days after `today`.
    pub fn extension_until(&self, today: NaiveDate, days: i64) -> Option<i64> {
        self.deadline
            .map(|deadline| self.days_passed(today) - deadline + days)
    }
}

#[derive(Debug, Clone)]
pub struct ActionCreate {
    pub kind: ActionKind,
    pub subject: String,
    pub content: String,
    pub effective_date: NaiveDate,
    pub deadline: Option<i64>,
    pub disclosure_level: Option<DisclosureLevel>,
    pub attachment_ids: Vec<i64>,
}

impl ActionCreate {
    /// An action with the statutory deadline of its kind.
    pub fn new(kind: ActionKind, effective_date: NaiveDate) -> Self {
        Self {
            kind,
            subject: String::new(),
            content: String::new(),
            effective_date,
            deadline: kind.default_deadline(None),
            disclosure_level: None,
            attachment_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_text(mut self, subject: String, content: String) -> Self {
        self.subject = subject;
        self.content = content;
        self
    }

    #[must_use]
    pub fn with_disclosure_level(mut self, level: DisclosureLevel) -> Self {
        self.disclosure_level = Some(level);
        self.deadline = self.kind.default_deadline(Some(level));
        self
    }

    #[must_use]
    pub fn with_attachments(mut self, attachment_ids: Vec<i64>) -> Self {
        self.attachment_ids = attachment_ids;
        self
    }
}

/// Where a request stands, derived from its last action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoRequestStatus {
    AwaitingObligee {
        deadline: Option<NaiveDate>,
        missed: bool,
    },
    AwaitingApplicant {
        deadline: Option<NaiveDate>,
        missed: bool,
    },
    Disclosed,
    Refused,
    Closed,
}

impl InfoRequestStatus {
    /// A final outcome is reported even after the request has been closed.
    pub fn of(actions: &[Action], closed: bool, today: NaiveDate) -> Self {
        let Some(last) = actions.last() else {
            return Self::Closed;
        };
        match last.kind {
            ActionKind::Disclosure if last.disclosure_level == Some(DisclosureLevel::Full) => {
                return Self::Disclosed;
            }
            ActionKind::Reversion => return Self::Disclosed,
            ActionKind::Affirmation | ActionKind::AppealExpiration => return Self::Refused,
            _ => (),
        }
        if closed {
            Self::Closed
        } else if last.kind.has_obligee_deadline() {
            Self::AwaitingObligee {
                deadline: last.deadline_date(),
                missed: last.deadline_missed(today),
            }
        } else {
            Self::AwaitingApplicant {
                deadline: last.deadline_date(),
                missed: last.deadline_missed(today),
            }
        }
    }
}

/// Kinds of actions the applicant may record next.
pub fn next_actions(actions: &[Action], closed: bool, today: NaiveDate) -> Vec<ActionKind> {
    let Some(last) = actions.last().filter(|_| !closed) else {
        return Vec::new();
    };
    ActionKind::ALL
        .into_iter()
        .filter(|kind| !kind.is_automatic() && kind.can_follow(last, today))
        .collect()
}

const CONSONANTS: &[u8] = b"bcdfghjklmnprstvz";
const VOWELS: &[u8] = b"aeiouy";

/// Random lower-case token of alternating consonants and vowels.
pub fn readable_token(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|i| {
            let letters = if i % 2 == 0 { CONSONANTS } else { VOWELS };
            char::from(letters[rng.random_range(0..letters.len())])
        })
        .collect()
}

/// Text of the letter sent to the obligee. Letters are always written in Slovak.
pub fn request_letter(
    obligee: &Obligee,
    applicant: &Applicant,
    content: &str,
    unique_email: &str,
    date: NaiveDate,
) -> String {
    format!(
        "{obligee_name}\n{obligee_street}\n{obligee_zip} {obligee_city}\n\n\
         {city}, {date}\n\n\
         Žiadosť o sprístupnenie informácie\n\n\
         Podľa zákona č. 211/2000 Z. z. o slobodnom prístupe k informáciám žiadam \
         o sprístupnenie nasledujúcej informácie:\n\n\
         {content}\n\n\
         Informáciu žiadam sprístupniť elektronicky na adresu {unique_email}.\n\n\
         S pozdravom\n{name}\n{street}\n{zip} {city}\n",
        obligee_name = obligee.name,
        obligee_street = obligee.street,
        obligee_zip = obligee.zip,
        obligee_city = obligee.city,
        city = applicant.city,
        date = date.format("%-d. %-m. %Y"),
        content = content.trim(),
        name = applicant.name,
        street = applicant.street,
        zip = applicant.zip,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JsonText;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn action(kind: ActionKind, effective_date: NaiveDate) -> Action {
        Action {
            id: 1,
            inforequest_id: 1,
            kind,
            subject: String::new(),
            content: String::new(),
            effective_date,
            deadline: kind.default_deadline(None),
            extension: None,
            disclosure_level: None,
            created_at: Utc::now(),
        }
    }

    fn disclosure(level: DisclosureLevel, effective_date: NaiveDate) -> Action {
        Action {
            disclosure_level: Some(level),
            deadline: ActionKind::Disclosure.default_deadline(Some(level)),
            ..action(ActionKind::Disclosure, effective_date)
        }
    }

    // Monday 3 March 2025; its 8 working day deadline ends on Thursday 13 March
    const SENT: (i32, u32, u32) = (2025, 3, 3);

    fn sent() -> NaiveDate {
        date(SENT.0, SENT.1, SENT.2)
    }

    #[test]
    fn test_codes_match_serialized_names() {
        for kind in ActionKind::ALL {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.code());
        }
        for level in DisclosureLevel::ALL {
            assert_eq!(serde_json::to_value(level).unwrap(), level.code());
        }
    }

    #[test]
    fn test_deadline() {
        let request = action(ActionKind::Request, sent());
        assert_eq!(request.deadline_date(), Some(date(2025, 3, 13)));
        assert_eq!(request.deadline_remaining(sent()), Some(8));
        assert_eq!(request.deadline_remaining(date(2025, 3, 13)), Some(0));
        assert!(!request.deadline_missed(date(2025, 3, 13)));
        assert!(request.deadline_missed(date(2025, 3, 14)));
        assert_eq!(action(ActionKind::Affirmation, sent()).deadline_date(), None);
    }

    #[test]
    fn test_extension_until() {
        let mut request = action(ActionKind::Request, sent());
        let today = date(2025, 3, 17);
        assert_eq!(request.deadline_remaining(today), Some(-2));

        request.extension = request.extension_until(today, 5);
        assert_eq!(request.extension, Some(7));
        assert_eq!(request.deadline_remaining(today), Some(5));
        assert_eq!(request.deadline_date(), Some(date(2025, 3, 24)));
    }

    #[test]
    fn test_default_deadlines() {
        assert_eq!(ActionKind::Appeal.default_deadline(None), Some(30));
        assert_eq!(
            ActionKind::Disclosure.default_deadline(Some(DisclosureLevel::Partial)),
            Some(15)
        );
        assert_eq!(
            ActionKind::Disclosure.default_deadline(Some(DisclosureLevel::Full)),
            None
        );
        assert_eq!(ActionKind::Reversion.default_deadline(None), None);
    }

    #[test]
    fn test_obligee_responses_follow_request() {
        let request = action(ActionKind::Request, sent());
        let today = date(2025, 3, 5);
        let allowed = next_actions(&[request], false, today);
        assert_eq!(
            allowed,
            vec![
                ActionKind::Confirmation,
                ActionKind::Extension,
                ActionKind::Advancement,
                ActionKind::ClarificationRequest,
                ActionKind::Disclosure,
                ActionKind::Refusal,
            ]
        );
    }

    #[test]
    fn test_appeal_after_missed_deadline() {
        let request = action(ActionKind::Request, sent());
        assert!(!ActionKind::Appeal.can_follow(&request, date(2025, 3, 13)));
        assert!(ActionKind::Appeal.can_follow(&request, date(2025, 3, 14)));
        assert!(ActionKind::Expiration.can_follow(&request, date(2025, 3, 14)));
    }

    #[test]
    fn test_appeal_after_disclosure() {
        let today = date(2025, 3, 5);
        let partial = disclosure(DisclosureLevel::Partial, sent());
        assert!(ActionKind::Appeal.can_follow(&partial, today));
        let full = disclosure(DisclosureLevel::Full, sent());
        assert!(!ActionKind::Appeal.can_follow(&full, today));
        assert!(next_actions(&[full], false, today).is_empty());

        let refusal = action(ActionKind::Refusal, sent());
        assert_eq!(
            next_actions(&[refusal], false, today),
            vec![ActionKind::Appeal]
        );
    }

    #[test]
    fn test_clarification_round() {
        let today = date(2025, 3, 5);
        let clarification = action(ActionKind::ClarificationRequest, sent());
        assert!(ActionKind::ClarificationResponse.can_follow(&clarification, today));
        assert!(ActionKind::ClarificationRequest.can_follow(&clarification, today));
        assert!(!ActionKind::Disclosure.can_follow(&clarification, today));

        let response = action(ActionKind::ClarificationResponse, today);
        assert!(ActionKind::Disclosure.can_follow(&response, today));
        assert!(!ActionKind::ClarificationResponse.can_follow(&response, today));
    }

    #[test]
    fn test_appeal_decisions() {
        let today = date(2025, 3, 5);
        let appeal = action(ActionKind::Appeal, sent());
        let allowed = next_actions(&[appeal], false, today);
        assert_eq!(
            allowed,
            vec![
                ActionKind::Affirmation,
                ActionKind::Reversion,
                ActionKind::Remandment
            ]
        );
        assert!(!ActionKind::AppealExpiration.can_follow(&action(ActionKind::Appeal, sent()), today));
    }

    #[test]
    fn test_closed_request_allows_nothing() {
        let request = action(ActionKind::Request, sent());
        assert!(next_actions(&[request], true, date(2025, 3, 5)).is_empty());
        assert!(next_actions(&[], false, date(2025, 3, 5)).is_empty());
    }

    #[test]
    fn test_status() {
        let today = date(2025, 3, 5);
        let request = action(ActionKind::Request, sent());
        assert_eq!(
            InfoRequestStatus::of(std::slice::from_ref(&request), false, today),
            InfoRequestStatus::AwaitingObligee {
                deadline: Some(date(2025, 3, 13)),
                missed: false
            }
        );
        assert_eq!(
            InfoRequestStatus::of(
                std::slice::from_ref(&request),
                false,
                date(2025, 3, 20)
            ),
            InfoRequestStatus::AwaitingObligee {
                deadline: Some(date(2025, 3, 13)),
                missed: true
            }
        );

        let refusal = action(ActionKind::Refusal, today);
        assert!(matches!(
            InfoRequestStatus::of(&[request.clone(), refusal.clone()], false, today),
            InfoRequestStatus::AwaitingApplicant { missed: false, .. }
        ));
        assert_eq!(
            InfoRequestStatus::of(&[request.clone(), refusal], true, today),
            InfoRequestStatus::Closed
        );

        // final outcomes outlive closing
        let full = disclosure(DisclosureLevel::Full, today);
        assert_eq!(
            InfoRequestStatus::of(&[request.clone(), full], true, today),
            InfoRequestStatus::Disclosed
        );
        let affirmation = action(ActionKind::Affirmation, today);
        assert_eq!(
            InfoRequestStatus::of(&[request, affirmation], false, today),
            InfoRequestStatus::Refused
        );
    }

    #[test]
    fn test_readable_token() {
        let token = readable_token(6);
        assert_eq!(token.len(), 6);
        for (i, c) in token.bytes().enumerate() {
            let letters = if i % 2 == 0 { CONSONANTS } else { VOWELS };
            assert!(letters.contains(&c), "unexpected {c} at {i}");
        }
    }

    #[test]
    fn test_request_letter() {
        let obligee = Obligee {
            id: 7,
            name: "Mesto Žilina".to_string(),
            street: "Námestie obetí komunizmu 1".to_string(),
            city: "Žilina".to_string(),
            zip: "01131".to_string(),
            emails: JsonText(vec!["podatelna@zilina.sk".to_string()]),
            score: 0,
        };
        let applicant = Applicant {
            name: "Jana Nováková".to_string(),
            street: "Hlavná 1".to_string(),
            city: "Košice".to_string(),
            zip: "04001".to_string(),
        };
        let letter = request_letter(
            &obligee,
            &applicant,
            "  Zmluvy o nájme za rok 2024. ",
            "kamo@mail.chcemvediet.sk",
            sent(),
        );
        assert!(letter.starts_with("Mesto Žilina\nNámestie obetí komunizmu 1\n01131 Žilina\n"));
        assert!(letter.contains("Košice, 3. 3. 2025"));
        assert!(letter.contains("\n\nZmluvy o nájme za rok 2024.\n\n"));
        assert!(letter.contains("na adresu kamo@mail.chcemvediet.sk."));
        assert!(letter.ends_with("Jana Nováková\nHlavná 1\n04001 Košice\n"));
    }
}
