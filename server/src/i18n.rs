//! # Localization
//!
//! The portal is served in Slovak (the default) and English. Every user-facing string is a
//! [`Message`] which is translated with [`Message::text()`].

use serde::{Deserialize, Serialize};

use crate::models::{ActionKind, DisclosureLevel, User};

/// Display language of the portal.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Sk,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Sk, Language::En];

    pub fn code(self) -> &'static str {
        match self {
            Language::Sk => "sk",
            Language::En => "en",
        }
    }

    /// Name of the language in the language itself.
    pub fn name(self) -> &'static str {
        match self {
            Language::Sk => "Slovensky",
            Language::En => "English",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Language::Sk => "/public/img/flag-sk.png",
            Language::En => "/public/img/flag-us.png",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }
}

/// Resolves the active language of a request.
///
/// The authenticated user's stored preference wins over the guest preference kept in the
/// session, which in turn wins over the default ([`Language::Sk`]).
pub fn resolve_language(user: Option<&User>, guest: Option<Language>) -> Language {
    user.map(|u| u.language).or(guest).unwrap_or_default()
}

/// Translatable user-facing strings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Message {
    // errors
    LoginFailed,
    LoginError,
    EmailAlreadyInUse,
    AccountAlreadyRegistered,
    RegistrationError,
    MissingFormData,
    PasswordMismatch,
    ObligeeSearchFailed,
    NotLoggedIn,
    GenericError,
    ProviderLoginFailed,
    InvalidRequest,
    PayloadTooLarge,
    UnknownObligee,
    InvalidAttachment,
    ActionNotAllowed,
    InvalidDate,
    InvalidExtension,

    // inline validation
    EmailMissing,
    PasswordMissing,
    FirstNameMissing,
    LastNameMissing,
    StreetMissing,
    CityMissing,
    ZipMissing,
    SubjectMissing,
    ContentMissing,

    // pages
    SiteTitle,
    Tagline,
    SearchObligees,
    SearchPlaceholder,
    NoObligeesFound,
    LogIn,
    LogOut,
    Register,
    WhyRegister,
    WhyRegisterText,
    LogInWith,
    RegisterWith,
    RegisteringWith,
    LoggedInAs,
    Profile,
    SaveProfile,
    ProfileSaved,
    Email,
    Password,
    PasswordConfirmation,
    FirstName,
    LastName,
    Street,
    City,
    Zip,
    PageNotFound,

    // information requests
    MyRequests,
    NewRequest,
    Drafts,
    NoRequests,
    UntitledDraft,
    DeleteDraft,
    Obligee,
    Subject,
    Content,
    Attachments,
    SubmitRequest,
    SaveDraft,
    SubmittedOn,
    RepliesTo,
    History,
    Deadline,
    DeadlineMissed,
    ExtendDeadline,
    ExtendBy,
    RecordObligeeAction,
    ActionKindLabel,
    DisclosureLevelLabel,
    EffectiveDate,
    Record,
    StatusAwaitingObligee,
    StatusAwaitingApplicant,
    StatusDisclosed,
    StatusRefused,
    StatusClosed,
    Action(ActionKind),
    Disclosure(DisclosureLevel),

    // obligee index
    Obligees,
    PreviousPage,
    NextPage,
    PageNumber,
}

impl Message {
    #[allow(clippy::too_many_lines)]
    pub fn text(self, language: Language) -> &'static str {
        use Language::{En, Sk};
        #[allow(clippy::enum_glob_use)]
        use Message::*;
        match (self, language) {
            (LoginFailed, En) => "Login failed",
            (LoginFailed, Sk) => "Prihlásenie zlyhalo",
            (LoginError, En) => "Login error",
            (LoginError, Sk) => "Chyba pri prihlasovaní",
            (EmailAlreadyInUse, En) => "Email already in use",
            (EmailAlreadyInUse, Sk) => "Email sa už používa",
            (AccountAlreadyRegistered, En) => "This account is already registered",
            (AccountAlreadyRegistered, Sk) => "Tento účet je už zaregistrovaný",
            (RegistrationError, En) => "Registration error",
            (RegistrationError, Sk) => "Chyba pri registrácii",
            (MissingFormData, En) => "Missing data from the form",
            (MissingFormData, Sk) => "Vo formulári chýbajú údaje",
            (PasswordMismatch, En) => "Password mismatch",
            (PasswordMismatch, Sk) => "Heslá sa nezhodujú",
            (ObligeeSearchFailed, En) => "Obligees search failed",
            (ObligeeSearchFailed, Sk) => "Vyhľadávanie povinných osôb zlyhalo",
            (NotLoggedIn, En) => "You are not logged in",
            (NotLoggedIn, Sk) => "Nie ste prihlásený",
            (GenericError, En) => "Something went wrong, please try again later",
            (GenericError, Sk) => "Nastala chyba, skúste to neskôr",
            (ProviderLoginFailed, En) => "Login failed with",
            (ProviderLoginFailed, Sk) => "Prihlásenie zlyhalo cez",
            (InvalidRequest, En) => "Invalid request",
            (InvalidRequest, Sk) => "Neplatná požiadavka",
            (PayloadTooLarge, En) => "The upload is too large",
            (PayloadTooLarge, Sk) => "Súbor je príliš veľký",
            (UnknownObligee, En) => "Unknown obligee",
            (UnknownObligee, Sk) => "Neznáma povinná osoba",
            (InvalidAttachment, En) => "Invalid attachment",
            (InvalidAttachment, Sk) => "Neplatná príloha",
            (ActionNotAllowed, En) => "This action is not possible at this point",
            (ActionNotAllowed, Sk) => "Tento úkon teraz nie je možný",
            (InvalidDate, En) => "Invalid date",
            (InvalidDate, Sk) => "Neplatný dátum",
            (InvalidExtension, En) => "The deadline can be extended by 2 to 100 working days",
            (InvalidExtension, Sk) => "Lehotu možno predĺžiť o 2 až 100 pracovných dní",

            (EmailMissing, En) => "Email missing",
            (EmailMissing, Sk) => "Chýba email",
            (PasswordMissing, En) => "Password missing",
            (PasswordMissing, Sk) => "Chýba heslo",
            (FirstNameMissing, En) => "First name missing",
            (FirstNameMissing, Sk) => "Chýba meno",
            (LastNameMissing, En) => "Last name missing",
            (LastNameMissing, Sk) => "Chýba priezvisko",
            (StreetMissing, En) => "Street missing",
            (StreetMissing, Sk) => "Chýba ulica",
            (CityMissing, En) => "City missing",
            (CityMissing, Sk) => "Chýba mesto",
            (ZipMissing, En) => "Zip missing",
            (ZipMissing, Sk) => "Chýba PSČ",
            (SubjectMissing, En) => "Subject missing",
            (SubjectMissing, Sk) => "Chýba predmet",
            (ContentMissing, En) => "Content missing",
            (ContentMissing, Sk) => "Chýba obsah",

            (SiteTitle, _) => "Chcem vedieť",
            (Tagline, En) => "Freedom of information requests made easy",
            (Tagline, Sk) => "Infozákon pre lenivých",
            (SearchObligees, En) => "Find an obligee",
            (SearchObligees, Sk) => "Nájdite povinnú osobu",
            (SearchPlaceholder, En) => "Name, street or city",
            (SearchPlaceholder, Sk) => "Názov, ulica alebo mesto",
            (NoObligeesFound, En) => "No obligees found",
            (NoObligeesFound, Sk) => "Nenašli sa žiadne povinné osoby",
            (LogIn, En) => "Log in",
            (LogIn, Sk) => "Prihlásiť sa",
            (LogOut, En) => "Log out",
            (LogOut, Sk) => "Odhlásiť sa",
            (Register, En) => "Register",
            (Register, Sk) => "Registrovať sa",
            (WhyRegister, En) => "Why register?",
            (WhyRegister, Sk) => "Prečo sa registrovať?",
            (WhyRegisterText, En) => {
                "A request for information must state the name and address of the applicant. \
                 Your account lets us fill these in for you, send requests on your behalf and \
                 keep track of every deadline the obligee has to meet."
            }
            (WhyRegisterText, Sk) => {
                "Žiadosť o informácie musí obsahovať meno a adresu žiadateľa. Vďaka účtu ich \
                 vyplníme za vás, odošleme žiadosť vo vašom mene a postrážime každú lehotu, \
                 ktorú musí povinná osoba dodržať."
            }
            (LogInWith, En) => "Log in with",
            (LogInWith, Sk) => "Prihlásiť sa cez",
            (RegisterWith, En) => "Register with",
            (RegisterWith, Sk) => "Registrovať sa cez",
            (RegisteringWith, En) => "You are registering with",
            (RegisteringWith, Sk) => "Registrujete sa cez",
            (LoggedInAs, En) => "Logged in as",
            (LoggedInAs, Sk) => "Prihlásený ako",
            (Profile, En) => "Profile",
            (Profile, Sk) => "Profil",
            (SaveProfile, En) => "Save",
            (SaveProfile, Sk) => "Uložiť",
            (ProfileSaved, En) => "Profile saved",
            (ProfileSaved, Sk) => "Profil bol uložený",
            (Email, _) => "Email",
            (Password, En) => "Password",
            (Password, Sk) => "Heslo",
            (PasswordConfirmation, En) => "Password again",
            (PasswordConfirmation, Sk) => "Heslo znova",
            (FirstName, En) => "First name",
            (FirstName, Sk) => "Meno",
            (LastName, En) => "Last name",
            (LastName, Sk) => "Priezvisko",
            (Street, En) => "Street",
            (Street, Sk) => "Ulica",
            (City, En) => "City",
            (City, Sk) => "Mesto",
            (Zip, En) => "Zip",
            (Zip, Sk) => "PSČ",
            (PageNotFound, En) => "Page not found",
            (PageNotFound, Sk) => "Stránka sa nenašla",

            (MyRequests, En) => "My requests",
            (MyRequests, Sk) => "Moje žiadosti",
            (NewRequest, En) => "New request",
            (NewRequest, Sk) => "Nová žiadosť",
            (Drafts, En) => "Drafts",
            (Drafts, Sk) => "Koncepty",
            (NoRequests, En) => "You have not submitted any requests yet",
            (NoRequests, Sk) => "Zatiaľ ste nepodali žiadnu žiadosť",
            (UntitledDraft, En) => "Untitled draft",
            (UntitledDraft, Sk) => "Koncept bez názvu",
            (DeleteDraft, En) => "Delete",
            (DeleteDraft, Sk) => "Zmazať",
            (Obligee, En) => "Obligee",
            (Obligee, Sk) => "Povinná osoba",
            (Subject, En) => "Subject",
            (Subject, Sk) => "Predmet",
            (Content, En) => "Requested information",
            (Content, Sk) => "Požadované informácie",
            (Attachments, En) => "Attachments",
            (Attachments, Sk) => "Prílohy",
            (SubmitRequest, En) => "Submit request",
            (SubmitRequest, Sk) => "Podať žiadosť",
            (SaveDraft, En) => "Save draft",
            (SaveDraft, Sk) => "Uložiť koncept",
            (SubmittedOn, En) => "Submitted on",
            (SubmittedOn, Sk) => "Podaná",
            (RepliesTo, En) => "Replies go to",
            (RepliesTo, Sk) => "Odpovede prichádzajú na",
            (History, En) => "History",
            (History, Sk) => "Priebeh",
            (Deadline, En) => "Deadline",
            (Deadline, Sk) => "Lehota do",
            (DeadlineMissed, En) => "missed",
            (DeadlineMissed, Sk) => "zmeškaná",
            (ExtendDeadline, En) => "Extend deadline",
            (ExtendDeadline, Sk) => "Predĺžiť lehotu",
            (ExtendBy, En) => "Working days from today",
            (ExtendBy, Sk) => "Pracovných dní od dnes",
            (RecordObligeeAction, En) => "Record a response of the obligee",
            (RecordObligeeAction, Sk) => "Zaznamenať odpoveď povinnej osoby",
            (ActionKindLabel, En) => "Response",
            (ActionKindLabel, Sk) => "Odpoveď",
            (DisclosureLevelLabel, En) => "Information disclosed",
            (DisclosureLevelLabel, Sk) => "Sprístupnené informácie",
            (EffectiveDate, En) => "Date",
            (EffectiveDate, Sk) => "Dátum",
            (Record, En) => "Record",
            (Record, Sk) => "Zaznamenať",
            (StatusAwaitingObligee, En) => "Waiting for the obligee",
            (StatusAwaitingObligee, Sk) => "Čaká sa na povinnú osobu",
            (StatusAwaitingApplicant, En) => "Waiting for you",
            (StatusAwaitingApplicant, Sk) => "Čaká sa na vás",
            (StatusDisclosed, En) => "Information disclosed",
            (StatusDisclosed, Sk) => "Informácie sprístupnené",
            (StatusRefused, En) => "Refused",
            (StatusRefused, Sk) => "Zamietnutá",
            (StatusClosed, En) => "Closed",
            (StatusClosed, Sk) => "Uzavretá",
            (Action(kind), language) => action_text(kind, language),
            (Disclosure(level), language) => disclosure_text(level, language),

            (Obligees, En) => "Obligees",
            (Obligees, Sk) => "Povinné osoby",
            (PreviousPage, En) => "Previous",
            (PreviousPage, Sk) => "Predchádzajúca",
            (NextPage, En) => "Next",
            (NextPage, Sk) => "Ďalšia",
            (PageNumber, En) => "Page",
            (PageNumber, Sk) => "Strana",
        }
    }
}

fn action_text(kind: ActionKind, language: Language) -> &'static str {
    use Language::{En, Sk};
    match (kind, language) {
        (ActionKind::Request, En) => "Request",
        (ActionKind::Request, Sk) => "Žiadosť",
        (ActionKind::ClarificationResponse, En) => "Clarification response",
        (ActionKind::ClarificationResponse, Sk) => "Doplnenie žiadosti",
        (ActionKind::Appeal, En) => "Appeal",
        (ActionKind::Appeal, Sk) => "Odvolanie",
        (ActionKind::Confirmation, En) => "Confirmation",
        (ActionKind::Confirmation, Sk) => "Potvrdenie prijatia",
        (ActionKind::Extension, En) => "Extension",
        (ActionKind::Extension, Sk) => "Predĺženie lehoty",
        (ActionKind::Advancement, En) => "Advancement",
        (ActionKind::Advancement, Sk) => "Postúpenie",
        (ActionKind::ClarificationRequest, En) => "Clarification request",
        (ActionKind::ClarificationRequest, Sk) => "Výzva na doplnenie",
        (ActionKind::Disclosure, En) => "Disclosure",
        (ActionKind::Disclosure, Sk) => "Sprístupnenie",
        (ActionKind::Refusal, En) => "Refusal",
        (ActionKind::Refusal, Sk) => "Rozhodnutie o nesprístupnení",
        (ActionKind::Affirmation, En) => "Affirmation",
        (ActionKind::Affirmation, Sk) => "Potvrdenie rozhodnutia",
        (ActionKind::Reversion, En) => "Reversion",
        (ActionKind::Reversion, Sk) => "Zmena rozhodnutia",
        (ActionKind::Remandment, En) => "Remandment",
        (ActionKind::Remandment, Sk) => "Vrátenie na nové konanie",
        (ActionKind::Expiration, En) => "Expiration",
        (ActionKind::Expiration, Sk) => "Uplynutie lehoty",
        (ActionKind::AppealExpiration, En) => "Appeal expiration",
        (ActionKind::AppealExpiration, Sk) => "Uplynutie lehoty na odvolanie",
    }
}

fn disclosure_text(level: DisclosureLevel, language: Language) -> &'static str {
    use Language::{En, Sk};
    match (level, language) {
        (DisclosureLevel::None, En) => "Nothing",
        (DisclosureLevel::None, Sk) => "Nič",
        (DisclosureLevel::Partial, En) => "Partially",
        (DisclosureLevel::Partial, Sk) => "Čiastočne",
        (DisclosureLevel::Full, En) => "Fully",
        (DisclosureLevel::Full, Sk) => "Úplne",
    }
}
