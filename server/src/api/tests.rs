use std::{env::VarError, path::Path, pin::Pin, sync::Arc};

use axum::{
    Router,
    http::{StatusCode, header},
};
use axum_test::{
    TestResponse, TestServer,
    multipart::{MultipartForm, Part},
};
use chrono::{Days, NaiveDate};
use serde_json::{Value, json};
use url::Url;

use super::{AppState, new_router};
use crate::{
    auth::oauth::{IdentityProvider, Provider, ProviderError, ProviderProfile, Providers},
    config::Config,
    db::{
        clients::sqlite::SqliteClient,
        interface::{DatabaseClient, DatabaseError},
    },
    i18n::Language,
    models::{
        ActionCreate, ActionKind, Applicant, InfoRequestCreate, MAX_ATTACHMENT_BYTES, Obligee,
        ObligeeCreate,
    },
    workdays,
};

const SESSION_SECRET: &str = "0123456789abcdef0123456789abcdef";

/// Identity provider which accepts the code `good` and nothing else.
struct FakeProvider {
    provider: Provider,
    profile: ProviderProfile,
}

impl IdentityProvider for FakeProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn authorize_url(&self, redirect_uri: &Url, state: &str, pkce_challenge: &str) -> Url {
        let mut url = Url::parse("https://accounts.example.com/authorize").unwrap();
        url.query_pairs_mut()
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("state", state)
            .append_pair("code_challenge", pkce_challenge);
        url
    }

    fn fetch_profile<'a>(
        &'a self,
        code: &'a str,
        _redirect_uri: &'a Url,
        _pkce_verifier: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderProfile, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            if code == "good" {
                Ok(self.profile.clone())
            } else {
                Err(ProviderError::MalformedProfile("rejected code"))
            }
        })
    }
}

fn google_profile() -> ProviderProfile {
    ProviderProfile {
        subject: "1093".to_string(),
        email: Some("jan.horak@example.sk".to_string()),
        given_name: Some("Ján".to_string()),
        middle_name: Some("Pavol".to_string()),
        family_name: Some("Horák".to_string()),
        display_name: Some("Ján Pavol Horák".to_string()),
    }
}

async fn build_test_router(providers: Providers) -> (Router, Arc<SqliteClient>) {
    let db = Arc::new(
        SqliteClient::new_memory()
            .await
            .expect("expected client creation to succeed"),
    );
    let config = Config::from_lookup(|var| match var {
        "DATABASE_URL" => Ok("sqlite::memory:".to_string()),
        "SESSION_SECRET" => Ok(SESSION_SECRET.to_string()),
        _ => Err(VarError::NotPresent),
    })
    .unwrap();
    let state = AppState::new(db.clone(), providers, &config);
    (new_router(state, Path::new("public")), db)
}

/// A visitor with their own cookies.
fn visitor(router: Router) -> TestServer {
    TestServer::builder()
        .save_cookies()
        .build(router)
        .expect("expected test server to start")
}

async fn build_test_server(providers: Providers) -> (TestServer, Arc<SqliteClient>) {
    let (router, db) = build_test_router(providers).await;
    (visitor(router), db)
}

async fn build_default_server() -> (TestServer, Arc<SqliteClient>) {
    build_test_server(Providers::new()).await
}

fn registration(email: &str) -> Value {
    json!({
        "email": email,
        "password": "tajne heslo",
        "passwordConfirmation": "tajne heslo",
        "firstName": "Jana",
        "lastName": "Nováková",
        "street": "Hlavná 1",
        "city": "Košice",
        "zip": "04001",
    })
}

fn location(response: &TestResponse) -> String {
    response
        .header(header::LOCATION)
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn should_register_and_log_in() {
    let (server, db) = build_default_server().await;

    let response = server
        .post("/register")
        .form(&registration("jana@example.sk"))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({ "success": true }));

    let user = db.get_user_by_email("jana@example.sk").await.unwrap();
    assert_eq!(user.city, "Košice");
    // only the hash is stored
    assert_ne!(user.password.as_deref(), Some("tajne heslo"));

    // registering logs the user in
    let response = server.get("/profile").await;
    response.assert_status_ok();
    assert!(response.text().contains("jana@example.sk"));

    server.post("/logout").await.assert_status(StatusCode::NO_CONTENT);

    let response = server
        .post("/login")
        .form(&json!({ "email": "jana@example.sk", "password": "tajne heslo" }))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({ "success": true }));
    server.get("/profile").await.assert_status_ok();
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let (server, _db) = build_default_server().await;
    server
        .post("/register")
        .form(&registration("jana@example.sk"))
        .await
        .assert_status_ok();
    server.post("/logout").await;

    let response = server
        .post("/login")
        .form(&json!({ "email": "jana@example.sk", "password": "zle heslo" }))
        .await;
    response.assert_status_unauthorized();
    response.assert_json(&json!({ "error": "Prihlásenie zlyhalo" }));

    let response = server
        .post("/login")
        .form(&json!({ "email": "peter@example.sk", "password": "tajne heslo" }))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn should_reject_incomplete_registration() {
    let (server, db) = build_default_server().await;

    let mut form = registration("jana@example.sk");
    form.as_object_mut().unwrap().remove("city");
    let response = server.post("/register").form(&form).await;
    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Vo formulári chýbajú údaje" }));

    let mut form = registration("jana@example.sk");
    form["password"] = json!("");
    form["passwordConfirmation"] = json!("");
    server
        .post("/register")
        .form(&form)
        .await
        .assert_status_bad_request();

    assert!(matches!(
        db.get_user_by_email("jana@example.sk").await,
        Err(DatabaseError::NotFound)
    ));
}

#[tokio::test]
async fn should_reject_password_mismatch() {
    let (server, db) = build_default_server().await;
    let mut form = registration("jana@example.sk");
    form["passwordConfirmation"] = json!("ine heslo");
    let response = server.post("/register").form(&form).await;
    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Heslá sa nezhodujú" }));
    assert!(db.get_user_by_email("jana@example.sk").await.is_err());
}

#[tokio::test]
async fn should_reject_duplicate_email() {
    let (server, _db) = build_default_server().await;
    server
        .post("/register")
        .form(&registration("jana@example.sk"))
        .await
        .assert_status_ok();
    server.post("/logout").await;

    let response = server
        .post("/register")
        .form(&registration("JANA@example.sk"))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    response.assert_json(&json!({ "error": "Email sa už používa" }));
}

#[tokio::test]
async fn should_persist_language_of_user() {
    let (server, db) = build_default_server().await;
    server
        .post("/register")
        .form(&registration("jana@example.sk"))
        .await
        .assert_status_ok();

    let response = server
        .post("/change-language")
        .add_query_param("code", "en")
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({}));

    let user = db.get_user_by_email("jana@example.sk").await.unwrap();
    assert_eq!(user.language, Language::En);
    assert!(server.get("/").await.text().contains(r#"<html lang="en">"#));

    // the preference survives logging out and back in
    server.post("/logout").await;
    assert!(server.get("/").await.text().contains(r#"<html lang="en">"#));
    server
        .post("/login")
        .form(&json!({ "email": "jana@example.sk", "password": "tajne heslo" }))
        .await
        .assert_status_ok();
    assert!(server.get("/").await.text().contains(r#"<html lang="en">"#));
}

#[tokio::test]
async fn should_keep_language_of_guest() {
    let (server, _db) = build_default_server().await;
    assert!(server.get("/").await.text().contains(r#"<html lang="sk">"#));

    server
        .post("/change-language")
        .add_query_param("code", "en")
        .await
        .assert_status_ok();
    assert!(server.get("/").await.text().contains(r#"<html lang="en">"#));

    // unknown codes change nothing
    server
        .post("/change-language")
        .add_query_param("code", "de")
        .await
        .assert_status_ok();
    assert!(server.get("/").await.text().contains(r#"<html lang="en">"#));

    let response = server
        .post("/login")
        .form(&json!({ "email": "nobody@example.sk", "password": "x" }))
        .await;
    response.assert_json(&json!({ "error": "Login failed" }));
}

#[tokio::test]
async fn should_reject_profile_after_logout() {
    let (server, _db) = build_default_server().await;
    server
        .post("/register")
        .form(&registration("jana@example.sk"))
        .await
        .assert_status_ok();
    server.post("/logout").await.assert_status(StatusCode::NO_CONTENT);
    // logging out twice is fine
    server.post("/logout").await.assert_status(StatusCode::NO_CONTENT);

    let response = server.get("/profile").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = server
        .post("/profile")
        .form(&json!({ "city": "Prešov" }))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn should_update_profile() {
    let (server, db) = build_default_server().await;
    server
        .post("/register")
        .form(&registration("jana@example.sk"))
        .await
        .assert_status_ok();

    let response = server
        .post("/profile")
        .form(&json!({ "street": "Hlavná 2", "city": "Prešov", "zip": "" }))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({ "success": true }));

    let user = db.get_user_by_email("jana@example.sk").await.unwrap();
    assert_eq!(user.city, "Prešov");
    assert_eq!(user.street, "Hlavná 2");
    assert_eq!(user.zip, "04001");
    assert!(server.get("/profile").await.text().contains("Prešov"));
}

#[tokio::test]
async fn should_search_obligees() {
    let (server, db) = build_default_server().await;
    for (name, score) in [
        ("Ministerstvo kultúry Slovenskej republiky", 10),
        ("Ministerstvo financií Slovenskej republiky", 5),
    ] {
        db.create_obligee(&ObligeeCreate {
            name: name.to_string(),
            street: "Námestie SNP 33".to_string(),
            city: "Bratislava".to_string(),
            zip: "81331".to_string(),
            emails: vec!["info@example.gov.sk".to_string()],
            score,
        })
        .await
        .unwrap();
    }

    let response = server
        .get("/search/obligees")
        .add_query_param("term", "kultury")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let obligees = body["obligees"].as_array().unwrap();
    assert_eq!(obligees.len(), 1);
    assert_eq!(
        obligees[0]["name"],
        "Ministerstvo kultúry Slovenskej republiky"
    );
    assert_eq!(obligees[0]["emails"], json!(["info@example.gov.sk"]));

    let response = server
        .get("/search/obligees")
        .add_query_param("term", "ministerstvo")
        .add_query_param("limit", 1)
        .await;
    let body: Value = response.json();
    assert_eq!(body["obligees"].as_array().unwrap().len(), 1);

    let response = server
        .get("/search/obligees")
        .add_query_param("term", "parlament")
        .await;
    response.assert_json(&json!({ "obligees": [] }));
}

/// Starts a provider sign-in and returns the `state` sent to the provider.
async fn start_oauth(server: &TestServer, path: &str) -> String {
    let response = server.get(path).await;
    response.assert_status(StatusCode::SEE_OTHER);
    let url = Url::parse(&location(&response)).unwrap();
    assert_eq!(url.host_str(), Some("accounts.example.com"));
    url.query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("expected state parameter")
}

#[tokio::test]
async fn should_register_through_provider() {
    let providers = Providers::new().with(FakeProvider {
        provider: Provider::Google,
        profile: google_profile(),
    });
    let (server, db) = build_test_server(providers).await;

    let state = start_oauth(&server, "/login/google").await;
    let response = server
        .get("/login/google/return")
        .add_query_param("code", "good")
        .add_query_param("state", &state)
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");

    let page = server.get("/register").await.text();
    assert!(page.contains(r#"name="email" value="jan.horak@example.sk""#));
    assert!(page.contains(r#"name="firstName" value="Ján""#));
    assert!(page.contains(r#"name="lastName" value="Pavol Horák""#));

    // no password needed; a forged auth token is ignored
    let response = server
        .post("/register")
        .form(&json!({
            "email": "jan.horak@example.sk",
            "firstName": "Ján",
            "lastName": "Pavol Horák",
            "street": "Mlynská 10",
            "city": "Žilina",
            "zip": "01001",
            "authToken": "twitter:1",
        }))
        .await;
    response.assert_status_ok();
    let user = db.get_user_by_email("jan.horak@example.sk").await.unwrap();
    assert_eq!(user.auth_token.as_deref(), Some("google:1093"));
    assert_eq!(user.password, None);

    // the same identity now logs straight in
    server.post("/logout").await;
    let state = start_oauth(&server, "/login/google").await;
    let response = server
        .get("/login/google/return")
        .add_query_param("code", "good")
        .add_query_param("state", &state)
        .await;
    assert_eq!(location(&response), "/");
    assert!(server.get("/profile").await.text().contains("jan.horak@example.sk"));

    // accounts without a password cannot log in with one
    server.post("/logout").await;
    server
        .post("/login")
        .form(&json!({ "email": "jan.horak@example.sk", "password": "" }))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn should_reject_provider_callback_with_bad_state() {
    let providers = Providers::new().with(FakeProvider {
        provider: Provider::Google,
        profile: google_profile(),
    });
    let (server, db) = build_test_server(providers).await;

    start_oauth(&server, "/login/google").await;
    let response = server
        .get("/login/google/return")
        .add_query_param("code", "good")
        .add_query_param("state", "forged")
        .await;
    assert_eq!(location(&response), "/login?fail=google");

    let state = start_oauth(&server, "/register/google").await;
    let response = server
        .get("/register/google/return")
        .add_query_param("code", "bad")
        .add_query_param("state", &state)
        .await;
    assert_eq!(location(&response), "/register");
    assert!(!server.get("/register").await.text().contains("jan.horak@example.sk"));

    // consent denied at the provider
    start_oauth(&server, "/login/google").await;
    let response = server
        .get("/login/google/return")
        .add_query_param("error", "access_denied")
        .await;
    assert_eq!(location(&response), "/login?fail=google");
    assert!(
        server
            .get("/login")
            .add_query_param("fail", "google")
            .await
            .text()
            .contains("Prihlásenie zlyhalo cez Google")
    );

    assert!(db.get_user_by_auth_token("google:1093").await.is_err());
}

#[tokio::test]
async fn should_hide_unconfigured_providers() {
    let (server, _db) = build_default_server().await;
    server.get("/login/twitter").await.assert_status_not_found();
    server.get("/register/facebook/return").await.assert_status_not_found();
    server.get("/login/myspace").await.assert_status_not_found();
    assert!(!server.get("/login").await.text().contains("/login/google"));
}

#[tokio::test]
async fn should_serve_pages() {
    let (server, _db) = build_default_server().await;
    server.get("/health").await.assert_status_ok();
    server.get("/why-register").await.assert_status_ok();
    let response = server.get("/login").await;
    response.assert_status_ok();
    assert!(response.text().contains(r#"class="ajax-form""#));
    server.get("/no-such-page").await.assert_status_not_found();
}

#[tokio::test]
async fn should_reject_second_registration_of_provider_account() {
    let providers = Providers::new().with(FakeProvider {
        provider: Provider::Google,
        profile: google_profile(),
    });
    let (router, db) = build_test_router(providers).await;
    let first = visitor(router.clone());
    let second = visitor(router);

    // both browsers sign in with the same Google account before either registers
    for server in [&first, &second] {
        let state = start_oauth(server, "/register/google").await;
        let response = server
            .get("/register/google/return")
            .add_query_param("code", "good")
            .add_query_param("state", &state)
            .await;
        assert_eq!(location(&response), "/register");
    }

    let mut form = registration("jan.horak@example.sk");
    form.as_object_mut().unwrap().remove("password");
    form.as_object_mut().unwrap().remove("passwordConfirmation");
    first.post("/register").form(&form).await.assert_status_ok();

    form["email"] = json!("jan.druhy@example.sk");
    let response = second.post("/register").form(&form).await;
    response.assert_status(StatusCode::CONFLICT);
    response.assert_json(&json!({ "error": "Tento účet je už zaregistrovaný" }));
    assert!(db.get_user_by_email("jan.druhy@example.sk").await.is_err());
}

#[tokio::test]
async fn should_answer_malformed_requests_with_json() {
    let (server, _db) = build_default_server().await;

    let response = server
        .get("/search/obligees")
        .add_query_param("term", "mesto")
        .add_query_param("limit", "abc")
        .await;
    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Neplatná požiadavka" }));

    // a JSON body where a form is expected
    let response = server
        .post("/login")
        .json(&json!({ "email": "jana@example.sk", "password": "x" }))
        .await;
    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Neplatná požiadavka" }));
}

async fn create_obligee(db: &SqliteClient, name: &str) -> Obligee {
    db.create_obligee(&ObligeeCreate {
        name: name.to_string(),
        street: "Námestie obetí komunizmu 1".to_string(),
        city: "Žilina".to_string(),
        zip: "01131".to_string(),
        emails: vec!["podatelna@zilina.sk".to_string()],
        score: 0,
    })
    .await
    .unwrap()
}

async fn register(server: &TestServer, email: &str) {
    server
        .post("/register")
        .form(&registration(email))
        .await
        .assert_status_ok();
}

fn redirect(response: &TestResponse) -> String {
    let body: Value = response.json();
    body["redirect"]
        .as_str()
        .expect("expected redirect")
        .to_string()
}

fn form_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

async fn upload(server: &TestServer, name: &str, content: &[u8]) -> i64 {
    let form = MultipartForm::new().add_part(
        "files",
        Part::bytes(content.to_vec())
            .file_name(name)
            .mime_type("application/pdf"),
    );
    let response = server.post("/inforequests/attachments").multipart(form).await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["files"][0]["id"].as_i64().expect("expected attachment ID")
}

#[tokio::test]
async fn should_submit_inforequest() {
    let (server, db) = build_default_server().await;
    let obligee = create_obligee(&db, "Mesto Žilina").await;

    let response = server.get("/inforequests").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    server
        .post("/inforequests/create")
        .form(&json!({ "button": "submit" }))
        .await
        .assert_status_unauthorized();

    register(&server, "jana@example.sk").await;
    server.get("/inforequests/create").await.assert_status_ok();

    let response = server
        .post("/inforequests/create")
        .form(&json!({
            "button": "submit",
            "obligee": obligee.id.to_string(),
            "subject": "",
            "content": "Žiadam o zmluvy.",
        }))
        .await;
    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Vo formulári chýbajú údaje" }));

    let response = server
        .post("/inforequests/create")
        .form(&json!({
            "button": "submit",
            "obligee": "999",
            "subject": "Zmluvy o dielo",
            "content": "Žiadam o zmluvy.",
        }))
        .await;
    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Neznáma povinná osoba" }));

    let response = server
        .post("/inforequests/create")
        .form(&json!({
            "button": "submit",
            "obligee": obligee.id.to_string(),
            "subject": "Zmluvy o dielo",
            "content": "Žiadam o zmluvy.",
            "attachments": "",
        }))
        .await;
    response.assert_status_ok();
    let detail_url = redirect(&response);

    let inforequests = db.list_inforequests("jana@example.sk").await.unwrap();
    assert_eq!(inforequests.len(), 1);
    let inforequest = &inforequests[0];
    assert_eq!(detail_url, format!("/inforequests/detail/{}", inforequest.id));
    assert_eq!(inforequest.obligee_id, obligee.id);
    assert_eq!(inforequest.applicant.name, "Jana Nováková");
    assert_eq!(inforequest.submission_date, workdays::today());
    let (token, domain) = inforequest.unique_email.split_once('@').unwrap();
    assert_eq!(token.len(), 4);
    assert_eq!(domain, "mail.chcemvediet.sk");

    let actions = db.list_actions(inforequest.id).await.unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].kind, ActionKind::Request);
    assert!(actions[0].content.contains("Žiadam o zmluvy."));
    assert!(actions[0].content.contains(&inforequest.unique_email));

    let page = server.get(&detail_url).await;
    page.assert_status_ok();
    assert!(page.text().contains(&inforequest.unique_email));
    assert!(server.get("/inforequests").await.text().contains(&detail_url));
}

#[tokio::test]
async fn should_save_and_submit_draft() {
    let (server, db) = build_default_server().await;
    let obligee = create_obligee(&db, "Mesto Žilina").await;
    register(&server, "jana@example.sk").await;

    // drafts need nothing filled in
    let response = server
        .post("/inforequests/create")
        .form(&json!({ "button": "draft", "obligee": "", "subject": "Rozpočet" }))
        .await;
    response.assert_status_ok();
    assert_eq!(redirect(&response), "/inforequests");

    let drafts = db.list_drafts("jana@example.sk").await.unwrap();
    assert_eq!(drafts.len(), 1);
    let draft_url = format!("/inforequests/create/{}", drafts[0].id);
    let page = server.get(&draft_url).await.text();
    assert!(page.contains(r#"name="subject" value="Rozpočet""#));

    let attachment = upload(&server, "rozpocet.pdf", b"%PDF-1.4").await;
    server
        .post(&draft_url)
        .form(&json!({
            "button": "draft",
            "obligee": obligee.id.to_string(),
            "subject": "Rozpočet 2025",
            "content": "Rozpočet mesta na rok 2025",
            "attachments": attachment.to_string(),
        }))
        .await
        .assert_status_ok();
    let draft = db.get_draft("jana@example.sk", drafts[0].id).await.unwrap();
    assert_eq!(draft.obligee_id, Some(obligee.id));
    assert_eq!(draft.subject, "Rozpočet 2025");
    let page = server.get(&draft_url).await.text();
    assert!(page.contains("rozpocet.pdf"));
    assert!(page.contains("Mesto Žilina"));

    let response = server
        .post(&draft_url)
        .form(&json!({
            "button": "submit",
            "obligee": obligee.id.to_string(),
            "subject": "Rozpočet 2025",
            "content": "Rozpočet mesta na rok 2025",
            "attachments": attachment.to_string(),
        }))
        .await;
    response.assert_status_ok();
    assert!(db.list_drafts("jana@example.sk").await.unwrap().is_empty());

    // the attachment moved to the request
    let page = server.get(&redirect(&response)).await.text();
    assert!(page.contains(&format!("/inforequests/attachments/{attachment}")));

    server
        .post(&draft_url)
        .form(&json!({ "button": "draft" }))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn should_delete_draft() {
    let (server, db) = build_default_server().await;
    register(&server, "jana@example.sk").await;
    server
        .post("/inforequests/create")
        .form(&json!({ "button": "draft", "subject": "Koncept" }))
        .await
        .assert_status_ok();
    let id = db.list_drafts("jana@example.sk").await.unwrap()[0].id;
    assert!(server.get("/inforequests").await.text().contains("Koncept"));

    let response = server
        .post(&format!("/inforequests/delete-draft/{id}"))
        .await;
    response.assert_status_ok();
    assert!(db.list_drafts("jana@example.sk").await.unwrap().is_empty());
    server
        .post(&format!("/inforequests/delete-draft/{id}"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn should_upload_and_download_attachments() {
    let (server, db) = build_default_server().await;
    register(&server, "jana@example.sk").await;

    let form = MultipartForm::new().add_part(
        "files",
        Part::bytes(b"%PDF-1.4".to_vec())
            .file_name("zmluva.pdf")
            .mime_type("application/pdf"),
    );
    let response = server.post("/inforequests/attachments").multipart(form).await;
    response.assert_status_ok();
    let body: Value = response.json();
    let file = &body["files"][0];
    let id = file["id"].as_i64().unwrap();
    assert_eq!(file["name"], "zmluva.pdf");
    assert_eq!(file["size"], 8);
    assert_eq!(file["url"], format!("/inforequests/attachments/{id}"));

    let response = server.get(&format!("/inforequests/attachments/{id}")).await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"%PDF-1.4");
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "application/octet-stream"
    );
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        r#"attachment; filename="zmluva.pdf""#
    );

    // nobody else can fetch it
    server.post("/logout").await;
    server
        .get(&format!("/inforequests/attachments/{id}"))
        .await
        .assert_status_unauthorized();
    register(&server, "peter@example.sk").await;
    server
        .get(&format!("/inforequests/attachments/{id}"))
        .await
        .assert_status_not_found();
    assert!(db.get_attachment("jana@example.sk", id).await.is_ok());
}

#[tokio::test]
async fn should_limit_request_sizes() {
    let (server, _db) = build_default_server().await;
    register(&server, "jana@example.sk").await;

    // ordinary forms are small
    let response = server
        .post("/inforequests/create")
        .form(&json!({ "button": "draft", "content": "x".repeat(20 * 1024) }))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    // uploads may be larger, up to their own limit
    upload(&server, "priloha.pdf", &vec![b'x'; 20 * 1024]).await;

    let form = MultipartForm::new().add_part(
        "files",
        Part::bytes(vec![0u8; MAX_ATTACHMENT_BYTES + 64 * 1024]).file_name("velky.bin"),
    );
    let response = server.post("/inforequests/attachments").multipart(form).await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn should_hide_inforequests_of_others() {
    let (server, db) = build_default_server().await;
    let obligee = create_obligee(&db, "Mesto Žilina").await;
    register(&server, "jana@example.sk").await;
    let response = server
        .post("/inforequests/create")
        .form(&json!({
            "button": "submit",
            "obligee": obligee.id.to_string(),
            "subject": "Zmluvy o dielo",
            "content": "Žiadam o zmluvy.",
        }))
        .await;
    let detail_url = redirect(&response);
    let id = db.list_inforequests("jana@example.sk").await.unwrap()[0].id;

    server.post("/logout").await;
    register(&server, "peter@example.sk").await;
    server.get(&detail_url).await.assert_status_not_found();
    assert!(!server.get("/inforequests").await.text().contains("Zmluvy o dielo"));
    server
        .post(&format!("/inforequests/{id}/obligee-action"))
        .form(&json!({
            "kind": "confirmation",
            "effectiveDate": form_date(workdays::today()),
        }))
        .await
        .assert_status_not_found();
    assert_eq!(db.list_actions(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn should_track_actions_and_deadlines() {
    let (server, db) = build_default_server().await;
    let obligee = create_obligee(&db, "Mesto Žilina").await;
    register(&server, "jana@example.sk").await;

    // submitted long ago; the obligee never answered
    let submitted = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    let inforequest = db
        .create_inforequest(&InfoRequestCreate {
            applicant_email: "jana@example.sk".to_string(),
            obligee_id: obligee.id,
            subject: "Zmluvy o dielo".to_string(),
            applicant: Applicant {
                name: "Jana Nováková".to_string(),
                street: "Hlavná 1".to_string(),
                city: "Košice".to_string(),
                zip: "04001".to_string(),
            },
            unique_email: "kamo@mail.chcemvediet.sk".to_string(),
            submission_date: submitted,
            request: ActionCreate::new(ActionKind::Request, submitted),
            draft_id: None,
        })
        .await
        .unwrap();
    let id = inforequest.id;
    let request = db.list_actions(id).await.unwrap().remove(0);
    let extend_url = format!("/inforequests/{id}/extend-deadline/{}", request.id);
    assert!(server.get(&format!("/inforequests/detail/{id}")).await.text().contains(&extend_url));

    let response = server
        .post(&extend_url)
        .form(&json!({ "extension": "1" }))
        .await;
    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Lehotu možno predĺžiť o 2 až 100 pracovných dní" }));

    server.post(&extend_url).form(&json!({})).await.assert_status_ok();
    let request = db.list_actions(id).await.unwrap().remove(0);
    assert_eq!(request.deadline_remaining(workdays::today()), Some(5));
    // the deadline is not missed any more
    server
        .post(&extend_url)
        .form(&json!({}))
        .await
        .assert_status(StatusCode::CONFLICT);
    server
        .post(&format!("/inforequests/{id}/extend-deadline/999"))
        .form(&json!({}))
        .await
        .assert_status_not_found();

    let obligee_action = format!("/inforequests/{id}/obligee-action");
    let response = server
        .post(&obligee_action)
        .form(&json!({ "kind": "appeal", "effectiveDate": form_date(workdays::today()) }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    response.assert_json(&json!({ "error": "Tento úkon teraz nie je možný" }));

    let tomorrow = workdays::today() + Days::new(1);
    for date in [NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), tomorrow] {
        let response = server
            .post(&obligee_action)
            .form(&json!({ "kind": "confirmation", "effectiveDate": form_date(date) }))
            .await;
        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Neplatný dátum" }));
    }

    let response = server
        .post(&obligee_action)
        .form(&json!({
            "kind": "refusal",
            "effectiveDate": "2025-03-10",
            "disclosureLevel": "none",
            "subject": "Rozhodnutie",
            "content": "Informácie nesprístupňujeme.",
        }))
        .await;
    response.assert_status_ok();
    assert!(redirect(&response).starts_with(&format!("/inforequests/detail/{id}#action-")));

    server
        .post(&format!("/inforequests/{id}/clarification-response"))
        .form(&json!({ "content": "Upresňujem." }))
        .await
        .assert_status(StatusCode::CONFLICT);
    server
        .post(&format!("/inforequests/{id}/appeal"))
        .form(&json!({ "content": "Odvolávam sa." }))
        .await
        .assert_status_ok();

    let kinds: Vec<_> = db
        .list_actions(id)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![ActionKind::Request, ActionKind::Refusal, ActionKind::Appeal]
    );
    let page = server.get(&format!("/inforequests/detail/{id}")).await.text();
    assert!(page.contains("Odvolávam sa."));
}

#[tokio::test]
async fn should_page_through_obligees() {
    let (server, db) = build_default_server().await;
    for i in 0..30 {
        create_obligee(&db, &format!("Obec {i:02}")).await;
    }

    let page = server.get("/obligees").await.text();
    assert!(page.contains("Obec 00"));
    assert!(page.contains("Obec 24"));
    assert!(!page.contains("Obec 25"));
    assert!(page.contains("Strana 1 / 2"));

    let page = server.get("/obligees").add_query_param("page", 2).await.text();
    assert!(page.contains("Obec 29"));
    assert!(!page.contains("Obec 00"));

    // out of range pages are clamped
    let page = server.get("/obligees").add_query_param("page", 9).await.text();
    assert!(page.contains("Strana 2 / 2"));
    let page = server.get("/obligees").add_query_param("page", "abc").await.text();
    assert!(page.contains("Strana 1 / 2"));
}
