//! # Third-party identity providers
//!
//! Google, Twitter and Facebook are all spoken to with the OAuth 2.0 authorization code
//! flow with PKCE. The portal only needs a stable subject identifier and whatever name and
//! email the provider is willing to share, which end up in a [`ProviderProfile`].

use std::{collections::HashMap, fmt, pin::Pin, str::FromStr, sync::Arc, time::Duration};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// Timeout for requests to the provider's token and profile endpoints.
const PROVIDER_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Twitter,
    Facebook,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Google, Provider::Twitter, Provider::Facebook];

    /// Path segment used in the provider's routes
    pub fn slug(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Twitter => "twitter",
            Provider::Facebook => "facebook",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Provider::Google => "Google",
            Provider::Twitter => "Twitter",
            Provider::Facebook => "Facebook",
        }
    }

    /// Value stored in [`User::auth_token`] for an identity of this provider.
    ///
    /// [`User::auth_token`]: crate::models::User::auth_token
    pub fn auth_token(self, subject: &str) -> String {
        format!("{}:{subject}", self.slug())
    }

    fn endpoints(self) -> &'static Endpoints {
        match self {
            Provider::Google => &GOOGLE,
            Provider::Twitter => &TWITTER,
            Provider::Facebook => &FACEBOOK,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown identity provider")]
pub struct UnknownProvider;

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.slug() == s)
            .ok_or(UnknownProvider)
    }
}

/// Why the visitor was sent to the provider.
///
/// Both purposes end in the same callback logic; they differ in their routes and in where
/// a failed attempt is redirected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthPurpose {
    Login,
    Register,
}

impl AuthPurpose {
    pub fn return_path(self, provider: Provider) -> String {
        match self {
            AuthPurpose::Login => format!("/login/{}/return", provider.slug()),
            AuthPurpose::Register => format!("/register/{}/return", provider.slug()),
        }
    }

    pub fn failure_redirect(self, provider: Provider) -> String {
        match self {
            AuthPurpose::Login => format!("/login?fail={}", provider.slug()),
            AuthPurpose::Register => "/register".to_string(),
        }
    }
}

/// Identity information returned by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    /// Provider's stable identifier of the account
    pub subject: String,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub middle_name: Option<String>,
    pub family_name: Option<String>,
    pub display_name: Option<String>,
}

impl ProviderProfile {
    /// Last name to pre-fill in the registration form. A middle name is prepended to the
    /// family name.
    pub fn last_name(&self) -> Option<String> {
        match (&self.middle_name, &self.family_name) {
            (Some(middle), Some(family)) => Some(format!("{middle} {family}")),
            (Some(middle), None) => Some(middle.clone()),
            (None, family) => family.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request to identity provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider returned an unusable profile: {0}")]
    MalformedProfile(&'static str),
}

/// A source of verified third-party identities.
pub trait IdentityProvider: Send + Sync + 'static {
    fn provider(&self) -> Provider;

    /// URL to which the visitor is redirected to grant consent.
    fn authorize_url(&self, redirect_uri: &Url, state: &str, pkce_challenge: &str) -> Url;

    /// Exchanges an authorization code for the visitor's profile.
    fn fetch_profile<'a>(
        &'a self,
        code: &'a str,
        redirect_uri: &'a Url,
        pkce_verifier: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderProfile, ProviderError>> + Send + 'a>>;
}

/// Configured identity providers, keyed by [`Provider`].
#[derive(Clone, Default)]
pub struct Providers {
    inner: HashMap<Provider, Arc<dyn IdentityProvider>>,
}

impl Providers {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, provider: impl IdentityProvider) -> Self {
        self.inner.insert(provider.provider(), Arc::new(provider));
        self
    }

    pub fn get(&self, provider: Provider) -> Option<&Arc<dyn IdentityProvider>> {
        self.inner.get(&provider)
    }

    /// Enabled providers, in display order.
    pub fn enabled(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.inner.contains_key(p))
            .collect()
    }
}

impl fmt::Debug for Providers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.enabled()).finish()
    }
}

/// PKCE verifier and its S256 challenge.
#[derive(Debug, Clone)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    pub fn generate() -> Self {
        let verifier = random_token();
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }
}

/// 256 bits of randomness, URL-safe. Used for `state` nonces and PKCE verifiers.
pub fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Debug, Clone, Copy)]
enum ClientAuth {
    /// HTTP basic authentication on the token endpoint
    Basic,
    /// `client_id` and `client_secret` in the token request body
    Body,
}

#[derive(Debug)]
struct Endpoints {
    authorize: &'static str,
    token: &'static str,
    userinfo: &'static str,
    scope: &'static str,
    client_auth: ClientAuth,
}

static GOOGLE: Endpoints = Endpoints {
    authorize: "https://accounts.google.com/o/oauth2/v2/auth",
    token: "https://oauth2.googleapis.com/token",
    userinfo: "https://openidconnect.googleapis.com/v1/userinfo",
    scope: "openid email profile",
    client_auth: ClientAuth::Body,
};

static TWITTER: Endpoints = Endpoints {
    authorize: "https://twitter.com/i/oauth2/authorize",
    token: "https://api.twitter.com/2/oauth2/token",
    userinfo: "https://api.twitter.com/2/users/me",
    scope: "users.read tweet.read",
    client_auth: ClientAuth::Basic,
};

static FACEBOOK: Endpoints = Endpoints {
    authorize: "https://www.facebook.com/v19.0/dialog/oauth",
    token: "https://graph.facebook.com/v19.0/oauth/access_token",
    userinfo: "https://graph.facebook.com/me?fields=id,email,first_name,middle_name,last_name,name",
    scope: "email public_profile",
    client_auth: ClientAuth::Body,
};

/// OAuth 2.0 client for one of the supported providers.
#[derive(Debug, Clone)]
pub struct OAuth2Provider {
    provider: Provider,
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl OAuth2Provider {
    pub fn new(
        provider: Provider,
        client_id: String,
        client_secret: String,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(PROVIDER_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            provider,
            client_id,
            client_secret,
            http,
        })
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &Url,
        pkce_verifier: &str,
    ) -> Result<String, ProviderError> {
        let endpoints = self.provider.endpoints();
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
            ("code_verifier", pkce_verifier),
            ("client_id", self.client_id.as_str()),
        ];
        let mut request = self.http.post(endpoints.token);
        match endpoints.client_auth {
            ClientAuth::Basic => {
                request = request.basic_auth(&self.client_id, Some(&self.client_secret));
            }
            ClientAuth::Body => params.push(("client_secret", self.client_secret.as_str())),
        }
        let token: TokenResponse = request
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(token.access_token)
    }
}

impl IdentityProvider for OAuth2Provider {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn authorize_url(&self, redirect_uri: &Url, state: &str, pkce_challenge: &str) -> Url {
        let endpoints = self.provider.endpoints();
        let mut url = Url::parse(endpoints.authorize).expect("expected endpoint to be valid");
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("scope", endpoints.scope)
            .append_pair("state", state)
            .append_pair("code_challenge", pkce_challenge)
            .append_pair("code_challenge_method", "S256");
        url
    }

    fn fetch_profile<'a>(
        &'a self,
        code: &'a str,
        redirect_uri: &'a Url,
        pkce_verifier: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderProfile, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let access_token = self.exchange_code(code, redirect_uri, pkce_verifier).await?;
            let body: serde_json::Value = self
                .http
                .get(self.provider.endpoints().userinfo)
                .bearer_auth(access_token)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            parse_profile(self.provider, &body)
        })
    }
}

/// Maps a provider's profile document to a [`ProviderProfile`].
fn parse_profile(
    provider: Provider,
    body: &serde_json::Value,
) -> Result<ProviderProfile, ProviderError> {
    let text = |v: &serde_json::Value, key: &str| {
        v.get(key)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    match provider {
        Provider::Google => Ok(ProviderProfile {
            subject: text(body, "sub").ok_or(ProviderError::MalformedProfile("missing sub"))?,
            email: text(body, "email"),
            given_name: text(body, "given_name"),
            middle_name: None,
            family_name: text(body, "family_name"),
            display_name: text(body, "name"),
        }),
        Provider::Facebook => Ok(ProviderProfile {
            subject: text(body, "id").ok_or(ProviderError::MalformedProfile("missing id"))?,
            email: text(body, "email"),
            given_name: text(body, "first_name"),
            middle_name: text(body, "middle_name"),
            family_name: text(body, "last_name"),
            display_name: text(body, "name"),
        }),
        Provider::Twitter => {
            let data = body
                .get("data")
                .ok_or(ProviderError::MalformedProfile("missing data"))?;
            let display_name = text(data, "name");
            // Twitter only has a single display name
            let (given_name, family_name) = match display_name.as_deref().map(str::trim) {
                Some(name) => match name.split_once(char::is_whitespace) {
                    Some((given, family)) => {
                        (Some(given.to_string()), Some(family.trim().to_string()))
                    }
                    None => (Some(name.to_string()), None),
                },
                None => (None, None),
            };
            Ok(ProviderProfile {
                subject: text(data, "id").ok_or(ProviderError::MalformedProfile("missing id"))?,
                email: None,
                given_name,
                middle_name: None,
                family_name,
                display_name,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_google_profile() {
        let profile = parse_profile(
            Provider::Google,
            &json!({
                "sub": "10769150350006150715113082367",
                "email": "jana@gmail.com",
                "given_name": "Jana",
                "family_name": "Nováková",
                "name": "Jana Nováková",
            }),
        )
        .unwrap();
        assert_eq!(profile.subject, "10769150350006150715113082367");
        assert_eq!(profile.email.as_deref(), Some("jana@gmail.com"));
        assert_eq!(profile.given_name.as_deref(), Some("Jana"));
        assert_eq!(profile.last_name().as_deref(), Some("Nováková"));
    }

    #[test]
    fn test_parse_facebook_profile_with_middle_name() {
        let profile = parse_profile(
            Provider::Facebook,
            &json!({
                "id": "42",
                "first_name": "Ján",
                "middle_name": "Mária",
                "last_name": "Kováč",
            }),
        )
        .unwrap();
        assert_eq!(profile.email, None);
        assert_eq!(profile.last_name().as_deref(), Some("Mária Kováč"));
    }

    #[test]
    fn test_parse_twitter_profile() {
        let profile = parse_profile(
            Provider::Twitter,
            &json!({ "data": { "id": "2244994945", "name": "Peter Novák", "username": "pnovak" } }),
        )
        .unwrap();
        assert_eq!(profile.subject, "2244994945");
        assert_eq!(profile.given_name.as_deref(), Some("Peter"));
        assert_eq!(profile.family_name.as_deref(), Some("Novák"));
    }

    #[test]
    fn test_parse_profile_without_subject() {
        assert!(matches!(
            parse_profile(Provider::Google, &json!({ "email": "x@example.com" })),
            Err(ProviderError::MalformedProfile(_))
        ));
    }

    #[test]
    fn test_authorize_url() {
        let google =
            OAuth2Provider::new(Provider::Google, "client".into(), "secret".into()).unwrap();
        let redirect = Url::parse("https://chcemvediet.sk/login/google/return").unwrap();
        let url = google.authorize_url(&redirect, "nonce", "challenge");
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(pairs["state"], "nonce");
        assert_eq!(pairs["redirect_uri"], redirect.as_str());
        assert_eq!(pairs["code_challenge_method"], "S256");
        assert!(!pairs.contains_key("client_secret"));
    }

    #[test]
    fn test_pkce_challenge() {
        let pkce = Pkce::generate();
        assert_eq!(pkce.verifier.len(), 43);
        assert_eq!(
            pkce.challenge,
            URL_SAFE_NO_PAD.encode(Sha256::digest(pkce.verifier.as_bytes()))
        );
    }

    #[test]
    fn test_provider_slugs() {
        for provider in Provider::ALL {
            assert_eq!(provider.slug().parse::<Provider>(), Ok(provider));
        }
        assert_eq!("myspace".parse::<Provider>(), Err(UnknownProvider));
        assert_eq!(Provider::Google.auth_token("123"), "google:123");
    }
}
