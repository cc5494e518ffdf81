//! # Process configuration
//!
//! All configuration comes from environment variables and is read once at startup.

use std::{env::VarError, fmt, net::SocketAddr, path::PathBuf};

use url::Url;

use crate::auth::oauth::Provider;

pub mod vars {
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const SESSION_SECRET: &str = "SESSION_SECRET";
    pub const APP_URL: &str = "APP_URL";
    pub const PORT: &str = "PORT";
    pub const STATIC_DIR: &str = "STATIC_DIR";
    pub const INFOREQUEST_EMAIL_DOMAIN: &str = "INFOREQUEST_EMAIL_DOMAIN";
    pub const GOOGLE_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
    pub const GOOGLE_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
    pub const TWITTER_KEY: &str = "TWITTER_KEY";
    pub const TWITTER_SECRET: &str = "TWITTER_SECRET";
    pub const FACEBOOK_APP_ID: &str = "FACEBOOK_APP_ID";
    pub const FACEBOOK_APP_SECRET: &str = "FACEBOOK_APP_SECRET";
}

pub mod defaults {
    pub const APP_URL: &str = "http://localhost:8080";
    pub const PORT: u16 = 8080;
    pub const STATIC_DIR: &str = "./public";
    pub const INFOREQUEST_EMAIL_DOMAIN: &str = "mail.chcemvediet.sk";
}

/// Shortest accepted session secret, in bytes.
const MIN_SESSION_SECRET_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable not set: {0}")]
    MissingEnv(&'static str),

    #[error("environment variable {0} is not valid UTF-8")]
    EnvNotUtf8(&'static str),

    #[error("environment variable {var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{provider} login is half-configured: {missing} is not set")]
    IncompleteProvider {
        provider: Provider,
        missing: &'static str,
    },
}

/// A string which is never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(pub String);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub provider: Provider,
    pub client_id: String,
    pub client_secret: Secret,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: Secret,
    /// Public base URL of the portal
    pub app_url: Url,
    pub listen_addr: SocketAddr,
    pub static_dir: PathBuf,
    /// Domain of the per-request addresses obligees reply to
    pub inforequest_email_domain: String,
    pub providers: Vec<ProviderCredentials>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var))
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Result<String, VarError>,
    {
        let optional = |var: &'static str| match lookup(var) {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::EnvNotUtf8(var)),
        };
        let required = |var: &'static str| optional(var)?.ok_or(ConfigError::MissingEnv(var));

        let database_url = required(vars::DATABASE_URL)?;

        let session_secret = required(vars::SESSION_SECRET)?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: vars::SESSION_SECRET,
                reason: format!("must be at least {MIN_SESSION_SECRET_LEN} bytes long"),
            });
        }

        let app_url = optional(vars::APP_URL)?.unwrap_or_else(|| defaults::APP_URL.to_string());
        let app_url = Url::parse(&app_url).map_err(|e| ConfigError::Invalid {
            var: vars::APP_URL,
            reason: e.to_string(),
        })?;

        let port = match optional(vars::PORT)? {
            Some(port) => port.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: vars::PORT,
                reason: e.to_string(),
            })?,
            None => defaults::PORT,
        };

        let static_dir = optional(vars::STATIC_DIR)?
            .map_or_else(|| PathBuf::from(defaults::STATIC_DIR), PathBuf::from);

        let inforequest_email_domain = optional(vars::INFOREQUEST_EMAIL_DOMAIN)?
            .unwrap_or_else(|| defaults::INFOREQUEST_EMAIL_DOMAIN.to_string());
        if inforequest_email_domain.contains(['@', ' ']) {
            return Err(ConfigError::Invalid {
                var: vars::INFOREQUEST_EMAIL_DOMAIN,
                reason: "must be a bare domain name".to_string(),
            });
        }

        let mut providers = Vec::new();
        for (provider, id_var, secret_var) in [
            (
                Provider::Google,
                vars::GOOGLE_CLIENT_ID,
                vars::GOOGLE_CLIENT_SECRET,
            ),
            (Provider::Twitter, vars::TWITTER_KEY, vars::TWITTER_SECRET),
            (
                Provider::Facebook,
                vars::FACEBOOK_APP_ID,
                vars::FACEBOOK_APP_SECRET,
            ),
        ] {
            match (optional(id_var)?, optional(secret_var)?) {
                (Some(client_id), Some(client_secret)) => providers.push(ProviderCredentials {
                    provider,
                    client_id,
                    client_secret: Secret(client_secret),
                }),
                (None, None) => (),
                (Some(_), None) => {
                    return Err(ConfigError::IncompleteProvider {
                        provider,
                        missing: secret_var,
                    });
                }
                (None, Some(_)) => {
                    return Err(ConfigError::IncompleteProvider {
                        provider,
                        missing: id_var,
                    });
                }
            }
        }

        Ok(Self {
            database_url,
            session_secret: Secret(session_secret),
            app_url,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            static_dir,
            inforequest_email_domain,
            providers,
        })
    }

    /// Cookies are only marked `Secure` when the portal is served over HTTPS.
    pub fn secure_cookies(&self) -> bool {
        self.app_url.scheme() == "https"
    }
}
