use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{
    auth::oauth::{AuthPurpose, Provider, ProviderProfile},
    i18n::Language,
    models::{JsonText, User},
};

/// How long a session lives after it was last written.
pub const SESSION_DURATION: chrono::Duration = chrono::Duration::days(14);

/// Server-side session row. Only the hash of the session ID is stored.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Session {
    pub id_hash: EncodableHash,
    pub data: JsonText<SessionData>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: &SessionId, data: SessionData) -> Self {
        let now = Utc::now();
        Self {
            id_hash: id.hash(),
            data: JsonText(data),
            created_at: now,
            expires_at: now + SESSION_DURATION,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Everything the portal remembers about a visitor between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    /// Identity of the logged-in user, a copy of the database row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// Language chosen by a guest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,

    /// Provider profile waiting to be linked to a new account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_info: Option<RegistrationInfo>,

    /// OAuth redirect in progress
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_authorization: Option<PendingAuthorization>,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInfo {
    pub provider: Provider,
    /// Provider-qualified subject identifier, becomes [`User::auth_token`]
    pub auth_token: String,
    pub profile: ProviderProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAuthorization {
    pub provider: Provider,
    pub purpose: AuthPurpose,
    /// CSRF nonce echoed back by the provider
    pub state: String,
    pub pkce_verifier: String,
}

/// Random 256-bit session identifier, as carried in the session cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionId([u8; 32]);

impl SessionId {
    pub fn generate() -> Self {
        let mut id = [0u8; 32];
        rand::rng().fill_bytes(&mut id);
        Self(id)
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    pub fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
        bytes.try_into().ok().map(Self)
    }

    pub fn hash(&self) -> EncodableHash {
        blake3::hash(&self.0).into()
    }
}

impl std::fmt::Debug for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionId(..)")
    }
}

mod encodable_hash {
    use std::ops::Deref;

    use serde::{Deserialize, Serialize};

    // no PartialEq/Eq derive, comparisons go through blake3::Hash (constant time)
    #[derive(Debug, Copy, Clone, Serialize, Deserialize)]
    #[repr(transparent)]
    pub struct EncodableHash(pub blake3::Hash);

    #[cfg(feature = "sqlx")]
    impl<DB: sqlx::Database> sqlx::Type<DB> for EncodableHash
    where
        Vec<u8>: sqlx::Type<DB>,
    {
        fn type_info() -> DB::TypeInfo {
            <Vec<u8> as sqlx::Type<DB>>::type_info()
        }
    }

    #[cfg(feature = "sqlx")]
    impl<'r, DB: sqlx::Database> sqlx::Decode<'r, DB> for EncodableHash
    where
        &'r [u8]: sqlx::Decode<'r, DB>,
    {
        fn decode(value: DB::ValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
            let bytes = <&[u8] as sqlx::Decode<'r, DB>>::decode(value)?;
            Ok(Self(blake3::Hash::from_slice(bytes)?))
        }
    }

    #[cfg(feature = "sqlx")]
    impl<'q, DB: sqlx::Database> sqlx::Encode<'q, DB> for EncodableHash
    where
        Vec<u8>: sqlx::Encode<'q, DB>,
    {
        fn encode_by_ref(
            &self,
            buf: &mut DB::ArgumentBuffer<'q>,
        ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
            <Vec<u8> as sqlx::Encode<'q, DB>>::encode(self.0.as_bytes().to_vec(), buf)
        }
    }

    impl Deref for EncodableHash {
        type Target = blake3::Hash;
        fn deref(&self) -> &Self::Target {
            &self.0
        }
    }

    impl From<blake3::Hash> for EncodableHash {
        fn from(hash: blake3::Hash) -> Self {
            Self(hash)
        }
    }
}
pub use encodable_hash::EncodableHash;
