use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

/// Wrapper which stores the encapsulated value as JSON text.
///
/// Session payloads and obligee email lists are kept in `TEXT` columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonText<T>(pub T);

impl<T> JsonText<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for JsonText<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Deref for JsonText<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for JsonText<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Transparent: a `JsonText<T>` looks exactly like a `T` to other serializers.
impl<'de, T> Deserialize<'de> for JsonText<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Self)
    }
}

impl<T> Serialize for JsonText<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// Delegate decoding to [`sqlx::types::Json`].
#[cfg(feature = "sqlx")]
impl<'r, T, DB> sqlx::Decode<'r, DB> for JsonText<T>
where
    sqlx::types::Json<T>: sqlx::Decode<'r, DB>,
    DB: sqlx::Database,
{
    fn decode(value: DB::ValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let sqlx_json = <sqlx::types::Json<T> as sqlx::Decode<'r, DB>>::decode(value)?;
        Ok(Self(sqlx_json.0))
    }
}

/// Delegate type to [`sqlx::types::Json`].
#[cfg(feature = "sqlx")]
impl<T, DB: sqlx::Database> sqlx::Type<DB> for JsonText<T>
where
    sqlx::types::Json<T>: sqlx::Type<DB>,
{
    fn type_info() -> DB::TypeInfo {
        <sqlx::types::Json<T> as sqlx::Type<DB>>::type_info()
    }

    fn compatible(ty: &DB::TypeInfo) -> bool {
        <sqlx::types::Json<T> as sqlx::Type<DB>>::compatible(ty)
    }
}

/// Delegate encoding to [`sqlx::types::Json`].
#[cfg(feature = "sqlx")]
impl<'q, T, DB> sqlx::Encode<'q, DB> for JsonText<T>
where
    DB: sqlx::Database,
    for<'a> sqlx::types::Json<&'a T>: sqlx::Encode<'q, DB>,
{
    fn encode_by_ref(
        &self,
        buf: &mut DB::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let sqlx_json = sqlx::types::Json(&self.0);
        <sqlx::types::Json<&T> as sqlx::Encode<'q, DB>>::encode_by_ref(&sqlx_json, buf)
    }
}

#[cfg(all(test, feature = "sqlite3"))]
mod tests {
    use sqlx::{Row, SqlitePool};

    use super::*;

    #[tokio::test]
    async fn test_stored_as_json_text() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let emails = vec!["podatelna@example.gov.sk".to_string()];

        let row = sqlx::query("SELECT $1 AS value, typeof($1) AS kind")
            .bind(JsonText(&emails))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("kind"), "text");
        assert_eq!(
            row.get::<String, _>("value"),
            r#"["podatelna@example.gov.sk"]"#
        );

        let decoded: JsonText<Vec<String>> = row.get("value");
        assert_eq!(decoded.into_inner(), emails);
    }
}
