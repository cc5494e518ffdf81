use serde::{Deserialize, Serialize};

use crate::models::JsonText;

/// A government body subject to freedom-of-information requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Obligee {
    pub id: i64,
    pub name: String,
    pub street: String,
    pub city: String,
    pub zip: String,
    pub emails: JsonText<Vec<String>>,
    /// Relevance, used only for ordering search results
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObligeeCreate {
    pub name: String,
    pub street: String,
    pub city: String,
    pub zip: String,
    pub emails: Vec<String>,
    #[serde(default)]
    pub score: i64,
}

impl ObligeeCreate {
    /// Text which [`find_obligees()`] matches search terms against.
    ///
    /// [`find_obligees()`]: crate::db::interface::DatabaseClient::find_obligees
    pub fn search_key(&self) -> String {
        crate::search::fold(&format!("{} {} {}", self.name, self.street, self.city))
    }
}
