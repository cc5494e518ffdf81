use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::Html,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{AppState, ApiError, CurrentSession, LocalizedError, error::Localize, pages::page},
    models::Obligee,
    views,
};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 50;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub term: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub obligees: Vec<Obligee>,
}

pub async fn search(
    State(state): State<AppState>,
    session: CurrentSession,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, LocalizedError> {
    let Query(query) = query.localize(session.language())?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let obligees = state
        .db
        .find_obligees(&query.term, Some(limit))
        .await
        .map_err(|e| ApiError::ObligeeSearchFailed(e).localized(session.language()))?;
    Ok(Json(SearchResponse { obligees }))
}

/// Obligees listed on one page of the index
pub const OBLIGEES_PER_PAGE: u32 = 25;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexQuery {
    pub page: Option<String>,
}

/// Clamps a requested 1-based page number to `1..=page_count`; garbage means the first page.
fn page_number(requested: Option<&str>, page_count: u32) -> u32 {
    requested
        .and_then(|p| p.trim().parse::<u32>().ok())
        .unwrap_or(1)
        .clamp(1, page_count.max(1))
}

/// Alphabetical, paginated index of all obligees.
pub async fn index(
    State(state): State<AppState>,
    session: CurrentSession,
    query: Result<Query<IndexQuery>, QueryRejection>,
) -> Result<Html<String>, LocalizedError> {
    let language = session.language();
    let requested = query.ok().and_then(|Query(q)| q.page);

    let count = state.db.count_obligees().await.localize(language)?;
    let page_count = count.div_ceil(OBLIGEES_PER_PAGE).max(1);
    let number = page_number(requested.as_deref(), page_count);
    let obligees = state
        .db
        .list_obligees((number - 1) * OBLIGEES_PER_PAGE, OBLIGEES_PER_PAGE)
        .await
        .localize(language)?;

    Ok(Html(views::obligee_index(
        &page(&session),
        &obligees,
        number,
        page_count,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_is_clamped() {
        assert_eq!(page_number(None, 4), 1);
        assert_eq!(page_number(Some("3"), 4), 3);
        assert_eq!(page_number(Some("0"), 4), 1);
        assert_eq!(page_number(Some("99"), 4), 4);
        assert_eq!(page_number(Some("abc"), 4), 1);
        assert_eq!(page_number(Some("2"), 0), 1);
    }
}
