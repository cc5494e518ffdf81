//! # Periodic maintenance
//!
//! Runs once an hour: purges expired sessions and abandoned uploads, and closes requests
//! which have been silent for too long.

use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info};

use crate::{
    db::interface::{DatabaseClient, DatabaseError},
    models::{ActionCreate, ActionKind},
    workdays,
};

/// How often maintenance runs
pub const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Uploads attached to nothing are deleted after this long
const ORPHANED_ATTACHMENT_AGE: chrono::Duration = chrono::Duration::days(1);

/// Working days past its last deadline after which a request is closed
const CLOSE_AFTER_WORKDAYS: i64 = 100;

pub async fn run_periodically(db: Arc<dyn DatabaseClient>) {
    let mut interval = tokio::time::interval(MAINTENANCE_INTERVAL);
    loop {
        interval.tick().await;
        run_once(db.as_ref(), workdays::today()).await;
    }
}

pub async fn run_once(db: &dyn DatabaseClient, today: NaiveDate) {
    match db.delete_expired_sessions().await {
        Ok(0) => (),
        Ok(count) => info!("purged {count} expired sessions"),
        Err(err) => error!("failed to purge expired sessions: {err}"),
    }
    match db
        .delete_orphaned_attachments(Utc::now() - ORPHANED_ATTACHMENT_AGE)
        .await
    {
        Ok(0) => (),
        Ok(count) => info!("purged {count} orphaned attachments"),
        Err(err) => error!("failed to purge orphaned attachments: {err}"),
    }
    match close_finished_inforequests(db, today).await {
        Ok(0) => (),
        Ok(count) => info!("closed {count} information requests"),
        Err(err) => error!("failed to close information requests: {err}"),
    }
}

/// Closes open requests whose last action has no deadline, or a deadline missed by more
/// than [`CLOSE_AFTER_WORKDAYS`].
///
/// A missed obligee deadline is first recorded as an expiration dated on the last day of
/// that deadline.
pub async fn close_finished_inforequests(
    db: &dyn DatabaseClient,
    today: NaiveDate,
) -> Result<u64, DatabaseError> {
    let mut closed = 0;
    for inforequest in db.list_open_inforequests().await? {
        let actions = db.list_actions(inforequest.id).await?;
        let Some(last) = actions.last() else {
            continue;
        };
        if last
            .deadline_remaining(today)
            .is_some_and(|remaining| remaining > -CLOSE_AFTER_WORKDAYS)
        {
            continue;
        }

        if last.has_obligee_deadline() && last.deadline_missed(today) {
            let kind = if last.kind == ActionKind::Appeal {
                ActionKind::AppealExpiration
            } else {
                ActionKind::Expiration
            };
            let effective_date = last.deadline_date().unwrap_or(today);
            debug!(inforequest.id, ?kind, %effective_date, "recording expiration");
            db.add_action(inforequest.id, &ActionCreate::new(kind, effective_date))
                .await?;
        }
        db.close_inforequest(inforequest.id).await?;
        closed += 1;
    }
    Ok(closed)
}

#[cfg(all(test, feature = "sqlite3"))]
mod tests {
    use super::*;
    use crate::{
        db::clients::sqlite::SqliteClient,
        i18n::Language,
        models::{
            Applicant, DisclosureLevel, InfoRequestCreate, InfoRequestStatus, ObligeeCreate,
            UserCreate,
        },
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    async fn submit(db: &SqliteClient, unique_email: &str) -> i64 {
        let obligee = db
            .create_obligee(&ObligeeCreate {
                name: "Mesto Žilina".to_string(),
                street: "Námestie obetí komunizmu 1".to_string(),
                city: "Žilina".to_string(),
                zip: "01131".to_string(),
                emails: vec!["podatelna@zilina.sk".to_string()],
                score: 0,
            })
            .await
            .unwrap();
        let submitted = date(2025, 3, 3);
        let inforequest = db
            .create_inforequest(&InfoRequestCreate {
                applicant_email: "jana@example.sk".to_string(),
                obligee_id: obligee.id,
                subject: "Zmluvy".to_string(),
                applicant: Applicant {
                    name: "Jana Nováková".to_string(),
                    street: "Hlavná 1".to_string(),
                    city: "Košice".to_string(),
                    zip: "04001".to_string(),
                },
                unique_email: unique_email.to_string(),
                submission_date: submitted,
                request: ActionCreate::new(ActionKind::Request, submitted),
                draft_id: None,
            })
            .await
            .unwrap();
        inforequest.id
    }

    async fn database() -> SqliteClient {
        let db = SqliteClient::new_memory().await.unwrap();
        db.create_user(&UserCreate {
            email: "jana@example.sk".to_string(),
            password: None,
            first_name: "Jana".to_string(),
            last_name: "Nováková".to_string(),
            street: "Hlavná 1".to_string(),
            city: "Košice".to_string(),
            zip: "04001".to_string(),
            auth_token: Some("google:1".to_string()),
            language: Language::Sk,
        })
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_recent_requests_stay_open() {
        let db = database().await;
        submit(&db, "kamo@mail.chcemvediet.sk").await;
        // the deadline was missed, but not long ago
        let closed = close_finished_inforequests(&db, date(2025, 4, 30)).await.unwrap();
        assert_eq!(closed, 0);
        assert_eq!(db.list_open_inforequests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_silent_obligee_expires() {
        let db = database().await;
        let id = submit(&db, "kamo@mail.chcemvediet.sk").await;

        let today = date(2026, 3, 3);
        let closed = close_finished_inforequests(&db, today).await.unwrap();
        assert_eq!(closed, 1);
        assert!(db.list_open_inforequests().await.unwrap().is_empty());

        let actions = db.list_actions(id).await.unwrap();
        let kinds: Vec<_> = actions.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ActionKind::Request, ActionKind::Expiration]);
        // dated on the last day of the missed deadline
        assert_eq!(actions[1].effective_date, date(2025, 3, 13));
        assert_eq!(
            InfoRequestStatus::of(&actions, true, today),
            InfoRequestStatus::Closed
        );
    }

    #[tokio::test]
    async fn test_finished_request_closes_without_expiration() {
        let db = database().await;
        let id = submit(&db, "kamo@mail.chcemvediet.sk").await;
        db.add_action(
            id,
            &ActionCreate::new(ActionKind::Disclosure, date(2025, 3, 7))
                .with_disclosure_level(DisclosureLevel::Full),
        )
        .await
        .unwrap();

        let today = date(2025, 3, 10);
        assert_eq!(close_finished_inforequests(&db, today).await.unwrap(), 1);
        let actions = db.list_actions(id).await.unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(
            InfoRequestStatus::of(&actions, true, today),
            InfoRequestStatus::Disclosed
        );
    }

    #[tokio::test]
    async fn test_run_once_keeps_fresh_data() {
        let db = database().await;
        submit(&db, "kamo@mail.chcemvediet.sk").await;
        run_once(&db, date(2025, 3, 4)).await;
        assert_eq!(db.list_open_inforequests().await.unwrap().len(), 1);
    }
}
