use std::{pin::Pin, str::FromStr};

use chrono::{DateTime, Utc};
use sqlx::{
    SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteSynchronous},
};
use tracing::debug;

use crate::{
    db::interface::{DatabaseClient, DatabaseError},
    models::{
        Action, ActionCreate, Attachment, AttachmentContent, AttachmentCreate, DraftContent,
        EncodableHash, InfoRequest, InfoRequestCreate, InfoRequestDraft, JsonText, Obligee,
        ObligeeCreate, SESSION_DURATION, Session, SessionData, User, UserCreate, UserUpdate,
    },
    search,
};


const USER_COLUMNS: &str = "email, password, first_name, last_name, street, city, zip, \
                            auth_token, language, created_at, updated_at";

const OBLIGEE_COLUMNS: &str = "id, name, street, city, zip, emails, score";

const DRAFT_COLUMNS: &str =
    "id, applicant_email, obligee_id, subject, content, created_at, updated_at";

const INFOREQUEST_COLUMNS: &str = "id, applicant_email, obligee_id, subject, applicant_name, \
                                   applicant_street, applicant_city, applicant_zip, \
                                   unique_email, submission_date, closed, created_at";

const ACTION_COLUMNS: &str = "id, inforequest_id, kind, subject, content, effective_date, \
                              deadline, extension, disclosure_level, created_at";

const ATTACHMENT_COLUMNS: &str =
    "id, owner_email, draft_id, action_id, name, content_type, size, created_at";

#[derive(Debug, thiserror::Error)]
pub enum CreateSqliteClientError {
    #[error("invalid database URL: {0}")]
    InvalidUrl(#[source] sqlx::Error),

    #[error("failed to migrate database to current version: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Opens or creates the database given either as a `sqlite:` URL or as a file path.
    pub async fn open(database_url: &str) -> Result<Self, CreateSqliteClientError> {
        let options = if database_url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(database_url)
                .map_err(CreateSqliteClientError::InvalidUrl)?
        } else {
            SqliteConnectOptions::new().filename(database_url)
        };
        Ok(Self {
            pool: Self::do_open(options.create_if_missing(true)).await?,
        })
    }

    /// Creates a client that uses a new in-memory database.
    pub async fn new_memory() -> Result<Self, CreateSqliteClientError> {
        // sqlx has some special handling for the in-memory database which only
        // happens when parsing from a URL string
        Self::open("sqlite://:memory:").await
    }

    async fn do_open(
        base_options: SqliteConnectOptions,
    ) -> Result<SqlitePool, CreateSqliteClientError> {
        let options = base_options
            .synchronous(SqliteSynchronous::Normal)
            .optimize_on_close(true, None)
            .pragma("foreign_keys", "ON");
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::migrate!("src/db/clients/sqlite/migrations")
            .run(&pool)
            .await?;

        Ok(pool)
    }
}

impl DatabaseClient for SqliteClient {
    fn create_user<'user>(
        &self,
        user: &'user UserCreate,
    ) -> Pin<Box<dyn Future<Output = Result<User, DatabaseError>> + Send + 'user>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!(
                "INSERT INTO users (email, password, first_name, last_name, street, city, zip,
                                    auth_token, language, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, unixepoch(), unixepoch())
                 RETURNING {USER_COLUMNS}"
            );
            let user = sqlx::query_as::<_, User>(&query)
                .bind(&user.email)
                .bind(&user.password)
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(&user.street)
                .bind(&user.city)
                .bind(&user.zip)
                .bind(&user.auth_token)
                .bind(user.language)
                .fetch_one(&pool)
                .await?;
            Ok(user)
        })
    }

    fn get_user_by_email<'email>(
        &self,
        email: &'email str,
    ) -> Pin<Box<dyn Future<Output = Result<User, DatabaseError>> + Send + 'email>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
            let user: User = sqlx::query_as(&query).bind(email).fetch_one(&pool).await?;
            Ok(user)
        })
    }

    fn get_user_by_auth_token<'token>(
        &self,
        auth_token: &'token str,
    ) -> Pin<Box<dyn Future<Output = Result<User, DatabaseError>> + Send + 'token>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!("SELECT {USER_COLUMNS} FROM users WHERE auth_token = $1");
            let user: User = sqlx::query_as(&query)
                .bind(auth_token)
                .fetch_one(&pool)
                .await?;
            Ok(user)
        })
    }

    fn update_user<'arg>(
        &self,
        email: &'arg str,
        update: &'arg UserUpdate,
    ) -> Pin<Box<dyn Future<Output = Result<User, DatabaseError>> + Send + 'arg>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            if update.is_empty() {
                return Err(DatabaseError::EmptyUpdate);
            }

            let mut assignments: Vec<(&str, &str)> = Vec::new();
            if let Some(first_name) = &update.first_name {
                assignments.push(("first_name", first_name));
            }
            if let Some(last_name) = &update.last_name {
                assignments.push(("last_name", last_name));
            }
            if let Some(street) = &update.street {
                assignments.push(("street", street));
            }
            if let Some(city) = &update.city {
                assignments.push(("city", city));
            }
            if let Some(zip) = &update.zip {
                assignments.push(("zip", zip));
            }
            if let Some(language) = update.language {
                assignments.push(("language", language.code()));
            }

            let mut query_parts: Vec<String> = assignments
                .iter()
                .map(|(column, _)| format!("{column} = ?"))
                .collect();
            query_parts.push("updated_at = unixepoch()".to_string());

            let query = format!(
                "UPDATE users SET {} WHERE email = ? RETURNING {USER_COLUMNS}",
                query_parts.join(", ")
            );

            // Bind parameters in order
            let mut sql_query = sqlx::query_as::<_, User>(&query);
            for (_, value) in &assignments {
                sql_query = sql_query.bind(*value);
            }
            let user = sql_query.bind(email).fetch_one(&pool).await?;
            Ok(user)
        })
    }

    fn create_obligee<'a>(
        &self,
        obligee: &'a ObligeeCreate,
    ) -> Pin<Box<dyn Future<Output = Result<Obligee, DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!(
                "INSERT INTO obligees (name, street, city, zip, emails, score, search_key)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING {OBLIGEE_COLUMNS}"
            );
            let created = sqlx::query_as::<_, Obligee>(&query)
                .bind(&obligee.name)
                .bind(&obligee.street)
                .bind(&obligee.city)
                .bind(&obligee.zip)
                .bind(JsonText(&obligee.emails))
                .bind(obligee.score)
                .bind(obligee.search_key())
                .fetch_one(&pool)
                .await?;
            Ok(created)
        })
    }

    fn find_obligees<'term>(
        &self,
        term: &'term str,
        limit: Option<u32>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Obligee>, DatabaseError>> + Send + 'term>> {
        let pool = self.pool.clone();
        // Words are alphanumeric only, so they never contain LIKE wildcards
        let words = search::words(term);
        Box::pin(async move {
            let conditions: Vec<&str> = words.iter().map(|_| "search_key LIKE ?").collect();
            let filter = if conditions.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", conditions.join(" AND "))
            };
            let query = format!(
                "SELECT {OBLIGEE_COLUMNS} FROM obligees {filter}
                 ORDER BY score DESC, name ASC LIMIT ?"
            );
            debug!(?words, ?limit, "searching obligees");

            let mut sql_query = sqlx::query_as::<_, Obligee>(&query);
            for word in &words {
                sql_query = sql_query.bind(format!("%{word}%"));
            }
            // a negative limit means no limit in SQLite
            let obligees = sql_query
                .bind(limit.map_or(-1, i64::from))
                .fetch_all(&pool)
                .await?;
            Ok(obligees)
        })
    }

    fn get_obligee(
        &self,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Obligee, DatabaseError>> + Send + 'static>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!("SELECT {OBLIGEE_COLUMNS} FROM obligees WHERE id = $1");
            let obligee: Obligee = sqlx::query_as(&query).bind(id).fetch_one(&pool).await?;
            Ok(obligee)
        })
    }

    fn list_obligees(
        &self,
        offset: u32,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Obligee>, DatabaseError>> + Send + 'static>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!(
                "SELECT {OBLIGEE_COLUMNS} FROM obligees ORDER BY name, id LIMIT $1 OFFSET $2"
            );
            let obligees = sqlx::query_as::<_, Obligee>(&query)
                .bind(limit)
                .bind(offset)
                .fetch_all(&pool)
                .await?;
            Ok(obligees)
        })
    }

    fn count_obligees(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<u32, DatabaseError>> + Send + 'static>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM obligees")
                .fetch_one(&pool)
                .await?;
            Ok(u32::try_from(count).unwrap_or(u32::MAX))
        })
    }

    fn create_draft<'a>(
        &self,
        applicant_email: &'a str,
        content: &'a DraftContent,
    ) -> Pin<Box<dyn Future<Output = Result<InfoRequestDraft, DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await?;
            let query = format!(
                "INSERT INTO inforequest_drafts (applicant_email, obligee_id, subject, content,
                                                 created_at, updated_at)
                 VALUES ($1, $2, $3, $4, unixepoch(), unixepoch())
                 RETURNING {DRAFT_COLUMNS}"
            );
            let draft: InfoRequestDraft = sqlx::query_as(&query)
                .bind(applicant_email)
                .bind(content.obligee_id)
                .bind(&content.subject)
                .bind(&content.content)
                .fetch_one(&mut *tx)
                .await?;
            attach(
                &mut tx,
                applicant_email,
                &content.attachment_ids,
                AttachTo::Draft(draft.id),
            )
            .await?;
            tx.commit().await?;
            Ok(draft)
        })
    }

    fn update_draft<'a>(
        &self,
        applicant_email: &'a str,
        id: i64,
        content: &'a DraftContent,
    ) -> Pin<Box<dyn Future<Output = Result<InfoRequestDraft, DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await?;
            let query = format!(
                "UPDATE inforequest_drafts
                 SET obligee_id = $1, subject = $2, content = $3, updated_at = unixepoch()
                 WHERE id = $4 AND applicant_email = $5
                 RETURNING {DRAFT_COLUMNS}"
            );
            let draft: InfoRequestDraft = sqlx::query_as(&query)
                .bind(content.obligee_id)
                .bind(&content.subject)
                .bind(&content.content)
                .bind(id)
                .bind(applicant_email)
                .fetch_one(&mut *tx)
                .await?;
            sqlx::query("UPDATE attachments SET draft_id = NULL WHERE draft_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            attach(
                &mut tx,
                applicant_email,
                &content.attachment_ids,
                AttachTo::Draft(id),
            )
            .await?;
            tx.commit().await?;
            Ok(draft)
        })
    }

    fn get_draft<'a>(
        &self,
        applicant_email: &'a str,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<InfoRequestDraft, DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!(
                "SELECT {DRAFT_COLUMNS} FROM inforequest_drafts
                 WHERE id = $1 AND applicant_email = $2"
            );
            let draft: InfoRequestDraft = sqlx::query_as(&query)
                .bind(id)
                .bind(applicant_email)
                .fetch_one(&pool)
                .await?;
            Ok(draft)
        })
    }

    fn list_drafts<'a>(
        &self,
        applicant_email: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<InfoRequestDraft>, DatabaseError>> + Send + 'a>>
    {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!(
                "SELECT {DRAFT_COLUMNS} FROM inforequest_drafts WHERE applicant_email = $1
                 ORDER BY updated_at DESC, id DESC"
            );
            let drafts = sqlx::query_as::<_, InfoRequestDraft>(&query)
                .bind(applicant_email)
                .fetch_all(&pool)
                .await?;
            Ok(drafts)
        })
    }

    fn delete_draft<'a>(
        &self,
        applicant_email: &'a str,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<(), DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result =
                sqlx::query("DELETE FROM inforequest_drafts WHERE id = $1 AND applicant_email = $2")
                    .bind(id)
                    .bind(applicant_email)
                    .execute(&pool)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(DatabaseError::NotFound);
            }
            Ok(())
        })
    }

    fn create_inforequest<'a>(
        &self,
        inforequest: &'a InfoRequestCreate,
    ) -> Pin<Box<dyn Future<Output = Result<InfoRequest, DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await?;
            let query = format!(
                "INSERT INTO inforequests (applicant_email, obligee_id, subject, applicant_name,
                                           applicant_street, applicant_city, applicant_zip,
                                           unique_email, submission_date, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, unixepoch())
                 RETURNING {INFOREQUEST_COLUMNS}"
            );
            let created: InfoRequest = sqlx::query_as(&query)
                .bind(&inforequest.applicant_email)
                .bind(inforequest.obligee_id)
                .bind(&inforequest.subject)
                .bind(&inforequest.applicant.name)
                .bind(&inforequest.applicant.street)
                .bind(&inforequest.applicant.city)
                .bind(&inforequest.applicant.zip)
                .bind(&inforequest.unique_email)
                .bind(inforequest.submission_date)
                .fetch_one(&mut *tx)
                .await?;

            let request = insert_action(&mut tx, created.id, &inforequest.request).await?;
            attach(
                &mut tx,
                &inforequest.applicant_email,
                &inforequest.request.attachment_ids,
                AttachTo::Action(request.id),
            )
            .await?;

            if let Some(draft_id) = inforequest.draft_id {
                sqlx::query(
                    "DELETE FROM inforequest_drafts WHERE id = $1 AND applicant_email = $2",
                )
                .bind(draft_id)
                .bind(&inforequest.applicant_email)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
            Ok(created)
        })
    }

    fn get_inforequest<'a>(
        &self,
        applicant_email: &'a str,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<InfoRequest, DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!(
                "SELECT {INFOREQUEST_COLUMNS} FROM inforequests
                 WHERE id = $1 AND applicant_email = $2"
            );
            let inforequest: InfoRequest = sqlx::query_as(&query)
                .bind(id)
                .bind(applicant_email)
                .fetch_one(&pool)
                .await?;
            Ok(inforequest)
        })
    }

    fn list_inforequests<'a>(
        &self,
        applicant_email: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<InfoRequest>, DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!(
                "SELECT {INFOREQUEST_COLUMNS} FROM inforequests WHERE applicant_email = $1
                 ORDER BY submission_date DESC, id DESC"
            );
            let inforequests = sqlx::query_as::<_, InfoRequest>(&query)
                .bind(applicant_email)
                .fetch_all(&pool)
                .await?;
            Ok(inforequests)
        })
    }

    fn list_open_inforequests(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<InfoRequest>, DatabaseError>> + Send + 'static>>
    {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query =
                format!("SELECT {INFOREQUEST_COLUMNS} FROM inforequests WHERE closed = 0 ORDER BY id");
            let inforequests = sqlx::query_as::<_, InfoRequest>(&query)
                .fetch_all(&pool)
                .await?;
            Ok(inforequests)
        })
    }

    fn close_inforequest(
        &self,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<(), DatabaseError>> + Send + 'static>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("UPDATE inforequests SET closed = 1 WHERE id = $1")
                .bind(id)
                .execute(&pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(DatabaseError::NotFound);
            }
            Ok(())
        })
    }

    fn add_action<'a>(
        &self,
        inforequest_id: i64,
        action: &'a ActionCreate,
    ) -> Pin<Box<dyn Future<Output = Result<Action, DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await?;
            let applicant_email: String =
                sqlx::query_scalar("SELECT applicant_email FROM inforequests WHERE id = $1")
                    .bind(inforequest_id)
                    .fetch_one(&mut *tx)
                    .await?;
            let created = insert_action(&mut tx, inforequest_id, action).await?;
            attach(
                &mut tx,
                &applicant_email,
                &action.attachment_ids,
                AttachTo::Action(created.id),
            )
            .await?;
            tx.commit().await?;
            Ok(created)
        })
    }

    fn list_actions(
        &self,
        inforequest_id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Action>, DatabaseError>> + Send + 'static>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!(
                "SELECT {ACTION_COLUMNS} FROM actions WHERE inforequest_id = $1
                 ORDER BY effective_date, id"
            );
            let actions = sqlx::query_as::<_, Action>(&query)
                .bind(inforequest_id)
                .fetch_all(&pool)
                .await?;
            Ok(actions)
        })
    }

    fn extend_deadline(
        &self,
        action_id: i64,
        extension: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Action, DatabaseError>> + Send + 'static>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query =
                format!("UPDATE actions SET extension = $1 WHERE id = $2 RETURNING {ACTION_COLUMNS}");
            let action: Action = sqlx::query_as(&query)
                .bind(extension)
                .bind(action_id)
                .fetch_one(&pool)
                .await?;
            Ok(action)
        })
    }

    fn create_attachment<'a>(
        &self,
        attachment: &'a AttachmentCreate,
    ) -> Pin<Box<dyn Future<Output = Result<Attachment, DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!(
                "INSERT INTO attachments (owner_email, name, content_type, size, content,
                                          created_at)
                 VALUES ($1, $2, $3, $4, $5, unixepoch())
                 RETURNING {ATTACHMENT_COLUMNS}"
            );
            let created: Attachment = sqlx::query_as(&query)
                .bind(&attachment.owner_email)
                .bind(&attachment.name)
                .bind(&attachment.content_type)
                .bind(i64::try_from(attachment.content.len()).unwrap_or(i64::MAX))
                .bind(&attachment.content)
                .fetch_one(&pool)
                .await?;
            Ok(created)
        })
    }

    fn get_attachment<'a>(
        &self,
        owner_email: &'a str,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<AttachmentContent, DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!(
                "SELECT {ATTACHMENT_COLUMNS}, content FROM attachments
                 WHERE id = $1 AND owner_email = $2"
            );
            let attachment: AttachmentContent = sqlx::query_as(&query)
                .bind(id)
                .bind(owner_email)
                .fetch_one(&pool)
                .await?;
            Ok(attachment)
        })
    }

    fn list_draft_attachments(
        &self,
        draft_id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Attachment>, DatabaseError>> + Send + 'static>>
    {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!(
                "SELECT {ATTACHMENT_COLUMNS} FROM attachments WHERE draft_id = $1 ORDER BY id"
            );
            let attachments = sqlx::query_as::<_, Attachment>(&query)
                .bind(draft_id)
                .fetch_all(&pool)
                .await?;
            Ok(attachments)
        })
    }

    fn list_inforequest_attachments(
        &self,
        inforequest_id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Attachment>, DatabaseError>> + Send + 'static>>
    {
        let pool = self.pool.clone();
        Box::pin(async move {
            let query = format!(
                "SELECT {ATTACHMENT_COLUMNS} FROM attachments
                 WHERE action_id IN (SELECT id FROM actions WHERE inforequest_id = $1)
                 ORDER BY id"
            );
            let attachments = sqlx::query_as::<_, Attachment>(&query)
                .bind(inforequest_id)
                .fetch_all(&pool)
                .await?;
            Ok(attachments)
        })
    }

    fn delete_orphaned_attachments(
        &self,
        before: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<u64, DatabaseError>> + Send + 'static>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query(
                "DELETE FROM attachments
                 WHERE draft_id IS NULL AND action_id IS NULL AND created_at < $1",
            )
            .bind(before.timestamp())
            .execute(&pool)
            .await?;
            Ok(result.rows_affected())
        })
    }

    fn create_session<'a>(
        &self,
        session: &'a Session,
    ) -> Pin<Box<dyn Future<Output = Result<(), DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO sessions (id_hash, data, created_at, expires_at)
                VALUES ($1, $2, $3, $4)",
            )
            .bind(session.id_hash)
            .bind(&session.data)
            .bind(session.created_at.timestamp())
            .bind(session.expires_at.timestamp())
            .execute(&pool)
            .await?;
            Ok(())
        })
    }

    fn get_session_by_id_hash<'id>(
        &self,
        id_hash: &'id EncodableHash,
    ) -> Pin<Box<dyn Future<Output = Result<Session, DatabaseError>> + Send + 'id>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let session: Session = sqlx::query_as(
                "SELECT id_hash, data, created_at, expires_at FROM sessions WHERE id_hash = $1",
            )
            .bind(id_hash)
            .fetch_one(&pool)
            .await?;
            Ok(session)
        })
    }

    fn update_session_data<'a>(
        &self,
        id_hash: &'a EncodableHash,
        data: &'a SessionData,
    ) -> Pin<Box<dyn Future<Output = Result<(), DatabaseError>> + Send + 'a>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let expires_at = chrono::Utc::now() + SESSION_DURATION;
            let result =
                sqlx::query("UPDATE sessions SET data = $1, expires_at = $2 WHERE id_hash = $3")
                    .bind(JsonText(data))
                    .bind(expires_at.timestamp())
                    .bind(id_hash)
                    .execute(&pool)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(DatabaseError::NotFound);
            }
            Ok(())
        })
    }

    fn delete_session_by_id_hash<'id>(
        &self,
        id_hash: &'id EncodableHash,
    ) -> Pin<Box<dyn Future<Output = Result<(), DatabaseError>> + Send + 'id>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("DELETE FROM sessions WHERE id_hash = $1")
                .bind(id_hash)
                .execute(&pool)
                .await?;
            Ok(())
        })
    }

    fn delete_expired_sessions(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<u64, DatabaseError>> + Send + 'static>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM sessions WHERE expires_at < unixepoch()")
                .execute(&pool)
                .await?;
            Ok(result.rows_affected())
        })
    }
}

enum AttachTo {
    Draft(i64),
    Action(i64),
}

/// Points attachments of `owner_email` at a draft or an action. Attachments which belong to
/// somebody else, or to an action already, fail the whole operation.
async fn attach(
    conn: &mut SqliteConnection,
    owner_email: &str,
    ids: &[i64],
    target: AttachTo,
) -> Result<(), DatabaseError> {
    let (assignment, target_id) = match target {
        AttachTo::Draft(id) => ("draft_id = $1", id),
        AttachTo::Action(id) => ("action_id = $1, draft_id = NULL", id),
    };
    let query = format!(
        "UPDATE attachments SET {assignment}
         WHERE id = $2 AND owner_email = $3 AND action_id IS NULL"
    );
    for id in ids {
        let result = sqlx::query(&query)
            .bind(target_id)
            .bind(id)
            .bind(owner_email)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            debug!(id, "attachment not available");
            return Err(DatabaseError::NotFound);
        }
    }
    Ok(())
}

async fn insert_action(
    conn: &mut SqliteConnection,
    inforequest_id: i64,
    action: &ActionCreate,
) -> Result<Action, DatabaseError> {
    let query = format!(
        "INSERT INTO actions (inforequest_id, kind, subject, content, effective_date, deadline,
                              disclosure_level, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, unixepoch())
         RETURNING {ACTION_COLUMNS}"
    );
    let created: Action = sqlx::query_as(&query)
        .bind(inforequest_id)
        .bind(action.kind)
        .bind(&action.subject)
        .bind(&action.content)
        .bind(action.effective_date)
        .bind(action.deadline)
        .bind(action.disclosure_level)
        .fetch_one(&mut *conn)
        .await?;
    Ok(created)
}
