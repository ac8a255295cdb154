//! SQLite-backed storage for users and reviews.
//!
//! All statements run on the `tokio_rusqlite` worker thread; callers only
//! ever await.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use git_context_engine::GitHubAccount;
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use crate::errors::{StoreError, StoreResult};

/// Listing cap for [`ReviewStore::list_reviews`].
pub const REVIEW_LIST_LIMIT: u32 = 50;

/// Default status written for finished pipeline runs.
pub const STATUS_COMPLETED: &str = "completed";

/// A persisted GitHub user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub github_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub created_at: String,
}

/// Insert form of a review. `issues` is stored verbatim as JSON.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: Option<i64>,
    pub repo_name: String,
    pub pr_number: u64,
    pub pr_url: String,
    pub severity: String,
    pub summary: String,
    pub issues: serde_json::Value,
    pub status: String,
}

/// A persisted review row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: Option<i64>,
    pub repo_name: String,
    pub pr_number: u64,
    pub pr_url: String,
    pub severity: String,
    pub summary: String,
    pub issues: serde_json::Value,
    pub status: String,
    pub created_at: String,
}

/// Handle over one SQLite connection, cheap to clone.
#[derive(Clone)]
pub struct ReviewStore {
    conn: Connection,
}

impl std::fmt::Debug for ReviewStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewStore").finish_non_exhaustive()
    }
}

impl ReviewStore {
    /// Opens (or creates) the database file and applies migrations.
    pub async fn open(path: &str) -> StoreResult<Self> {
        let conn = Connection::open(path).await?;
        let store = Self { conn };
        store
            .call(|db| {
                db.execute_batch(
                    "PRAGMA journal_mode=WAL;
                     PRAGMA foreign_keys=ON;",
                )?;
                db.busy_timeout(Duration::from_secs(5))?;
                crate::schema::migrate(db)
            })
            .await?;
        info!(path, "review store opened");
        Ok(store)
    }

    /// Private in-memory database; used by tests and local runs.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().await?;
        let store = Self { conn };
        store.call(crate::schema::migrate).await?;
        Ok(store)
    }

    async fn call<R, F>(&self, f: F) -> StoreResult<R>
    where
        F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let res: Result<R, tokio_rusqlite::Error> = self.conn.call(move |db| Ok(f(db)?)).await;
        res.map_err(StoreError::from)
    }

    /// Inserts a review and returns its id.
    pub async fn create_review(&self, review: NewReview) -> StoreResult<i64> {
        let issues = serde_json::to_string(&review.issues)?;
        let created_at = now_rfc3339();

        let id = self
            .call(move |db| {
                db.execute(
                    "INSERT INTO reviews
                        (user_id, repo_name, pr_number, pr_url, severity, summary, issues, status, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    rusqlite::params![
                        review.user_id,
                        review.repo_name,
                        review.pr_number as i64,
                        review.pr_url,
                        review.severity,
                        review.summary,
                        issues,
                        review.status,
                        created_at,
                    ],
                )?;
                Ok(db.last_insert_rowid())
            })
            .await?;

        debug!(review_id = id, "review stored");
        Ok(id)
    }

    /// Newest first, capped at [`REVIEW_LIST_LIMIT`]. `None` lists every user's reviews.
    pub async fn list_reviews(&self, user_id: Option<i64>) -> StoreResult<Vec<Review>> {
        let rows = self
            .call(move |db| {
                let mut stmt = db.prepare(
                    "SELECT id, user_id, repo_name, pr_number, pr_url, severity, summary, issues, status, created_at
                     FROM reviews
                     WHERE ?1 IS NULL OR user_id = ?1
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?2",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![user_id, REVIEW_LIST_LIMIT], read_review_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;

        rows.into_iter().map(ReviewRow::into_review).collect()
    }

    pub async fn get_review(&self, id: i64) -> StoreResult<Option<Review>> {
        let row = self
            .call(move |db| {
                db.query_row(
                    "SELECT id, user_id, repo_name, pr_number, pr_url, severity, summary, issues, status, created_at
                     FROM reviews WHERE id = ?1",
                    [id],
                    read_review_row,
                )
                .optional()
            })
            .await?;

        row.map(ReviewRow::into_review).transpose()
    }

    /// Inserts or refreshes the user identified by `account.id`.
    ///
    /// Profile fields and the access token are overwritten on every login.
    pub async fn upsert_user(&self, account: &GitHubAccount, access_token: &str) -> StoreResult<User> {
        let account = account.clone();
        let access_token = access_token.to_owned();
        let created_at = now_rfc3339();

        let user = self
            .call(move |db| {
                db.execute(
                    "INSERT INTO users (github_id, username, email, avatar_url, access_token, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(github_id) DO UPDATE SET
                        username = excluded.username,
                        email = excluded.email,
                        avatar_url = excluded.avatar_url,
                        access_token = excluded.access_token",
                    rusqlite::params![
                        account.id,
                        account.login,
                        account.email,
                        account.avatar_url,
                        access_token,
                        created_at,
                    ],
                )?;
                db.query_row(
                    "SELECT id, github_id, username, email, avatar_url, access_token, created_at
                     FROM users WHERE github_id = ?1",
                    [account.id],
                    read_user_row,
                )
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "user upserted");
        Ok(user)
    }

    pub async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        self.call(move |db| {
            db.query_row(
                "SELECT id, github_id, username, email, avatar_url, access_token, created_at
                 FROM users WHERE id = ?1",
                [id],
                read_user_row,
            )
            .optional()
        })
        .await
    }
}

/// Review as read from SQLite, before the issues column is decoded.
struct ReviewRow {
    id: i64,
    user_id: Option<i64>,
    repo_name: String,
    pr_number: i64,
    pr_url: String,
    severity: String,
    summary: String,
    issues: String,
    status: String,
    created_at: String,
}

impl ReviewRow {
    fn into_review(self) -> StoreResult<Review> {
        Ok(Review {
            id: self.id,
            user_id: self.user_id,
            repo_name: self.repo_name,
            pr_number: self.pr_number.max(0) as u64,
            pr_url: self.pr_url,
            severity: self.severity,
            summary: self.summary,
            issues: serde_json::from_str(&self.issues)?,
            status: self.status,
            created_at: self.created_at,
        })
    }
}

fn read_review_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<ReviewRow> {
    Ok(ReviewRow {
        id: r.get(0)?,
        user_id: r.get(1)?,
        repo_name: r.get(2)?,
        pr_number: r.get(3)?,
        pr_url: r.get(4)?,
        severity: r.get(5)?,
        summary: r.get(6)?,
        issues: r.get(7)?,
        status: r.get(8)?,
        created_at: r.get(9)?,
    })
}

fn read_user_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get(0)?,
        github_id: r.get(1)?,
        username: r.get(2)?,
        email: r.get(3)?,
        avatar_url: r.get(4)?,
        access_token: r.get(5)?,
        created_at: r.get(6)?,
    })
}

/// Millisecond precision keeps lexical order equal to insertion order.
fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn review(user_id: Option<i64>, pr: u64) -> NewReview {
        NewReview {
            user_id,
            repo_name: "acme/api".into(),
            pr_number: pr,
            pr_url: format!("https://github.com/acme/api/pull/{pr}"),
            severity: "medium".into(),
            summary: "two issues".into(),
            issues: json!([{"type": "bug", "file": "src/lib.rs", "description": "off by one"}]),
            status: STATUS_COMPLETED.into(),
        }
    }

    fn account(id: i64, login: &str) -> GitHubAccount {
        GitHubAccount {
            id,
            login: login.into(),
            email: Some(format!("{login}@x.io")),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn open_in_missing_directory_fails() {
        let err = ReviewStore::open("/nonexistent-codeassure-dir/reviews.db").await.unwrap_err();
        assert!(matches!(err, StoreError::Open(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn review_round_trips() {
        let store = ReviewStore::open_in_memory().await.unwrap();
        let id = store.create_review(review(None, 7)).await.unwrap();

        let got = store.get_review(id).await.unwrap().unwrap();
        assert_eq!(got.pr_number, 7);
        assert_eq!(got.status, "completed");
        assert_eq!(got.issues[0]["type"], "bug");
        assert!(got.user_id.is_none());

        assert!(store.get_review(id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_user_newest_first() {
        let store = ReviewStore::open_in_memory().await.unwrap();
        let user = store.upsert_user(&account(1, "octo"), "gho_1").await.unwrap();

        store.create_review(review(Some(user.id), 1)).await.unwrap();
        store.create_review(review(None, 2)).await.unwrap();
        store.create_review(review(Some(user.id), 3)).await.unwrap();

        let mine = store.list_reviews(Some(user.id)).await.unwrap();
        let prs: Vec<u64> = mine.iter().map(|r| r.pr_number).collect();
        assert_eq!(prs, vec![3, 1]);

        let all = store.list_reviews(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].pr_number, 3);
    }

    #[tokio::test]
    async fn list_is_capped() {
        let store = ReviewStore::open_in_memory().await.unwrap();
        for pr in 0..(REVIEW_LIST_LIMIT as u64 + 5) {
            store.create_review(review(None, pr)).await.unwrap();
        }
        let all = store.list_reviews(None).await.unwrap();
        assert_eq!(all.len(), REVIEW_LIST_LIMIT as usize);
    }

    #[tokio::test]
    async fn upsert_user_keys_on_github_id() {
        let store = ReviewStore::open_in_memory().await.unwrap();
        let first = store.upsert_user(&account(42, "octo"), "gho_a").await.unwrap();
        let again = store.upsert_user(&account(42, "octocat"), "gho_b").await.unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(again.username, "octocat");
        assert_eq!(again.access_token.as_deref(), Some("gho_b"));

        let loaded = store.get_user(first.id).await.unwrap().unwrap();
        assert_eq!(loaded, again);
        assert!(store.get_user(first.id + 1).await.unwrap().is_none());
    }
}
