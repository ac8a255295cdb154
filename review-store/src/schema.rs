//! Table layout and forward-only migrations.

const SCHEMA_VERSION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    );
";

/// `users` is keyed by the GitHub account id; `reviews.issues` holds the
/// issue list as a JSON array.
const SCHEMA_V1_SQL: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        github_id    INTEGER NOT NULL UNIQUE,
        username     TEXT    NOT NULL UNIQUE,
        email        TEXT,
        avatar_url   TEXT,
        access_token TEXT,
        created_at   TEXT    NOT NULL
    );

    CREATE TABLE IF NOT EXISTS reviews (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id    INTEGER REFERENCES users(id),
        repo_name  TEXT    NOT NULL,
        pr_number  INTEGER NOT NULL,
        pr_url     TEXT    NOT NULL,
        severity   TEXT    NOT NULL,
        summary    TEXT    NOT NULL,
        issues     TEXT    NOT NULL DEFAULT '[]',
        status     TEXT    NOT NULL DEFAULT 'completed',
        created_at TEXT    NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_reviews_user ON reviews(user_id, created_at);
";

/// Brings the database to the latest version. Safe to run on every open.
pub fn migrate(db: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(SCHEMA_VERSION_DDL)?;

    let version: i64 = db
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if version < 1 {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute_batch(SCHEMA_V1_SQL)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        tx.commit()?;
    }

    Ok(())
}
