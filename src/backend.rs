use std::path::{Path, PathBuf};

use log::{error, info};
use sqlx::{migrate::MigrateDatabase, Pool, Sqlite, SqlitePool};

use crate::user::User;

type Result<T> = std::result::Result<T, ()>;

#[derive(Debug)]
pub enum FindError {
    NotFound,
    Internal,
}

#[derive(Debug)]
pub enum CreateError {
    DuplicateEmail,
    Internal,
}

#[derive(Debug)]
pub struct Backend(pub Pool<Sqlite>);

/// No migration machinery: one table, created when missing.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL,
        email TEXT UNIQUE NOT NULL,
        pwhash TEXT NOT NULL,
        session_id TEXT
    )
";

fn into_db(path: &Path) -> PathBuf {
    path.join("users.db")
}

async fn init(data_dir: &Path) {
    let final_path = format!(
        "sqlite://{}",
        into_db(data_dir).to_str().expect("non utf-8 data")
    );
    match Sqlite::create_database(&final_path).await {
        Ok(()) => {
            info!("Using {}", &final_path);
        }
        Err(e) => {
            let sqlx::Error::Database(db_err) = e else {
                panic!("error creating database: {e}");
            };

            panic!("sql db error: {db_err:?}");
        }
    }
}

pub async fn ensure_schema(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(SCHEMA)
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            error!("error creating users table: {e:?}");
        })
}

impl Backend {
    pub async fn new(data_dir: &Path) -> Self {
        let db_pathbuf = into_db(data_dir);
        let db_path = db_pathbuf.to_str().expect("non utf-8 data");
        let pool = match SqlitePool::connect(db_path).await {
            Ok(pool) => pool,
            Err(_err) => {
                init(data_dir).await;
                SqlitePool::connect(db_path).await.expect("db connection")
            }
        };

        ensure_schema(&pool).await.expect("schema");

        Self(pool)
    }
}

impl Backend {
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        pwhash: &str,
    ) -> std::result::Result<(), CreateError> {
        sqlx::query(
            "
            INSERT INTO users
            (username, email, pwhash)
            VALUES
            (?, ?, ?)
            ",
        )
        .bind(username)
        .bind(email)
        .bind(pwhash)
        .execute(&self.0)
        .await
        .map(|_| ())
        .map_err(|e| {
            if is_unique_violation(&e) {
                CreateError::DuplicateEmail
            } else {
                error!("error inserting user: {e:?}");
                CreateError::Internal
            }
        })
    }

    pub async fn find_user(&self, email: &str) -> std::result::Result<User, FindError> {
        sqlx::query_as::<_, User>(
            "
            SELECT id, username, email, pwhash, session_id
            FROM users
            WHERE email = ?
            ",
        )
        .bind(email)
        .fetch_one(&self.0)
        .await
        .map_err(|e| {
            if matches!(e, sqlx::Error::RowNotFound) {
                FindError::NotFound
            } else {
                error!("error selecting user: {e:?}");
                FindError::Internal
            }
        })
    }

    /// session_id: set to None to logout / make NULL
    pub async fn update_user_session(&self, email: &str, session_id: Option<&str>) -> bool {
        sqlx::query(
            "
            UPDATE users
            SET session_id = ?
            WHERE email = ?
            ",
        )
        .bind(session_id)
        .bind(email)
        .execute(&self.0)
        .await
        .map_err(|e| {
            error!("update user: {e}");
            e
        })
        .is_ok()
    }

    pub async fn users_with_session(&self, session_id: &str) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            "
            SELECT id, username, email, pwhash, session_id
            FROM users
            WHERE session_id = ?
            ",
        )
        .bind(session_id)
        .fetch_all(&self.0)
        .await
        .map_err(|e| {
            error!("couldn't query for session {session_id}: {e:?}");
        })
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    // SQLITE_CONSTRAINT_UNIQUE
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("2067"),
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock;

    #[tokio::test]
    async fn insert_and_find() {
        let backend = Backend(mock::create_db().await);

        backend
            .create_user("rob", "rob@example.com", "$2b$fakehash")
            .await
            .unwrap();

        let user = backend.find_user("rob@example.com").await.unwrap();
        assert_eq!(user.username, "rob");
        assert_eq!(user.email, "rob@example.com");
        assert_eq!(user.pwhash, "$2b$fakehash");
        assert_eq!(user.session_id, None);
    }

    #[tokio::test]
    async fn find_missing_user() {
        let backend = Backend(mock::create_db().await);

        assert!(matches!(
            backend.find_user("nobody@example.com").await,
            Err(FindError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let backend = Backend(mock::create_db().await);

        backend
            .create_user("rob", "rob@example.com", "hash1")
            .await
            .unwrap();

        let err = backend
            .create_user("other", "rob@example.com", "hash2")
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::DuplicateEmail));

        // first row untouched
        let user = backend.find_user("rob@example.com").await.unwrap();
        assert_eq!(user.username, "rob");
        assert_eq!(user.pwhash, "hash1");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&backend.0)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn session_column_round_trip() {
        let backend = Backend(mock::create_db().await);

        backend
            .create_user("rob", "rob@example.com", "hash")
            .await
            .unwrap();

        assert!(
            backend
                .update_user_session("rob@example.com", Some("some-session"))
                .await
        );

        let users = backend.users_with_session("some-session").await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "rob@example.com");

        assert!(backend.update_user_session("rob@example.com", None).await);
        let users = backend.users_with_session("some-session").await.unwrap();
        assert!(users.is_empty());
    }
}
