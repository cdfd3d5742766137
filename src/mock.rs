use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::backend;

pub async fn create_db() -> Pool<Sqlite> {
    // one connection, or each pool checkout would see its own :memory: db
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();

    backend::ensure_schema(&db).await.unwrap();

    db
}
