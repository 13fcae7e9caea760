use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sqlx::{
    error::ErrorKind,
    migrate::Migrator,
    query::{Query, QueryAs},
    sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    FromRow, Sqlite,
};
use tracing::debug;

pub mod retry;

pub use retry::RetryPolicy;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

// Primary SQLite result codes; extended codes carry these in the low byte.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_CONSTRAINT: i32 = 19;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Transient engine fault (locked/busy file, I/O, exhausted pool).
    #[error("storage unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error("constraint violation: {0}")]
    ConstraintViolation(#[source] sqlx::Error),
    #[error("storage error: {0}")]
    Other(#[source] sqlx::Error),
}

impl StorageError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Unavailable(_))
    }
}

enum Class {
    Unavailable,
    Constraint,
    Other,
}

fn classify(err: &sqlx::Error) -> Class {
    match err {
        sqlx::Error::Database(db_err) => {
            let primary = db_err
                .code()
                .and_then(|c| c.parse::<i32>().ok())
                .map(|c| c & 0xff);
            match primary {
                Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => Class::Unavailable,
                Some(SQLITE_CONSTRAINT) => Class::Constraint,
                _ => match db_err.kind() {
                    ErrorKind::UniqueViolation
                    | ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation => Class::Constraint,
                    _ => Class::Other,
                },
            }
        }
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => Class::Unavailable,
        _ => Class::Other,
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match classify(&err) {
            Class::Unavailable => StorageError::Unavailable(err),
            Class::Constraint => StorageError::ConstraintViolation(err),
            Class::Other => StorageError::Other(err),
        }
    }
}

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Int(i64),
    Text(String),
    Null,
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Param::Null)
    }
}

/// One statement of an atomic batch.
#[derive(Debug, Clone)]
pub struct Statement<'a> {
    pub sql: &'a str,
    pub params: Vec<Param>,
}

impl<'a> Statement<'a> {
    pub fn new(sql: &'a str, params: Vec<Param>) -> Self {
        Self { sql, params }
    }
}

fn bind_query<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [Param],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for p in params {
        query = match p {
            Param::Int(v) => query.bind(*v),
            Param::Text(s) => query.bind(s.as_str()),
            Param::Null => query.bind(None::<String>),
        };
    }
    query
}

fn bind_query_as<'q, T>(
    mut query: QueryAs<'q, Sqlite, T, SqliteArguments<'q>>,
    params: &'q [Param],
) -> QueryAs<'q, Sqlite, T, SqliteArguments<'q>> {
    for p in params {
        query = match p {
            Param::Int(v) => query.bind(*v),
            Param::Text(s) => query.bind(s.as_str()),
            Param::Null => query.bind(None::<String>),
        };
    }
    query
}

/// Storage accessor. Every call checks a connection out of the pool and
/// hands it back when the call returns, on success and on failure alike.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl Db {
    pub async fn connect(url: &str, max_connections: u32, retry: RetryPolicy) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("parse database url {}", url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_millis(250));
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("connect to database")?;
        Ok(Self { pool, retry })
    }

    pub fn from_pool(pool: SqlitePool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs a write statement and returns the number of affected rows.
    pub async fn execute(&self, sql: &str, params: &[Param]) -> Result<u64, StorageError> {
        self.retry.run(|| self.execute_once(sql, params)).await
    }

    pub async fn fetch<T>(&self, sql: &str, params: &[Param]) -> Result<Vec<T>, StorageError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        self.retry.run(|| self.fetch_once::<T>(sql, params)).await
    }

    pub async fn fetch_optional<T>(
        &self,
        sql: &str,
        params: &[Param],
    ) -> Result<Option<T>, StorageError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        self.retry
            .run(|| self.fetch_optional_once::<T>(sql, params))
            .await
    }

    /// Runs all statements in one transaction. Any failure rolls the whole
    /// batch back.
    pub async fn execute_atomic(&self, statements: &[Statement<'_>]) -> Result<u64, StorageError> {
        self.retry.run(|| self.execute_atomic_once(statements)).await
    }

    async fn execute_once(&self, sql: &str, params: &[Param]) -> Result<u64, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let done = bind_query(sqlx::query(sql), params)
            .execute(&mut *conn)
            .await?;
        Ok(done.rows_affected())
    }

    async fn fetch_once<T>(&self, sql: &str, params: &[Param]) -> Result<Vec<T>, StorageError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut conn = self.pool.acquire().await?;
        let rows = bind_query_as(sqlx::query_as::<_, T>(sql), params)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }

    async fn fetch_optional_once<T>(
        &self,
        sql: &str,
        params: &[Param],
    ) -> Result<Option<T>, StorageError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut conn = self.pool.acquire().await?;
        let row = bind_query_as(sqlx::query_as::<_, T>(sql), params)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    async fn execute_atomic_once(&self, statements: &[Statement<'_>]) -> Result<u64, StorageError> {
        // An early return drops `tx`, which rolls back.
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;
        for st in statements {
            affected += bind_query(sqlx::query(st.sql), &st.params)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        debug!(statements = statements.len(), affected, "atomic batch committed");
        Ok(affected)
    }
}

/// Tables in drop order (dependents first).
const TABLES: &[&str] = &[
    "appointments",
    "patients",
    "available_time_slots",
    "doctors",
    "departments",
    "users",
    "_sqlx_migrations",
];

/// Drops every table and recreates the schema from the embedded migrations.
pub async fn reset_schema(db: &Db) -> anyhow::Result<()> {
    for table in TABLES {
        let sql = format!("DROP TABLE IF EXISTS {}", table);
        db.execute(&sql, &[])
            .await
            .with_context(|| format!("drop table {}", table))?;
    }
    MIGRATOR.run(db.pool()).await.context("run migrations")?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, FromRow, PartialEq)]
    struct Dept {
        id: i64,
        name: String,
    }

    #[test]
    fn param_from_option() {
        assert_eq!(Param::from(None::<String>), Param::Null);
        assert_eq!(Param::from(Some("x")), Param::Text("x".into()));
        assert_eq!(Param::from(3i64), Param::Int(3));
    }

    #[tokio::test]
    async fn execute_and_fetch() {
        let (db, _dir) = test_db::fresh().await;
        let n = db
            .execute("INSERT INTO departments (name) VALUES (?)", &["Cardiology".into()])
            .await
            .unwrap();
        assert_eq!(n, 1);

        let rows: Vec<Dept> = db
            .fetch("SELECT id, name FROM departments ORDER BY id", &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Cardiology");

        let none: Option<Dept> = db
            .fetch_optional("SELECT id, name FROM departments WHERE id = ?", &[999i64.into()])
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn unique_violation_is_constraint() {
        let (db, _dir) = test_db::fresh().await;
        db.execute("INSERT INTO departments (name) VALUES (?)", &["ER".into()])
            .await
            .unwrap();
        let err = db
            .execute("INSERT INTO departments (name) VALUES (?)", &["ER".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)), "{err:?}");
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let (db, _dir) = test_db::fresh().await;
        let err = db
            .execute(
                "INSERT INTO appointments (patient_id, doctor_id, date, time, status) \
                 VALUES (?, ?, ?, ?, 'Pending')",
                &[42i64.into(), 42i64.into(), "2025-01-01".into(), "10:00".into()],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn malformed_sql_is_other() {
        let (db, _dir) = test_db::fresh().await;
        let err = db.execute("SELEC nonsense", &[]).await.unwrap_err();
        assert!(matches!(err, StorageError::Other(_)), "{err:?}");
    }

    #[tokio::test]
    async fn locked_database_is_unavailable_and_retried() {
        use std::sync::atomic::{AtomicU32, Ordering};

        static CHECKS: AtomicU32 = AtomicU32::new(0);

        let (db, dir) = test_db::fresh().await;
        let url = format!("sqlite://{}", dir.path().join("hospital.db").display());
        let other = SqlitePool::connect(&url).await.unwrap();
        let mut holder = other.acquire().await.unwrap();
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *holder)
            .await
            .unwrap();

        let policy = RetryPolicy {
            retryable: |e| {
                CHECKS.fetch_add(1, Ordering::SeqCst);
                e.is_transient()
            },
            ..RetryPolicy::fixed(3, Duration::from_millis(1))
        };
        let locked = Db::from_pool(db.pool().clone(), policy);
        let err = locked
            .execute("INSERT INTO departments (name) VALUES (?)", &["Oncology".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)), "{err:?}");
        assert!(err.is_transient());
        assert_eq!(CHECKS.load(Ordering::SeqCst), 3);

        sqlx::query("ROLLBACK").execute(&mut *holder).await.unwrap();
        db.execute("INSERT INTO departments (name) VALUES (?)", &["Oncology".into()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_batch_rolls_back() {
        let (db, _dir) = test_db::fresh().await;
        let batch = [
            Statement::new("INSERT INTO departments (name) VALUES (?)", vec!["A".into()]),
            Statement::new("INSERT INTO departments (name) VALUES (?)", vec!["A".into()]),
        ];
        let err = db.execute_atomic(&batch).await.unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));

        let rows: Vec<Dept> = db.fetch("SELECT id, name FROM departments", &[]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn reset_schema_empties_tables() {
        let (db, _dir) = test_db::fresh().await;
        db.execute("INSERT INTO departments (name) VALUES (?)", &["ICU".into()])
            .await
            .unwrap();
        reset_schema(&db).await.unwrap();
        let rows: Vec<Dept> = db.fetch("SELECT id, name FROM departments", &[]).await.unwrap();
        assert!(rows.is_empty());
    }
}
