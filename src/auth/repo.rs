use crate::{
    auth::{principal::Role, repo_types::User},
    db::{Db, StorageError},
};

impl User {
    /// Find a user by exact username.
    pub async fn find_by_username(db: &Db, username: &str) -> Result<Option<User>, StorageError> {
        db.fetch_optional(
            r#"
            SELECT id, username, password_hash, role
            FROM users
            WHERE username = ?
            "#,
            &[username.into()],
        )
        .await
    }

    pub async fn find_by_id(db: &Db, id: i64) -> Result<Option<User>, StorageError> {
        db.fetch_optional(
            r#"SELECT id, username, password_hash, role FROM users WHERE id = ?"#,
            &[id.into()],
        )
        .await
    }

    /// Create a new user with an already hashed password.
    pub async fn create(
        db: &Db,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, StorageError> {
        db.fetch_optional(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES (?, ?, ?)
            RETURNING id, username, password_hash, role
            "#,
            &[username.into(), password_hash.into(), role.into()],
        )
        .await?
        .ok_or(StorageError::Other(sqlx::Error::RowNotFound))
    }

    pub async fn list(db: &Db) -> Result<Vec<User>, StorageError> {
        db.fetch(
            r#"SELECT id, username, password_hash, role FROM users ORDER BY id"#,
            &[],
        )
        .await
    }

    pub async fn update_role(db: &Db, id: i64, role: Role) -> Result<u64, StorageError> {
        db.execute(
            r#"UPDATE users SET role = ? WHERE id = ?"#,
            &[role.into(), id.into()],
        )
        .await
    }

    pub async fn delete(db: &Db, id: i64) -> Result<u64, StorageError> {
        db.execute(r#"DELETE FROM users WHERE id = ?"#, &[id.into()])
            .await
    }
}
