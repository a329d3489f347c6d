//! Student/admin account storage. Credential hashing and registration
//! business rules are out of scope for the core (spec.md §1); this module
//! only provides what `/auth/login` needs (spec.md §9 open question: the
//! hashing algorithm choice is out of scope but must be deterministic).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub student_id: String,
    pub email: String,
    pub full_name: String,
    pub hashed_password: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("identity-service migration failed")
}

pub async fn find_by_student_id(pool: &PgPool, student_id: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        select id, student_id, email, full_name, hashed_password, is_admin, is_active, created_at
        from users
        where student_id = $1
        "#,
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await
    .context("find_by_student_id failed")?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        select id, student_id, email, full_name, hashed_password, is_admin, is_active, created_at
        from users
        where id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("find_by_id failed")?;
    Ok(user)
}

pub async fn insert_user(
    pool: &PgPool,
    student_id: &str,
    email: &str,
    full_name: &str,
    hashed_password: &str,
    is_admin: bool,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        insert into users (student_id, email, full_name, hashed_password, is_admin)
        values ($1, $2, $3, $4, $5)
        returning id, student_id, email, full_name, hashed_password, is_admin, is_active, created_at
        "#,
    )
    .bind(student_id)
    .bind(email)
    .bind(full_name)
    .bind(hashed_password)
    .bind(is_admin)
    .fetch_one(pool)
    .await
    .context("insert_user failed")?;
    Ok(user)
}

pub async fn update_password(pool: &PgPool, user_id: Uuid, hashed_password: &str) -> Result<()> {
    sqlx::query("update users set hashed_password = $1 where id = $2")
        .bind(hashed_password)
        .bind(user_id)
        .execute(pool)
        .await
        .context("update_password failed")?;
    Ok(())
}
