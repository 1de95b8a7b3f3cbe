use crate::models::{AdminUser, Gender, NewUser, Role, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// RepositoryError
///
/// Storage failures, classified so callers can tell a late-detected duplicate (a unique
/// constraint firing inside the transaction) apart from an infrastructure fault.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("write rejected: {0}")]
    WriteFailed(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl RepositoryError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, RepositoryError::UniqueViolation(_))
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepositoryError::UniqueViolation(
                    db_err.constraint().unwrap_or("unknown").to_string(),
                )
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                RepositoryError::Unavailable(e.to_string())
            }
            other => RepositoryError::Database(other),
        }
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// The abstract contract for user persistence. Handlers and the registration pipeline only
/// ever see `Arc<dyn Repository>`, so Postgres and the in-memory store are interchangeable.
///
/// **Send + Sync + async_trait** are required to share the trait object across Axum's
/// asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Cheap liveness probe used by the health route.
    async fn ping(&self) -> RepoResult<()>;

    /// Any user whose email OR phone number OR national ID matches. Read-only pre-check;
    /// the store's unique constraints remain the source of truth.
    async fn find_user_by_any_of(
        &self,
        email: &str,
        phone_number: &str,
        nid: &str,
    ) -> RepoResult<Option<User>>;

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;

    /// Opens an all-or-nothing unit of work. Dropping the returned value without calling
    /// `commit` discards every write made through it.
    async fn begin(&self) -> RepoResult<Box<dyn RegistrationTx>>;
}

/// RegistrationTx
///
/// Writes performed inside one transaction. Nothing is visible to other readers until
/// `commit` succeeds.
#[async_trait]
pub trait RegistrationTx: Send {
    async fn create_user(&mut self, user: NewUser) -> RepoResult<User>;

    async fn create_admin_user(&mut self, user_id: Uuid, position: &str) -> RepoResult<AdminUser>;

    async fn commit(self: Box<Self>) -> RepoResult<()>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

// --- Row Mapping ---

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    full_name: String,
    email: String,
    nid: String,
    gender: String,
    phone_number: String,
    password: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let gender: Gender = row.gender.parse().map_err(RepositoryError::Corrupt)?;
        let role: Role = row.role.parse().map_err(RepositoryError::Corrupt)?;

        Ok(User {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            nid: row.nid,
            gender,
            phone_number: row.phone_number,
            password: row.password,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    id: Uuid,
    user_id: Uuid,
    position: String,
    created_at: DateTime<Utc>,
}

impl From<AdminUserRow> for AdminUser {
    fn from(row: AdminUserRow) -> Self {
        AdminUser {
            id: row.id,
            user_id: row.user_id,
            position: row.position,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, full_name, email, nid, gender, phone_number, password, role, created_at, updated_at";

// --- Postgres ---

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL. Uniqueness of
/// email, phone number and national ID is enforced by table constraints (see `migrations/`).
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user_by_any_of(
        &self,
        email: &str,
        phone_number: &str,
        nid: &str,
    ) -> RepoResult<Option<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1) OR phone_number = $2 OR nid = $3 LIMIT 1"
        );

        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .bind(phone_number)
            .bind(nid)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn begin(&self) -> RepoResult<Box<dyn RegistrationTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresRegistration { tx }))
    }
}

/// PostgresRegistration
///
/// A live Postgres transaction. sqlx rolls it back on drop unless `commit` ran.
pub struct PostgresRegistration {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RegistrationTx for PostgresRegistration {
    async fn create_user(&mut self, user: NewUser) -> RepoResult<User> {
        let query = format!(
            r#"
            INSERT INTO users (id, full_name, email, nid, gender, phone_number, password, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.nid)
            .bind(user.gender.as_str())
            .bind(&user.phone_number)
            .bind(&user.password)
            .bind(user.role.as_str())
            .fetch_one(&mut *self.tx)
            .await?;

        User::try_from(row)
    }

    async fn create_admin_user(&mut self, user_id: Uuid, position: &str) -> RepoResult<AdminUser> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r#"
            INSERT INTO admin_users (id, user_id, position, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, user_id, position, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(position)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row.into())
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
