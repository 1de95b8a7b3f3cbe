use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{AdminUser, NewUser, User};
use crate::repository::{RegistrationTx, RepoResult, Repository, RepositoryError};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    admin_users: HashMap<Uuid, AdminUser>,
}

impl Tables {
    /// Name of the unique key `user` would collide on, if any.
    fn conflicting_key(&self, user: &User) -> Option<&'static str> {
        self.users.values().find_map(|existing| {
            if existing.email.to_lowercase() == user.email.to_lowercase() {
                Some("users_email_key")
            } else if existing.phone_number == user.phone_number {
                Some("users_phone_number_key")
            } else if existing.nid == user.nid {
                Some("users_nid_key")
            } else {
                None
            }
        })
    }
}

#[derive(Default)]
struct Faults {
    fail_admin_insert: AtomicBool,
    unavailable: AtomicBool,
}

impl Faults {
    fn check_available(&self) -> RepoResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

/// InMemoryRepository
///
/// A process-local implementation of `Repository` with the same guarantees the Postgres schema
/// gives: email (case-insensitively), phone number and national ID are unique, and a
/// registration commits both of its rows or neither. Uniqueness is re-checked under the table
/// lock at commit, so two registrations racing past the read-only pre-check cannot both
/// succeed.
///
/// Faults can be injected to exercise rollback and infrastructure-failure paths.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Faults>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `create_admin_user` call fails after the user row has been staged.
    pub fn with_failing_admin_insert() -> Self {
        let repo = Self::default();
        repo.faults.fail_admin_insert.store(true, Ordering::SeqCst);
        repo
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    pub async fn admin_user_count(&self) -> usize {
        self.tables.lock().await.admin_users.len()
    }

    pub async fn admin_user_for(&self, user_id: Uuid) -> Option<AdminUser> {
        self.tables
            .lock()
            .await
            .admin_users
            .values()
            .find(|admin| admin.user_id == user_id)
            .cloned()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn ping(&self) -> RepoResult<()> {
        self.faults.check_available()
    }

    async fn find_user_by_any_of(
        &self,
        email: &str,
        phone_number: &str,
        nid: &str,
    ) -> RepoResult<Option<User>> {
        self.faults.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| {
                u.email.to_lowercase() == email.to_lowercase()
                    || u.phone_number == phone_number
                    || u.nid == nid
            })
            .cloned())
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        self.faults.check_available()?;
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn begin(&self) -> RepoResult<Box<dyn RegistrationTx>> {
        self.faults.check_available()?;
        Ok(Box::new(InMemoryRegistration {
            tables: Arc::clone(&self.tables),
            faults: Arc::clone(&self.faults),
            users: Vec::new(),
            admin_users: Vec::new(),
        }))
    }
}

/// InMemoryRegistration
///
/// Staged writes. Nothing touches the shared tables until `commit`.
pub struct InMemoryRegistration {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Faults>,
    users: Vec<User>,
    admin_users: Vec<AdminUser>,
}

#[async_trait]
impl RegistrationTx for InMemoryRegistration {
    async fn create_user(&mut self, user: NewUser) -> RepoResult<User> {
        self.faults.check_available()?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            full_name: user.full_name,
            email: user.email,
            nid: user.nid,
            gender: user.gender,
            phone_number: user.phone_number,
            password: user.password,
            role: user.role,
            created_at: now,
            updated_at: now,
        };

        // Immediate constraint check against committed rows, as a database would do on INSERT.
        if let Some(key) = self.tables.lock().await.conflicting_key(&user) {
            return Err(RepositoryError::UniqueViolation(key.to_string()));
        }

        self.users.push(user.clone());
        Ok(user)
    }

    async fn create_admin_user(&mut self, user_id: Uuid, position: &str) -> RepoResult<AdminUser> {
        self.faults.check_available()?;

        if self.faults.fail_admin_insert.load(Ordering::SeqCst) {
            return Err(RepositoryError::WriteFailed(
                "injected admin_users insert failure".to_string(),
            ));
        }

        let user_known = self.users.iter().any(|u| u.id == user_id)
            || self.tables.lock().await.users.contains_key(&user_id);
        if !user_known {
            return Err(RepositoryError::WriteFailed(format!(
                "admin_users.user_id references missing user {}",
                user_id
            )));
        }

        let admin = AdminUser {
            id: Uuid::new_v4(),
            user_id,
            position: position.to_string(),
            created_at: Utc::now(),
        };
        self.admin_users.push(admin.clone());
        Ok(admin)
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let InMemoryRegistration {
            tables,
            faults,
            users,
            admin_users,
        } = *self;
        faults.check_available()?;

        let mut tables = tables.lock().await;

        // Re-check under the lock: another registration may have committed since our INSERT.
        for user in &users {
            if let Some(key) = tables.conflicting_key(user) {
                return Err(RepositoryError::UniqueViolation(key.to_string()));
            }
        }

        for user in users {
            tables.users.insert(user.id, user);
        }
        for admin in admin_users {
            tables.admin_users.insert(admin.id, admin);
        }
        Ok(())
    }
}
