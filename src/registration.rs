//! Admin registration: uniqueness pre-check, hashing, the two-row transaction, and token
//! issuance.

use crate::{
    auth::TokenIssuer,
    error::ApiError,
    models::{AdminSignupRequest, AdminUserView, Gender, NewUser, Role, SignupData},
    password::CredentialHasher,
    repository::Repository,
    response::FieldError,
    validation::{TextFields, collect_field_errors},
};
use validator::Validate;

/// AdminSignup
///
/// A validated, normalized admin registration.
#[derive(Debug, Clone)]
pub struct AdminSignup {
    pub full_name: String,
    pub email: String,
    pub nid: String,
    pub gender: Gender,
    pub phone_number: String,
    pub password: String,
    pub position: String,
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| {
        ApiError::Validation(vec![FieldError::new(field, format!("{} is required", field))])
    })
}

impl TryFrom<AdminSignupRequest> for AdminSignup {
    type Error = ApiError;

    /// Applies the request's validation rules, then normalizes: names are trimmed and the
    /// email is lower-cased. `ValidatedJson` has usually run the same rules already; running
    /// them here keeps direct callers from bypassing them.
    fn try_from(req: AdminSignupRequest) -> Result<Self, Self::Error> {
        if let Err(errors) = req.validate() {
            return Err(ApiError::Validation(collect_field_errors(
                &errors,
                AdminSignupRequest::TEXT_FIELDS,
            )));
        }

        let gender = required(req.gender, "gender")?
            .parse::<Gender>()
            .map_err(|reason| ApiError::Validation(vec![FieldError::new("gender", reason)]))?;

        Ok(Self {
            full_name: required(req.full_name, "fullName")?.trim().to_string(),
            email: required(req.email, "email")?.trim().to_lowercase(),
            nid: required(req.nid, "NID")?,
            gender,
            phone_number: required(req.phone_number, "phoneNumber")?,
            password: required(req.password, "password")?,
            position: required(req.position, "position")?.trim().to_string(),
        })
    }
}

/// register_admin
///
/// Runs the admin signup pipeline:
/// 1. uniqueness pre-check on email OR phone OR national ID (409, no hint which one)
/// 2. password hashing, before any transaction is opened
/// 3. `User` + `AdminUser` inserts in one transaction; a unique violation raised by the store
///    surfaces as the same 409
/// 4. token minting for the committed identity
///
/// Nothing is retried: a failed registration must be resubmitted by the caller.
pub async fn register_admin(
    repo: &dyn Repository,
    hasher: &CredentialHasher,
    tokens: &TokenIssuer,
    signup: AdminSignup,
) -> Result<SignupData, ApiError> {
    let existing = repo
        .find_user_by_any_of(&signup.email, &signup.phone_number, &signup.nid)
        .await
        .map_err(|e| ApiError::Infrastructure(e.to_string()))?;

    if existing.is_some() {
        tracing::info!("admin signup rejected: identity already registered");
        return Err(ApiError::Conflict);
    }

    let password_hash = hasher
        .hash(signup.password)
        .await
        .map_err(|e| ApiError::Infrastructure(e.to_string()))?;

    let mut tx = repo
        .begin()
        .await
        .map_err(|e| ApiError::Infrastructure(e.to_string()))?;

    let user = tx
        .create_user(NewUser {
            full_name: signup.full_name,
            email: signup.email,
            nid: signup.nid,
            gender: signup.gender,
            phone_number: signup.phone_number,
            password: password_hash,
            role: Role::Admin,
        })
        .await
        .map_err(ApiError::Transaction)?;

    // On error `tx` is dropped here, which rolls back the user row staged above.
    let admin = tx
        .create_admin_user(user.id, &signup.position)
        .await
        .map_err(ApiError::Transaction)?;

    tx.commit().await.map_err(ApiError::Transaction)?;

    let admin_user = AdminUserView::compose(user, admin);
    let token = tokens
        .issue(admin_user.id, admin_user.role)
        .map_err(|e| ApiError::Infrastructure(e.to_string()))?;

    tracing::info!(user_id = %admin_user.id, "admin registered");

    Ok(SignupData { admin_user, token })
}
