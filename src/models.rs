use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{self, TextField, TextFields};

// --- Enumerations ---

/// Gender
///
/// Closed set of values accepted on registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("Unknown gender: {}", s))
    }
}

/// Role
///
/// The RBAC field on `User`. Admin signup always writes `Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Resident,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Resident => "resident",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "resident" => Ok(Role::Resident),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

// --- Core Records ---

/// User
///
/// The identity root, stored in the `users` table. Email, phone number and national ID are
/// each unique across all users. The password hash is write-only: it is never serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(rename = "NID")]
    pub nid: String,
    pub gender: Gender,
    pub phone_number: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// NewUser
///
/// Insert payload for a `User`. `password` already holds the hash.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub nid: String,
    pub gender: Gender,
    pub phone_number: String,
    pub password: String,
    pub role: Role,
}

/// AdminUser
///
/// Role-extension row for a `User` whose role is admin. Owned by, and deleted with, its user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub position: String,
    pub created_at: DateTime<Utc>,
}

/// AdminUserView
///
/// Output schema for a registered admin: every `User` field except the password, with the
/// admin `position` merged in. Built only through `compose`, so the hash cannot leak.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminUserView {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(rename = "NID")]
    pub nid: String,
    pub gender: Gender,
    pub phone_number: String,
    pub role: Role,
    pub position: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl AdminUserView {
    pub fn compose(user: User, admin: AdminUser) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            nid: user.nid,
            gender: user.gender,
            phone_number: user.phone_number,
            role: user.role,
            position: admin.position,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// AdminSignupRequest
///
/// Input payload for `POST /api/v1/admin/signup`.
///
/// Every field is optional at the type level so that a body missing several fields is
/// rejected with all of them listed, rather than failing on the first one serde meets.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminSignupRequest {
    #[schema(example = "Jane Doe")]
    #[validate(
        required(message = "fullName is required"),
        length(min = 1, message = "fullName is required"),
        custom(function = "validation::validate_not_blank", message = "fullName is required")
    )]
    pub full_name: Option<String>,

    #[schema(example = "jane@example.com")]
    #[validate(
        required(message = "email is required"),
        email(message = "Please provide a valid email")
    )]
    pub email: Option<String>,

    #[serde(rename = "NID")]
    #[schema(example = "1199080012345678")]
    #[validate(
        required(message = "National ID is required"),
        length(min = 1, message = "National ID is required"),
        regex(path = *validation::NATIONAL_ID, message = "Please provide a valid National ID")
    )]
    pub nid: Option<String>,

    #[schema(example = "female")]
    #[validate(
        required(message = "gender is required"),
        custom(function = "validation::validate_gender")
    )]
    pub gender: Option<String>,

    #[schema(example = "+250788000000")]
    #[validate(
        required(message = "Phone number is required"),
        length(min = 1, message = "Phone number is required"),
        regex(
            path = *validation::PHONE_NUMBER,
            message = "Please provide phone number, starting with country code."
        )
    )]
    pub phone_number: Option<String>,

    #[schema(example = "Str0ngPassword")]
    #[validate(
        required(message = "Password is required"),
        length(min = 1, message = "Password is required"),
        custom(function = "validation::validate_password_strength")
    )]
    pub password: Option<String>,

    #[schema(example = "Village Manager")]
    #[validate(
        required(message = "position is required"),
        length(min = 1, message = "position is required"),
        custom(function = "validation::validate_not_blank", message = "position is required")
    )]
    pub position: Option<String>,
}

impl TextFields for AdminSignupRequest {
    const TEXT_FIELDS: &'static [TextField] = &[
        TextField::new("full_name", "fullName", "fullName must be a string"),
        TextField::new("email", "email", "email must be a string"),
        TextField::new("nid", "NID", "Please provide a valid National ID"),
        TextField::new("gender", "gender", "gender must be a string"),
        TextField::new(
            "phone_number",
            "phoneNumber",
            "Please provide phone number, starting with country code.",
        ),
        TextField::new("password", "password", "Please provide a valid password"),
        TextField::new("position", "position", "position must be a string"),
    ];
}

// --- Response Payloads (Output Schemas) ---

/// SignupData
///
/// The `data` member of a successful admin signup envelope.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SignupData {
    pub admin_user: AdminUserView,
    /// Signed session token for the new admin.
    pub token: String,
}

/// HealthReport
///
/// Output schema for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HealthReport {
    pub status: String,
    pub store: String,
}

/// ServiceInfo
///
/// Output schema for `GET /index` and the development `/test` route.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub environment: String,
}
