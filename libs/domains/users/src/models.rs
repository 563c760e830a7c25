use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{UserError, UserResult};

/// User aggregate
///
/// Independent of how the store lays the record out. `id` is assigned once
/// by the service and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Always lower-case
    pub email: String,
    pub phone_number: i64,
}

/// DTO for creating a user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(range(min = 0))]
    pub phone_number: i64,
}

/// Partial update: absent fields are left as they are
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    #[schema(example = "user@example.com")]
    pub email: Option<String>,
    #[validate(range(min = 0))]
    pub phone_number: Option<i64>,
}

/// Public projection of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "0b9f1c1e-6f0a-4b8e-9a57-0d4f1c3b2a10")]
    pub id: String,
    pub name: String,
    #[schema(example = "user@example.com")]
    pub email: String,
    pub phone_number: i64,
}

/// Lookup and uniqueness depend on the canonical form
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Build an aggregate, enforcing its invariants.
    ///
    /// The email is normalized before it is stored.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: &str,
        phone_number: i64,
    ) -> UserResult<Self> {
        let id = id.into();
        let name = name.into();

        if id.trim().is_empty() {
            return Err(UserError::Validation("id must not be empty".to_string()));
        }
        check_name(&name)?;
        let email = normalize_email(email);
        check_email(&email)?;
        check_phone_number(phone_number)?;

        Ok(Self {
            id,
            name,
            email,
            phone_number,
        })
    }

    /// Merge the fields present in `update`.
    ///
    /// Either every present field is applied or, on an invalid value, none is.
    pub fn apply_update(&mut self, update: UpdateUser) -> UserResult<()> {
        if let Some(ref name) = update.name {
            check_name(name)?;
        }
        let email = update.email.as_deref().map(normalize_email);
        if let Some(ref email) = email {
            check_email(email)?;
        }
        if let Some(phone_number) = update.phone_number {
            check_phone_number(phone_number)?;
        }

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(phone_number) = update.phone_number {
            self.phone_number = phone_number;
        }
        Ok(())
    }
}

fn check_name(name: &str) -> UserResult<()> {
    if name.trim().is_empty() {
        return Err(UserError::Validation("name must not be empty".to_string()));
    }
    Ok(())
}

fn check_email(email: &str) -> UserResult<()> {
    if email.is_empty() {
        return Err(UserError::Validation("email must not be empty".to_string()));
    }
    Ok(())
}

fn check_phone_number(phone_number: i64) -> UserResult<()> {
    if phone_number < 0 {
        return Err(UserError::Validation(
            "phone_number must not be negative".to_string(),
        ));
    }
    Ok(())
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone_number: user.phone_number,
        }
    }
}
