//! User accounts, roles and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_not_blank, validate_password_chars, validate_reset_token};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::pet::Pet;

/// Account role. Variants are declared lowest to highest so that the derived
/// `Ord` is the authorization order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Customer,
    Staff,
    Manager,
    Admin,
}

impl Role {
    /// Whether this role is at or above `required`.
    pub fn meets_threshold(self, required: Role) -> bool {
        self >= required
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Staff => "STAFF",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CUSTOMER" => Ok(Role::Customer),
            "STAFF" => Ok(Role::Staff),
            "MANAGER" => Ok(Role::Manager),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub staff_level: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lower-cases and trims an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(
        length(
            min = 8,
            message = "Password must be at least 8 characters"
        ),
        custom(function = "validate_password_chars")
    )]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(custom(function = "validate_reset_token"))]
    pub token: String,

    #[validate(
        length(
            min = 8,
            message = "Password must be at least 8 characters"
        ),
        custom(function = "validate_password_chars")
    )]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Admin-side account creation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(
        min = 8,
        message = "Password must be at least 8 characters"
    ))]
    pub password: String,

    #[serde(default)]
    pub role: Role,

    #[validate(range(min = 0, max = 10, message = "Staff level must be between 0 and 10"))]
    pub staff_level: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub role: Option<Role>,

    #[validate(range(min = 0, max = 10, message = "Staff level must be between 0 and 10"))]
    pub staff_level: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub staff_level: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            staff_level: user.staff_level,
            created_at: user.created_at,
        }
    }
}

/// The caller's own profile with their pets.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub pets: Vec<Pet>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(password: &str, confirm: &str) -> SignUpRequest {
        SignUpRequest {
            name: "Dana".into(),
            email: "dana@example.com".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn test_role_total_order() {
        assert!(Role::Customer < Role::Staff);
        assert!(Role::Staff < Role::Manager);
        assert!(Role::Manager < Role::Admin);
    }

    #[test]
    fn test_meets_threshold() {
        assert!(Role::Admin.meets_threshold(Role::Manager));
        assert!(Role::Staff.meets_threshold(Role::Staff));
        assert!(!Role::Staff.meets_threshold(Role::Manager));
        assert!(!Role::Customer.meets_threshold(Role::Staff));
    }

    #[test]
    fn test_role_serde_uses_upper_case() {
        assert_eq!(
            serde_json::to_string(&Role::Manager).unwrap(),
            "\"MANAGER\""
        );
        let role: Role = serde_json::from_str("\"STAFF\"").unwrap();
        assert_eq!(role, Role::Staff);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("CUSTOMER".parse::<Role>().unwrap(), Role::Customer);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_signup_valid() {
        assert!(signup("longenough", "longenough").validate().is_ok());
    }

    #[test]
    fn test_signup_short_password() {
        let errors = signup("short", "short").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_signup_mismatched_confirmation() {
        let errors = signup("longenough", "different1").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("confirm_password"));
    }

    #[test]
    fn test_signup_malformed_email() {
        let mut req = signup("longenough", "longenough");
        req.email = "not-an-email".into();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_signup_blank_name() {
        let mut req = signup("longenough", "longenough");
        req.name = "   ".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_signup_deserializes_camel_case() {
        let req: SignUpRequest = serde_json::from_value(serde_json::json!({
            "name": "Dana",
            "email": "dana@example.com",
            "password": "longenough",
            "confirmPassword": "longenough"
        }))
        .unwrap();
        assert_eq!(req.confirm_password, "longenough");
    }

    #[test]
    fn test_reset_request_rejects_malformed_token() {
        let req = ResetPasswordRequest {
            token: "abc".into(),
            password: "longenough".into(),
            confirm_password: "longenough".into(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("token"));
    }

    #[test]
    fn test_create_user_defaults_to_customer() {
        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "Sam",
            "email": "sam@example.com",
            "password": "longenough"
        }))
        .unwrap();
        assert_eq!(req.role, Role::Customer);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Dana@Example.COM "), "dana@example.com");
    }

    #[test]
    fn test_user_response_omits_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Dana".into(),
            email: "dana@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Customer,
            staff_level: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));

        let response = UserResponse::from(user);
        assert_eq!(response.role, Role::Customer);
    }
}
