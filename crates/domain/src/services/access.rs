//! Single policy check used by every protected operation.

use thiserror::Error;
use uuid::Uuid;

use crate::models::Role;

/// The authenticated principal of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("Requires {0} role or higher")]
    InsufficientRole(Role),

    #[error("Only the owner or {0} and above may access this resource")]
    NotOwner(Role),
}

/// Grants access when the caller owns the resource or holds at least `required`.
///
/// Pass `owner = None` for pure role gates.
pub fn authorize(caller: &Caller, owner: Option<Uuid>, required: Role) -> Result<(), AccessDenied> {
    if owner == Some(caller.user_id) || caller.role.meets_threshold(required) {
        return Ok(());
    }

    Err(match owner {
        Some(_) => AccessDenied::NotOwner(required),
        None => AccessDenied::InsufficientRole(required),
    })
}

impl Caller {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn require_role(&self, required: Role) -> Result<(), AccessDenied> {
        authorize(self, None, required)
    }

    pub fn require_owner_or(&self, owner: Uuid, required: Role) -> Result<(), AccessDenied> {
        authorize(self, Some(owner), required)
    }
}
