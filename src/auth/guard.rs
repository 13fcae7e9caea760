//! Role-based capability checks shared by every handler.

use tracing::debug;

use crate::{
    auth::principal::{Principal, Role},
    error::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Appointment,
    AppointmentStatus,
    Department,
    Doctor,
    Patient,
    TimeSlot,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

/// Admins may do anything. Patients may browse the catalogue, book or read
/// appointments and file a patient record; appointment reads are scoped to
/// their own rows by the caller.
pub fn allows(principal: &Principal, resource: Resource, action: Action) -> bool {
    match principal.role {
        Role::Admin => true,
        Role::Patient => matches!(
            (resource, action),
            (Resource::Appointment, Action::Create | Action::Read)
                | (Resource::Patient, Action::Create)
                | (Resource::Doctor | Resource::Department | Resource::TimeSlot, Action::Read)
        ),
    }
}

pub fn require(principal: &Principal, resource: Resource, action: Action) -> Result<(), AppError> {
    if allows(principal, resource, action) {
        Ok(())
    } else {
        debug!(user_id = principal.id, ?resource, ?action, "capability denied");
        Err(AppError::Forbidden)
    }
}

pub fn require_all(principal: &Principal, caps: &[(Resource, Action)]) -> Result<(), AppError> {
    caps.iter()
        .try_for_each(|&(resource, action)| require(principal, resource, action))
}
