use membership_core::domain::value_objects::permissions::Permission;

use super::AuthStaff;

/// Operations guarded by the permission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Cancel,
    Restore,
    Pause,
    Resume,
    DeleteHard,
    Read,
    CohortReport,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Cancel => "cancel",
            Operation::Restore => "restore",
            Operation::Pause => "pause",
            Operation::Resume => "resume",
            Operation::DeleteHard => "delete_hard",
            Operation::Read => "read",
            Operation::CohortReport => "cohort_report",
        }
    }

    pub fn required_permission(&self) -> Permission {
        match self {
            Operation::Create => Permission::SubscriptionsCreate,
            Operation::Update => Permission::SubscriptionsUpdate,
            Operation::Cancel => Permission::SubscriptionsCancel,
            Operation::Restore => Permission::SubscriptionsRestore,
            Operation::Pause => Permission::SubscriptionsPause,
            Operation::Resume => Permission::SubscriptionsResume,
            Operation::DeleteHard => Permission::SubscriptionsDelete,
            Operation::Read => Permission::SubscriptionsRead,
            Operation::CohortReport => Permission::ReportsRead,
        }
    }
}

pub fn authorize(staff: &AuthStaff, operation: Operation) -> bool {
    staff.permissions.contains(&operation.required_permission())
}
