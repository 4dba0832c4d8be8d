//! Staff permission resolution.
//!
//! A staff member's effective permission set comes from one of three
//! profiles: an explicit custom list, the preset of their role, or the
//! read-only subset of that preset.

use std::{collections::HashSet, fmt::Display};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Permission {
    #[serde(rename = "subscriptions.read")]
    SubscriptionsRead,
    #[serde(rename = "subscriptions.create")]
    SubscriptionsCreate,
    #[serde(rename = "subscriptions.update")]
    SubscriptionsUpdate,
    #[serde(rename = "subscriptions.cancel")]
    SubscriptionsCancel,
    #[serde(rename = "subscriptions.restore")]
    SubscriptionsRestore,
    #[serde(rename = "subscriptions.pause")]
    SubscriptionsPause,
    #[serde(rename = "subscriptions.resume")]
    SubscriptionsResume,
    #[serde(rename = "subscriptions.delete")]
    SubscriptionsDelete,
    #[serde(rename = "reports.read")]
    ReportsRead,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::SubscriptionsRead => "subscriptions.read",
            Permission::SubscriptionsCreate => "subscriptions.create",
            Permission::SubscriptionsUpdate => "subscriptions.update",
            Permission::SubscriptionsCancel => "subscriptions.cancel",
            Permission::SubscriptionsRestore => "subscriptions.restore",
            Permission::SubscriptionsPause => "subscriptions.pause",
            Permission::SubscriptionsResume => "subscriptions.resume",
            Permission::SubscriptionsDelete => "subscriptions.delete",
            Permission::ReportsRead => "reports.read",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Permission::SubscriptionsRead | Permission::ReportsRead)
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Owner,
    Manager,
    Receptionist,
    Trainer,
}

impl StaffRole {
    pub fn preset(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            StaffRole::Owner => &[
                SubscriptionsRead,
                SubscriptionsCreate,
                SubscriptionsUpdate,
                SubscriptionsCancel,
                SubscriptionsRestore,
                SubscriptionsPause,
                SubscriptionsResume,
                SubscriptionsDelete,
                ReportsRead,
            ],
            StaffRole::Manager => &[
                SubscriptionsRead,
                SubscriptionsCreate,
                SubscriptionsUpdate,
                SubscriptionsCancel,
                SubscriptionsRestore,
                SubscriptionsPause,
                SubscriptionsResume,
                ReportsRead,
            ],
            StaffRole::Receptionist => &[
                SubscriptionsRead,
                SubscriptionsCreate,
                SubscriptionsPause,
                SubscriptionsResume,
            ],
            StaffRole::Trainer => &[SubscriptionsRead],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "permissions", rename_all = "snake_case")]
pub enum PermissionProfile {
    Custom(Vec<Permission>),
    RoleDefault,
    ReadOnly,
}

pub fn resolve(role: StaffRole, profile: &PermissionProfile) -> HashSet<Permission> {
    match profile {
        PermissionProfile::Custom(permissions) => permissions.iter().copied().collect(),
        PermissionProfile::RoleDefault => role.preset().iter().copied().collect(),
        PermissionProfile::ReadOnly => role
            .preset()
            .iter()
            .copied()
            .filter(Permission::is_read_only)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_default_uses_the_preset() {
        let permissions = resolve(StaffRole::Receptionist, &PermissionProfile::RoleDefault);

        assert!(permissions.contains(&Permission::SubscriptionsPause));
        assert!(!permissions.contains(&Permission::SubscriptionsDelete));
        assert_eq!(permissions.len(), StaffRole::Receptionist.preset().len());
    }

    #[test]
    fn read_only_keeps_only_read_permissions_of_the_preset() {
        let permissions = resolve(StaffRole::Manager, &PermissionProfile::ReadOnly);

        assert_eq!(
            permissions,
            HashSet::from([Permission::SubscriptionsRead, Permission::ReportsRead])
        );
    }

    #[test]
    fn read_only_never_grants_beyond_the_preset() {
        let permissions = resolve(StaffRole::Trainer, &PermissionProfile::ReadOnly);

        assert_eq!(permissions, HashSet::from([Permission::SubscriptionsRead]));
    }

    #[test]
    fn custom_list_ignores_the_role() {
        let profile = PermissionProfile::Custom(vec![Permission::ReportsRead, Permission::ReportsRead]);

        let permissions = resolve(StaffRole::Owner, &profile);

        assert_eq!(permissions, HashSet::from([Permission::ReportsRead]));
    }

    #[test]
    fn profile_deserializes_from_tagged_json() {
        let profile: PermissionProfile = serde_json::from_str(
            r#"{"kind":"custom","permissions":["subscriptions.pause","reports.read"]}"#,
        )
        .unwrap();
        assert_eq!(
            profile,
            PermissionProfile::Custom(vec![Permission::SubscriptionsPause, Permission::ReportsRead])
        );

        let profile: PermissionProfile = serde_json::from_str(r#"{"kind":"read_only"}"#).unwrap();
        assert_eq!(profile, PermissionProfile::ReadOnly);
    }
}
