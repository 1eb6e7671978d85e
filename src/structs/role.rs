use serde::Serialize;

use super::permission::Permission;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub permissions: Permission,
    pub is_default: bool,
}

impl Role {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }

    pub fn add_permission(&mut self, permission: Permission) {
        self.permissions.insert(permission);
    }

    pub fn remove_permission(&mut self, permission: Permission) {
        self.permissions.remove(permission);
    }

    pub fn reset_permissions(&mut self) {
        self.permissions = Permission::empty();
    }
}

/// One row of the role table applied at bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSeed {
    pub name: String,
    pub permissions: Vec<Permission>,
    pub is_default: bool,
}

impl RoleSeed {
    pub fn new(name: &str, permissions: &[Permission], is_default: bool) -> Self {
        Self {
            name: name.to_string(),
            permissions: permissions.to_vec(),
            is_default,
        }
    }

    /// OR of every listed flag.
    pub fn mask(&self) -> Permission {
        self.permissions
            .iter()
            .fold(Permission::empty(), |mask, permission| mask | *permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(permissions: Permission) -> Role {
        Role {
            id: 1,
            name: "Tester".to_string(),
            permissions,
            is_default: false,
        }
    }

    #[test]
    fn test_add_and_remove_permission() {
        let mut r = role(Permission::empty());
        r.add_permission(Permission::FOLLOW);
        r.add_permission(Permission::WRITE);
        r.add_permission(Permission::WRITE);
        assert!(r.has_permission(Permission::FOLLOW));
        assert!(r.has_permission(Permission::WRITE));
        assert_eq!(r.permissions.to_db(), 5);

        r.remove_permission(Permission::FOLLOW);
        assert!(!r.has_permission(Permission::FOLLOW));
        assert!(r.has_permission(Permission::WRITE));

        r.reset_permissions();
        assert!(r.permissions.is_empty());
    }

    #[test]
    fn test_seed_mask() {
        let seed = RoleSeed::new(
            "Moderator",
            &[
                Permission::FOLLOW,
                Permission::COMMENT,
                Permission::WRITE,
                Permission::MODERATE,
            ],
            false,
        );
        assert_eq!(seed.mask().to_db(), 15);
        assert_eq!(RoleSeed::new("Empty", &[], false).mask(), Permission::empty());
    }
}
