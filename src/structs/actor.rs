use super::{permission::Permission, role::Role, user::User};

/// A signed-in user together with the role it resolved to.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub role: Option<Role>,
}

impl AuthUser {
    /// A user without a role holds no permissions.
    pub fn can(&self, permission: Permission) -> bool {
        self.role
            .as_ref()
            .is_some_and(|role| role.has_permission(permission))
    }
}

/// Whoever is performing the current operation.
#[derive(Debug, Clone)]
pub enum Actor {
    Authenticated(AuthUser),
    Anonymous,
}

impl Actor {
    pub fn can(&self, permission: Permission) -> bool {
        match self {
            Actor::Authenticated(auth_user) => auth_user.can(permission),
            Actor::Anonymous => false,
        }
    }

    pub fn is_administrator(&self) -> bool {
        self.can(Permission::ADMIN)
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Actor::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Actor::Authenticated(auth_user) => Some(&auth_user.user),
            Actor::Anonymous => None,
        }
    }
}
