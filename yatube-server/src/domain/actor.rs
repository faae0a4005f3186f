use uuid::Uuid;

use crate::domain::error::DomainError;

/// Whoever is attempting an operation, as resolved by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User { id: Uuid, username: String },
}

impl Actor {
    pub fn user(id: Uuid, username: impl Into<String>) -> Self {
        Actor::User {
            id,
            username: username.into(),
        }
    }

    /// Id of the signed-in user, or `Unauthorized` for anonymous actors.
    pub fn require_id(&self) -> Result<Uuid, DomainError> {
        match self {
            Actor::User { id, .. } => Ok(*id),
            Actor::Anonymous => Err(DomainError::Unauthorized),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Actor::User { username, .. } => Some(username),
            Actor::Anonymous => None,
        }
    }

    pub fn is(&self, user_id: Uuid) -> bool {
        matches!(self, Actor::User { id, .. } if *id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_has_no_identity() {
        assert!(matches!(
            Actor::Anonymous.require_id(),
            Err(DomainError::Unauthorized)
        ));
        assert!(!Actor::Anonymous.is(Uuid::nil()));
    }

    #[test]
    fn user_matches_only_own_id() {
        let id = Uuid::new_v4();
        let actor = Actor::user(id, "author_user");
        assert!(actor.is(id));
        assert!(!actor.is(Uuid::new_v4()));
        assert_eq!(actor.username(), Some("author_user"));
    }
}
