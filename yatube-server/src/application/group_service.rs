use std::sync::Arc;

use tracing::{info, instrument};

use crate::data::group_repository::GroupRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::actor::Actor;
use crate::domain::error::DomainError;
use crate::domain::group::Group;

/// Group management. Creating and deleting groups is reserved for staff
/// users; anyone may list them.
#[derive(Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { groups, users }
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
        self.groups.list().await
    }

    #[instrument(skip(self, description))]
    pub async fn create_group(
        &self,
        actor: &Actor,
        title: String,
        slug: String,
        description: String,
    ) -> Result<Group, DomainError> {
        self.require_staff(actor).await?;
        let group = self
            .groups
            .create(Group::new(title, slug, description)?)
            .await?;
        info!(slug = %group.slug, title = %group, "group created");
        Ok(group)
    }

    /// Posts in the group are kept and lose their group reference.
    #[instrument(skip(self))]
    pub async fn delete_group(&self, actor: &Actor, slug: &str) -> Result<(), DomainError> {
        self.require_staff(actor).await?;
        if !self.groups.delete(slug).await? {
            return Err(DomainError::GroupNotFound(slug.to_string()));
        }
        Ok(())
    }

    async fn require_staff(&self, actor: &Actor) -> Result<(), DomainError> {
        let id = actor.require_id()?;
        match self.users.find_by_id(id).await? {
            Some(user) if user.is_staff => Ok(()),
            _ => Err(DomainError::Forbidden),
        }
    }
}
