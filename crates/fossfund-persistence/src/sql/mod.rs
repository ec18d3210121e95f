//! SQL-based persistence backend (PostgreSQL via SeaORM)
//!
//! This module implements the persistence traits with direct SeaORM queries
//! against the schema created by [`crate::schema::setup`].

use async_trait::async_trait;
use sea_orm::{prelude::Expr, *};
use tracing::{debug, info};

use crate::entity::{organisations, projects, sessions, users};
use crate::model::*;
use crate::traits::*;

/// External database persistence service
///
/// Wraps a SeaORM `DatabaseConnection` and implements all persistence traits
/// by delegating to direct database queries.
#[derive(Clone, Debug)]
pub struct ExternalDbPersistService {
    db: DatabaseConnection,
}

impl ExternalDbPersistService {
    /// Create a new ExternalDbPersistService with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get a reference to the underlying database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// ============================================================================
// PersistenceService implementation
// ============================================================================

#[async_trait]
impl PersistenceService for ExternalDbPersistService {
    async fn health_check(&self) -> anyhow::Result<()> {
        self.db.ping().await?;
        Ok(())
    }
}

// ============================================================================
// ProjectPersistence implementation
// ============================================================================

#[async_trait]
impl ProjectPersistence for ExternalDbPersistService {
    async fn project_find_page(
        &self,
        page_number: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<ProjectInfo>> {
        let total_count = projects::Entity::find().count(&self.db).await?;

        if total_count == 0 {
            return Ok(Page::empty(page_number));
        }

        let Some(offset) = page_offset(page_number, page_size) else {
            return Ok(Page::new(total_count, page_number, page_size, Vec::new()));
        };

        let page_items = projects::Entity::find()
            .find_also_related(organisations::Entity)
            .order_by_asc(projects::Column::ProjId)
            .offset(offset)
            .limit(page_size)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|(project, org)| ProjectInfo::from_models(project, org))
            .collect();

        Ok(Page::new(total_count, page_number, page_size, page_items))
    }

    async fn project_find_first(&self, limit: u64) -> anyhow::Result<Vec<ProjectInfo>> {
        let projects = projects::Entity::find()
            .find_also_related(organisations::Entity)
            .order_by_asc(projects::Column::ProjId)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|(project, org)| ProjectInfo::from_models(project, org))
            .collect();

        Ok(projects)
    }

    async fn project_get(&self, proj_id: i32) -> anyhow::Result<Option<ProjectInfo>> {
        let project = projects::Entity::find_by_id(proj_id)
            .find_also_related(organisations::Entity)
            .one(&self.db)
            .await?
            .map(|(project, org)| ProjectInfo::from_models(project, org));

        Ok(project)
    }

    async fn project_create(&self, draft: &ProjectDraft, logo: bool) -> anyhow::Result<i32> {
        let entity = projects::ActiveModel {
            org_id: Set(draft.org_id),
            name: Set(draft.name.clone()),
            desc: Set(draft.desc.clone()),
            homepage: Set(draft.homepage.clone()),
            logo: Set(logo),
            ..Default::default()
        };

        let model = entity.insert(&self.db).await?;
        info!(proj_id = model.proj_id, name = %model.name, "Project created");

        Ok(model.proj_id)
    }

    async fn project_update(
        &self,
        proj_id: i32,
        draft: &ProjectDraft,
        logo: Option<bool>,
    ) -> anyhow::Result<bool> {
        match projects::Entity::find_by_id(proj_id).one(&self.db).await? {
            Some(entity) => {
                let mut project: projects::ActiveModel = entity.into();

                project.org_id = Set(draft.org_id);
                project.name = Set(draft.name.clone());
                project.desc = Set(draft.desc.clone());
                project.homepage = Set(draft.homepage.clone());
                if let Some(logo) = logo {
                    project.logo = Set(logo);
                }

                project.update(&self.db).await?;
                debug!(proj_id, "Project updated");

                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn project_set_logo(&self, proj_id: i32, logo: bool) -> anyhow::Result<bool> {
        let result = projects::Entity::update_many()
            .col_expr(projects::Column::Logo, Expr::value(logo))
            .filter(projects::Column::ProjId.eq(proj_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn project_delete(&self, proj_id: i32) -> anyhow::Result<bool> {
        let result = projects::Entity::delete_by_id(proj_id)
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            info!(proj_id, "Project deleted");
        }

        Ok(result.rows_affected > 0)
    }
}

// ============================================================================
// OrganisationPersistence implementation
// ============================================================================

#[async_trait]
impl OrganisationPersistence for ExternalDbPersistService {
    async fn organisation_find_all(&self) -> anyhow::Result<Vec<OrganisationInfo>> {
        let organisations = organisations::Entity::find()
            .order_by_asc(organisations::Column::OrgId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(OrganisationInfo::from)
            .collect();

        Ok(organisations)
    }

    async fn organisation_find_page(
        &self,
        page_number: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<OrganisationInfo>> {
        let total_count = organisations::Entity::find().count(&self.db).await?;

        if total_count == 0 {
            return Ok(Page::empty(page_number));
        }

        let Some(offset) = page_offset(page_number, page_size) else {
            return Ok(Page::new(total_count, page_number, page_size, Vec::new()));
        };

        let page_items = organisations::Entity::find()
            .order_by_asc(organisations::Column::OrgId)
            .offset(offset)
            .limit(page_size)
            .all(&self.db)
            .await?
            .into_iter()
            .map(OrganisationInfo::from)
            .collect();

        Ok(Page::new(total_count, page_number, page_size, page_items))
    }

    async fn organisation_get(&self, org_id: i32) -> anyhow::Result<Option<OrganisationInfo>> {
        let organisation = organisations::Entity::find_by_id(org_id)
            .one(&self.db)
            .await?
            .map(OrganisationInfo::from);

        Ok(organisation)
    }

    async fn organisation_create(
        &self,
        draft: &OrganisationDraft,
        logo: bool,
    ) -> anyhow::Result<i32> {
        let entity = organisations::ActiveModel {
            name: Set(draft.name.clone()),
            desc: Set(draft.desc.clone()),
            logo: Set(logo),
            ..Default::default()
        };

        let model = entity.insert(&self.db).await?;
        info!(org_id = model.org_id, name = %model.name, "Organisation created");

        Ok(model.org_id)
    }

    async fn organisation_update(
        &self,
        org_id: i32,
        draft: &OrganisationDraft,
        logo: Option<bool>,
    ) -> anyhow::Result<bool> {
        match organisations::Entity::find_by_id(org_id).one(&self.db).await? {
            Some(entity) => {
                let mut organisation: organisations::ActiveModel = entity.into();

                organisation.name = Set(draft.name.clone());
                organisation.desc = Set(draft.desc.clone());
                if let Some(logo) = logo {
                    organisation.logo = Set(logo);
                }

                organisation.update(&self.db).await?;
                debug!(org_id, "Organisation updated");

                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn organisation_set_logo(&self, org_id: i32, logo: bool) -> anyhow::Result<bool> {
        let result = organisations::Entity::update_many()
            .col_expr(organisations::Column::Logo, Expr::value(logo))
            .filter(organisations::Column::OrgId.eq(org_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn organisation_delete(&self, org_id: i32) -> anyhow::Result<bool> {
        let result = organisations::Entity::delete_by_id(org_id)
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            info!(org_id, "Organisation deleted");
        }

        Ok(result.rows_affected > 0)
    }
}

// ============================================================================
// UserPersistence implementation
// ============================================================================

#[async_trait]
impl UserPersistence for ExternalDbPersistService {
    async fn user_find_by_provider(
        &self,
        provider: OAuthProvider,
        provider_user_id: &str,
    ) -> anyhow::Result<Option<UserInfo>> {
        let user = users::Entity::find()
            .filter(users::Column::Provider.eq(provider))
            .filter(users::Column::ProviderUserId.eq(provider_user_id))
            .one(&self.db)
            .await?
            .map(UserInfo::from);

        Ok(user)
    }

    async fn user_create(
        &self,
        provider: OAuthProvider,
        provider_user_id: &str,
    ) -> anyhow::Result<UserInfo> {
        let entity = users::ActiveModel {
            provider: Set(Some(provider)),
            provider_user_id: Set(Some(provider_user_id.to_string())),
            joined: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };

        let model = entity.insert(&self.db).await?;
        info!(user_id = model.user_id, %provider, "User created");

        Ok(UserInfo::from(model))
    }

    async fn session_create(&self, user_id: i32) -> anyhow::Result<String> {
        let ses_id = uuid::Uuid::new_v4().to_string();

        let entity = sessions::ActiveModel {
            ses_id: Set(ses_id.clone()),
            user_id: Set(user_id),
        };

        sessions::Entity::insert(entity).exec(&self.db).await?;
        debug!(user_id, "Session created");

        Ok(ses_id)
    }

    async fn session_find_user(&self, ses_id: &str) -> anyhow::Result<Option<UserInfo>> {
        let user = users::Entity::find()
            .inner_join(sessions::Entity)
            .filter(sessions::Column::SesId.eq(ses_id))
            .one(&self.db)
            .await?
            .map(UserInfo::from);

        Ok(user)
    }

    async fn session_delete(&self, ses_id: &str) -> anyhow::Result<bool> {
        let result = sessions::Entity::delete_by_id(ses_id.to_string())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
