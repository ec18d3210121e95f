//! Project persistence trait

use async_trait::async_trait;

use crate::model::{Page, ProjectDraft, ProjectInfo};

/// Project persistence operations
#[async_trait]
pub trait ProjectPersistence: Send + Sync {
    /// Find one page of projects, joined with their organisations
    async fn project_find_page(
        &self,
        page_number: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<ProjectInfo>>;

    /// Find the first `limit` projects, joined with their organisations
    async fn project_find_first(&self, limit: u64) -> anyhow::Result<Vec<ProjectInfo>>;

    /// Get a project by its ID
    async fn project_get(&self, proj_id: i32) -> anyhow::Result<Option<ProjectInfo>>;

    /// Create a new project, returning its ID
    async fn project_create(&self, draft: &ProjectDraft, logo: bool) -> anyhow::Result<i32>;

    /// Update an existing project
    ///
    /// `logo` of `None` leaves the logo flag unchanged.
    async fn project_update(
        &self,
        proj_id: i32,
        draft: &ProjectDraft,
        logo: Option<bool>,
    ) -> anyhow::Result<bool>;

    /// Set the logo flag of a project
    async fn project_set_logo(&self, proj_id: i32, logo: bool) -> anyhow::Result<bool>;

    /// Delete a project
    async fn project_delete(&self, proj_id: i32) -> anyhow::Result<bool>;
}
