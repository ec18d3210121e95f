//! Organisation persistence trait

use async_trait::async_trait;

use crate::model::{OrganisationDraft, OrganisationInfo, Page};

/// Organisation persistence operations
#[async_trait]
pub trait OrganisationPersistence: Send + Sync {
    /// Find all organisations, ordered by ID
    async fn organisation_find_all(&self) -> anyhow::Result<Vec<OrganisationInfo>>;

    /// Find one page of organisations
    async fn organisation_find_page(
        &self,
        page_number: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<OrganisationInfo>>;

    /// Get an organisation by its ID
    async fn organisation_get(&self, org_id: i32) -> anyhow::Result<Option<OrganisationInfo>>;

    /// Create a new organisation, returning its ID
    async fn organisation_create(
        &self,
        draft: &OrganisationDraft,
        logo: bool,
    ) -> anyhow::Result<i32>;

    /// Update an existing organisation
    ///
    /// `logo` of `None` leaves the logo flag unchanged.
    async fn organisation_update(
        &self,
        org_id: i32,
        draft: &OrganisationDraft,
        logo: Option<bool>,
    ) -> anyhow::Result<bool>;

    /// Set the logo flag of an organisation
    async fn organisation_set_logo(&self, org_id: i32, logo: bool) -> anyhow::Result<bool>;

    /// Delete an organisation; its projects lose their organisation
    async fn organisation_delete(&self, org_id: i32) -> anyhow::Result<bool>;
}
