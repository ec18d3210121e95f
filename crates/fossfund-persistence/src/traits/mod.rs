//! Persistence traits for the storage abstraction layer
//!
//! Handlers depend on these traits rather than on a database connection so
//! that the SQL backend can be swapped for another implementation.

pub mod organisation;
pub mod project;
pub mod user;

pub use organisation::OrganisationPersistence;
pub use project::ProjectPersistence;
pub use user::UserPersistence;

use async_trait::async_trait;

/// Unified persistence service trait
#[async_trait]
pub trait PersistenceService:
    ProjectPersistence + OrganisationPersistence + UserPersistence + Send + Sync
{
    /// Health check for the storage backend
    async fn health_check(&self) -> anyhow::Result<()>;
}
