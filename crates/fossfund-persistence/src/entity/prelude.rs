//! `SeaORM` Entity prelude

pub use super::groups::Entity as Groups;
pub use super::memberships::Entity as Memberships;
pub use super::organisations::Entity as Organisations;
pub use super::projects::Entity as Projects;
pub use super::sessions::Entity as Sessions;
pub use super::urls::Entity as Urls;
pub use super::users::Entity as Users;
