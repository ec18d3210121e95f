//! `SeaORM` Entity definitions for the fossfund schema

pub mod prelude;

pub mod groups;
pub mod memberships;
pub mod organisations;
pub mod projects;
pub mod sea_orm_active_enums;
pub mod sessions;
pub mod urls;
pub mod users;
