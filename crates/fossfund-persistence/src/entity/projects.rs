//! Free and open source projects listed on the site

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub proj_id: i32,
    pub org_id: Option<i32>,
    pub name: String,
    pub desc: Option<String>,
    pub homepage: Option<String>,
    /// Whether a logo image has been uploaded
    pub logo: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organisations::Entity",
        from = "Column::OrgId",
        to = "super::organisations::Column::OrgId",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Organisations,
    #[sea_orm(has_many = "super::memberships::Entity")]
    Memberships,
}

impl Related<super::organisations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organisations.def()
    }
}

impl Related<super::memberships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
