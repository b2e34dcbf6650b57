//! Candidate entity
//!
//! Root aggregate of a CV: bio, skills, projects, and contacts hang off it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "candidates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub first_name: String,

    #[sea_orm(column_type = "Text")]
    pub last_name: String,

    /// Creating user; nulled when that user is deleted
    pub created_by: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::app_user::Entity",
        from = "Column::CreatedBy",
        to = "super::app_user::Column::Id",
        on_delete = "SetNull"
    )]
    Creator,

    #[sea_orm(has_one = "super::bio_item::Entity")]
    Bio,

    #[sea_orm(has_many = "super::candidate_skill::Entity", on_delete = "Cascade")]
    CandidateSkills,

    #[sea_orm(has_many = "super::candidate_project::Entity", on_delete = "Cascade")]
    CandidateProjects,

    #[sea_orm(has_many = "super::contact::Entity", on_delete = "Cascade")]
    Contacts,
}

impl Related<super::app_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::bio_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bio.def()
    }
}

impl Related<super::candidate_skill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CandidateSkills.def()
    }
}

impl Related<super::candidate_project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CandidateProjects.def()
    }
}

impl Related<super::contact::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contacts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
