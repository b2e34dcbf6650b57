//! Skill entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "skills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text", unique)]
    pub name: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::candidate_skill::Entity", on_delete = "Cascade")]
    CandidateSkills,
}

impl Related<super::candidate_skill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CandidateSkills.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
