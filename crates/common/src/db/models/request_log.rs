//! RequestLog entity
//!
//! Append-only audit record of an inbound request. Rows are never
//! updated or deleted by the system.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "request_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub timestamp: DateTimeWithTimeZone,

    #[sea_orm(column_type = "Text")]
    pub method: String,

    #[sea_orm(column_type = "Text")]
    pub path: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub query_string: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub remote_ip: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,

    /// Acting user; nulled when that user is deleted
    pub user_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::app_user::Entity",
        from = "Column::UserId",
        to = "super::app_user::Column::Id",
        on_delete = "SetNull"
    )]
    User,
}

impl Related<super::app_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
