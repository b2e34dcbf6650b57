//! SeaORM entity models
//!
//! Database entities for CVForge

mod app_user;
mod bio_item;
mod candidate;
mod candidate_project;
mod candidate_skill;
mod contact;
mod contact_type;
mod project;
mod request_log;
mod skill;

pub use app_user::{
    ActiveModel as AppUserActiveModel,
    Column as AppUserColumn,
    Entity as AppUserEntity,
    Model as AppUser,
};

pub use candidate::{
    ActiveModel as CandidateActiveModel,
    Column as CandidateColumn,
    Entity as CandidateEntity,
    Model as Candidate,
};

pub use bio_item::{
    ActiveModel as BioItemActiveModel,
    Column as BioItemColumn,
    Entity as BioItemEntity,
    Model as BioItem,
};

pub use skill::{
    ActiveModel as SkillActiveModel,
    Column as SkillColumn,
    Entity as SkillEntity,
    Model as Skill,
};

pub use candidate_skill::{
    ActiveModel as CandidateSkillActiveModel,
    Column as CandidateSkillColumn,
    Entity as CandidateSkillEntity,
    Model as CandidateSkill,
};

pub use project::{
    ActiveModel as ProjectActiveModel,
    Column as ProjectColumn,
    Entity as ProjectEntity,
    Model as Project,
};

pub use candidate_project::{
    ActiveModel as CandidateProjectActiveModel,
    Column as CandidateProjectColumn,
    Entity as CandidateProjectEntity,
    Model as CandidateProject,
};

pub use contact_type::{
    ActiveModel as ContactTypeActiveModel,
    Column as ContactTypeColumn,
    Entity as ContactTypeEntity,
    Model as ContactType,
};

pub use contact::{
    ActiveModel as ContactActiveModel,
    Column as ContactColumn,
    Entity as ContactEntity,
    Model as Contact,
};

pub use request_log::{
    ActiveModel as RequestLogActiveModel,
    Column as RequestLogColumn,
    Entity as RequestLogEntity,
    Model as RequestLog,
};
