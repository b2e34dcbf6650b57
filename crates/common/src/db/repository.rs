//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling and transaction support. Association
//! traversal is explicit (`find_bio_by_candidate_id`,
//! `find_contacts_by_candidate_id`) so NotFound paths are visible in
//! the signatures instead of hidden behind relation attributes.

use crate::cv::validate_contact_value;
use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Consolidated read view of a candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub projects: Vec<ProjectSummary>,
    pub contacts: Vec<ContactSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSummary {
    pub contact_type: String,
    pub value: String,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    /// Create a new user with a pre-hashed password
    pub async fn create_user(&self, username: String, password_hash: String) -> Result<AppUser> {
        if self.find_user_by_username(&username).await?.is_some() {
            return Err(AppError::Duplicate {
                message: format!("Username already taken: {}", username),
            });
        }

        let user = AppUserActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username),
            password_hash: Set(password_hash),
            created_at: Set(chrono::Utc::now().into()),
        };

        user.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find user by username
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<AppUser>> {
        AppUserEntity::find()
            .filter(AppUserColumn::Username.eq(username))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Candidate Operations
    // ========================================================================

    /// Create a new candidate
    pub async fn create_candidate(
        &self,
        first_name: String,
        last_name: String,
        created_by: Option<Uuid>,
    ) -> Result<Candidate> {
        let candidate = CandidateActiveModel {
            id: Set(Uuid::new_v4()),
            first_name: Set(first_name),
            last_name: Set(last_name),
            created_by: Set(created_by),
            created_at: Set(chrono::Utc::now().into()),
        };

        candidate.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find candidate by ID
    pub async fn find_candidate_by_id(&self, id: Uuid) -> Result<Option<Candidate>> {
        CandidateEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find candidate by ID, failing with CandidateNotFound
    pub async fn get_candidate(&self, id: Uuid) -> Result<Candidate> {
        self.find_candidate_by_id(id)
            .await?
            .ok_or_else(|| AppError::CandidateNotFound { id: id.to_string() })
    }

    /// List candidates with pagination
    pub async fn list_candidates(&self, offset: u64, limit: u64) -> Result<(Vec<Candidate>, u64)> {
        let paginator = CandidateEntity::find()
            .order_by_desc(CandidateColumn::CreatedAt)
            .paginate(self.read_conn(), limit);

        let total = paginator.num_items().await?;
        let candidates = paginator.fetch_page(offset / limit.max(1)).await?;

        Ok((candidates, total))
    }

    /// Update a candidate's name
    pub async fn update_candidate(
        &self,
        id: Uuid,
        first_name: String,
        last_name: String,
    ) -> Result<Candidate> {
        let mut candidate: CandidateActiveModel = self.get_candidate(id).await?.into();

        candidate.first_name = Set(first_name);
        candidate.last_name = Set(last_name);

        candidate.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete candidate by ID
    pub async fn delete_candidate(&self, id: Uuid) -> Result<bool> {
        let result = CandidateEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // BioItem Operations
    // ========================================================================

    /// Create a bio for a candidate
    ///
    /// Fails validation before persistence if the candidate already has
    /// one; the unique column is the backstop, not the primary check.
    pub async fn create_bio_item(&self, candidate_id: Uuid, bio: String) -> Result<BioItem> {
        self.get_candidate(candidate_id).await?;

        if self.find_bio_by_candidate_id(candidate_id).await?.is_some() {
            return Err(AppError::Validation {
                message: format!("Candidate {} already has a bio", candidate_id),
                field: Some("candidate_id".to_string()),
            });
        }

        let item = BioItemActiveModel {
            id: Set(Uuid::new_v4()),
            bio: Set(bio),
            candidate_id: Set(candidate_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        item.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find bio item by ID
    pub async fn find_bio_item_by_id(&self, id: Uuid) -> Result<Option<BioItem>> {
        BioItemEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find the bio belonging to a candidate
    pub async fn find_bio_by_candidate_id(&self, candidate_id: Uuid) -> Result<Option<BioItem>> {
        BioItemEntity::find()
            .filter(BioItemColumn::CandidateId.eq(candidate_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List bio items with pagination
    pub async fn list_bio_items(&self, offset: u64, limit: u64) -> Result<(Vec<BioItem>, u64)> {
        let paginator = BioItemEntity::find()
            .order_by_desc(BioItemColumn::CreatedAt)
            .paginate(self.read_conn(), limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(offset / limit.max(1)).await?;

        Ok((items, total))
    }

    /// Update a bio item's text
    pub async fn update_bio_item(&self, id: Uuid, bio: String) -> Result<BioItem> {
        let mut item: BioItemActiveModel = self
            .find_bio_item_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                resource_type: "bio_item".to_string(),
                id: id.to_string(),
            })?
            .into();

        item.bio = Set(bio);

        item.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete bio item by ID
    pub async fn delete_bio_item(&self, id: Uuid) -> Result<bool> {
        let result = BioItemEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Skill Operations
    // ========================================================================

    /// Create a skill with a unique name
    pub async fn create_skill(&self, name: String) -> Result<Skill> {
        if self.find_skill_by_name(&name).await?.is_some() {
            return Err(AppError::Duplicate {
                message: format!("Skill already exists: {}", name),
            });
        }

        let skill = SkillActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(chrono::Utc::now().into()),
        };

        skill.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find skill by ID
    pub async fn find_skill_by_id(&self, id: Uuid) -> Result<Option<Skill>> {
        SkillEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find skill by name
    pub async fn find_skill_by_name(&self, name: &str) -> Result<Option<Skill>> {
        SkillEntity::find()
            .filter(SkillColumn::Name.eq(name))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List skills with pagination
    pub async fn list_skills(&self, offset: u64, limit: u64) -> Result<(Vec<Skill>, u64)> {
        let paginator = SkillEntity::find()
            .order_by_asc(SkillColumn::Name)
            .paginate(self.read_conn(), limit);

        let total = paginator.num_items().await?;
        let skills = paginator.fetch_page(offset / limit.max(1)).await?;

        Ok((skills, total))
    }

    /// Rename a skill
    pub async fn update_skill(&self, id: Uuid, name: String) -> Result<Skill> {
        if let Some(existing) = self.find_skill_by_name(&name).await? {
            if existing.id != id {
                return Err(AppError::Duplicate {
                    message: format!("Skill already exists: {}", name),
                });
            }
        }

        let mut skill: SkillActiveModel = self
            .find_skill_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                resource_type: "skill".to_string(),
                id: id.to_string(),
            })?
            .into();

        skill.name = Set(name);

        skill.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete skill by ID
    pub async fn delete_skill(&self, id: Uuid) -> Result<bool> {
        let result = SkillEntity::delete_by_id(id).exec(self.write_conn()).await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // CandidateSkill Operations
    // ========================================================================

    /// Link a candidate to a skill
    pub async fn create_candidate_skill(
        &self,
        candidate_id: Uuid,
        skill_id: Uuid,
    ) -> Result<CandidateSkill> {
        self.get_candidate(candidate_id).await?;
        self.find_skill_by_id(skill_id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                resource_type: "skill".to_string(),
                id: skill_id.to_string(),
            })?;

        let link = CandidateSkillActiveModel {
            id: Set(Uuid::new_v4()),
            candidate_id: Set(candidate_id),
            skill_id: Set(skill_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        link.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find candidate-skill link by ID
    pub async fn find_candidate_skill_by_id(&self, id: Uuid) -> Result<Option<CandidateSkill>> {
        CandidateSkillEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List candidate-skill links with pagination
    pub async fn list_candidate_skills(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<CandidateSkill>, u64)> {
        let paginator = CandidateSkillEntity::find()
            .order_by_desc(CandidateSkillColumn::CreatedAt)
            .paginate(self.read_conn(), limit);

        let total = paginator.num_items().await?;
        let links = paginator.fetch_page(offset / limit.max(1)).await?;

        Ok((links, total))
    }

    /// Delete a candidate-skill link, removing the skill when orphaned
    ///
    /// The link delete, the orphan re-check, and the skill delete run in
    /// one transaction: a concurrent link create against the same skill
    /// either lands before the check (skill survives) or after commit
    /// (skill already gone, the create fails its foreign key). Returns
    /// whether the skill was removed.
    pub async fn delete_candidate_skill(&self, id: Uuid) -> Result<bool> {
        let txn = self.write_conn().begin().await?;

        let link = CandidateSkillEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::AssociationNotFound { id: id.to_string() })?;

        let skill_id = link.skill_id;

        CandidateSkillEntity::delete_by_id(id).exec(&txn).await?;

        let remaining = CandidateSkillEntity::find()
            .filter(CandidateSkillColumn::SkillId.eq(skill_id))
            .count(&txn)
            .await?;

        let skill_removed = remaining == 0;
        if skill_removed {
            SkillEntity::delete_by_id(skill_id).exec(&txn).await?;
        }

        txn.commit().await?;

        tracing::info!(
            candidate_skill_id = %id,
            skill_id = %skill_id,
            skill_removed,
            "Candidate-skill link deleted"
        );

        Ok(skill_removed)
    }

    // ========================================================================
    // Project Operations
    // ========================================================================

    /// Create a project
    pub async fn create_project(&self, name: String, description: String) -> Result<Project> {
        let project = ProjectActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(description),
            created_at: Set(chrono::Utc::now().into()),
        };

        project.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find project by ID
    pub async fn find_project_by_id(&self, id: Uuid) -> Result<Option<Project>> {
        ProjectEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List projects with pagination
    pub async fn list_projects(&self, offset: u64, limit: u64) -> Result<(Vec<Project>, u64)> {
        let paginator = ProjectEntity::find()
            .order_by_asc(ProjectColumn::Name)
            .paginate(self.read_conn(), limit);

        let total = paginator.num_items().await?;
        let projects = paginator.fetch_page(offset / limit.max(1)).await?;

        Ok((projects, total))
    }

    /// Update a project
    pub async fn update_project(
        &self,
        id: Uuid,
        name: String,
        description: String,
    ) -> Result<Project> {
        let mut project: ProjectActiveModel = self
            .find_project_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                resource_type: "project".to_string(),
                id: id.to_string(),
            })?
            .into();

        project.name = Set(name);
        project.description = Set(description);

        project.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete project by ID
    pub async fn delete_project(&self, id: Uuid) -> Result<bool> {
        let result = ProjectEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // CandidateProject Operations
    // ========================================================================

    /// Link a candidate to a project
    pub async fn create_candidate_project(
        &self,
        candidate_id: Uuid,
        project_id: Uuid,
    ) -> Result<CandidateProject> {
        self.get_candidate(candidate_id).await?;
        self.find_project_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                resource_type: "project".to_string(),
                id: project_id.to_string(),
            })?;

        let link = CandidateProjectActiveModel {
            id: Set(Uuid::new_v4()),
            candidate_id: Set(candidate_id),
            project_id: Set(project_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        link.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find candidate-project link by ID
    pub async fn find_candidate_project_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<CandidateProject>> {
        CandidateProjectEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List candidate-project links with pagination
    pub async fn list_candidate_projects(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<CandidateProject>, u64)> {
        let paginator = CandidateProjectEntity::find()
            .order_by_desc(CandidateProjectColumn::CreatedAt)
            .paginate(self.read_conn(), limit);

        let total = paginator.num_items().await?;
        let links = paginator.fetch_page(offset / limit.max(1)).await?;

        Ok((links, total))
    }

    /// Delete a candidate-project link, removing the project when orphaned
    ///
    /// Same transactional contract as [`Self::delete_candidate_skill`].
    pub async fn delete_candidate_project(&self, id: Uuid) -> Result<bool> {
        let txn = self.write_conn().begin().await?;

        let link = CandidateProjectEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::AssociationNotFound { id: id.to_string() })?;

        let project_id = link.project_id;

        CandidateProjectEntity::delete_by_id(id).exec(&txn).await?;

        let remaining = CandidateProjectEntity::find()
            .filter(CandidateProjectColumn::ProjectId.eq(project_id))
            .count(&txn)
            .await?;

        let project_removed = remaining == 0;
        if project_removed {
            ProjectEntity::delete_by_id(project_id).exec(&txn).await?;
        }

        txn.commit().await?;

        tracing::info!(
            candidate_project_id = %id,
            project_id = %project_id,
            project_removed,
            "Candidate-project link deleted"
        );

        Ok(project_removed)
    }

    // ========================================================================
    // ContactType Operations
    // ========================================================================

    /// Create a contact type with a unique label
    pub async fn create_contact_type(&self, name: String) -> Result<ContactType> {
        if self.find_contact_type_by_name(&name).await?.is_some() {
            return Err(AppError::Duplicate {
                message: format!("Contact type already exists: {}", name),
            });
        }

        let contact_type = ContactTypeActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(chrono::Utc::now().into()),
        };

        contact_type.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find contact type by ID
    pub async fn find_contact_type_by_id(&self, id: Uuid) -> Result<Option<ContactType>> {
        ContactTypeEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find contact type by label
    pub async fn find_contact_type_by_name(&self, name: &str) -> Result<Option<ContactType>> {
        ContactTypeEntity::find()
            .filter(ContactTypeColumn::Name.eq(name))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List contact types with pagination
    pub async fn list_contact_types(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<ContactType>, u64)> {
        let paginator = ContactTypeEntity::find()
            .order_by_asc(ContactTypeColumn::Name)
            .paginate(self.read_conn(), limit);

        let total = paginator.num_items().await?;
        let types = paginator.fetch_page(offset / limit.max(1)).await?;

        Ok((types, total))
    }

    /// Rename a contact type
    pub async fn update_contact_type(&self, id: Uuid, name: String) -> Result<ContactType> {
        if let Some(existing) = self.find_contact_type_by_name(&name).await? {
            if existing.id != id {
                return Err(AppError::Duplicate {
                    message: format!("Contact type already exists: {}", name),
                });
            }
        }

        let mut contact_type: ContactTypeActiveModel = self
            .find_contact_type_by_id(id)
            .await?
            .ok_or_else(|| AppError::ContactTypeNotFound { id: id.to_string() })?
            .into();

        contact_type.name = Set(name);

        contact_type.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete contact type by ID
    pub async fn delete_contact_type(&self, id: Uuid) -> Result<bool> {
        let result = ContactTypeEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Contact Operations
    // ========================================================================

    /// Create a contact, validating the value against its type semantics
    pub async fn create_contact(
        &self,
        candidate_id: Uuid,
        contact_type_id: Uuid,
        value: String,
    ) -> Result<Contact> {
        self.get_candidate(candidate_id).await?;

        let contact_type = self
            .find_contact_type_by_id(contact_type_id)
            .await?
            .ok_or_else(|| AppError::ContactTypeNotFound {
                id: contact_type_id.to_string(),
            })?;

        validate_contact_value(&contact_type.name, &value)?;

        let duplicate = ContactEntity::find()
            .filter(ContactColumn::Value.eq(value.as_str()))
            .one(self.read_conn())
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Duplicate {
                message: format!("Contact value already exists: {}", value),
            });
        }

        let contact = ContactActiveModel {
            id: Set(Uuid::new_v4()),
            value: Set(value),
            candidate_id: Set(candidate_id),
            contact_type_id: Set(contact_type_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        contact.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find contact by ID
    pub async fn find_contact_by_id(&self, id: Uuid) -> Result<Option<Contact>> {
        ContactEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find all contacts belonging to a candidate
    pub async fn find_contacts_by_candidate_id(&self, candidate_id: Uuid) -> Result<Vec<Contact>> {
        ContactEntity::find()
            .filter(ContactColumn::CandidateId.eq(candidate_id))
            .order_by_asc(ContactColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List contacts with pagination
    pub async fn list_contacts(&self, offset: u64, limit: u64) -> Result<(Vec<Contact>, u64)> {
        let paginator = ContactEntity::find()
            .order_by_desc(ContactColumn::CreatedAt)
            .paginate(self.read_conn(), limit);

        let total = paginator.num_items().await?;
        let contacts = paginator.fetch_page(offset / limit.max(1)).await?;

        Ok((contacts, total))
    }

    /// Update a contact's value, re-validating against its type
    pub async fn update_contact(&self, id: Uuid, value: String) -> Result<Contact> {
        let existing = self
            .find_contact_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                resource_type: "contact".to_string(),
                id: id.to_string(),
            })?;

        let contact_type = self
            .find_contact_type_by_id(existing.contact_type_id)
            .await?
            .ok_or_else(|| AppError::ContactTypeNotFound {
                id: existing.contact_type_id.to_string(),
            })?;

        validate_contact_value(&contact_type.name, &value)?;

        let mut contact: ContactActiveModel = existing.into();
        contact.value = Set(value);

        contact.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete contact by ID
    pub async fn delete_contact(&self, id: Uuid) -> Result<bool> {
        let result = ContactEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Summary Assembly
    // ========================================================================

    /// Assemble the consolidated read view of a candidate
    ///
    /// Read-only. Skills and projects are deduplicated by entity id, so
    /// duplicated join rows collapse to one entry; association order is
    /// preserved otherwise.
    pub async fn candidate_summary(&self, candidate_id: Uuid) -> Result<CandidateSummary> {
        let candidate = self.get_candidate(candidate_id).await?;

        let bio = self
            .find_bio_by_candidate_id(candidate_id)
            .await?
            .map(|item| item.bio);

        // Skills through the join table, in association order
        let skill_links = CandidateSkillEntity::find()
            .filter(CandidateSkillColumn::CandidateId.eq(candidate_id))
            .order_by_asc(CandidateSkillColumn::CreatedAt)
            .all(self.read_conn())
            .await?;

        let skill_ids: Vec<Uuid> = skill_links.iter().map(|l| l.skill_id).collect();
        let skills_by_id: HashMap<Uuid, Skill> = SkillEntity::find()
            .filter(SkillColumn::Id.is_in(skill_ids))
            .all(self.read_conn())
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut seen_skills = HashSet::new();
        let mut skills = Vec::new();
        for link in &skill_links {
            if seen_skills.insert(link.skill_id) {
                if let Some(skill) = skills_by_id.get(&link.skill_id) {
                    skills.push(skill.name.clone());
                }
            }
        }

        // Projects through the join table
        let project_links = CandidateProjectEntity::find()
            .filter(CandidateProjectColumn::CandidateId.eq(candidate_id))
            .order_by_asc(CandidateProjectColumn::CreatedAt)
            .all(self.read_conn())
            .await?;

        let project_ids: Vec<Uuid> = project_links.iter().map(|l| l.project_id).collect();
        let projects_by_id: HashMap<Uuid, Project> = ProjectEntity::find()
            .filter(ProjectColumn::Id.is_in(project_ids))
            .all(self.read_conn())
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut seen_projects = HashSet::new();
        let mut projects = Vec::new();
        for link in &project_links {
            if seen_projects.insert(link.project_id) {
                if let Some(project) = projects_by_id.get(&link.project_id) {
                    projects.push(ProjectSummary {
                        name: project.name.clone(),
                        description: project.description.clone(),
                    });
                }
            }
        }

        // Contacts with their type labels
        let contact_rows = self.find_contacts_by_candidate_id(candidate_id).await?;

        let type_ids: Vec<Uuid> = contact_rows.iter().map(|c| c.contact_type_id).collect();
        let types_by_id: HashMap<Uuid, ContactType> = ContactTypeEntity::find()
            .filter(ContactTypeColumn::Id.is_in(type_ids))
            .all(self.read_conn())
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let contacts = contact_rows
            .into_iter()
            .map(|c| ContactSummary {
                contact_type: types_by_id
                    .get(&c.contact_type_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_default(),
                value: c.value,
            })
            .collect();

        Ok(CandidateSummary {
            id: candidate.id,
            first_name: candidate.first_name,
            last_name: candidate.last_name,
            bio,
            skills,
            projects,
            contacts,
        })
    }

    // ========================================================================
    // Request Log Operations
    // ========================================================================

    /// Append a request log record (audit trail; never updated)
    pub async fn insert_request_log(
        &self,
        method: String,
        path: String,
        query_string: Option<String>,
        remote_ip: Option<String>,
        user_agent: Option<String>,
        user_id: Option<Uuid>,
    ) -> Result<RequestLog> {
        let log = RequestLogActiveModel {
            id: Set(Uuid::new_v4()),
            timestamp: Set(chrono::Utc::now().into()),
            method: Set(method),
            path: Set(path),
            query_string: Set(query_string),
            remote_ip: Set(remote_ip),
            user_agent: Set(user_agent),
            user_id: Set(user_id),
        };

        log.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// List request logs, newest first
    pub async fn list_request_logs(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<RequestLog>, u64)> {
        let paginator = RequestLogEntity::find()
            .order_by_desc(RequestLogColumn::Timestamp)
            .paginate(self.read_conn(), limit);

        let total = paginator.num_items().await?;
        let logs = paginator.fetch_page(offset / limit.max(1)).await?;

        Ok((logs, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serialization_shape() {
        let summary = CandidateSummary {
            id: Uuid::new_v4(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            bio: None,
            skills: vec!["Python".to_string()],
            projects: vec![],
            contacts: vec![],
        };

        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(value["first_name"], "Jane");
        assert_eq!(value["last_name"], "Doe");
        assert_eq!(value["skills"], serde_json::json!(["Python"]));
        assert_eq!(value["bio"], serde_json::Value::Null);
        assert_eq!(value["projects"], serde_json::json!([]));
        assert_eq!(value["contacts"], serde_json::json!([]));
    }

    #[test]
    fn test_contact_summary_serialization() {
        let contact = ContactSummary {
            contact_type: "Email".to_string(),
            value: "jane.doe@example.com".to_string(),
        };

        let value = serde_json::to_value(&contact).unwrap();
        assert_eq!(value["contact_type"], "Email");
        assert_eq!(value["value"], "jane.doe@example.com");
    }
}
