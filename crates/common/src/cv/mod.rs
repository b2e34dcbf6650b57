//! CV domain services
//!
//! Display-context assembly for the CV detail page and PDF renderer,
//! plus the contact-format rules tied to contact types.

use crate::config::TranslationConfig;
use crate::db::{CandidateSummary, ContactSummary, ProjectSummary};
use crate::errors::{AppError, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;
use validator::{ValidateEmail, ValidateUrl};

/// Fixed UI copy shown on the CV detail page and in the PDF
///
/// Field names are the wire keys the translation whitelist uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiLabels {
    pub download_btn_title: String,
    pub email_submit_btn_title: String,
    pub translate_btn_title: String,
    pub bio_title: String,
    pub skills_title: String,
    pub projects_title: String,
    pub contacts_title: String,
    pub no_bio_message: String,
    pub no_skills_message: String,
    pub no_projects_message: String,
    pub no_contacts_message: String,
}

impl Default for UiLabels {
    fn default() -> Self {
        Self {
            download_btn_title: "Download PDF".to_string(),
            email_submit_btn_title: "Send PDF".to_string(),
            translate_btn_title: "Translate".to_string(),
            bio_title: "Bio".to_string(),
            skills_title: "Skills".to_string(),
            projects_title: "Projects".to_string(),
            contacts_title: "Contacts".to_string(),
            no_bio_message: "No bio information available.".to_string(),
            no_skills_message: "No skills information available.".to_string(),
            no_projects_message: "No projects information available.".to_string(),
            no_contacts_message: "No contacts information available.".to_string(),
        }
    }
}

/// Everything the CV detail page or the PDF renderer needs to display
/// one candidate, before or after translation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvContext {
    pub candidate_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub projects: Vec<ProjectSummary>,
    pub contacts: Vec<ContactSummary>,
    pub labels: UiLabels,
    /// Languages offered by the translate control
    pub languages: Vec<String>,
    /// Non-fatal notice, e.g. a failed translation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CvContext {
    /// Build the display context from an assembled summary
    pub fn build(summary: CandidateSummary, translation: &TranslationConfig) -> Self {
        Self {
            candidate_id: summary.id,
            first_name: summary.first_name,
            last_name: summary.last_name,
            bio: summary.bio,
            skills: summary.skills,
            projects: summary.projects,
            contacts: summary.contacts,
            labels: UiLabels::default(),
            languages: translation.language_list(),
            error_message: None,
        }
    }

    /// Candidate's display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // E.164-style: optional +, 8 to 15 digits, no leading zero
    RE.get_or_init(|| Regex::new(r"^\+?[1-9][0-9]{7,14}$").unwrap())
}

/// Validate a contact value against the semantics of its type label
///
/// "email" must be a syntactically valid address, "phone" must parse as
/// an international phone number, "profile" must be an http(s) URL.
/// Unknown type labels skip format validation.
pub fn validate_contact_value(contact_type: &str, value: &str) -> Result<()> {
    match contact_type.to_ascii_lowercase().as_str() {
        "email" => {
            if !value.validate_email() {
                return Err(AppError::Validation {
                    message: format!("Not a valid email address: {}", value),
                    field: Some("value".to_string()),
                });
            }
        }
        "phone" => {
            let digits: String = value
                .chars()
                .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
                .collect();
            if !phone_regex().is_match(&digits) {
                return Err(AppError::Validation {
                    message: format!("Not a valid phone number: {}", value),
                    field: Some("value".to_string()),
                });
            }
        }
        "profile" => {
            if !value.validate_url() || !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(AppError::Validation {
                    message: format!("Not a valid profile URL: {}", value),
                    field: Some("value".to_string()),
                });
            }
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslationConfig;

    fn summary() -> CandidateSummary {
        CandidateSummary {
            id: Uuid::new_v4(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            bio: None,
            skills: vec!["Python".to_string()],
            projects: vec![],
            contacts: vec![],
        }
    }

    fn translation_config() -> TranslationConfig {
        TranslationConfig {
            api_key: None,
            api_base: None,
            model: "gpt-4o".to_string(),
            temperature: 0.3,
            timeout_secs: 30,
            max_retries: 1,
            languages: Vec::new(),
        }
    }

    #[test]
    fn test_context_build() {
        let ctx = CvContext::build(summary(), &translation_config());
        assert_eq!(ctx.full_name(), "Jane Doe");
        assert_eq!(ctx.labels.bio_title, "Bio");
        assert_eq!(ctx.labels.no_skills_message, "No skills information available.");
        assert!(!ctx.languages.is_empty());
        assert!(ctx.error_message.is_none());
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_contact_value("Email", "user@example.com").is_ok());
        assert!(validate_contact_value("email", "not-an-email").is_err());
        assert!(validate_contact_value("Email", "").is_err());
    }

    #[test]
    fn test_phone_validation() {
        assert!(validate_contact_value("Phone", "+14155552671").is_ok());
        assert!(validate_contact_value("Phone", "+44 20 7946 0958").is_ok());
        assert!(validate_contact_value("phone", "notaphone").is_err());
        assert!(validate_contact_value("Phone", "123").is_err());
    }

    #[test]
    fn test_profile_validation() {
        assert!(validate_contact_value("Profile", "https://github.com/janedoe").is_ok());
        assert!(validate_contact_value("profile", "not a url").is_err());
        assert!(validate_contact_value("Profile", "ftp://example.com/cv").is_err());
    }

    #[test]
    fn test_unknown_type_skips_validation() {
        assert!(validate_contact_value("Telegram", "@janedoe").is_ok());
        assert!(validate_contact_value("", "anything").is_ok());
    }
}
