//! CV email job processor
//!
//! Recomputes the candidate's display context from the database,
//! applies best-effort translation, renders the PDF, and posts the
//! message through the mail provider.

use cvforge_common::{
    config::TranslationConfig,
    cv::CvContext,
    db::{DbPool, Repository},
    errors::Result,
    mailer::{EmailAttachment, MailClient},
    metrics::record_email,
    pdf::render_cv_pdf,
    queue::CvEmailJobMessage,
    translation::TranslationPipeline,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct EmailProcessor {
    repo: Repository,
    translation: TranslationConfig,
    translator: Option<Arc<TranslationPipeline>>,
    mail: MailClient,
}

impl EmailProcessor {
    pub fn new(
        db: DbPool,
        translation: TranslationConfig,
        translator: Option<Arc<TranslationPipeline>>,
        mail: MailClient,
    ) -> Self {
        Self {
            repo: Repository::new(db),
            translation,
            translator,
            mail,
        }
    }

    /// Process one CV email job
    ///
    /// Translation is best-effort: a failed translation sends the
    /// original-language CV rather than failing the job. Delivery
    /// failures propagate so the queue's redelivery policy applies.
    pub async fn process_job(&self, job: CvEmailJobMessage) -> Result<()> {
        let summary = self.repo.candidate_summary(job.candidate_id).await?;
        let mut ctx = CvContext::build(summary, &self.translation);

        if let Some(language) = &job.language {
            match &self.translator {
                Some(pipeline) => match pipeline.translate_context(language, &ctx).await {
                    Ok(translated) => ctx = translated,
                    Err(e) if e.is_translation_failure() => {
                        warn!(
                            candidate_id = %job.candidate_id,
                            language,
                            error = %e,
                            "Translation failed, sending original content"
                        );
                    }
                    Err(e) => return Err(e),
                },
                None => {
                    warn!(
                        candidate_id = %job.candidate_id,
                        "Translation not configured, sending original content"
                    );
                }
            }
        }

        let rendered = render_cv_pdf(&ctx)?;

        let subject = format!("Candidate CV: {} {}", ctx.first_name, ctx.last_name);
        let body = format!(
            "Dear User,\n\nPlease find attached the CV of {} {}.",
            ctx.first_name, ctx.last_name
        );

        let attachment = EmailAttachment {
            filename: rendered.filename.clone(),
            content_type: "application/pdf".to_string(),
            bytes: rendered.bytes,
        };

        self.mail
            .send(&job.recipient, &subject, &body, Some(&attachment))
            .await?;

        record_email(true);

        info!(
            candidate_id = %job.candidate_id,
            recipient = %job.recipient,
            filename = %rendered.filename,
            "CV email delivered"
        );

        Ok(())
    }
}
