//! CVForge Mailer Worker
//!
//! Processes CV email jobs from the SQS queue:
//! 1. Receives a job (candidate reference + recipient)
//! 2. Recomputes the display context, translating when requested
//! 3. Renders the CV PDF
//! 4. Delivers the message through the mail provider API

mod processor;

use crate::processor::EmailProcessor;
use cvforge_common::{
    config::AppConfig,
    db::DbPool,
    mailer::MailClient,
    metrics::record_email,
    queue::{CvEmailJobMessage, Queue, QueueConfig},
    translation::TranslationPipeline,
    VERSION,
};
use std::sync::Arc;
use tracing::{error, info, warn, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting CVForge Mailer Worker v{}", VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    // Initialize mail client; the worker is useless without one
    let mail = MailClient::from_config(&config.mailer)?;

    // Initialize the translation pipeline (optional)
    let translator = match TranslationPipeline::from_config(&config.translation) {
        Ok(pipeline) => Some(Arc::new(pipeline)),
        Err(e) => {
            warn!(error = %e, "Translation disabled");
            None
        }
    };

    let processor = EmailProcessor::new(db, config.translation.clone(), translator, mail);

    // Initialize email queue
    let email_queue = match config.queue.email_queue_url.clone() {
        Some(url) => {
            info!(url = %url, "Connecting to email queue...");
            let queue_config = QueueConfig {
                url,
                dlq_url: config.queue.dlq_url.clone(),
                visibility_timeout: config.queue.visibility_timeout_secs as i32,
                wait_time_seconds: config.queue.poll_timeout_secs as i32,
                max_messages: config.queue.batch_size as i32,
            };
            Queue::new(queue_config).await?
        }
        None => {
            warn!("queue.email_queue_url not set, waiting for shutdown signal...");
            tokio::signal::ctrl_c().await?;
            info!("Mailer worker shutting down");
            return Ok(());
        }
    };

    info!("Mailer worker ready, starting queue polling...");

    // Circuit breaker state
    let mut consecutive_failures = 0;
    const MAX_FAILURES: u32 = 5;
    const CIRCUIT_BREAK_DURATION: std::time::Duration = std::time::Duration::from_secs(30);

    // Start polling loop
    loop {
        // Circuit breaker check
        if consecutive_failures >= MAX_FAILURES {
            warn!(
                failures = consecutive_failures,
                "Circuit breaker open, pausing..."
            );
            tokio::time::sleep(CIRCUIT_BREAK_DURATION).await;
            consecutive_failures = 0;
            info!("Circuit breaker reset, resuming...");
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            result = email_queue.receive() => {
                match result {
                    Ok(messages) => {
                        for message in messages {
                            let receipt_handle = message.receipt_handle.clone().unwrap_or_default();

                            let job: CvEmailJobMessage = match Queue::parse_message(&message) {
                                Ok(job) => job,
                                Err(e) => {
                                    error!(error = %e, "Dropping unparsable job message");
                                    if let Err(e) = email_queue.delete(&receipt_handle).await {
                                        error!(error = %e, "Failed to delete message");
                                    }
                                    continue;
                                }
                            };

                            info!(
                                candidate_id = %job.candidate_id,
                                recipient = %job.recipient,
                                "Received CV email job"
                            );

                            match processor.process_job(job.clone()).await {
                                Ok(()) => {
                                    consecutive_failures = 0;
                                    // Delete message on success
                                    if let Err(e) = email_queue.delete(&receipt_handle).await {
                                        error!(error = %e, "Failed to delete message");
                                    }
                                }
                                Err(e) => {
                                    consecutive_failures += 1;
                                    record_email(false);
                                    error!(
                                        candidate_id = %job.candidate_id,
                                        error = %e,
                                        failures = consecutive_failures,
                                        "Failed to process CV email job"
                                    );
                                    // Message will be re-delivered or moved to DLQ
                                }
                            }
                        }
                    }
                    Err(e) => {
                        consecutive_failures += 1;
                        error!(error = %e, "Failed to receive messages from queue");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    }
                }
            }
        }
    }

    info!("Mailer worker shutting down");
    Ok(())
}
