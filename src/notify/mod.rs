use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::MailConfig;
use crate::jobs::repo::Job;
use crate::jobs::status::JobStatus;

pub mod templates;

/// Outbound notification capability. Delivery is best-effort everywhere it is
/// called: a failed send is logged by the caller and never fails the
/// operation that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_otp(&self, email: &str, name: &str, otp: &str) -> anyhow::Result<()>;

    async fn notify_status_change(
        &self,
        email: &str,
        name: &str,
        job: &Job,
        old_status: JobStatus,
        new_status: JobStatus,
    ) -> anyhow::Result<()>;

    async fn notify_reminder(&self, email: &str, name: &str, job: &Job) -> anyhow::Result<()>;
}

/// Delivers mail by posting JSON to an HTTP mail API.
pub struct MailNotifier {
    http: reqwest::Client,
    config: MailConfig,
}

impl MailNotifier {
    pub fn new(config: MailConfig) -> anyhow::Result<Self> {
        // Cap the wait per send; a slow mail API must not stall a scan.
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("build mail http client")?;
        Ok(Self { http, config })
    }

    async fn deliver(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let resp = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&serde_json::json!({
                "from": self.config.from,
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await
            .context("mail api request")?;
        resp.error_for_status().context("mail api response")?;
        debug!(to = %to, subject = %subject, "mail delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for MailNotifier {
    async fn send_otp(&self, email: &str, name: &str, otp: &str) -> anyhow::Result<()> {
        let (subject, html) = templates::otp_email(name, otp);
        self.deliver(email, &subject, &html).await
    }

    async fn notify_status_change(
        &self,
        email: &str,
        name: &str,
        job: &Job,
        old_status: JobStatus,
        new_status: JobStatus,
    ) -> anyhow::Result<()> {
        let (subject, html) = templates::status_update_email(name, job, old_status, new_status);
        self.deliver(email, &subject, &html).await
    }

    async fn notify_reminder(&self, email: &str, name: &str, job: &Job) -> anyhow::Result<()> {
        let (subject, html) = templates::deadline_reminder_email(name, job);
        self.deliver(email, &subject, &html).await
    }
}

/// Stand-in when mail is not configured: records the intent in the log and
/// reports success.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_otp(&self, email: &str, _name: &str, _otp: &str) -> anyhow::Result<()> {
        info!(to = %email, "mail not configured; skipping OTP email");
        Ok(())
    }

    async fn notify_status_change(
        &self,
        email: &str,
        _name: &str,
        job: &Job,
        old_status: JobStatus,
        new_status: JobStatus,
    ) -> anyhow::Result<()> {
        info!(
            to = %email,
            company = %job.company_name,
            old_status = %old_status,
            new_status = %new_status,
            "mail not configured; skipping status-change email"
        );
        Ok(())
    }

    async fn notify_reminder(&self, email: &str, _name: &str, job: &Job) -> anyhow::Result<()> {
        info!(
            to = %email,
            company = %job.company_name,
            "mail not configured; skipping reminder email"
        );
        Ok(())
    }
}
