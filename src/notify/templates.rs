use time::macros::format_description;
use time::OffsetDateTime;

use crate::jobs::repo::Job;
use crate::jobs::status::JobStatus;

const HEADER: &str = r#"<div style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; text-align: center; border-radius: 10px 10px 0 0;">
  <h1 style="margin: 0; font-size: 28px;">Job Tracker</h1>
  <p style="margin: 10px 0 0 0; opacity: 0.9;">{tagline}</p>
</div>"#;

fn header(tagline: &str) -> String {
    HEADER.replace("{tagline}", tagline)
}

fn format_when(when: OffsetDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute] UTC");
    when.format(&fmt).unwrap_or_else(|_| when.to_string())
}

pub fn otp_email(name: &str, otp: &str) -> (String, String) {
    let subject = "Email Verification - Job Tracker".to_string();
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
{header}
<div style="background: #f8f9fa; padding: 30px; border-radius: 0 0 10px 10px;">
  <h2 style="color: #333;">Hello {name}!</h2>
  <p style="color: #666; line-height: 1.6;">Thank you for signing up with Job Tracker!
    To complete your registration, please use the verification code below:</p>
  <div style="background: #fff; border: 2px dashed #667eea; border-radius: 8px; padding: 20px; text-align: center; margin: 25px 0;">
    <h3 style="color: #667eea; font-size: 32px; margin: 0; letter-spacing: 5px; font-weight: bold;">{otp}</h3>
  </div>
  <p style="color: #666; line-height: 1.6;">This code will expire in <strong>10 minutes</strong>.
    If you didn't request this verification, please ignore this email.</p>
</div>
</div>"#,
        header = header("Email Verification"),
    );
    (subject, html)
}

pub fn status_update_email(
    name: &str,
    job: &Job,
    old_status: JobStatus,
    new_status: JobStatus,
) -> (String, String) {
    let subject = format!("Job Status Updated - {}", job.company_name);
    let position_row = match &job.position {
        Some(position) => format!(
            r#"<div style="margin-bottom: 15px;"><strong style="color: #555;">Position:</strong> <span style="color: #666;">{position}</span></div>"#
        ),
        None => String::new(),
    };
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
{header}
<div style="background: #f8f9fa; padding: 30px; border-radius: 0 0 10px 10px;">
  <h2 style="color: #333;">Hello {name}!</h2>
  <p style="color: #666; line-height: 1.6;">Your job application status has been updated. Here are the details:</p>
  <div style="background: #fff; border-radius: 8px; padding: 25px; margin: 25px 0; box-shadow: 0 2px 10px rgba(0,0,0,0.1);">
    <h3 style="color: #333;">{company}</h3>
    <div style="margin-bottom: 15px;"><strong style="color: #555;">Job ID:</strong> <span style="color: #666;">{job_id}</span></div>
    {position_row}
    <div style="margin-bottom: 15px;"><strong style="color: #555;">Previous Status:</strong> <span style="color: {old_color};">{old_label}</span></div>
    <div style="margin-bottom: 15px;"><strong style="color: #555;">New Status:</strong> <span style="color: {new_color}; font-weight: bold;">{new_label}</span></div>
    <div style="margin-bottom: 15px;"><strong style="color: #555;">Round:</strong> <span style="color: #666;">{round}</span></div>
  </div>
</div>
</div>"#,
        header = header("Status Update Notification"),
        company = job.company_name,
        job_id = job.job_id,
        old_color = old_status.color(),
        old_label = old_status.label(),
        new_color = new_status.color(),
        new_label = new_status.label(),
        round = job.round_number,
    );
    (subject, html)
}

pub fn deadline_reminder_email(name: &str, job: &Job) -> (String, String) {
    let subject = format!("Follow-up Reminder - {}", job.company_name);
    let due = job
        .next_follow_up
        .map(format_when)
        .unwrap_or_else(|| "soon".to_string());
    let position_row = match &job.position {
        Some(position) => format!(
            r#"<div style="margin-bottom: 15px;"><strong style="color: #555;">Position:</strong> <span style="color: #666;">{position}</span></div>"#
        ),
        None => String::new(),
    };
    let notes_row = match &job.notes {
        Some(notes) => format!(
            r#"<div style="margin-bottom: 15px;"><strong style="color: #555;">Notes:</strong> <span style="color: #666;">{notes}</span></div>"#
        ),
        None => String::new(),
    };
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
{header}
<div style="background: #f8f9fa; padding: 30px; border-radius: 0 0 10px 10px;">
  <h2 style="color: #333;">Hello {name}!</h2>
  <p style="color: #666; line-height: 1.6;">This is a reminder that your follow-up for the application below is due in about 24 hours.</p>
  <div style="background: #fff; border-radius: 8px; padding: 25px; margin: 25px 0; box-shadow: 0 2px 10px rgba(0,0,0,0.1);">
    <h3 style="color: #333;">{company}</h3>
    <div style="margin-bottom: 15px;"><strong style="color: #555;">Job ID:</strong> <span style="color: #666;">{job_id}</span></div>
    {position_row}
    <div style="margin-bottom: 15px;"><strong style="color: #555;">Current Status:</strong> <span style="color: {status_color};">{status_label}</span></div>
    <div style="margin-bottom: 15px;"><strong style="color: #555;">Follow-up Due:</strong> <span style="color: #666;">{due}</span></div>
    {notes_row}
  </div>
</div>
</div>"#,
        header = header("Follow-up Reminder"),
        company = job.company_name,
        job_id = job.job_id,
        status_color = job.status.color(),
        status_label = job.status.label(),
    );
    (subject, html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::fixtures;
    use time::macros::datetime;

    #[test]
    fn otp_email_carries_the_code() {
        let (subject, html) = otp_email("Avery", "483920");
        assert_eq!(subject, "Email Verification - Job Tracker");
        assert!(html.contains("483920"));
        assert!(html.contains("Hello Avery!"));
    }

    #[test]
    fn status_update_email_shows_both_statuses() {
        let mut job = fixtures::job(datetime!(2026-03-02 12:00 UTC));
        job.company_name = "Acme".into();
        job.round_number = 2;
        let (subject, html) =
            status_update_email("Avery", &job, JobStatus::Screening, JobStatus::Offer);
        assert_eq!(subject, "Job Status Updated - Acme");
        assert!(html.contains("Screening"));
        assert!(html.contains("Offer Received"));
        assert!(html.contains(JobStatus::Offer.color()));
        assert!(html.contains(">2</span>"));
    }

    #[test]
    fn status_update_email_omits_missing_position() {
        let job = fixtures::job(datetime!(2026-03-02 12:00 UTC));
        let (_, html) = status_update_email("Avery", &job, JobStatus::Applied, JobStatus::Offer);
        assert!(!html.contains("Position:"));
    }

    #[test]
    fn reminder_email_formats_the_due_timestamp() {
        let mut job = fixtures::job(datetime!(2026-03-02 12:00 UTC));
        job.next_follow_up = Some(datetime!(2026-03-03 09:30 UTC));
        job.notes = Some("ask about team size".into());
        let (subject, html) = deadline_reminder_email("Avery", &job);
        assert!(subject.starts_with("Follow-up Reminder"));
        assert!(html.contains("2026-03-03 09:30 UTC"));
        assert!(html.contains("ask about team size"));
    }
}
