use serde::Deserialize;
use time::Time;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Outbound mail settings. Absent when MAIL_API_URL is not set, in which case
/// emails are logged instead of delivered and the reminder scheduler stays off.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    /// UTC time of day at which the daily deadline scan runs.
    pub run_at: Time,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Statuses counted as "interviews scheduled" in the analytics KPIs.
    pub interview_statuses: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub mail: Option<MailConfig>,
    pub reminders: ReminderConfig,
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "jobtrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "jobtrack-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };

        let mail = match std::env::var("MAIL_API_URL") {
            Ok(api_url) => Some(MailConfig {
                api_url,
                api_key: std::env::var("MAIL_API_KEY")?,
                from: std::env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "Job Tracker <no-reply@jobtrack.local>".into()),
            }),
            Err(_) => None,
        };

        let hour = std::env::var("REMINDER_HOUR")
            .ok()
            .and_then(|v| v.parse::<u8>().ok())
            .unwrap_or(9);
        let minute = std::env::var("REMINDER_MINUTE")
            .ok()
            .and_then(|v| v.parse::<u8>().ok())
            .unwrap_or(0);
        let reminders = ReminderConfig {
            run_at: Time::from_hms(hour, minute, 0)
                .map_err(|_| anyhow::anyhow!("invalid REMINDER_HOUR/REMINDER_MINUTE"))?,
        };

        let analytics = AnalyticsConfig {
            interview_statuses: std::env::var("ANALYTICS_INTERVIEW_STATUSES")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| default_interview_statuses()),
        };

        Ok(Self {
            database_url,
            jwt,
            mail,
            reminders,
            analytics,
        })
    }
}

/// The stock dashboard counted these three literals, which are not part of the
/// status enum, so the KPI reads zero until the env override names the real
/// interview stages. Kept as the default for compatibility with existing
/// deployments.
pub fn default_interview_statuses() -> Vec<String> {
    vec![
        "interview".into(),
        "interview_scheduled".into(),
        "interview_completed".into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interview_statuses_are_the_legacy_literals() {
        let defaults = default_interview_statuses();
        assert_eq!(
            defaults,
            vec!["interview", "interview_scheduled", "interview_completed"]
        );
    }
}
