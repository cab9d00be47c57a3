use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Application status. The set is closed but unordered: any status may move
/// to any other, including "backward" moves like offer -> screening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "job_status", rename_all = "kebab-case")]
pub enum JobStatus {
    Applied,
    Screening,
    PhoneInterview,
    TechnicalInterview,
    OnsiteInterview,
    FinalInterview,
    Offer,
    Accepted,
    Rejected,
    Withdrawn,
}

impl JobStatus {
    pub const ALL: [JobStatus; 10] = [
        JobStatus::Applied,
        JobStatus::Screening,
        JobStatus::PhoneInterview,
        JobStatus::TechnicalInterview,
        JobStatus::OnsiteInterview,
        JobStatus::FinalInterview,
        JobStatus::Offer,
        JobStatus::Accepted,
        JobStatus::Rejected,
        JobStatus::Withdrawn,
    ];

    /// Interview-round statuses, as used by the jobs stats aggregate.
    pub const INTERVIEW_STAGES: [JobStatus; 5] = [
        JobStatus::Screening,
        JobStatus::PhoneInterview,
        JobStatus::TechnicalInterview,
        JobStatus::OnsiteInterview,
        JobStatus::FinalInterview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Applied => "applied",
            JobStatus::Screening => "screening",
            JobStatus::PhoneInterview => "phone-interview",
            JobStatus::TechnicalInterview => "technical-interview",
            JobStatus::OnsiteInterview => "onsite-interview",
            JobStatus::FinalInterview => "final-interview",
            JobStatus::Offer => "offer",
            JobStatus::Accepted => "accepted",
            JobStatus::Rejected => "rejected",
            JobStatus::Withdrawn => "withdrawn",
        }
    }

    /// Human-readable label shown in notification emails.
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Applied => "Applied",
            JobStatus::Screening => "Screening",
            JobStatus::PhoneInterview => "Phone Interview",
            JobStatus::TechnicalInterview => "Technical Interview",
            JobStatus::OnsiteInterview => "Onsite Interview",
            JobStatus::FinalInterview => "Final Interview",
            JobStatus::Offer => "Offer Received",
            JobStatus::Accepted => "Accepted",
            JobStatus::Rejected => "Rejected",
            JobStatus::Withdrawn => "Withdrawn",
        }
    }

    /// Accent color used for the status badge in notification emails.
    pub fn color(&self) -> &'static str {
        match self {
            JobStatus::Applied => "#6c757d",
            JobStatus::Screening => "#17a2b8",
            JobStatus::PhoneInterview => "#ffc107",
            JobStatus::TechnicalInterview => "#fd7e14",
            JobStatus::OnsiteInterview => "#e83e8c",
            JobStatus::FinalInterview => "#6f42c1",
            JobStatus::Offer => "#28a745",
            JobStatus::Accepted => "#20c997",
            JobStatus::Rejected => "#dc3545",
            JobStatus::Withdrawn => "#6c757d",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Status must be one of: {}",
                    JobStatus::ALL.map(|s| s.as_str()).join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>(), Ok(status));
        }
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&JobStatus::PhoneInterview).unwrap();
        assert_eq!(json, "\"phone-interview\"");
        let back: JobStatus = serde_json::from_str("\"onsite-interview\"").unwrap();
        assert_eq!(back, JobStatus::OnsiteInterview);
    }

    #[test]
    fn unknown_status_is_rejected_with_the_full_list() {
        let err = "interviewing".parse::<JobStatus>().unwrap_err();
        assert!(err.starts_with("Status must be one of: applied,"));
        assert!(err.contains("withdrawn"));
    }

    #[test]
    fn display_metadata_is_total() {
        for status in JobStatus::ALL {
            assert!(!status.label().is_empty());
            assert!(status.color().starts_with('#'));
        }
    }

    #[test]
    fn interview_stages_are_the_hyphenated_mid_pipeline_statuses() {
        assert!(JobStatus::INTERVIEW_STAGES.contains(&JobStatus::Screening));
        assert!(JobStatus::INTERVIEW_STAGES.contains(&JobStatus::FinalInterview));
        assert!(!JobStatus::INTERVIEW_STAGES.contains(&JobStatus::Offer));
        assert!(!JobStatus::INTERVIEW_STAGES.contains(&JobStatus::Applied));
    }
}
