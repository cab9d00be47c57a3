use std::collections::BTreeMap;
use time::{Date, Duration, Month, OffsetDateTime};

use crate::analytics::dto::{AnalyticsResponse, Charts, DeadlineEntry, Insights, Kpis};
use crate::jobs::repo::Job;
use crate::jobs::status::JobStatus;

/// Reduce a user's active-job snapshot into KPIs, chart groupings, the
/// 7-day deadline list and focus-area suggestions. Pure computation; the
/// snapshot is assumed validated at write time and sorted by application
/// date descending.
pub fn aggregate(
    jobs: &[Job],
    now: OffsetDateTime,
    interview_statuses: &[String],
) -> AnalyticsResponse {
    let total_applications = jobs.len();
    let interviews_scheduled = jobs
        .iter()
        .filter(|job| {
            interview_statuses
                .iter()
                .any(|status| status == job.status.as_str())
        })
        .count();
    let offers_received = jobs
        .iter()
        .filter(|job| job.status == JobStatus::Offer)
        .count();
    let conversion_ratio = conversion_ratio(offers_received, total_applications);

    let deadline_window_end = now + Duration::days(7);
    let upcoming_deadlines = jobs
        .iter()
        .filter(|job| follow_up_within(job, now, deadline_window_end))
        .count();

    let mut status_breakdown: BTreeMap<String, u64> = BTreeMap::new();
    let mut applications_over_time: BTreeMap<String, u64> = BTreeMap::new();
    let mut job_type_distribution: BTreeMap<String, u64> = BTreeMap::new();
    let mut monthly_trends: BTreeMap<String, u64> = BTreeMap::new();
    let mut excitement_distribution: BTreeMap<i32, u64> = BTreeMap::new();

    let trend_cutoff = months_back(now, 6);
    for job in jobs {
        *status_breakdown
            .entry(job.status.as_str().to_string())
            .or_insert(0) += 1;
        *applications_over_time
            .entry(week_key(job.application_date))
            .or_insert(0) += 1;
        *job_type_distribution
            .entry(job_type_of(job.position.as_deref()).to_string())
            .or_insert(0) += 1;
        if job.application_date >= trend_cutoff {
            *monthly_trends
                .entry(month_key(job.application_date))
                .or_insert(0) += 1;
        }
        *excitement_distribution
            .entry(job.excitement_index)
            .or_insert(0) += 1;
    }

    let mut deadlines: Vec<DeadlineEntry> = jobs
        .iter()
        .filter_map(|job| {
            let next_follow_up = job.next_follow_up?;
            if next_follow_up < now || next_follow_up > deadline_window_end {
                return None;
            }
            Some(DeadlineEntry {
                id: job.id,
                job_id: job.job_id.clone(),
                company_name: job.company_name.clone(),
                position: job.position.clone(),
                next_follow_up,
                status: job.status,
                days_until: days_until(next_follow_up, now),
            })
        })
        .collect();
    deadlines.sort_by_key(|entry| entry.next_follow_up);

    // Advisory rules are independent; any subset may fire, in this order.
    let mut suggested_focus_areas = Vec::new();
    if conversion_ratio < 10.0 {
        suggested_focus_areas.push("Improve interview preparation".to_string());
    }
    if upcoming_deadlines > 5 {
        suggested_focus_areas.push("Prioritize follow-ups".to_string());
    }
    if let Some(&rejected) = status_breakdown.get(JobStatus::Rejected.as_str()) {
        if rejected as f64 > total_applications as f64 * 0.5 {
            suggested_focus_areas.push("Review application strategy".to_string());
        }
    }

    AnalyticsResponse {
        kpis: Kpis {
            total_applications,
            interviews_scheduled,
            offers_received,
            conversion_ratio,
            upcoming_deadlines,
        },
        charts: Charts {
            status_breakdown,
            applications_over_time,
            job_type_distribution,
            monthly_trends,
            excitement_distribution,
        },
        deadlines,
        insights: Insights {
            suggested_focus_areas,
        },
    }
}

pub(crate) fn conversion_ratio(offers: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (offers as f64 / total as f64 * 1000.0).round() / 10.0
}

fn follow_up_within(job: &Job, start: OffsetDateTime, end: OffsetDateTime) -> bool {
    // Both edges inclusive: a follow-up due this instant still counts.
    job.next_follow_up
        .map(|due| due >= start && due <= end)
        .unwrap_or(false)
}

/// Sunday-aligned week bucket of the given instant, keyed `YYYY-MM-DD`.
pub(crate) fn week_key(when: OffsetDateTime) -> String {
    let date = when.date();
    let start = date - Duration::days(date.weekday().number_days_from_sunday() as i64);
    format!(
        "{:04}-{:02}-{:02}",
        start.year(),
        start.month() as u8,
        start.day()
    )
}

pub(crate) fn month_key(when: OffsetDateTime) -> String {
    format!("{:04}-{:02}", when.year(), when.month() as u8)
}

/// Calendar-month subtraction; the day clamps to the target month's length
/// (Aug 31 minus 6 months is Feb 28/29).
pub(crate) fn months_back(now: OffsetDateTime, months: u32) -> OffsetDateTime {
    let date = now.date();
    let mut year = date.year();
    let mut month = date.month();
    for _ in 0..months {
        month = month.previous();
        if month == Month::December {
            year -= 1;
        }
    }
    let day = date.day().min(time::util::days_in_year_month(year, month));
    let shifted = Date::from_calendar_date(year, month, day).unwrap_or(date);
    now.replace_date(shifted)
}

/// Coarse classification by substring of the position title, first match
/// wins: intern, remote, full, part, contract; anything else is Other.
pub(crate) fn job_type_of(position: Option<&str>) -> &'static str {
    let Some(position) = position else {
        return "Other";
    };
    let lowered = position.to_lowercase();
    if lowered.contains("intern") {
        "Internship"
    } else if lowered.contains("remote") {
        "Remote"
    } else if lowered.contains("full") {
        "Full-time"
    } else if lowered.contains("part") {
        "Part-time"
    } else if lowered.contains("contract") {
        "Contract"
    } else {
        "Other"
    }
}

/// Whole days until the deadline, rounded up; a deadline later today is 1.
pub(crate) fn days_until(deadline: OffsetDateTime, now: OffsetDateTime) -> i64 {
    let seconds = (deadline - now).whole_seconds();
    (seconds as f64 / 86_400.0).ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_interview_statuses;
    use crate::jobs::fixtures;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-08-05 12:00 UTC);

    fn interview_stage_names() -> Vec<String> {
        JobStatus::INTERVIEW_STAGES
            .iter()
            .map(|s| s.as_str().to_string())
            .collect()
    }

    #[test]
    fn empty_snapshot_yields_zero_ratio_not_nan() {
        let result = aggregate(&[], NOW, &interview_stage_names());
        assert_eq!(result.kpis.total_applications, 0);
        assert_eq!(result.kpis.conversion_ratio, 0.0);
        assert!(result.deadlines.is_empty());
    }

    #[test]
    fn conversion_ratio_rounds_to_one_decimal() {
        assert_eq!(conversion_ratio(1, 3), 33.3);
        assert_eq!(conversion_ratio(2, 10), 20.0);
        assert_eq!(conversion_ratio(2, 3), 66.7);
        assert_eq!(conversion_ratio(0, 7), 0.0);
    }

    #[test]
    fn end_to_end_scenario_ten_jobs() {
        let mut jobs = Vec::new();
        for i in 0..10 {
            let mut job = fixtures::job(NOW - Duration::days(i));
            job.status = match i {
                0 | 1 => JobStatus::Offer,
                2 => JobStatus::Screening,
                3 => JobStatus::PhoneInterview,
                4 => JobStatus::FinalInterview,
                _ => JobStatus::Applied,
            };
            if i == 5 {
                job.next_follow_up = Some(NOW + Duration::days(3));
            }
            jobs.push(job);
        }

        let result = aggregate(&jobs, NOW, &interview_stage_names());
        assert_eq!(result.kpis.total_applications, 10);
        assert_eq!(result.kpis.offers_received, 2);
        assert_eq!(result.kpis.interviews_scheduled, 3);
        assert_eq!(result.kpis.conversion_ratio, 20.0);
        assert_eq!(result.kpis.upcoming_deadlines, 1);
        assert_eq!(result.deadlines.len(), 1);
        assert_eq!(result.deadlines[0].days_until, 3);
    }

    #[test]
    fn legacy_interview_literals_never_match_the_enum() {
        let mut jobs = Vec::new();
        for status in [
            JobStatus::Screening,
            JobStatus::PhoneInterview,
            JobStatus::OnsiteInterview,
        ] {
            let mut job = fixtures::job(NOW);
            job.status = status;
            jobs.push(job);
        }
        // Default config keeps the historical dashboard behavior: zero.
        let legacy = aggregate(&jobs, NOW, &default_interview_statuses());
        assert_eq!(legacy.kpis.interviews_scheduled, 0);
        // The corrected set counts the real interview stages.
        let corrected = aggregate(&jobs, NOW, &interview_stage_names());
        assert_eq!(corrected.kpis.interviews_scheduled, 3);
    }

    #[test]
    fn deadline_window_is_inclusive_at_both_ends() {
        let mut at_now = fixtures::job(NOW);
        at_now.next_follow_up = Some(NOW);
        let mut at_seven_days = fixtures::job(NOW);
        at_seven_days.next_follow_up = Some(NOW + Duration::days(7));
        let mut just_past = fixtures::job(NOW);
        just_past.next_follow_up = Some(NOW + Duration::days(7) + Duration::seconds(1));
        let mut in_the_past = fixtures::job(NOW);
        in_the_past.next_follow_up = Some(NOW - Duration::seconds(1));

        let jobs = vec![at_now, at_seven_days, just_past, in_the_past];
        let result = aggregate(&jobs, NOW, &interview_stage_names());
        assert_eq!(result.kpis.upcoming_deadlines, 2);
    }

    #[test]
    fn deadlines_sort_ascending_by_due_date() {
        let mut later = fixtures::job(NOW);
        later.job_id = "LATER".into();
        later.next_follow_up = Some(NOW + Duration::days(5));
        let mut sooner = fixtures::job(NOW);
        sooner.job_id = "SOONER".into();
        sooner.next_follow_up = Some(NOW + Duration::days(1));

        let result = aggregate(&[later, sooner], NOW, &interview_stage_names());
        let ids: Vec<&str> = result.deadlines.iter().map(|d| d.job_id.as_str()).collect();
        assert_eq!(ids, ["SOONER", "LATER"]);
    }

    #[test]
    fn days_until_rounds_up() {
        assert_eq!(days_until(NOW + Duration::hours(72), NOW), 3);
        assert_eq!(days_until(NOW + Duration::hours(71), NOW), 3);
        assert_eq!(days_until(NOW + Duration::seconds(1), NOW), 1);
        assert_eq!(days_until(NOW, NOW), 0);
    }

    #[test]
    fn week_key_aligns_to_the_preceding_sunday() {
        // 2026-03-04 is a Wednesday; its week starts Sunday 2026-03-01.
        assert_eq!(week_key(datetime!(2026-03-04 15:30 UTC)), "2026-03-01");
        // A Sunday is its own week start.
        assert_eq!(week_key(datetime!(2026-03-01 00:10 UTC)), "2026-03-01");
        // Saturday still belongs to the week that began six days earlier.
        assert_eq!(week_key(datetime!(2026-03-07 23:59 UTC)), "2026-03-01");
    }

    #[test]
    fn month_key_is_year_dash_month() {
        assert_eq!(month_key(datetime!(2026-03-04 15:30 UTC)), "2026-03");
        assert_eq!(month_key(datetime!(2025-11-30 00:00 UTC)), "2025-11");
    }

    #[test]
    fn months_back_clamps_to_short_months() {
        let shifted = months_back(datetime!(2026-08-31 12:00 UTC), 6);
        assert_eq!(shifted.date(), time::macros::date!(2026-02-28));
        let across_year = months_back(datetime!(2026-02-15 12:00 UTC), 6);
        assert_eq!(across_year.date(), time::macros::date!(2025-08-15));
    }

    #[test]
    fn monthly_trends_drop_applications_older_than_six_months() {
        let mut recent = fixtures::job(NOW);
        recent.application_date = NOW - Duration::days(30);
        let mut stale = fixtures::job(NOW);
        stale.application_date = NOW - Duration::days(250);

        let result = aggregate(&[recent, stale], NOW, &interview_stage_names());
        let total: u64 = result.charts.monthly_trends.values().sum();
        assert_eq!(total, 1);
        // Both still count toward the all-time weekly series.
        let weekly: u64 = result.charts.applications_over_time.values().sum();
        assert_eq!(weekly, 2);
    }

    #[test]
    fn job_type_priority_prefers_remote_over_fulltime_keywords() {
        assert_eq!(job_type_of(Some("Senior Remote Engineer")), "Remote");
        assert_eq!(job_type_of(Some("Software Engineering Intern")), "Internship");
        assert_eq!(job_type_of(Some("Remote Intern")), "Internship");
        assert_eq!(job_type_of(Some("Full-Time Analyst")), "Full-time");
        assert_eq!(job_type_of(Some("Contract QA")), "Contract");
        assert_eq!(job_type_of(Some("Staff Engineer")), "Other");
        assert_eq!(job_type_of(None), "Other");
        // Substring matching is deliberately naive: "Partner" reads as part-time.
        assert_eq!(job_type_of(Some("Partner Success Manager")), "Part-time");
    }

    #[test]
    fn excitement_distribution_counts_each_index() {
        let mut thrilled = fixtures::job(NOW);
        thrilled.excitement_index = 5;
        let mut meh = fixtures::job(NOW);
        meh.excitement_index = 2;
        let also_meh = {
            let mut j = fixtures::job(NOW);
            j.excitement_index = 2;
            j
        };

        let result = aggregate(&[thrilled, meh, also_meh], NOW, &interview_stage_names());
        assert_eq!(result.charts.excitement_distribution.get(&5), Some(&1));
        assert_eq!(result.charts.excitement_distribution.get(&2), Some(&2));
    }

    #[test]
    fn focus_areas_fire_independently() {
        // Low conversion only.
        let mut jobs = vec![fixtures::job(NOW)];
        let result = aggregate(&jobs, NOW, &interview_stage_names());
        assert_eq!(
            result.insights.suggested_focus_areas,
            vec!["Improve interview preparation"]
        );

        // Heavy rejection on top of low conversion.
        for _ in 0..3 {
            let mut job = fixtures::job(NOW);
            job.status = JobStatus::Rejected;
            jobs.push(job);
        }
        let result = aggregate(&jobs, NOW, &interview_stage_names());
        assert_eq!(
            result.insights.suggested_focus_areas,
            vec!["Improve interview preparation", "Review application strategy"]
        );
    }

    #[test]
    fn many_upcoming_deadlines_suggest_prioritizing_follow_ups() {
        let mut jobs = Vec::new();
        for i in 0..6 {
            let mut job = fixtures::job(NOW);
            job.status = JobStatus::Offer;
            job.next_follow_up = Some(NOW + Duration::days(1) + Duration::hours(i));
            jobs.push(job);
        }
        let result = aggregate(&jobs, NOW, &interview_stage_names());
        // 100% conversion, so only the deadline rule fires.
        assert_eq!(
            result.insights.suggested_focus_areas,
            vec!["Prioritize follow-ups"]
        );
    }

    #[test]
    fn soft_deleted_rows_never_reach_the_aggregator() {
        // The repository filters on is_active; the aggregator trusts its
        // input. This pins the contract: callers pass active rows only.
        let mut inactive = fixtures::job(NOW);
        inactive.is_active = false;
        let active = fixtures::job(NOW);
        let snapshot: Vec<_> = [inactive, active]
            .into_iter()
            .filter(|j| j.is_active)
            .collect();
        let result = aggregate(&snapshot, NOW, &interview_stage_names());
        assert_eq!(result.kpis.total_applications, 1);
    }
}
