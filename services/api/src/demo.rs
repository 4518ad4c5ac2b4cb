use crate::infra::{
    parse_datetime, seed_directory, InMemoryDirectory, InMemoryReviewRepository,
    InMemoryReviewService,
};
use chrono::{Duration, Local, NaiveDateTime};
use clap::Args;
use peer_review::error::AppError;
use peer_review::reviews::{
    current_period, validate_period, Dimension, Employee, FixedClock, PeriodSummary,
    PolicyViolation, ReviewDraft, ReviewPeriod, ReviewServiceError, ReviewStatus, ScoreSheet,
    ScoringEngine, SubmissionWindow, SubmissionWindowPolicy, YearBoundary,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    #[arg(long)]
    pub(crate) job_performance: f64,
    #[arg(long)]
    pub(crate) additional_achievements: f64,
    #[arg(long)]
    pub(crate) compliance: f64,
    #[arg(long)]
    pub(crate) teamwork: f64,
    #[arg(long)]
    pub(crate) diligence: f64,
}

#[derive(Args, Debug)]
pub(crate) struct WindowArgs {
    /// Quarter (1-4)
    #[arg(long)]
    pub(crate) quarter: u8,
    #[arg(long)]
    pub(crate) year: i32,
    /// Instant to evaluate (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS). Defaults to now.
    #[arg(long, value_parser = parse_datetime)]
    pub(crate) at: Option<NaiveDateTime>,
    /// Close Q4 windows at the end of the calendar year
    #[arg(long)]
    pub(crate) strict_calendar_year: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Quarter to simulate (defaults to the current review period)
    #[arg(long)]
    pub(crate) quarter: Option<u8>,
    /// Year to simulate (defaults to the current review period)
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Restrict the summary to one department
    #[arg(long)]
    pub(crate) department: Option<String>,
    /// Print the summary as CSV instead of a table
    #[arg(long)]
    pub(crate) csv: bool,
}

const DEMO_RATINGS: [[f64; 5]; 5] = [
    [4.0, 3.0, 5.0, 4.0, 4.0],
    [5.0, 4.0, 4.0, 5.0, 3.0],
    [3.0, 3.5, 4.0, 3.0, 4.5],
    [4.5, 5.0, 3.0, 4.0, 5.0],
    [2.5, 3.0, 3.5, 4.0, 3.0],
];

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let sheet = ScoreSheet {
        job_performance: Some(args.job_performance),
        additional_achievements: Some(args.additional_achievements),
        compliance: Some(args.compliance),
        teamwork: Some(args.teamwork),
        diligence: Some(args.diligence),
    };

    let engine = ScoringEngine::standard();
    let (scores, final_score) = engine.score(&sheet).map_err(ReviewServiceError::from)?;

    println!("Weighted peer review score");
    for dimension in Dimension::ordered() {
        println!(
            "- {:<24} rating {:>4} x weight {:.2} -> {:>6.2}",
            dimension.label(),
            scores.get(dimension),
            engine.weights().weight(dimension),
            engine.contribution(&scores, dimension)
        );
    }
    println!("Final score: {final_score}");
    Ok(())
}

pub(crate) fn run_window(args: WindowArgs) -> Result<(), AppError> {
    let WindowArgs {
        quarter,
        year,
        at,
        strict_calendar_year,
    } = args;

    let period = validate_period(quarter, year).map_err(ReviewServiceError::from)?;
    let boundary = if strict_calendar_year {
        YearBoundary::StrictCalendarYear
    } else {
        YearBoundary::WindowAnchored
    };
    let now = at.unwrap_or_else(|| Local::now().naive_local());
    let status = SubmissionWindowPolicy::new(boundary)
        .status(period, now)
        .ok_or(ReviewServiceError::from(PolicyViolation::NoWindow(period)))?;

    println!(
        "{} submissions: {} through {}",
        status.period, status.opens_on, status.closes_on
    );
    println!(
        "As of {}: {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        if status.open { "open" } else { "closed" }
    );
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        quarter,
        year,
        department,
        csv,
    } = args;

    let current = current_period(Local::now().naive_local());
    let period = validate_period(
        quarter.unwrap_or(current.quarter),
        year.unwrap_or(current.year),
    )
    .map_err(ReviewServiceError::from)?;

    let (service, admin) = seeded_demo(period)?;
    let department = department.as_deref().filter(|dept| !dept.trim().is_empty());

    if csv {
        let export = service.export(&admin, period.quarter, period.year, department)?;
        print!("{}", String::from_utf8_lossy(&export.body));
        return Ok(());
    }

    let summary = service.summary(&admin, period.quarter, period.year, department)?;
    render_summary(&summary);
    Ok(())
}

/// Service over a seeded roster with a round of reviews for `period`, clocked
/// inside the period's submission window.
pub(crate) fn seeded_demo(
    period: ReviewPeriod,
) -> Result<(InMemoryReviewService, Employee), ReviewServiceError> {
    let window =
        SubmissionWindow::for_period(period).ok_or(PolicyViolation::NoWindow(period))?;
    let clock = FixedClock(window.opens_at() + Duration::hours(9));

    let service = InMemoryReviewService::with_parts(
        Arc::new(InMemoryReviewRepository::default()),
        Arc::new(InMemoryDirectory::default()),
        ScoringEngine::standard(),
        SubmissionWindowPolicy::default(),
        Arc::new(clock),
    );

    let employees = seed_directory(&service)?;
    let admin = employees
        .iter()
        .find(|employee| employee.is_admin())
        .cloned()
        .ok_or_else(|| ReviewServiceError::Forbidden("demo roster has no admin".to_string()))?;
    let reviewers: Vec<&Employee> = employees.iter().filter(|employee| !employee.is_admin()).collect();

    for (index, reviewer) in reviewers.iter().enumerate() {
        for offset in 1..=2 {
            let reviewee = reviewers[(index + offset) % reviewers.len()];
            let ratings = DEMO_RATINGS[(index + offset) % DEMO_RATINGS.len()];
            // The last reviewer leaves one review in draft.
            let status = if index + 1 == reviewers.len() && offset == 2 {
                ReviewStatus::Draft
            } else {
                ReviewStatus::Submitted
            };
            service.save(
                reviewer,
                ReviewDraft {
                    reviewee: reviewee.id.clone(),
                    quarter: period.quarter,
                    year: period.year,
                    scores: sheet_from(ratings),
                    status: Some(status),
                },
            )?;
        }
    }

    Ok((service, admin))
}

fn sheet_from(ratings: [f64; 5]) -> ScoreSheet {
    let mut sheet = ScoreSheet::default();
    for (dimension, rating) in Dimension::ordered().into_iter().zip(ratings) {
        sheet.set(dimension, Some(rating));
    }
    sheet
}

fn render_summary(summary: &PeriodSummary) {
    println!(
        "Peer review summary for {} ({})",
        summary.period, summary.department
    );
    if summary.entries.is_empty() {
        println!("No submitted reviews.");
        return;
    }
    for entry in &summary.entries {
        println!(
            "- {} [{}] {} | {} reviews | average {:.2}",
            entry.employee_name,
            entry.employee_code,
            entry.department,
            entry.review_count,
            entry.average_score
        );
        let averages = entry.dimension_averages;
        println!(
            "  job {:.2} | achievements {:.2} | compliance {:.2} | teamwork {:.2} | diligence {:.2}",
            averages.job_performance,
            averages.additional_achievements,
            averages.compliance,
            averages.teamwork,
            averages.diligence
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_demo_summarizes_submitted_reviews() {
        let period = ReviewPeriod::new(2, 2024);
        let (service, admin) = seeded_demo(period).expect("demo seeds");

        let summary = service
            .summary(&admin, period.quarter, period.year, None)
            .expect("summary");

        // Five reviewers each write two reviews, one of them left in draft.
        let submitted: usize = summary.entries.iter().map(|entry| entry.review_count).sum();
        assert_eq!(submitted, 9);
        assert_eq!(summary.count, 5);
        assert!(summary
            .entries
            .windows(2)
            .all(|pair| pair[0].average_score >= pair[1].average_score));
    }

    #[test]
    fn seeded_demo_exports_department_csv() {
        let period = ReviewPeriod::new(4, 2024);
        let (service, admin) = seeded_demo(period).expect("demo seeds");

        let export = service
            .export(&admin, 4, 2024, Some("Finance"))
            .expect("export");

        assert_eq!(export.file_name, "peer-review-2024-q4-finance.csv");
        let body = String::from_utf8(export.body).expect("utf8");
        assert_eq!(body.lines().count(), 3);
    }
}
