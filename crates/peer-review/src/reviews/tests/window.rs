use super::common::at;
use crate::reviews::domain::ReviewPeriod;
use crate::reviews::window::{
    current_period, is_submission_open, PolicyViolation, SubmissionWindow,
    SubmissionWindowPolicy, YearBoundary,
};
use chrono::NaiveDate;

#[test]
fn q1_window_opens_at_midnight_on_march_25() {
    assert!(is_submission_open(1, 2024, at(2024, 3, 25, 0, 0, 0)));
    assert!(!is_submission_open(1, 2024, at(2024, 3, 24, 23, 59, 59)));
}

#[test]
fn q1_window_closes_at_midnight_starting_april_14() {
    assert!(is_submission_open(1, 2024, at(2024, 4, 13, 23, 59, 59)));
    assert!(is_submission_open(1, 2024, at(2024, 4, 14, 0, 0, 0)));
    assert!(!is_submission_open(1, 2024, at(2024, 4, 14, 0, 0, 1)));
    assert!(!is_submission_open(1, 2024, at(2024, 4, 14, 12, 0, 0)));

    let window = SubmissionWindow::for_period(ReviewPeriod::new(1, 2024)).expect("window");
    assert_eq!(window.closes_at(), at(2024, 4, 14, 0, 0, 0));
}

#[test]
fn each_quarter_has_its_own_window() {
    let cases = [
        (1, (2024, 3, 25), (2024, 4, 14)),
        (2, (2024, 6, 25), (2024, 7, 14)),
        (3, (2024, 9, 25), (2024, 10, 14)),
        (4, (2024, 12, 25), (2025, 1, 14)),
    ];

    for (quarter, (oy, om, od), (cy, cm, cd)) in cases {
        let window =
            SubmissionWindow::for_period(ReviewPeriod::new(quarter, 2024)).expect("window exists");
        assert_eq!(window.opens_on, NaiveDate::from_ymd_opt(oy, om, od).expect("date"));
        assert_eq!(window.closes_on, NaiveDate::from_ymd_opt(cy, cm, cd).expect("date"));
        assert_eq!(window.crosses_year(), quarter == 4);
    }
}

#[test]
fn windows_do_not_match_other_quarters() {
    let mid_q2_window = at(2024, 7, 1, 12, 0, 0);
    assert!(is_submission_open(2, 2024, mid_q2_window));
    assert!(!is_submission_open(1, 2024, mid_q2_window));
    assert!(!is_submission_open(3, 2024, mid_q2_window));
}

#[test]
fn past_and_future_years_are_closed() {
    assert!(!is_submission_open(1, 2023, at(2024, 3, 30, 12, 0, 0)));
    assert!(!is_submission_open(1, 2025, at(2024, 3, 30, 12, 0, 0)));
}

#[test]
fn invalid_quarters_never_open() {
    assert!(!is_submission_open(0, 2024, at(2024, 3, 30, 12, 0, 0)));
    assert!(!is_submission_open(5, 2024, at(2024, 3, 30, 12, 0, 0)));
    assert!(SubmissionWindow::for_period(ReviewPeriod::new(5, 2024)).is_none());
}

#[test]
fn q4_window_stays_open_into_january_when_anchored_on_the_window() {
    let january = at(2025, 1, 10, 12, 0, 0);
    let policy = SubmissionWindowPolicy::default();

    assert_eq!(policy.year_boundary(), YearBoundary::WindowAnchored);
    assert!(policy.is_open(ReviewPeriod::new(4, 2024), january));
    assert!(is_submission_open(4, 2024, january));
    // The upcoming Q4 has not opened yet.
    assert!(!is_submission_open(4, 2025, january));
}

#[test]
fn q4_window_closes_on_new_year_under_strict_calendar_year() {
    let strict = SubmissionWindowPolicy::new(YearBoundary::StrictCalendarYear);

    assert!(!strict.is_open(ReviewPeriod::new(4, 2024), at(2025, 1, 10, 12, 0, 0)));
    assert!(strict.is_open(ReviewPeriod::new(4, 2024), at(2024, 12, 31, 23, 59, 59)));
    assert!(strict.is_open(ReviewPeriod::new(1, 2024), at(2024, 4, 1, 8, 0, 0)));
}

#[test]
fn check_explains_the_allowed_window() {
    let policy = SubmissionWindowPolicy::default();
    let period = ReviewPeriod::new(2, 2024);

    match policy.check(period, at(2024, 5, 1, 9, 0, 0)) {
        Err(PolicyViolation::SubmissionClosed {
            opens_on,
            closes_on,
            ..
        }) => {
            assert_eq!(opens_on, NaiveDate::from_ymd_opt(2024, 6, 25).expect("date"));
            assert_eq!(closes_on, NaiveDate::from_ymd_opt(2024, 7, 14).expect("date"));
        }
        other => panic!("expected closed window, got {other:?}"),
    }

    let message = policy
        .check(period, at(2024, 5, 1, 9, 0, 0))
        .expect_err("closed")
        .to_string();
    assert_eq!(
        message,
        "submissions for Q2 2024 are only accepted from 2024-06-25 through 2024-07-14"
    );
    assert!(policy.check(period, at(2024, 6, 30, 9, 0, 0)).is_ok());
}

#[test]
fn status_reports_window_dates_and_state() {
    let policy = SubmissionWindowPolicy::default();
    let status = policy
        .status(ReviewPeriod::new(3, 2024), at(2024, 10, 2, 10, 0, 0))
        .expect("valid quarter");
    assert!(status.open);
    assert_eq!(status.opens_on, NaiveDate::from_ymd_opt(2024, 9, 25).expect("date"));
}

#[test]
fn current_period_buckets_by_month() {
    assert_eq!(current_period(at(2024, 2, 10, 9, 0, 0)), ReviewPeriod::new(1, 2024));
    assert_eq!(current_period(at(2024, 5, 20, 9, 0, 0)), ReviewPeriod::new(2, 2024));
    assert_eq!(current_period(at(2024, 9, 30, 9, 0, 0)), ReviewPeriod::new(3, 2024));
    assert_eq!(current_period(at(2024, 12, 26, 9, 0, 0)), ReviewPeriod::new(4, 2024));
}

#[test]
fn current_period_rolls_back_during_first_two_weeks_of_a_quarter() {
    assert_eq!(current_period(at(2024, 4, 14, 23, 0, 0)), ReviewPeriod::new(1, 2024));
    assert_eq!(current_period(at(2024, 4, 15, 0, 0, 0)), ReviewPeriod::new(2, 2024));
    assert_eq!(current_period(at(2024, 7, 1, 0, 0, 0)), ReviewPeriod::new(2, 2024));
    assert_eq!(current_period(at(2024, 10, 9, 0, 0, 0)), ReviewPeriod::new(3, 2024));
}

#[test]
fn january_rolls_back_to_q4_of_the_previous_year() {
    let now = at(2025, 1, 10, 12, 0, 0);
    let period = current_period(now);

    assert_eq!(period, ReviewPeriod::new(4, 2024));
    assert!(SubmissionWindowPolicy::default().is_open(period, now));
    assert_eq!(current_period(at(2025, 1, 15, 0, 0, 0)), ReviewPeriod::new(1, 2025));
}
