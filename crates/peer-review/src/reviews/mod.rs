//! Quarterly peer reviews: rating validation, weighted scoring, submission
//! windows, storage contracts, and period reporting.

pub mod clock;
pub mod directory;
pub mod domain;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod window;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use directory::{DirectoryError, EmployeeDirectory};
pub use domain::{
    Dimension, Employee, EmployeeId, EmployeeUpdate, NewEmployee, ReviewDraft, ReviewId,
    ReviewPeriod, ReviewScores, ReviewStatus, Role, ScoreSheet,
};
pub use report::views::{DimensionAverages, PeriodSummary, SummaryEntry};
pub use report::{export_csv, summarize, CsvExport, ExportError};
pub use repository::{RepositoryError, ReviewKey, ReviewQuery, ReviewRecord, ReviewRepository};
pub use router::{review_router, EMPLOYEE_HEADER};
pub use scoring::{
    round_to_hundredths, validate_participants, validate_period, validate_review,
    validate_scores, FinalScore, ScoringEngine, ValidationError, WeightTable, WeightTableError,
};
pub use service::{PendingEntry, PendingReviews, ReviewService, ReviewServiceError};
pub use window::{
    current_period, is_submission_open, PolicyViolation, SubmissionWindow,
    SubmissionWindowPolicy, WindowStatus, YearBoundary,
};
