use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::directory::{DirectoryError, EmployeeDirectory};
use super::domain::{
    Employee, EmployeeId, EmployeeUpdate, NewEmployee, ReviewDraft, ReviewId, ReviewPeriod,
    ReviewStatus,
};
use super::report::views::PeriodSummary;
use super::report::{export_csv, summarize, CsvExport, ExportError};
use super::repository::{
    sort_newest_first, RepositoryError, ReviewKey, ReviewQuery, ReviewRecord, ReviewRepository,
};
use super::scoring::{validate_period, validate_review, ScoringEngine, ValidationError};
use super::window::{current_period, PolicyViolation, SubmissionWindowPolicy, WindowStatus};

/// Service composing validation, the window policy, scoring, and storage.
pub struct ReviewService<R, D> {
    repository: Arc<R>,
    directory: Arc<D>,
    engine: Arc<ScoringEngine>,
    policy: SubmissionWindowPolicy,
    clock: Arc<dyn Clock>,
}

static REVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static EMPLOYEE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_review_id() -> ReviewId {
    let id = REVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReviewId(format!("rev-{id:06}"))
}

fn next_employee_id() -> EmployeeId {
    let id = EMPLOYEE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EmployeeId(format!("emp-{id:04}"))
}

impl<R, D> ReviewService<R, D>
where
    R: ReviewRepository + 'static,
    D: EmployeeDirectory + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<D>) -> Self {
        Self::with_parts(
            repository,
            directory,
            ScoringEngine::standard(),
            SubmissionWindowPolicy::default(),
            Arc::new(SystemClock),
        )
    }

    pub fn with_parts(
        repository: Arc<R>,
        directory: Arc<D>,
        engine: ScoringEngine,
        policy: SubmissionWindowPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            directory,
            engine: Arc::new(engine),
            policy,
            clock,
        }
    }

    /// Same collaborators, different clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Resolve the caller; unknown and deactivated employees are rejected.
    pub fn authenticate(&self, id: &EmployeeId) -> Result<Employee, ReviewServiceError> {
        match self.directory.fetch(id)? {
            Some(employee) if employee.active => Ok(employee),
            _ => Err(ReviewServiceError::Unauthenticated),
        }
    }

    /// Create or update the reviewer's review of a colleague for a period.
    pub fn save(
        &self,
        reviewer: &Employee,
        draft: ReviewDraft,
    ) -> Result<ReviewRecord, ReviewServiceError> {
        let (period, scores) = validate_review(
            &reviewer.id,
            &draft.reviewee,
            draft.quarter,
            draft.year,
            &draft.scores,
        )?;

        match self.directory.fetch(&draft.reviewee)? {
            Some(reviewee) if reviewee.active => {}
            _ => return Err(ReviewServiceError::UnknownEmployee(draft.reviewee)),
        }

        let key = ReviewKey {
            reviewer: reviewer.id.clone(),
            reviewee: draft.reviewee,
            period,
        };
        let existing = self.repository.find_by_key(&key)?;
        let stored_status = existing.as_ref().map(|record| record.status);
        let status = draft
            .status
            .or(stored_status)
            .unwrap_or(ReviewStatus::Draft);

        // Submitted reviews, and saves that submit, only change inside the window.
        let now = self.clock.now();
        if status == ReviewStatus::Submitted || stored_status == Some(ReviewStatus::Submitted) {
            if let Err(violation) = self.policy.check(period, now) {
                warn!(reviewer = %reviewer.id, %period, "submitted review change rejected outside window");
                return Err(violation.into());
            }
        }

        let record = match existing {
            Some(mut existing) => {
                existing.revise(scores, status, &self.engine, now);
                existing
            }
            None => ReviewRecord::new(next_review_id(), key, scores, status, &self.engine, now),
        };

        let stored = self.repository.upsert(record)?;
        match stored.status {
            ReviewStatus::Submitted => info!(
                review = %stored.id,
                reviewer = %stored.reviewer,
                reviewee = %stored.reviewee,
                period = %stored.period,
                final_score = %stored.final_score,
                "review submitted"
            ),
            ReviewStatus::Draft => debug!(review = %stored.id, "review draft saved"),
        }
        Ok(stored)
    }

    /// Fetch a review visible to its reviewer, its reviewee, or an admin.
    pub fn get(&self, actor: &Employee, id: &ReviewId) -> Result<ReviewRecord, ReviewServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or_else(|| ReviewServiceError::NotFound(id.clone()))?;

        if !actor.is_admin() && !record.involves(&actor.id) {
            return Err(ReviewServiceError::Forbidden(
                "reviews are visible to their participants and admins".to_string(),
            ));
        }
        Ok(record)
    }

    pub fn reviews_by(&self, reviewer: &Employee) -> Result<Vec<ReviewRecord>, ReviewServiceError> {
        let mut records = self.repository.by_reviewer(&reviewer.id)?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    /// Colleagues to review in the current period and how far along each review is.
    pub fn pending(&self, reviewer: &Employee) -> Result<PendingReviews, ReviewServiceError> {
        let now = self.clock.now();
        let period = current_period(now);

        let existing: HashMap<EmployeeId, ReviewRecord> = self
            .repository
            .by_reviewer(&reviewer.id)?
            .into_iter()
            .filter(|record| record.period == period)
            .map(|record| (record.reviewee.clone(), record))
            .collect();

        let entries = self
            .colleagues(reviewer)?
            .into_iter()
            .map(|employee| {
                let review = existing.get(&employee.id);
                PendingEntry {
                    review_status: review.map(|record| record.status),
                    review_id: review.map(|record| record.id.clone()),
                    employee_id: employee.id,
                    name: employee.name,
                    employee_code: employee.employee_code,
                    department: employee.department,
                }
            })
            .collect();

        Ok(PendingReviews {
            period,
            window: self.policy.status(period, now),
            entries,
        })
    }

    /// Active employees other than `actor`.
    pub fn colleagues(&self, actor: &Employee) -> Result<Vec<Employee>, ReviewServiceError> {
        let mut colleagues: Vec<Employee> = self
            .directory
            .active()?
            .into_iter()
            .filter(|employee| employee.id != actor.id)
            .collect();
        colleagues.sort_by(|a, b| a.employee_code.cmp(&b.employee_code));
        Ok(colleagues)
    }

    pub fn window_status(&self, quarter: u8, year: i32) -> Result<WindowStatus, ReviewServiceError> {
        let period = validate_period(quarter, year)?;
        self.policy
            .status(period, self.clock.now())
            .ok_or_else(|| PolicyViolation::NoWindow(period).into())
    }

    pub fn query(
        &self,
        actor: &Employee,
        query: &ReviewQuery,
    ) -> Result<Vec<ReviewRecord>, ReviewServiceError> {
        require_admin(actor)?;
        let mut records = self.repository.matching(query)?;

        if let Some(department) = query.department.as_deref() {
            let departments: HashMap<EmployeeId, String> = self
                .directory
                .all()?
                .into_iter()
                .map(|employee| (employee.id, employee.department))
                .collect();
            records.retain(|record| {
                departments.get(&record.reviewee).map(String::as_str) == Some(department)
            });
        }

        sort_newest_first(&mut records);
        Ok(records)
    }

    pub fn summary(
        &self,
        actor: &Employee,
        quarter: u8,
        year: i32,
        department: Option<&str>,
    ) -> Result<PeriodSummary, ReviewServiceError> {
        require_admin(actor)?;
        let period = validate_period(quarter, year)?;
        self.summarize_period(period, department)
    }

    pub fn export(
        &self,
        actor: &Employee,
        quarter: u8,
        year: i32,
        department: Option<&str>,
    ) -> Result<CsvExport, ReviewServiceError> {
        let summary = self.summary(actor, quarter, year, department)?;
        let export = export_csv(&summary, department)?;
        info!(file = %export.file_name, rows = summary.count, "summary exported");
        Ok(export)
    }

    fn summarize_period(
        &self,
        period: ReviewPeriod,
        department: Option<&str>,
    ) -> Result<PeriodSummary, ReviewServiceError> {
        let query = ReviewQuery {
            quarter: Some(period.quarter),
            year: Some(period.year),
            status: Some(ReviewStatus::Submitted),
            department: None,
        };
        let records = self.repository.matching(&query)?;
        let employees = self.directory.active()?;
        Ok(summarize(period, department, &records, &employees))
    }

    pub fn employees(&self, actor: &Employee) -> Result<Vec<Employee>, ReviewServiceError> {
        require_admin(actor)?;
        let mut employees = self.directory.all()?;
        employees.sort_by(|a, b| a.employee_code.cmp(&b.employee_code));
        Ok(employees)
    }

    pub fn create_employee(
        &self,
        actor: &Employee,
        new_employee: NewEmployee,
    ) -> Result<Employee, ReviewServiceError> {
        require_admin(actor)?;
        self.register_employee(new_employee)
    }

    /// Add an employee without an acting admin, used to bootstrap a directory.
    pub fn register_employee(
        &self,
        new_employee: NewEmployee,
    ) -> Result<Employee, ReviewServiceError> {
        let new_employee = new_employee.sanitized()?;
        let employee = Employee {
            id: next_employee_id(),
            name: new_employee.name,
            employee_code: new_employee.employee_code,
            department: new_employee.department,
            role: new_employee.role.unwrap_or_default(),
            active: true,
            created_at: self.clock.now(),
        };

        let stored = self.directory.insert(employee)?;
        info!(
            employee = %stored.id,
            code = %stored.employee_code,
            role = stored.role.label(),
            "employee registered"
        );
        Ok(stored)
    }

    pub fn update_employee(
        &self,
        actor: &Employee,
        id: &EmployeeId,
        update: EmployeeUpdate,
    ) -> Result<Employee, ReviewServiceError> {
        require_admin(actor)?;
        let mut employee = self
            .directory
            .fetch(id)?
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;
        update.apply(&mut employee);
        Ok(self.directory.update(employee)?)
    }
}

fn require_admin(actor: &Employee) -> Result<(), ReviewServiceError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ReviewServiceError::Forbidden("admin role required".to_string()))
    }
}

/// Review progress for the reviewer's current period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingReviews {
    pub period: ReviewPeriod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowStatus>,
    pub entries: Vec<PendingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingEntry {
    pub employee_id: EmployeeId,
    pub name: String,
    pub employee_code: String,
    pub department: String,
    pub review_status: Option<ReviewStatus>,
    pub review_id: Option<ReviewId>,
}

/// Error raised by the review service.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("caller is not a known active employee")]
    Unauthenticated,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("reviewee {0} is not an active employee")]
    UnknownEmployee(EmployeeId),
    #[error("review {0} not found")]
    NotFound(ReviewId),
}
