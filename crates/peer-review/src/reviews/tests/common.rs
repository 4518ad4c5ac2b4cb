use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::reviews::clock::FixedClock;
use crate::reviews::directory::{DirectoryError, EmployeeDirectory};
use crate::reviews::domain::{
    Employee, EmployeeId, ReviewDraft, ReviewId, ReviewStatus, Role, ScoreSheet,
};
use crate::reviews::repository::{
    RepositoryError, ReviewKey, ReviewQuery, ReviewRecord, ReviewRepository,
};
use crate::reviews::scoring::ScoringEngine;
use crate::reviews::service::ReviewService;
use crate::reviews::window::SubmissionWindowPolicy;

pub(super) fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, second)
        .expect("valid time")
}

/// Inside the Q1 2024 window.
pub(super) fn q1_window_now() -> NaiveDateTime {
    at(2024, 4, 2, 9, 30, 0)
}

pub(super) fn sheet(
    job_performance: f64,
    additional_achievements: f64,
    compliance: f64,
    teamwork: f64,
    diligence: f64,
) -> ScoreSheet {
    ScoreSheet {
        job_performance: Some(job_performance),
        additional_achievements: Some(additional_achievements),
        compliance: Some(compliance),
        teamwork: Some(teamwork),
        diligence: Some(diligence),
    }
}

pub(super) fn sample_sheet() -> ScoreSheet {
    sheet(4.0, 3.0, 5.0, 2.0, 4.0)
}

pub(super) fn employee(id: &str, code: &str, department: &str, role: Role) -> Employee {
    Employee {
        id: EmployeeId(id.to_string()),
        name: format!("Employee {code}"),
        employee_code: code.to_string(),
        department: department.to_string(),
        role,
        active: true,
        created_at: at(2023, 1, 9, 8, 0, 0),
    }
}

pub(super) fn alice() -> Employee {
    employee("emp-alice", "E100", "Engineering", Role::Employee)
}

pub(super) fn bob() -> Employee {
    employee("emp-bob", "E200", "Engineering", Role::Employee)
}

pub(super) fn carol() -> Employee {
    employee("emp-carol", "E300", "Finance", Role::Employee)
}

pub(super) fn admin() -> Employee {
    employee("emp-admin", "A001", "People", Role::Admin)
}

pub(super) fn draft_for(reviewee: &Employee, scores: ScoreSheet, status: Option<ReviewStatus>) -> ReviewDraft {
    ReviewDraft {
        reviewee: reviewee.id.clone(),
        quarter: 1,
        year: 2024,
        scores,
        status,
    }
}

pub(super) fn seeded_directory() -> Arc<MemoryDirectory> {
    let directory = Arc::new(MemoryDirectory::default());
    for employee in [alice(), bob(), carol(), admin()] {
        directory.insert(employee).expect("seed employee");
    }
    directory
}

pub(super) fn build_service(
    now: NaiveDateTime,
) -> (
    ReviewService<MemoryRepository, MemoryDirectory>,
    Arc<MemoryRepository>,
    Arc<MemoryDirectory>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let directory = seeded_directory();
    let service = ReviewService::with_parts(
        repository.clone(),
        directory.clone(),
        ScoringEngine::standard(),
        SubmissionWindowPolicy::default(),
        Arc::new(FixedClock(now)),
    );
    (service, repository, directory)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ReviewKey, ReviewRecord>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl ReviewRepository for MemoryRepository {
    fn upsert(&self, mut record: ReviewRecord) -> Result<ReviewRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if let Some(existing) = guard.get(&record.key()) {
            record.id = existing.id.clone();
            record.created_at = existing.created_at;
            if record.is_submitted() && existing.submitted_at.is_some() {
                record.submitted_at = existing.submitted_at;
            }
        }
        guard.insert(record.key(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ReviewId) -> Result<Option<ReviewRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().find(|record| &record.id == id).cloned())
    }

    fn find_by_key(&self, key: &ReviewKey) -> Result<Option<ReviewRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(key).cloned())
    }

    fn by_reviewer(&self, reviewer: &EmployeeId) -> Result<Vec<ReviewRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.reviewer == reviewer)
            .cloned()
            .collect())
    }

    fn matching(&self, query: &ReviewQuery) -> Result<Vec<ReviewRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    employees: Arc<Mutex<HashMap<EmployeeId, Employee>>>,
}

impl EmployeeDirectory for MemoryDirectory {
    fn fetch(&self, id: &EmployeeId) -> Result<Option<Employee>, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<Employee>, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn insert(&self, employee: Employee) -> Result<Employee, DirectoryError> {
        let mut guard = self.employees.lock().expect("directory mutex poisoned");
        if guard
            .values()
            .any(|existing| existing.employee_code == employee.employee_code)
        {
            return Err(DirectoryError::DuplicateEmployeeCode(employee.employee_code));
        }
        guard.insert(employee.id.clone(), employee.clone());
        Ok(employee)
    }

    fn update(&self, employee: Employee) -> Result<Employee, DirectoryError> {
        let mut guard = self.employees.lock().expect("directory mutex poisoned");
        if !guard.contains_key(&employee.id) {
            return Err(DirectoryError::NotFound(employee.id));
        }
        guard.insert(employee.id.clone(), employee.clone());
        Ok(employee)
    }
}

pub(super) struct UnavailableRepository;

impl ReviewRepository for UnavailableRepository {
    fn upsert(&self, _record: ReviewRecord) -> Result<ReviewRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ReviewId) -> Result<Option<ReviewRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_key(&self, _key: &ReviewKey) -> Result<Option<ReviewRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_reviewer(&self, _reviewer: &EmployeeId) -> Result<Vec<ReviewRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn matching(&self, _query: &ReviewQuery) -> Result<Vec<ReviewRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
