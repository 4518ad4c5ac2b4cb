use chrono::{NaiveDate, NaiveDateTime};
use metrics_exporter_prometheus::PrometheusHandle;
use peer_review::reviews::{
    DirectoryError, Employee, EmployeeDirectory, EmployeeId, NewEmployee, RepositoryError,
    ReviewId, ReviewKey, ReviewQuery, ReviewRecord, ReviewRepository, ReviewService,
    ReviewServiceError, Role,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReviewRepository {
    records: Arc<Mutex<HashMap<ReviewKey, ReviewRecord>>>,
}

impl ReviewRepository for InMemoryReviewRepository {
    fn upsert(&self, mut record: ReviewRecord) -> Result<ReviewRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let key = record.key();
        if let Some(existing) = guard.get(&key) {
            record.id = existing.id.clone();
            record.created_at = existing.created_at;
            // Concurrent first submissions keep whichever stamp landed first.
            if record.is_submitted() && existing.submitted_at.is_some() {
                record.submitted_at = existing.submitted_at;
            }
        }
        guard.insert(key, record.clone());
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
pub(crate) struct InMemoryDirectory {
    employees: Arc<Mutex<HashMap<EmployeeId, Employee>>>,
}

impl EmployeeDirectory for InMemoryDirectory {
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
        match guard.get_mut(&employee.id) {
            Some(slot) => {
                *slot = employee.clone();
                Ok(employee)
            }
            None => Err(DirectoryError::NotFound(employee.id)),
        }
    }
}

pub(crate) type InMemoryReviewService = ReviewService<InMemoryReviewRepository, InMemoryDirectory>;

const DEMO_EMPLOYEES: [(&str, &str, &str, Role); 6] = [
    ("Ruth Okafor", "HR-001", "People", Role::Admin),
    ("Priya Natarajan", "EN-101", "Engineering", Role::Employee),
    ("Marcus Bell", "EN-102", "Engineering", Role::Employee),
    ("Sofia Duarte", "EN-103", "Engineering", Role::Employee),
    ("Lena Fischer", "FN-201", "Finance", Role::Employee),
    ("Tomas Haddad", "FN-202", "Finance", Role::Employee),
];

/// Register the demo roster; the first entry is the admin.
pub(crate) fn seed_directory(
    service: &InMemoryReviewService,
) -> Result<Vec<Employee>, ReviewServiceError> {
    DEMO_EMPLOYEES
        .iter()
        .map(|(name, code, department, role)| {
            service.register_employee(NewEmployee {
                name: name.to_string(),
                employee_code: code.to_string(),
                department: department.to_string(),
                role: Some(*role),
            })
        })
        .collect()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Accepts `YYYY-MM-DDTHH:MM:SS` or a bare date (midnight).
pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    if let Ok(at) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(at);
    }
    parse_date(trimmed).map(|date| date.and_time(chrono::NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_datetime_accepts_dates_and_timestamps() {
        let midnight = parse_datetime("2024-04-14").expect("date parses");
        assert_eq!(midnight.to_string(), "2024-04-14 00:00:00");

        let stamped = parse_datetime("2024-04-14T23:59:59").expect("timestamp parses");
        assert_eq!(stamped.to_string(), "2024-04-14 23:59:59");

        assert!(parse_datetime("14/04/2024").is_err());
    }

    #[test]
    fn seeded_directory_has_one_admin() {
        let service = InMemoryReviewService::new(
            Arc::new(InMemoryReviewRepository::default()),
            Arc::new(InMemoryDirectory::default()),
        );
        let employees = seed_directory(&service).expect("seeded");

        assert_eq!(employees.len(), DEMO_EMPLOYEES.len());
        assert_eq!(employees.iter().filter(|employee| employee.is_admin()).count(), 1);
        assert!(seed_directory(&service).is_err(), "codes are unique");
    }

    #[test]
    fn racing_submissions_keep_the_first_stamp() {
        use peer_review::reviews::{ReviewPeriod, ReviewStatus, ScoreSheet, ScoringEngine};

        let engine = ScoringEngine::standard();
        let sheet = ScoreSheet {
            job_performance: Some(4.0),
            additional_achievements: Some(3.0),
            compliance: Some(5.0),
            teamwork: Some(2.0),
            diligence: Some(4.0),
        };
        let (scores, _) = engine.score(&sheet).expect("valid sheet");
        let key = ReviewKey {
            reviewer: EmployeeId("emp-alice".to_string()),
            reviewee: EmployeeId("emp-bob".to_string()),
            period: ReviewPeriod::new(1, 2024),
        };
        let first_at = parse_datetime("2024-04-02T09:30:00").expect("timestamp");
        let second_at = parse_datetime("2024-04-02T09:30:01").expect("timestamp");

        // Both callers saw no stored record and built their own first submission.
        let first = ReviewRecord::new(
            ReviewId("rev-a".to_string()),
            key.clone(),
            scores,
            ReviewStatus::Submitted,
            &engine,
            first_at,
        );
        let second = ReviewRecord::new(
            ReviewId("rev-b".to_string()),
            key.clone(),
            scores,
            ReviewStatus::Submitted,
            &engine,
            second_at,
        );

        let repository = InMemoryReviewRepository::default();
        repository.upsert(first).expect("first upsert");
        let stored = repository.upsert(second).expect("second upsert");

        assert_eq!(stored.id, ReviewId("rev-a".to_string()));
        assert_eq!(stored.created_at, first_at);
        assert_eq!(stored.submitted_at, Some(first_at));
        assert_eq!(stored.updated_at, second_at);
        let found = repository.find_by_key(&key).expect("lookup").expect("stored");
        assert_eq!(found.submitted_at, Some(first_at));
    }
}
