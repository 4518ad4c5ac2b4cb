use super::domain::{Employee, EmployeeId, EmployeeUpdate, NewEmployee};

/// Lookup and maintenance of the people taking part in reviews.
pub trait EmployeeDirectory: Send + Sync {
    fn fetch(&self, id: &EmployeeId) -> Result<Option<Employee>, DirectoryError>;
    fn all(&self) -> Result<Vec<Employee>, DirectoryError>;
    /// Insert a new employee; the employee code must be unique.
    fn insert(&self, employee: Employee) -> Result<Employee, DirectoryError>;
    fn update(&self, employee: Employee) -> Result<Employee, DirectoryError>;

    fn active(&self) -> Result<Vec<Employee>, DirectoryError> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|employee| employee.active)
            .collect())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("employee code {0} is already registered")]
    DuplicateEmployeeCode(String),
    #[error("employee {0} not found")]
    NotFound(EmployeeId),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

impl NewEmployee {
    /// Trimmed copy with every required field present.
    pub fn sanitized(self) -> Result<Self, DirectoryError> {
        let name = required(self.name, "name")?;
        let employee_code = required(self.employee_code, "employee_code")?;
        let department = required(self.department, "department")?;
        Ok(Self {
            name,
            employee_code,
            department,
            role: self.role,
        })
    }
}

impl EmployeeUpdate {
    pub fn apply(self, employee: &mut Employee) {
        if let Some(name) = non_blank(self.name) {
            employee.name = name;
        }
        if let Some(department) = non_blank(self.department) {
            employee.department = department;
        }
        if let Some(role) = self.role {
            employee.role = role;
        }
        if let Some(active) = self.active {
            employee.active = active;
        }
    }
}

fn required(value: String, field: &'static str) -> Result<String, DirectoryError> {
    non_blank(Some(value)).ok_or(DirectoryError::MissingField(field))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
