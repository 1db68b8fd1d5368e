//! In-memory backend and fixtures for unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::client::PerformanceApi;
use crate::error::ChatError;
use crate::models::{
    Corpus, Department, DepartmentMetrics, DepartmentRecord, EmployeeRecord, EmployeeStatus,
    PerformanceReviewSummary, ReviewStatus,
};

#[derive(Default)]
pub struct FakeApi {
    employees: Vec<EmployeeRecord>,
    departments: Vec<DepartmentRecord>,
    reviews: HashMap<String, Vec<PerformanceReviewSummary>>,
    fail_employees: bool,
    fail_departments: bool,
    fail_performance: HashSet<String>,
    employee_list_calls: AtomicUsize,
    department_list_calls: AtomicUsize,
    performance_calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new(employees: Vec<EmployeeRecord>, departments: Vec<DepartmentRecord>) -> Self {
        Self {
            employees,
            departments,
            ..Self::default()
        }
    }

    pub fn with_reviews(
        mut self,
        employee_id: &str,
        reviews: Vec<PerformanceReviewSummary>,
    ) -> Self {
        self.reviews.insert(employee_id.to_string(), reviews);
        self
    }

    pub fn fail_employees(mut self) -> Self {
        self.fail_employees = true;
        self
    }

    pub fn fail_departments(mut self) -> Self {
        self.fail_departments = true;
        self
    }

    pub fn fail_performance_for(mut self, employee_id: &str) -> Self {
        self.fail_performance.insert(employee_id.to_string());
        self
    }

    pub fn corpus(&self) -> Corpus {
        Corpus {
            employees: self.employees.clone(),
            departments: self.departments.clone(),
        }
    }

    pub fn employee_list_calls(&self) -> usize {
        self.employee_list_calls.load(Ordering::SeqCst)
    }

    pub fn department_list_calls(&self) -> usize {
        self.department_list_calls.load(Ordering::SeqCst)
    }

    pub fn performance_calls(&self) -> Vec<String> {
        self.performance_calls.lock().unwrap().clone()
    }
}

fn unavailable() -> ChatError {
    ChatError::Api {
        status: 500,
        body: "{\"error\":\"boom\"}".to_string(),
    }
}

#[async_trait]
impl PerformanceApi for FakeApi {
    async fn list_employees(&self) -> Result<Vec<EmployeeRecord>, ChatError> {
        self.employee_list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_employees {
            return Err(unavailable());
        }
        Ok(self.employees.clone())
    }

    async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, ChatError> {
        self.department_list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_departments {
            return Err(unavailable());
        }
        Ok(self.departments.clone())
    }

    async fn employee_performance(
        &self,
        employee_id: &str,
    ) -> Result<Vec<PerformanceReviewSummary>, ChatError> {
        self.performance_calls
            .lock()
            .unwrap()
            .push(employee_id.to_string());
        if self.fail_performance.contains(employee_id) {
            return Err(unavailable());
        }
        Ok(self.reviews.get(employee_id).cloned().unwrap_or_default())
    }
}

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

pub fn employee(id: &str, name: &str, department: Department, position: &str) -> EmployeeRecord {
    EmployeeRecord {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@company.com", name.to_lowercase().replace(' ', ".")),
        department,
        position: position.to_string(),
        hire_date: ts("2021-03-01T00:00:00Z"),
        status: EmployeeStatus::Active,
        phone: None,
    }
}

pub fn john_doe() -> EmployeeRecord {
    EmployeeRecord {
        hire_date: ts("2020-01-15T00:00:00Z"),
        phone: Some("+1-555-0101".to_string()),
        ..employee("e1", "John Doe", Department::Engineering, "Senior Developer")
    }
}

pub fn engineering() -> DepartmentRecord {
    DepartmentRecord {
        id: "d1".to_string(),
        name: "Engineering".to_string(),
        description: Some("Software development and technical operations".to_string()),
        metrics: Some(DepartmentMetrics {
            total_employees: Some(45),
            average_rating: Some(4.3),
            reviews_completed: Some(12),
            last_updated: None,
        }),
    }
}

pub fn sales() -> DepartmentRecord {
    DepartmentRecord {
        id: "d2".to_string(),
        name: "Sales".to_string(),
        description: Some("Revenue generation and client relationships".to_string()),
        metrics: Some(DepartmentMetrics {
            total_employees: Some(20),
            average_rating: Some(3.9),
            reviews_completed: Some(7),
            last_updated: None,
        }),
    }
}

pub fn review(rating: f64, date: &str, achievements: Option<&str>) -> PerformanceReviewSummary {
    PerformanceReviewSummary {
        overall_rating: rating,
        review_date: ts(date),
        status: ReviewStatus::Completed,
        achievements: achievements.map(str::to_string),
    }
}
