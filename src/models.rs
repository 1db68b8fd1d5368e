//! Core data models used throughout perfbot.
//!
//! Records mirror the JSON the performance-tracker backend returns. Unknown
//! wire fields (populated managers, addresses, audit timestamps) are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Departments the backend accepts for an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Engineering,
    Marketing,
    Sales,
    #[serde(rename = "HR")]
    Hr,
    Finance,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Engineering => "Engineering",
            Department::Marketing => "Marketing",
            Department::Sales => "Sales",
            Department::Hr => "HR",
            Department::Finance => "Finance",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
    #[serde(rename = "On Leave")]
    OnLeave,
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmployeeStatus::Active => "Active",
            EmployeeStatus::Inactive => "Inactive",
            EmployeeStatus::OnLeave => "On Leave",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[default]
    Draft,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Archived,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReviewStatus::Draft => "Draft",
            ReviewStatus::InProgress => "In Progress",
            ReviewStatus::Completed => "Completed",
            ReviewStatus::Archived => "Archived",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: Department,
    pub position: String,
    pub hire_date: DateTime<Utc>,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Aggregates the backend recomputes per department. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentMetrics {
    #[serde(default)]
    pub total_employees: Option<u64>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub reviews_completed: Option<u64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<DepartmentMetrics>,
}

/// One entry of `GET /employees/{id}/performance`, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReviewSummary {
    pub overall_rating: f64,
    pub review_date: DateTime<Utc>,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievements: Option<String>,
}

/// Paginated body of `GET /employees`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePage {
    #[serde(default)]
    pub employees: Vec<EmployeeRecord>,
    #[serde(default)]
    pub total_pages: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl EmployeePage {
    /// Employees the backend holds beyond this page, when it reports a total.
    pub fn unfetched(&self) -> u64 {
        self.total
            .map(|total| total.saturating_sub(self.employees.len() as u64))
            .unwrap_or(0)
    }
}

/// Snapshot of the roster a chat session answers from.
///
/// Replaced wholesale on reload; nothing mutates it in place.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub employees: Vec<EmployeeRecord>,
    pub departments: Vec<DepartmentRecord>,
}

impl Corpus {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty() && self.departments.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A transcript entry. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

/// A corpus record selected for a query, borrowed from the corpus snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchResult<'a> {
    Employee(&'a EmployeeRecord),
    Department(&'a DepartmentRecord),
}
