//! Response synthesis.
//!
//! Turns the matches for a query into one reply: a block per match, in match
//! order. Employee blocks are followed by the employee's latest performance
//! review when the backend has one. Review fetches run one at a time so the
//! block order never depends on response timing.
//!
//! ```text
//! **John Doe** (Senior Developer)
//! - Department: Engineering
//! - Email: john.doe@company.com
//! - Hire Date: 1/15/2020
//! - Status: Active
//!
//! **Latest Performance Review:**
//! - Rating: 4.5/5
//! ...
//! ```

use std::fmt::{Display, Write};

use crate::client::PerformanceApi;
use crate::error::ChatError;
use crate::models::{
    Corpus, DepartmentRecord, EmployeeRecord, MatchResult, PerformanceReviewSummary,
};
use crate::retrieve::retrieve;

/// Reply when nothing in the corpus matches the query.
pub const FALLBACK_RESPONSE: &str = "I couldn't find specific information about that. \
Please try asking about an employee by name, department, or ask general questions about \
performance data. Make sure the backend server is running.";

/// Reply when matches produced no text.
pub const EMPTY_SYNTHESIS_RESPONSE: &str = "I found some information but couldn't generate \
a proper response. Please try rephrasing your question.";

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone)]
pub struct ResponseOptions {
    /// strftime pattern for hire and review dates.
    pub date_format: String,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self {
            date_format: "%-m/%-d/%Y".to_string(),
        }
    }
}

/// Match `query` against `corpus` and build the reply.
///
/// The corpus is only read. `api` is called once per matched employee.
pub async fn respond(
    query: &str,
    corpus: &Corpus,
    api: &dyn PerformanceApi,
    options: &ResponseOptions,
) -> Result<String, ChatError> {
    let matches = retrieve(query, corpus);
    generate(&matches, api, options).await
}

/// Render `matches` in order, fetching each employee's latest review as its
/// block is written. No matches yields [`FALLBACK_RESPONSE`].
pub async fn generate(
    matches: &[MatchResult<'_>],
    api: &dyn PerformanceApi,
    options: &ResponseOptions,
) -> Result<String, ChatError> {
    if matches.is_empty() {
        return Ok(FALLBACK_RESPONSE.to_string());
    }

    let mut response = String::new();

    for item in matches {
        match item {
            MatchResult::Employee(emp) => {
                write_employee(&mut response, emp, options)?;
                match latest_review(api, &emp.id).await {
                    Ok(Some(review)) => write_review(&mut response, &review, options)?,
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "omitting performance review block"),
                }
            }
            MatchResult::Department(dept) => write_department(&mut response, dept)?,
        }
    }

    if response.is_empty() {
        return Ok(EMPTY_SYNTHESIS_RESPONSE.to_string());
    }
    Ok(response)
}

async fn latest_review(
    api: &dyn PerformanceApi,
    employee_id: &str,
) -> Result<Option<PerformanceReviewSummary>, ChatError> {
    let history = api
        .employee_performance(employee_id)
        .await
        .map_err(|e| ChatError::EnrichmentUnavailable {
            employee_id: employee_id.to_string(),
            reason: e.to_string(),
        })?;
    Ok(history.into_iter().next())
}

fn write_employee(
    out: &mut String,
    emp: &EmployeeRecord,
    options: &ResponseOptions,
) -> Result<(), ChatError> {
    writeln!(out, "**{}** ({})", emp.name, emp.position)?;
    writeln!(out, "- Department: {}", emp.department)?;
    writeln!(out, "- Email: {}", emp.email)?;
    writeln!(out, "- Hire Date: {}", emp.hire_date.format(&options.date_format))?;
    writeln!(out, "- Status: {}", emp.status)?;
    if let Some(phone) = non_empty(&emp.phone) {
        writeln!(out, "- Phone: {}", phone)?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_review(
    out: &mut String,
    review: &PerformanceReviewSummary,
    options: &ResponseOptions,
) -> Result<(), ChatError> {
    writeln!(out, "**Latest Performance Review:**")?;
    writeln!(out, "- Rating: {}/5", review.overall_rating)?;
    writeln!(
        out,
        "- Review Date: {}",
        review.review_date.format(&options.date_format)
    )?;
    writeln!(out, "- Status: {}", review.status)?;
    if let Some(achievements) = non_empty(&review.achievements) {
        writeln!(out, "- Achievements: {}", achievements)?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_department(out: &mut String, dept: &DepartmentRecord) -> Result<(), ChatError> {
    let metrics = dept.metrics.as_ref();
    writeln!(out, "**{} Department:**", dept.name)?;
    writeln!(
        out,
        "- Total Employees: {}",
        or_na(recorded(metrics.and_then(|m| m.total_employees)))
    )?;
    writeln!(
        out,
        "- Average Rating: {}/5",
        or_na(recorded(metrics.and_then(|m| m.average_rating)))
    )?;
    writeln!(
        out,
        "- Reviews Completed: {}",
        or_na(recorded(metrics.and_then(|m| m.reviews_completed)))
    )?;
    if let Some(description) = non_empty(&dept.description) {
        writeln!(out, "- Description: {}", description)?;
    }
    writeln!(out)?;
    Ok(())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// The tracker stores 0 until a metric has been computed, so 0 means unknown.
fn recorded<T: PartialEq + Default>(value: Option<T>) -> Option<T> {
    value.filter(|v| *v != T::default())
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
