//! Corpus loading.
//!
//! Fetches the employee and department lists concurrently and joins on both.
//! There is no retry: either fetch failing fails the whole load.

use crate::client::PerformanceApi;
use crate::error::ChatError;
use crate::models::Corpus;

/// Fetch both lists at once. Any failure becomes [`ChatError::DataUnavailable`].
pub async fn load(api: &dyn PerformanceApi) -> Result<Corpus, ChatError> {
    let (employees, departments) =
        tokio::try_join!(api.list_employees(), api.list_departments())
            .map_err(|e| ChatError::DataUnavailable(e.to_string()))?;

    tracing::info!(
        employees = employees.len(),
        departments = departments.len(),
        "corpus loaded"
    );

    Ok(Corpus {
        employees,
        departments,
    })
}

/// [`load`], substituting an empty corpus on failure so the session stays usable.
pub async fn load_or_empty(api: &dyn PerformanceApi) -> Corpus {
    match load(api).await {
        Ok(corpus) => corpus,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to an empty corpus");
            Corpus::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DepartmentRecord, EmployeeRecord, PerformanceReviewSummary};
    use crate::testing::{engineering, john_doe, FakeApi};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Each list call blocks until the other one has started, so the load only
    /// finishes when both are in flight together.
    #[derive(Default)]
    struct RendezvousApi {
        employees_entered: Notify,
        departments_entered: Notify,
    }

    #[async_trait]
    impl PerformanceApi for RendezvousApi {
        async fn list_employees(&self) -> Result<Vec<EmployeeRecord>, ChatError> {
            self.employees_entered.notify_one();
            self.departments_entered.notified().await;
            Ok(vec![john_doe()])
        }

        async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, ChatError> {
            self.departments_entered.notify_one();
            self.employees_entered.notified().await;
            Ok(vec![engineering()])
        }

        async fn employee_performance(
            &self,
            _employee_id: &str,
        ) -> Result<Vec<PerformanceReviewSummary>, ChatError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_load_collects_both_lists() {
        let api = FakeApi::new(vec![john_doe()], vec![engineering()]);
        let corpus = load(&api).await.unwrap();
        assert_eq!(corpus.employees.len(), 1);
        assert_eq!(corpus.departments.len(), 1);
        assert_eq!(api.employee_list_calls(), 1);
        assert_eq!(api.department_list_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetches_run_concurrently() {
        let api = RendezvousApi::default();
        let corpus = tokio::time::timeout(Duration::from_secs(5), load(&api))
            .await
            .expect("list fetches did not overlap")
            .unwrap();
        assert_eq!(corpus.employees.len(), 1);
        assert_eq!(corpus.departments.len(), 1);
    }

    #[tokio::test]
    async fn test_either_failure_fails_load() {
        let api = FakeApi::new(vec![john_doe()], vec![engineering()]).fail_employees();
        assert!(matches!(
            load(&api).await,
            Err(ChatError::DataUnavailable(_))
        ));

        let api = FakeApi::new(vec![john_doe()], vec![engineering()]).fail_departments();
        assert!(matches!(
            load(&api).await,
            Err(ChatError::DataUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_load_or_empty_degrades() {
        let api = FakeApi::new(vec![john_doe()], vec![engineering()]).fail_departments();
        let corpus = load_or_empty(&api).await;
        assert!(corpus.is_empty());
    }
}
