use std::sync::Arc;

use crate::db::models::TestCase;
use crate::repositories::contracts::TestCaseRepository;

#[derive(Clone)]
pub(crate) struct TestCaseStore {
    repository: Arc<dyn TestCaseRepository>,
}

impl TestCaseStore {
    pub(crate) fn new(repository: Arc<dyn TestCaseRepository>) -> Self {
        Self { repository }
    }

    /// All cases for the question in creation order (ties broken by id).
    pub(crate) async fn list(&self, question_id: &str) -> Result<Vec<TestCase>, sqlx::Error> {
        self.repository.list_by_question(question_id).await
    }

    pub(crate) async fn list_visible(
        &self,
        question_id: &str,
    ) -> Result<Vec<TestCase>, sqlx::Error> {
        let mut cases = self.list(question_id).await?;
        cases.retain(|case| !case.is_hidden);
        Ok(cases)
    }
}
