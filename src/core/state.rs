use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::repositories::contracts::{AttemptRepository, CourseDirectory, TestCaseRepository};
use crate::repositories::postgres::PgRepositories;
use crate::services::attempts::AttemptManager;
use crate::services::grading::{GradingOrchestrator, GradingPolicy};
use crate::services::judge::JudgeClient;
use crate::services::status_report::StatusReporter;
use crate::services::test_cases::TestCaseStore;

/// Storage collaborators injected into the grading services.
#[derive(Clone)]
pub(crate) struct Repositories {
    pub(crate) attempts: Arc<dyn AttemptRepository>,
    pub(crate) test_cases: Arc<dyn TestCaseRepository>,
    pub(crate) directory: Arc<dyn CourseDirectory>,
}

impl Repositories {
    pub(crate) fn postgres(pool: PgPool) -> Self {
        let repositories = Arc::new(PgRepositories::new(pool));
        Self {
            attempts: repositories.clone(),
            test_cases: repositories.clone(),
            directory: repositories,
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    directory: Arc<dyn CourseDirectory>,
    attempts: AttemptManager,
    test_cases: TestCaseStore,
    grading: GradingOrchestrator,
    status: StatusReporter,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: PgPool,
        repositories: Repositories,
        judge: Arc<dyn JudgeClient>,
    ) -> Self {
        let attempts =
            AttemptManager::new(repositories.attempts.clone(), repositories.directory.clone());
        let test_cases = TestCaseStore::new(repositories.test_cases.clone());
        let grading = GradingOrchestrator::new(
            attempts.clone(),
            test_cases.clone(),
            repositories.directory.clone(),
            judge,
            GradingPolicy::from_settings(&settings),
        );
        let status =
            StatusReporter::new(repositories.attempts.clone(), repositories.directory.clone());

        Self {
            inner: Arc::new(InnerState {
                settings,
                db,
                directory: repositories.directory,
                attempts,
                test_cases,
                grading,
                status,
            }),
        }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn directory(&self) -> &dyn CourseDirectory {
        self.inner.directory.as_ref()
    }

    pub(crate) fn attempts(&self) -> &AttemptManager {
        &self.inner.attempts
    }

    pub(crate) fn test_cases(&self) -> &TestCaseStore {
        &self.inner.test_cases
    }

    pub(crate) fn grading(&self) -> &GradingOrchestrator {
        &self.inner.grading
    }

    pub(crate) fn status(&self) -> &StatusReporter {
        &self.inner.status
    }
}
