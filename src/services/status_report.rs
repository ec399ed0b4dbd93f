use std::collections::HashMap;
use std::sync::Arc;

use crate::db::types::UserRole;
use crate::repositories::contracts::{AttemptRepository, CourseDirectory};
use crate::schemas::status::{QuestionStatusResponse, StudentAttemptStatus};
use crate::services::errors::GradingError;

#[derive(Clone)]
pub(crate) struct StatusReporter {
    attempts: Arc<dyn AttemptRepository>,
    directory: Arc<dyn CourseDirectory>,
}

impl StatusReporter {
    pub(crate) fn new(
        attempts: Arc<dyn AttemptRepository>,
        directory: Arc<dyn CourseDirectory>,
    ) -> Self {
        Self { attempts, directory }
    }

    /// One row per enrolled student, ordered by username. Read-only.
    pub(crate) async fn question_status(
        &self,
        teacher_id: &str,
        batch_id: &str,
        question_id: &str,
    ) -> Result<QuestionStatusResponse, GradingError> {
        let teacher = self
            .directory
            .find_user(teacher_id)
            .await?
            .ok_or(GradingError::NotFound("User not found"))?;
        if teacher.role != UserRole::Teacher {
            return Err(GradingError::NotATeacher);
        }

        let batch = self
            .directory
            .find_batch(batch_id)
            .await?
            .ok_or(GradingError::NotFound("Batch not found"))?;
        if batch.teacher_id != teacher_id {
            return Err(GradingError::NotOwner);
        }

        let question = self
            .directory
            .find_question(question_id)
            .await?
            .filter(|question| question.batch_id == batch.id)
            .ok_or(GradingError::NotFound("Question not found in this batch"))?;

        let students = self.directory.list_enrolled_students(&batch.id).await?;
        let student_ids: Vec<String> = students.iter().map(|student| student.id.clone()).collect();
        let attempts = self.attempts.list_latest_for_students(&question.id, &student_ids).await?;
        let by_student: HashMap<&str, _> =
            attempts.iter().map(|attempt| (attempt.student_id.as_str(), attempt)).collect();

        let rows = students
            .iter()
            .map(|student| {
                StudentAttemptStatus::new(student, by_student.get(student.id.as_str()).copied())
            })
            .collect();

        Ok(QuestionStatusResponse {
            question_id: question.id,
            question_title: question.title,
            batch_id: batch.id,
            batch_name: batch.name,
            students: rows,
        })
    }
}
