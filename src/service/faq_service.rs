use std::sync::Arc;

use crate::{
    domain::{FaqEntry, FaqId, MarkFaqRequest, QuestionId, UpdateFaqRequest, UserId},
    error::{AppError, Result},
    repository::{FaqRepository, SolutionLookup},
    service::{
        authorization::{AuthorizationGate, MaintenanceGrant, ModerationAction},
        log_storage_error,
    },
};

/// Curates FAQ entries out of resolved questions.
pub struct FaqCurationService {
    repo: Arc<dyn FaqRepository>,
    solutions: Arc<dyn SolutionLookup>,
    gate: Arc<AuthorizationGate>,
}

impl FaqCurationService {
    pub fn new(
        repo: Arc<dyn FaqRepository>,
        solutions: Arc<dyn SolutionLookup>,
        gate: Arc<AuthorizationGate>,
    ) -> Self {
        Self { repo, solutions, gate }
    }

    /// Mark a question as FAQ. The question must have an accepted solution
    /// and must not already be marked.
    pub async fn mark_as_faq(&self, request: MarkFaqRequest, acting_user: Option<UserId>) -> Result<FaqEntry> {
        let staff_id = self.gate.require(acting_user, ModerationAction::MarkFaq).await?;

        validate_fields(&request.category, &request.display_title)?;

        if !self.solutions.has_solution(request.question_id).await.map_err(log_storage_error)? {
            tracing::warn!(question_id = request.question_id, "FAQ refused: no solution answer");
            return Err(AppError::PreconditionFailed(format!(
                "Question {} has no answer marked as solution",
                request.question_id
            )));
        }

        if self.repo.exists_for_question(request.question_id).await.map_err(log_storage_error)? {
            return Err(AppError::Conflict(format!(
                "Question {} is already marked as FAQ",
                request.question_id
            )));
        }

        let entry = self.repo.create(request, staff_id).await.map_err(log_storage_error)?;

        tracing::info!(
            faq_id = entry.id,
            question_id = entry.question_id,
            staff_id,
            "Question marked as FAQ"
        );
        Ok(entry)
    }

    /// Remove every FAQ entry for the question. Returns whether anything was removed.
    pub async fn remove_faq(&self, question_id: QuestionId, acting_user: Option<UserId>) -> Result<bool> {
        let staff_id = self.gate.require(acting_user, ModerationAction::RemoveFaq).await?;

        let removed = self.repo.delete_by_question(question_id).await.map_err(log_storage_error)?;
        if removed > 0 {
            tracing::info!(question_id, staff_id, removed, "FAQ entries removed");
        }
        Ok(removed > 0)
    }

    /// Removal without a staff actor, for maintenance jobs.
    pub async fn remove_faq_with_grant(&self, question_id: QuestionId, grant: &MaintenanceGrant) -> Result<bool> {
        let removed = self.repo.delete_by_question(question_id).await.map_err(log_storage_error)?;
        tracing::warn!(
            question_id,
            removed,
            reason = grant.reason(),
            "FAQ entries removed under maintenance grant"
        );
        Ok(removed > 0)
    }

    /// Edit category, title and notes. The question link is fixed.
    pub async fn update(&self, faq_id: FaqId, request: UpdateFaqRequest, acting_user: Option<UserId>) -> Result<FaqEntry> {
        let staff_id = self.gate.require(acting_user, ModerationAction::UpdateFaq).await?;

        validate_fields(&request.category, &request.display_title)?;

        let entry = self.repo.update(faq_id, request).await.map_err(log_storage_error)?;
        tracing::info!(faq_id, staff_id, "FAQ entry updated");
        Ok(entry)
    }

    pub async fn find_by_id(&self, faq_id: FaqId) -> Result<Option<FaqEntry>> {
        self.repo.find_by_id(faq_id).await.map_err(log_storage_error)
    }

    pub async fn find_by_question(&self, question_id: QuestionId) -> Result<Option<FaqEntry>> {
        self.repo.find_by_question(question_id).await.map_err(log_storage_error)
    }

    pub async fn is_question_marked_as_faq(&self, question_id: QuestionId) -> Result<bool> {
        self.repo.exists_for_question(question_id).await.map_err(log_storage_error)
    }

    /// All entries, by category then newest first.
    pub async fn list_all(&self) -> Result<Vec<FaqEntry>> {
        self.repo.list_all().await.map_err(log_storage_error)
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<FaqEntry>> {
        self.repo.list_by_category(category).await.map_err(log_storage_error)
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        self.repo.categories().await.map_err(log_storage_error)
    }
}

fn validate_fields(category: &str, display_title: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(AppError::Validation("Category is required".to_string()));
    }
    if display_title.trim().is_empty() {
        return Err(AppError::Validation("Display title is required".to_string()));
    }
    Ok(())
}
