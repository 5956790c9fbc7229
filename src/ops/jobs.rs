//! Job mutations.

use uuid::Uuid;

use crate::backend::tables;
use crate::errors::AppError;
use crate::models::{CreateJobRequest, Job, UpdateJobRequest};
use crate::state::AppState;

impl AppState {
    /// Create a job and reload the snapshot.
    pub async fn create_job(&self, request: &CreateJobRequest) -> Result<Job, AppError> {
        let job: Job = self.backend.insert(tables::JOBS, request).await?;
        self.reload().await;
        Ok(job)
    }

    /// Update a job and reload the snapshot.
    pub async fn update_job(&self, id: Uuid, changes: &UpdateJobRequest) -> Result<Job, AppError> {
        let job: Job = self.backend.update(tables::JOBS, id, changes).await?;
        self.reload().await;
        Ok(job)
    }

    /// Delete a job and reload the snapshot.
    pub async fn delete_job(&self, id: Uuid) -> Result<(), AppError> {
        self.backend.delete(tables::JOBS, id).await?;
        self.reload().await;
        Ok(())
    }
}
