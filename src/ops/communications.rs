//! Communication mutations. Create-only: the product never edits or removes
//! a logged communication.

use crate::backend::tables;
use crate::errors::AppError;
use crate::models::{Communication, CreateCommunicationRequest};
use crate::state::AppState;

impl AppState {
    /// Create a communication and reload the snapshot.
    pub async fn create_communication(
        &self,
        request: &CreateCommunicationRequest,
    ) -> Result<Communication, AppError> {
        let communication: Communication =
            self.backend.insert(tables::COMMUNICATIONS, request).await?;
        self.reload().await;
        Ok(communication)
    }
}
