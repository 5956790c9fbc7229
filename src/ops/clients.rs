//! Client mutations. Deletion is owned by the backend's relationship
//! lifecycle and is not exposed here.

use uuid::Uuid;

use crate::backend::tables;
use crate::errors::AppError;
use crate::models::{Client, CreateClientRequest, UpdateClientRequest};
use crate::state::AppState;

impl AppState {
    /// Create a client and reload the snapshot.
    pub async fn create_client(&self, request: &CreateClientRequest) -> Result<Client, AppError> {
        let client: Client = self.backend.insert(tables::CLIENTS, request).await?;
        self.reload().await;
        Ok(client)
    }

    /// Update a client and reload the snapshot.
    pub async fn update_client(
        &self,
        id: Uuid,
        changes: &UpdateClientRequest,
    ) -> Result<Client, AppError> {
        let client: Client = self.backend.update(tables::CLIENTS, id, changes).await?;
        self.reload().await;
        Ok(client)
    }
}
