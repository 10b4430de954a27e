use async_trait::async_trait;

use crate::event::{CatalogError, NewEvent};

/// Durable home of published event definitions.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Store a definition whose `id` is already assigned. Fails with
    /// `AlreadyExists` if the id is taken.
    async fn save(&self, definition: &NewEvent) -> Result<(), CatalogError>;

    /// Every stored definition, oldest first
    async fn load_all(&self) -> Result<Vec<NewEvent>, CatalogError>;
}
