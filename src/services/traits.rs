use crate::services::{CommandSource, ServiceEffect};
use crate::state::Matrix;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for IRC services.
///
/// Services are virtual entities that handle commands directed at them.
/// They produce effects which are then applied to the network state.
#[async_trait]
pub trait Service: Send + Sync {
    /// Get the canonical name of the service (e.g., "ChanServ").
    fn name(&self) -> &str;

    /// Get the aliases for this service (e.g., "CS").
    fn aliases(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Handle a message directed to this service.
    ///
    /// # Arguments
    /// * `matrix` - The network state.
    /// * `source` - Who sent the command, and from where.
    /// * `text` - The message text (command and arguments).
    ///
    /// # Returns
    /// A list of effects to apply.
    async fn handle(
        &self,
        matrix: &Arc<Matrix>,
        source: &CommandSource,
        text: &str,
    ) -> Vec<ServiceEffect>;
}
