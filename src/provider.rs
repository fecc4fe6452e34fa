//! Provider trait for field-event sources

use crate::Result;
use crate::types::FieldEvent;

/// Trait for field-event sources
///
/// Providers abstract over where decoded fields come from (a recorded
/// capture, a live decoder pushing through a channel) and handle their own
/// pacing internally.
#[async_trait::async_trait]
pub trait Provider: Send + 'static {
    /// Get the next field event
    ///
    /// Returns:
    /// - `Ok(Some(event))` - Next event in trace order
    /// - `Ok(None)` - Source exhausted (normal termination)
    /// - `Err(e)` - Error occurred
    async fn next_event(&mut self) -> Result<Option<FieldEvent>>;

    /// Short description for logs
    fn describe(&self) -> String;
}
