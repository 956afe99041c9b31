use async_trait::async_trait;

use crate::error::Result;

/// Outbound half of the dialogue manager protocol
#[async_trait]
pub trait DialogueInterface: Send + Sync {
    /// End a session so the platform expects no further turn
    async fn end_session(&self, session_id: &str, text: Option<&str>) -> Result<()>;

    /// Start a notification session on `site_id` that speaks `text`
    async fn start_notification(
        &self,
        site_id: &str,
        text: &str,
        custom_data: Option<&str>,
    ) -> Result<()>;
}
