use async_trait::async_trait;

use crate::error::LookupFailure;

/// Music catalog search
#[async_trait]
pub trait TrackSearchInterface: Send + Sync {
    /// Identifier of the best match for `phrase`
    async fn find_track(&self, phrase: &str) -> Result<String, LookupFailure>;
}
