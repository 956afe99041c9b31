use std::sync::Arc;

use crate::config::Config;
use crate::deezer::TrackSearchInterface;
use crate::hermes::DialogueInterface;

/// Everything an intent handler needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dialogue: Arc<dyn DialogueInterface>,
    pub search: Arc<dyn TrackSearchInterface>,
}

impl AppState {
    pub fn new(
        config: Config,
        dialogue: Arc<dyn DialogueInterface>,
        search: Arc<dyn TrackSearchInterface>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            dialogue,
            search,
        }
    }
}
