pub mod handler;

use tracing::{error, info};

use crate::error::Result;
use crate::hermes::IntentStream;
use crate::state::AppState;

pub use handler::{handle_intent, lookup_track_id};

/// Process intents one at a time until the broker connection fails
pub async fn run(state: AppState, mut intents: IntentStream) -> Result<()> {
    info!(
        "Listening for intent {} on {}",
        state.config.skill.intent_name,
        state.config.mqtt.address()
    );

    loop {
        let message = intents.next_intent().await?;
        if let Err(e) = handle_intent(&state, &message).await {
            error!("Error handling intent {}: {}", message.intent_name(), e);
        }
    }
}
