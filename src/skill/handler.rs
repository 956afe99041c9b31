use tracing::{debug, info};

use crate::config::SkillConfig;
use crate::deezer::TrackSearchInterface;
use crate::error::Result;
use crate::hermes::IntentMessage;
use crate::state::AppState;

/// Route an intent to its handler. Intents the skill does not know are dropped.
pub async fn handle_intent(state: &AppState, message: &IntentMessage) -> Result<()> {
    info!("[Received] intent {}", message.intent_name());

    if message.intent_name() == state.config.skill.intent_name {
        play_track(state, message).await?;
    } else {
        debug!("No handler for intent {}, ignoring", message.intent_name());
    }

    Ok(())
}

/// Look the requested track up, then end the session and speak the result
async fn play_track(state: &AppState, message: &IntentMessage) -> Result<()> {
    let skill = &state.config.skill;
    info!(
        "[Received] slots: {:?} / input: {:?}",
        message.slot_names(),
        message.input
    );

    let searched_track = message
        .slot_value(&skill.slot_name)
        .unwrap_or_else(|| skill.default_track.clone());

    let text = lookup_track_id(state.search.as_ref(), &searched_track, skill).await;

    state
        .dialogue
        .end_session(&message.session_id, Some(""))
        .await?;
    state
        .dialogue
        .start_notification(&message.site_id, &text, Some(""))
        .await?;

    Ok(())
}

/// Track identifier for `phrase`, or the phrase to speak when there is none
pub async fn lookup_track_id(
    search: &dyn TrackSearchInterface,
    phrase: &str,
    skill: &SkillConfig,
) -> String {
    match search.find_track(phrase).await {
        Ok(track_id) => {
            info!("Found track id {} for {:?}", track_id, phrase);
            track_id
        }
        Err(failure) => {
            info!("Track lookup for {:?} failed: {}", phrase, failure);
            failure.phrase(skill).to_string()
        }
    }
}
