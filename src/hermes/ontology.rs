use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Topic filter matching every recognized intent
pub const INTENT_TOPIC_FILTER: &str = "hermes/intent/#";
pub const INTENT_TOPIC_PREFIX: &str = "hermes/intent/";
pub const END_SESSION_TOPIC: &str = "hermes/dialogueManager/endSession";
pub const START_SESSION_TOPIC: &str = "hermes/dialogueManager/startSession";

/// Intent recognized by the NLU, as published on `hermes/intent/<name>`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentMessage {
    pub session_id: String,
    #[serde(default = "default_site_id")]
    pub site_id: String,
    #[serde(default)]
    pub custom_data: Option<String>,
    #[serde(default)]
    pub input: String,
    pub intent: IntentClassifierResult,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

fn default_site_id() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentClassifierResult {
    pub intent_name: String,
    #[serde(default)]
    pub confidence_score: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub slot_name: String,
    #[serde(default)]
    pub raw_value: String,
    #[serde(default)]
    pub value: Option<SlotValue>,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f32>,
}

/// Resolved slot value, e.g. `{"kind": "Custom", "value": "imagine"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotValue {
    pub kind: String,
    #[serde(default)]
    pub value: Value,
}

impl IntentMessage {
    pub fn intent_name(&self) -> &str {
        &self.intent.intent_name
    }

    /// Spoken value of the first slot called `name`
    pub fn slot_value(&self, name: &str) -> Option<String> {
        self.slots
            .iter()
            .find(|slot| slot.slot_name == name)
            .and_then(Slot::spoken_value)
    }

    pub fn slot_names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.slot_name.as_str()).collect()
    }
}

impl Slot {
    /// Resolved value when it is a plain string or number, the raw
    /// transcription otherwise. Blank values count as absent.
    pub fn spoken_value(&self) -> Option<String> {
        let resolved = self.value.as_ref().and_then(|v| match &v.value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let text = resolved.unwrap_or_else(|| self.raw_value.clone());
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Payload of `hermes/dialogueManager/endSession`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionMessage {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Payload of `hermes/dialogueManager/startSession`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionMessage {
    pub site_id: String,
    pub init: SessionInit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<String>,
}

/// How a started session behaves; a notification speaks its text and ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionInit {
    Notification { text: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn play_song_payload() -> Value {
        json!({
            "sessionId": "2d1c3b0e-5c1f-4d9a-9a57-2c4d1f0a6b11",
            "customData": null,
            "siteId": "kitchen",
            "input": "joue imagine",
            "intent": {"intentName": "fabio35:playSong", "confidenceScore": 0.93},
            "slots": [{
                "rawValue": "imagine",
                "value": {"kind": "Custom", "value": "Imagine"},
                "range": {"start": 5, "end": 12},
                "entity": "musicTrack",
                "slotName": "musicTrack",
                "confidenceScore": 0.88
            }]
        })
    }

    #[test]
    fn decodes_intent_payload() {
        let msg: IntentMessage = serde_json::from_value(play_song_payload()).unwrap();
        assert_eq!(msg.intent_name(), "fabio35:playSong");
        assert_eq!(msg.site_id, "kitchen");
        assert_eq!(msg.slot_value("musicTrack").as_deref(), Some("Imagine"));
        assert_eq!(msg.slot_names(), vec!["musicTrack"]);
        assert!(msg.slot_value("artist").is_none());
    }

    #[test]
    fn minimal_payload_uses_defaults() {
        let msg: IntentMessage = serde_json::from_value(json!({
            "sessionId": "s1",
            "intent": {"intentName": "other:intent"}
        }))
        .unwrap();
        assert_eq!(msg.site_id, "default");
        assert!(msg.slots.is_empty());
    }

    #[test]
    fn raw_value_used_when_resolution_is_not_text() {
        let slot: Slot = serde_json::from_value(json!({
            "slotName": "musicTrack",
            "rawValue": " let it be ",
            "value": {"kind": "Custom", "value": {"nested": true}}
        }))
        .unwrap();
        assert_eq!(slot.spoken_value().as_deref(), Some("let it be"));
    }

    #[test]
    fn blank_slot_counts_as_absent() {
        let slot: Slot = serde_json::from_value(json!({
            "slotName": "musicTrack",
            "rawValue": "  "
        }))
        .unwrap();
        assert!(slot.spoken_value().is_none());
    }

    #[test]
    fn outbound_payloads_match_wire_format() {
        let end = EndSessionMessage {
            session_id: "s1".to_string(),
            text: Some(String::new()),
        };
        assert_eq!(
            serde_json::to_value(&end).unwrap(),
            json!({"sessionId": "s1", "text": ""})
        );

        let start = StartSessionMessage {
            site_id: "kitchen".to_string(),
            init: SessionInit::Notification {
                text: "3135556".to_string(),
            },
            custom_data: Some(String::new()),
        };
        assert_eq!(
            serde_json::to_value(&start).unwrap(),
            json!({
                "siteId": "kitchen",
                "init": {"type": "notification", "text": "3135556"},
                "customData": ""
            })
        );
    }
}
