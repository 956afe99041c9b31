use async_trait::async_trait;
use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Packet, QoS};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::interface::DialogueInterface;
use super::ontology::{
    EndSessionMessage, IntentMessage, SessionInit, StartSessionMessage, END_SESSION_TOPIC,
    INTENT_TOPIC_FILTER, INTENT_TOPIC_PREFIX, START_SESSION_TOPIC,
};
use crate::config::MqttConfig;
use crate::error::{Result, SkillError};

/// Capacity of the request queue between the client handle and its event loop
const REQUEST_CAPACITY: usize = 16;
/// Intent payloads carry ASR tokens and can exceed the 10 KiB default
const MAX_PACKET_SIZE: usize = 256 * 1024;

/// Hermes client publishing dialogue manager requests over MQTT
#[derive(Clone)]
pub struct HermesClient {
    client: AsyncClient,
}

/// Source of broker events, polled from a background task
#[async_trait]
pub trait EventSource: Send + 'static {
    async fn poll(&mut self) -> std::result::Result<Event, ConnectionError>;
}

#[async_trait]
impl EventSource for EventLoop {
    async fn poll(&mut self) -> std::result::Result<Event, ConnectionError> {
        EventLoop::poll(self).await
    }
}

/// Intents decoded by the background event loop task, in arrival order
pub struct IntentStream {
    intents: mpsc::UnboundedReceiver<Result<IntentMessage>>,
}

impl HermesClient {
    /// Create the client and start driving its connection in a background
    /// task. Must be called from within a tokio runtime.
    pub fn connect(config: &MqttConfig) -> (Self, IntentStream) {
        let client_id = config.client_id();
        info!("Connecting to MQTT broker {} as {}", config.address(), client_id);

        let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
        options.set_keep_alive(config.keep_alive());
        options.set_max_packet_size(MAX_PACKET_SIZE, MAX_PACKET_SIZE);
        if let Some((username, password)) = config.credentials() {
            options.set_credentials(username, password);
        }

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        (Self { client }, IntentStream::spawn(eventloop))
    }

    pub async fn subscribe_intents(&self) -> Result<()> {
        self.client
            .subscribe(INTENT_TOPIC_FILTER, QoS::AtLeastOnce)
            .await?;
        debug!("Subscribed to {}", INTENT_TOPIC_FILTER);
        Ok(())
    }

    async fn publish_json<T: Serialize>(&self, topic: &str, message: &T) -> Result<()> {
        let payload = serde_json::to_vec(message)?;
        debug!("Publishing {} ({} bytes)", topic, payload.len());
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DialogueInterface for HermesClient {
    async fn end_session(&self, session_id: &str, text: Option<&str>) -> Result<()> {
        let message = EndSessionMessage {
            session_id: session_id.to_string(),
            text: text.map(|t| t.to_string()),
        };
        self.publish_json(END_SESSION_TOPIC, &message).await
    }

    async fn start_notification(
        &self,
        site_id: &str,
        text: &str,
        custom_data: Option<&str>,
    ) -> Result<()> {
        let message = StartSessionMessage {
            site_id: site_id.to_string(),
            init: SessionInit::Notification {
                text: text.to_string(),
            },
            custom_data: custom_data.map(|c| c.to_string()),
        };
        self.publish_json(START_SESSION_TOPIC, &message).await
    }
}

impl IntentStream {
    /// Poll `source` in its own task so keep-alives and queued publishes keep
    /// flowing while an intent is being handled.
    pub fn spawn<S: EventSource>(source: S) -> Self {
        let (sender, intents) = mpsc::unbounded_channel();
        tokio::spawn(pump_events(source, sender));
        Self { intents }
    }

    /// Wait for the next intent. A connection error from the background
    /// task is returned once; there is no reconnect.
    pub async fn next_intent(&mut self) -> Result<IntentMessage> {
        match self.intents.recv().await {
            Some(intent) => intent,
            None => Err(SkillError::EventLoopStopped),
        }
    }
}

async fn pump_events<S: EventSource>(
    mut source: S,
    intents: mpsc::UnboundedSender<Result<IntentMessage>>,
) {
    loop {
        let event = match source.poll().await {
            Ok(event) => event,
            Err(e) => {
                let _ = intents.send(Err(e.into()));
                return;
            }
        };

        if let Some(message) = intent_from_event(event) {
            if intents.send(Ok(message)).is_err() {
                debug!("Intent receiver dropped, stopping event loop");
                return;
            }
        }
    }
}

/// Decoded intent carried by `event`, if any. Payloads that do not decode
/// are logged and skipped.
fn intent_from_event(event: Event) -> Option<IntentMessage> {
    let publish = match event {
        Event::Incoming(Packet::Publish(publish)) => publish,
        Event::Incoming(Packet::ConnAck(ack)) => {
            info!("Connected to MQTT broker: {:?}", ack.code);
            return None;
        }
        _ => return None,
    };

    if !publish.topic.starts_with(INTENT_TOPIC_PREFIX) {
        debug!("Ignoring message on {}", publish.topic);
        return None;
    }

    match decode_intent(&publish.payload) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!("Dropping undecodable intent on {}: {}", publish.topic, e);
            None
        }
    }
}

fn decode_intent(payload: &[u8]) -> serde_json::Result<IntentMessage> {
    serde_json::from_slice(payload)
}
