pub mod client;
pub mod interface;
pub mod ontology;

pub use client::{EventSource, HermesClient, IntentStream};
pub use interface::DialogueInterface;
pub use ontology::{EndSessionMessage, IntentMessage, SessionInit, Slot, StartSessionMessage};
