pub mod client;
pub mod interface;
pub mod types;

pub use client::DeezerClient;
pub use interface::TrackSearchInterface;
pub use types::parse_response;
