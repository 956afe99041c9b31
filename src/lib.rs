//! Voice assistant skill answering a "play song" intent with the Deezer id
//! of the requested track.

pub mod config;
pub mod deezer;
pub mod error;
pub mod hermes;
pub mod skill;
pub mod state;

pub use crate::config::Config;
pub use crate::error::{LookupFailure, Result, SkillError};
pub use crate::state::AppState;
