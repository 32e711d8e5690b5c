//! CraftDraft Application
//!
//! Headless shell around the drafting engine: configuration loading,
//! session replay and the keyboard shortcut reference.

pub mod config;
pub mod session;
mod shortcuts;

pub use config::{AppConfig, CONFIG_ENV};
pub use session::{Session, SessionError, SessionReport};
pub use shortcuts::{Shortcut, ShortcutRegistry};
