//! Core functionality for the slide deck navigator
//!
//! This crate owns the deck snapshot, the navigation state machine and its
//! synchronization with the location fragment. Hosts render the state it
//! exposes and feed it fragment changes.

pub mod config;
pub mod deck;
pub mod location;
pub mod navigation;
pub mod presentation;

use thiserror::Error;

// Re-export commonly used types
pub use config::{ConfigOverrides, DeckConfig, Dependency, DependencyPlan, Transition};
pub use deck::{Deck, LazyMedia, MediaKind, Slide};
pub use location::{Fragment, LocationBar};
pub use navigation::{
    Classification, DeckSubscriber, LayoutEvent, Navigator, ReadyEvent, Routes,
    SlideChangedEvent, SlideStatus,
};
pub use presentation::{HostCapabilities, Presentation, ResourceLoader};

/// Errors that can occur while loading a deck or its configuration
#[derive(Error, Debug)]
pub enum DeckError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Duplicate slide id '{0}'")]
    DuplicateId(String),

    #[error("Invalid slide id '{0}'")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, DeckError>;
