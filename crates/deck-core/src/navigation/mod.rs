use serde::{Deserialize, Serialize};

mod engine;
mod state;
mod subscriber;
mod visibility;

pub use engine::Navigator;
pub use state::{diff_state, StateDiff};
pub use subscriber::{DeckSubscriber, LayoutEvent, ReadyEvent, SlideChangedEvent};
pub use visibility::compute_visibility_window;

/// Position of a slide relative to the active one.
///
/// Slides before the active slide are classified `Future` and slides after
/// it `Past`. Hosts key their styling on these exact names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Past,
    Present,
    Future,
}

impl Classification {
    pub fn class_name(&self) -> &'static str {
        match self {
            Classification::Past => "past",
            Classification::Present => "present",
            Classification::Future => "future",
        }
    }
}

/// Navigator-owned view status of one slide.
///
/// Before the first navigation every slide is unclassified and displayed,
/// and no layout notification is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideStatus {
    /// None until the slide has been classified once
    pub classification: Option<Classification>,

    /// Not interactable and hidden from assistive technology
    pub hidden: bool,

    /// Inside the visibility window
    pub displayed: bool,
}

impl Default for SlideStatus {
    fn default() -> Self {
        Self {
            classification: None,
            hidden: false,
            displayed: true,
        }
    }
}

/// Directions that are currently legal
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Routes {
    pub left: bool,
    pub right: bool,
}
