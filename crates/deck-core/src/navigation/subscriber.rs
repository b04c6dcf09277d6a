//! Navigation subscriber trait

use crate::deck::Slide;

/// Sent once after the presentation has started
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyEvent {
    pub index: usize,
    pub current_slide: Option<Slide>,
}

/// Sent on every effective index change
#[derive(Debug, Clone, PartialEq)]
pub struct SlideChangedEvent {
    pub index: usize,
    pub previous_slide: Option<Slide>,
    pub current_slide: Option<Slide>,
}

/// Sent whenever layout should be refreshed
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEvent {
    /// Indices of slides inside the visibility window
    pub displayed: Vec<usize>,
}

/// Trait for components that need to respond to deck navigation.
///
/// Every method defaults to a no-op so subscribers only implement the
/// notifications they care about.
pub trait DeckSubscriber: Send + Sync {
    fn on_ready(&self, _event: &ReadyEvent) {}

    fn on_slide_changed(&self, _event: &SlideChangedEvent) {}

    /// A state tag became active. The notification is named after the tag.
    fn on_state_entered(&self, _tag: &str) {}

    fn on_state_exited(&self, _tag: &str) {}

    fn on_layout(&self, _event: &LayoutEvent) {}
}

/// A notification queued while the navigator holds its lock
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Notification {
    Ready(ReadyEvent),
    SlideChanged(SlideChangedEvent),
    StateEntered(String),
    StateExited(String),
    Layout(LayoutEvent),
}

impl Notification {
    pub(crate) fn deliver(&self, subscriber: &dyn DeckSubscriber) {
        match self {
            Notification::Ready(event) => subscriber.on_ready(event),
            Notification::SlideChanged(event) => subscriber.on_slide_changed(event),
            Notification::StateEntered(tag) => subscriber.on_state_entered(tag),
            Notification::StateExited(tag) => subscriber.on_state_exited(tag),
            Notification::Layout(event) => subscriber.on_layout(event),
        }
    }
}
