//! Console rendering of deck state

use deck_core::{
    Classification, DeckSubscriber, LayoutEvent, Navigator, Presentation, ReadyEvent, SlideChangedEvent,
    SlideStatus,
};
use parking_lot::Mutex;
use tracing::info;

/// Subscriber that reports notifications on stdout
#[derive(Default)]
pub struct ConsoleRenderer {
    /// Displayed slides from the most recent layout pass
    displayed: Mutex<Vec<usize>>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn displayed(&self) -> Vec<usize> {
        self.displayed.lock().clone()
    }
}

impl DeckSubscriber for ConsoleRenderer {
    fn on_ready(&self, event: &ReadyEvent) {
        info!("ready at slide {}", event.index);
        println!("ready: slide {}{}", event.index, slide_label(event.current_slide.as_ref()));
    }

    fn on_slide_changed(&self, event: &SlideChangedEvent) {
        let from = event
            .previous_slide
            .as_ref()
            .map(|s| s.index.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "slidechanged: {} -> {}{}",
            from,
            event.index,
            slide_label(event.current_slide.as_ref())
        );
    }

    fn on_state_entered(&self, tag: &str) {
        println!("state: +{tag}");
    }

    fn on_state_exited(&self, tag: &str) {
        println!("state: -{tag}");
    }

    fn on_layout(&self, event: &LayoutEvent) {
        *self.displayed.lock() = event.displayed.clone();
    }
}

fn slide_label(slide: Option<&deck_core::Slide>) -> String {
    match slide.and_then(|s| s.id.as_deref()) {
        Some(id) => format!(" ({id})"),
        None => String::new(),
    }
}

/// One cell per slide: `<` future, `@` present, `>` past, `.` not displayed
pub fn render_strip(statuses: &[SlideStatus]) -> String {
    statuses
        .iter()
        .map(|status| {
            if !status.displayed {
                return '.';
            }
            match status.classification {
                Some(Classification::Future) => '<',
                Some(Classification::Present) => '@',
                Some(Classification::Past) => '>',
                None => '?',
            }
        })
        .collect()
}

/// Multi-line summary for the `status` command
pub fn render_status(presentation: &Presentation, navigator: &Navigator) -> String {
    let mut lines = Vec::new();
    lines.push(format!("slide {}/{}", navigator.index(), navigator.len()));
    lines.push(format!("deck  [{}]", render_strip(&navigator.statuses())));
    lines.push(format!("state {:?}", navigator.root_classes()));
    lines.push(format!("wrapper {:?}", presentation.wrapper_classes()));
    if presentation.is_disabled() {
        lines.push(format!("body {:?}", presentation.body_classes()));
    }
    lines.join("\n")
}
