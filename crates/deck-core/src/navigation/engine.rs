//! Navigator implementation

use std::cmp::Ordering;
use std::sync::{Arc, Weak};

use indexmap::IndexSet;
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::state::diff_state;
use super::subscriber::Notification;
use super::visibility::compute_visibility_window;
use super::{
    Classification, DeckSubscriber, LayoutEvent, ReadyEvent, Routes, SlideChangedEvent, SlideStatus,
};
use crate::deck::{Deck, Slide};
use crate::location::Fragment;

/// Navigation state stored internally
#[derive(Debug)]
struct NavigatorState {
    deck: Arc<Deck>,
    status: Vec<SlideStatus>,
    /// None until the first navigation
    current: Option<usize>,
    current_slide: Option<usize>,
    previous_slide: Option<usize>,
    /// Tags of the present slide
    state: Vec<String>,
    view_distance: usize,
    /// Classes on the document root
    root_classes: IndexSet<String>,
}

impl NavigatorState {
    /// Classify every slide around `index` and pick up the present slide's
    /// state tags. Returns the clamped index.
    fn update_slides(&mut self, index: usize) -> usize {
        let len = self.deck.len();
        if len == 0 {
            // No slides means we can't be anywhere beyond the zeroth index
            self.state.clear();
            return 0;
        }

        let index = index.min(len - 1);
        for (i, status) in self.status.iter_mut().enumerate() {
            status.classification = Some(match i.cmp(&index) {
                Ordering::Less => Classification::Future,
                Ordering::Greater => Classification::Past,
                Ordering::Equal => Classification::Present,
            });
            status.hidden = i != index;
        }

        self.state = self.deck.get(index).map(|s| s.state.clone()).unwrap_or_default();
        index
    }

    fn update_visibility(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        if self.deck.is_empty() {
            return;
        }

        let window = compute_visibility_window(current, self.view_distance, self.deck.len());
        for (status, displayed) in self.status.iter_mut().zip(window) {
            status.displayed = displayed;
        }
    }

    fn layout_event(&self) -> LayoutEvent {
        LayoutEvent {
            displayed: self
                .status
                .iter()
                .enumerate()
                .filter(|(_, s)| s.displayed)
                .map(|(i, _)| i)
                .collect(),
        }
    }

    fn slide(&self, index: Option<usize>) -> Option<Slide> {
        index.and_then(|i| self.deck.get(i).cloned())
    }
}

/// The slide navigator.
///
/// Owns the current index and every piece of view state derived from it.
/// All mutation goes through [`Navigator::goto_index`].
pub struct Navigator {
    state: Arc<RwLock<NavigatorState>>,
    subscribers: Arc<RwLock<Vec<Weak<dyn DeckSubscriber>>>>,
}

impl Navigator {
    /// Create a navigator over `deck`. Nothing is classified until the first
    /// navigation.
    pub fn new(deck: Deck, view_distance: usize) -> Self {
        let deck = Arc::new(deck);
        let state = NavigatorState {
            status: vec![SlideStatus::default(); deck.len()],
            deck,
            current: None,
            current_slide: None,
            previous_slide: None,
            state: Vec::new(),
            view_distance: view_distance.max(1),
            root_classes: IndexSet::new(),
        };

        Self {
            state: Arc::new(RwLock::new(state)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Step to the slide at `target`, or re-apply the current index when
    /// `target` is None. Out of range targets are clamped. Returns the
    /// resolved index.
    pub fn goto_index(&self, target: Option<usize>) -> usize {
        let mut state = self.state.write();
        let mut notifications = Vec::new();

        // Remember where we were before
        let previous_slide = state.current_slide;
        let state_before = std::mem::take(&mut state.state);
        let index_before = state.current.unwrap_or(0);

        let requested = target.or(state.current).unwrap_or(0);
        let index = state.update_slides(requested);
        state.current = Some(index);

        state.update_visibility();
        notifications.push(Notification::Layout(state.layout_event()));

        // Additions first so a tag shared across the transition never drops
        let diff = diff_state(&state_before, &state.state);
        for tag in diff.entered {
            state.root_classes.insert(tag.clone());
            notifications.push(Notification::StateEntered(tag));
        }
        for tag in diff.exited {
            state.root_classes.shift_remove(&tag);
            notifications.push(Notification::StateExited(tag));
        }

        state.current_slide = if state.deck.is_empty() { None } else { Some(index) };

        if index != index_before {
            state.previous_slide = previous_slide;
            notifications.push(Notification::SlideChanged(SlideChangedEvent {
                index,
                previous_slide: state.slide(previous_slide),
                current_slide: state.slide(state.current_slide),
            }));
        } else {
            // The previous slide is never the same as the current one
            state.previous_slide = None;
        }

        debug!(
            "navigator: goto requested={:?} resolved={} before={} state={:?}",
            target, index, index_before, state.state
        );

        drop(state);
        self.notify(notifications);
        index
    }

    /// Navigate according to a location fragment.
    pub fn resolve_from_location(&self, fragment: &Fragment) -> usize {
        let (current, position) = {
            let state = self.state.read();
            let position = match fragment {
                Fragment::Named(name) => state.deck.position_of(name),
                _ => None,
            };
            (state.current, position)
        };

        match fragment {
            Fragment::Named(name) => match position {
                Some(index) => self.goto_index(Some(index)),
                None => {
                    debug!("navigator: no slide named '{}', staying put", name);
                    self.goto_index(Some(current.unwrap_or(0)))
                }
            },
            Fragment::Malformed(name) => {
                warn!("navigator: ignoring malformed fragment name '{}'", name);
                self.goto_index(Some(current.unwrap_or(0)))
            }
            Fragment::Index(index) => {
                if current != Some(*index) {
                    self.goto_index(Some(*index))
                } else {
                    *index
                }
            }
        }
    }

    /// Parse `hash` and navigate to it
    pub fn resolve_hash(&self, hash: &str) -> usize {
        self.resolve_from_location(&Fragment::parse(hash))
    }

    /// Which directions are currently legal
    pub fn available_routes(&self) -> Routes {
        let state = self.state.read();
        let index = state.current.unwrap_or(0);
        Routes {
            left: index > 0,
            right: index + 1 < state.deck.len(),
        }
    }

    /// Index of the slide carrying `id`, or the current index when `id` is
    /// None. Unknown ids resolve to 0.
    pub fn indices_of(&self, id: Option<&str>) -> usize {
        let state = self.state.read();
        match id {
            Some(id) => state.deck.position_of(id).unwrap_or(0),
            None => state.current.unwrap_or(0),
        }
    }

    /// Emit a layout refresh for the displayed slides
    /// Nothing is emitted before the first navigation.
    pub fn layout(&self) {
        let event = {
            let state = self.state.read();
            if state.current.is_none() {
                return;
            }
            state.layout_event()
        };
        self.notify(vec![Notification::Layout(event)]);
    }

    /// Re-apply visibility and layout without navigating
    pub fn sync(&self) {
        let event = {
            let mut state = self.state.write();
            if state.current.is_none() {
                return;
            }
            state.update_visibility();
            state.layout_event()
        };
        self.notify(vec![Notification::Layout(event)]);
    }

    pub fn set_view_distance(&self, view_distance: usize) {
        self.state.write().view_distance = view_distance.max(1);
        self.sync();
    }

    /// Swap in a new deck snapshot and re-apply the current index to it
    pub fn rebuild(&self, deck: Deck) {
        let navigated = {
            let mut state = self.state.write();
            state.status = vec![SlideStatus::default(); deck.len()];
            let len = deck.len();
            state.deck = Arc::new(deck);
            state.current_slide = state.current_slide.filter(|i| *i < len);
            state.previous_slide = None;
            state.current.is_some()
        };

        if navigated {
            self.goto_index(None);
        } else {
            self.sync();
        }
    }

    /// Add a subscriber. Only a weak reference is kept.
    pub fn add_subscriber(&self, subscriber: Arc<dyn DeckSubscriber>) {
        let mut subscribers = self.subscribers.write();
        subscribers.push(Arc::downgrade(&subscriber));
    }

    pub(crate) fn announce_ready(&self) {
        let event = {
            let state = self.state.read();
            ReadyEvent {
                index: state.current.unwrap_or(0),
                current_slide: state.slide(state.current_slide),
            }
        };
        self.notify(vec![Notification::Ready(event)]);
    }

    pub fn index(&self) -> usize {
        self.state.read().current.unwrap_or(0)
    }

    /// False until the first navigation
    pub fn has_navigated(&self) -> bool {
        self.state.read().current.is_some()
    }

    pub fn len(&self) -> usize {
        self.state.read().deck.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn deck(&self) -> Arc<Deck> {
        self.state.read().deck.clone()
    }

    pub fn current_slide(&self) -> Option<Slide> {
        let state = self.state.read();
        state.slide(state.current_slide)
    }

    /// Slide left by the last effective index change
    pub fn previous_slide(&self) -> Option<Slide> {
        let state = self.state.read();
        state.slide(state.previous_slide)
    }

    pub fn slide_status(&self, index: usize) -> Option<SlideStatus> {
        self.state.read().status.get(index).copied()
    }

    pub fn statuses(&self) -> Vec<SlideStatus> {
        self.state.read().status.clone()
    }

    /// State tags of the present slide
    pub fn active_state(&self) -> Vec<String> {
        self.state.read().state.clone()
    }

    pub fn root_classes(&self) -> Vec<String> {
        self.state.read().root_classes.iter().cloned().collect()
    }

    pub fn view_distance(&self) -> usize {
        self.state.read().view_distance
    }

    /// Deliver notifications to every live subscriber
    fn notify(&self, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }

        let live: Vec<Arc<dyn DeckSubscriber>> = {
            let mut subscribers = self.subscribers.write();

            // Remove any dead weak references
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        for notification in &notifications {
            for subscriber in &live {
                notification.deliver(subscriber.as_ref());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        log: Mutex<Vec<String>>,
        changes: Mutex<Vec<SlideChangedEvent>>,
        layouts: Mutex<Vec<Vec<usize>>>,
    }

    impl Recorder {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.log.lock())
        }
    }

    impl DeckSubscriber for Recorder {
        fn on_ready(&self, event: &ReadyEvent) {
            self.log.lock().push(format!("ready:{}", event.index));
        }

        fn on_slide_changed(&self, event: &SlideChangedEvent) {
            self.log.lock().push(format!("changed:{}", event.index));
            self.changes.lock().push(event.clone());
        }

        fn on_state_entered(&self, tag: &str) {
            self.log.lock().push(format!("enter:{tag}"));
        }

        fn on_state_exited(&self, tag: &str) {
            self.log.lock().push(format!("exit:{tag}"));
        }

        fn on_layout(&self, event: &LayoutEvent) {
            self.layouts.lock().push(event.displayed.clone());
        }
    }

    fn deck_of(n: usize) -> Deck {
        Deck::new((0..n).map(Slide::new).collect()).unwrap()
    }

    fn navigator_with_recorder(deck: Deck) -> (Navigator, Arc<Recorder>) {
        let navigator = Navigator::new(deck, 5);
        let recorder = Arc::new(Recorder::default());
        navigator.add_subscriber(recorder.clone());
        (navigator, recorder)
    }

    fn present_count(navigator: &Navigator) -> usize {
        navigator
            .statuses()
            .iter()
            .filter(|s| s.classification == Some(Classification::Present))
            .count()
    }

    #[test]
    fn test_goto_clamps_for_any_deck_size() {
        for n in 0..6 {
            for target in 0..10 {
                let navigator = Navigator::new(deck_of(n), 5);
                let index = navigator.goto_index(Some(target));
                let expected = if n == 0 { 0 } else { target.min(n - 1) };
                assert_eq!(index, expected, "n={n} target={target}");
                assert_eq!(navigator.index(), expected);
                assert_eq!(present_count(&navigator), usize::from(n > 0));
            }
        }
    }

    #[test]
    fn test_classification_is_literal() {
        let navigator = Navigator::new(deck_of(5), 5);
        navigator.goto_index(Some(2));

        let classes: Vec<_> = navigator.statuses().iter().map(|s| s.classification).collect();
        assert_eq!(
            classes,
            vec![
                Some(Classification::Future),
                Some(Classification::Future),
                Some(Classification::Present),
                Some(Classification::Past),
                Some(Classification::Past),
            ]
        );

        let hidden: Vec<_> = navigator.statuses().iter().map(|s| s.hidden).collect();
        assert_eq!(hidden, vec![true, true, false, true, true]);
    }

    #[test]
    fn test_repeated_goto_suppresses_slide_changed() {
        let (navigator, recorder) = navigator_with_recorder(deck_of(4));

        navigator.goto_index(Some(2));
        assert_eq!(recorder.take(), vec!["changed:2"]);
        assert_eq!(navigator.previous_slide(), None);

        navigator.goto_index(Some(3));
        assert_eq!(recorder.take(), vec!["changed:3"]);
        assert_eq!(navigator.previous_slide().map(|s| s.index), Some(2));

        navigator.goto_index(Some(3));
        assert!(recorder.take().is_empty());
        assert_eq!(navigator.previous_slide(), None);

        navigator.goto_index(None);
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_slide_changed_carries_slides() {
        let (navigator, recorder) = navigator_with_recorder(deck_of(3));
        navigator.goto_index(Some(1));
        navigator.goto_index(Some(2));

        let changes = recorder.changes.lock();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].previous_slide, None);
        assert_eq!(changes[1].previous_slide.as_ref().map(|s| s.index), Some(1));
        assert_eq!(changes[1].current_slide.as_ref().map(|s| s.index), Some(2));
    }

    #[test]
    fn test_shared_state_tag_does_not_flicker() {
        let deck = Deck::new(vec![
            Slide::new(0).with_state("dim alert"),
            Slide::new(1).with_state("dim calm"),
            Slide::new(2),
        ])
        .unwrap();
        let (navigator, recorder) = navigator_with_recorder(deck);

        navigator.goto_index(Some(0));
        assert_eq!(recorder.take(), vec!["enter:dim", "enter:alert"]);
        assert_eq!(navigator.root_classes(), vec!["dim", "alert"]);

        navigator.goto_index(Some(1));
        assert_eq!(recorder.take(), vec!["enter:calm", "exit:alert", "changed:1"]);
        assert_eq!(navigator.root_classes(), vec!["dim", "calm"]);

        navigator.goto_index(Some(2));
        assert_eq!(recorder.take(), vec!["exit:calm", "exit:dim", "changed:2"]);
        assert!(navigator.root_classes().is_empty());
        assert!(navigator.active_state().is_empty());
    }

    #[test]
    fn test_refresh_keeps_state() {
        let deck = Deck::new(vec![Slide::new(0).with_state("dim")]).unwrap();
        let (navigator, recorder) = navigator_with_recorder(deck);
        navigator.goto_index(Some(0));
        recorder.take();

        navigator.goto_index(None);
        assert!(recorder.take().is_empty());
        assert_eq!(navigator.root_classes(), vec!["dim"]);
    }

    #[test]
    fn test_resolve_numeric_fragment() {
        let (navigator, recorder) = navigator_with_recorder(deck_of(5));
        assert_eq!(navigator.resolve_hash("#/2"), 2);
        assert_eq!(recorder.take(), vec!["changed:2"]);

        // Same fragment again is not re-applied
        assert_eq!(navigator.resolve_hash("#/2"), 2);
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_resolve_unknown_name_stays_put() {
        let navigator = Navigator::new(deck_of(5), 5);
        navigator.goto_index(Some(3));
        assert_eq!(navigator.resolve_hash("#/bogus"), 3);
        assert_eq!(navigator.resolve_hash("#/b@d!"), 3);
        assert_eq!(navigator.index(), 3);
    }

    #[test]
    fn test_resolve_named_fragment() {
        let deck = Deck::new(vec![
            Slide::new(0).with_id("sec1"),
            Slide::new(1).with_id("sec2"),
            Slide::new(2).with_id("sec3"),
        ])
        .unwrap();
        let navigator = Navigator::new(deck, 5);
        assert_eq!(navigator.resolve_hash("#/sec3"), 2);
        assert_eq!(navigator.current_slide().and_then(|s| s.id), Some("sec3".to_string()));
        assert_eq!(navigator.indices_of(Some("sec2")), 1);
        assert_eq!(navigator.indices_of(None), 2);
    }

    #[test]
    fn test_initial_resolve_navigates_to_zero() {
        let navigator = Navigator::new(deck_of(3), 5);
        assert!(!navigator.has_navigated());
        navigator.resolve_hash("");
        assert!(navigator.has_navigated());
        assert_eq!(present_count(&navigator), 1);
    }

    #[test]
    fn test_visibility_window_applied() {
        let navigator = Navigator::new(deck_of(11), 2);
        navigator.goto_index(Some(5));
        let displayed: Vec<usize> = navigator
            .statuses()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.displayed)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(displayed, vec![4, 5, 6]);

        navigator.set_view_distance(5);
        assert!(navigator.statuses().iter().all(|s| s.displayed));
    }

    #[test]
    fn test_goto_emits_layout_for_window() {
        let navigator = Navigator::new(deck_of(11), 2);
        let recorder = Arc::new(Recorder::default());
        navigator.add_subscriber(recorder.clone());

        navigator.goto_index(Some(5));
        assert_eq!(*recorder.layouts.lock(), vec![vec![4, 5, 6]]);

        navigator.layout();
        navigator.goto_index(Some(99));
        assert_eq!(
            *recorder.layouts.lock(),
            vec![vec![4, 5, 6], vec![4, 5, 6], vec![9, 10]]
        );
    }

    #[test]
    fn test_no_layout_before_first_navigation() {
        let navigator = Navigator::new(deck_of(11), 2);
        let recorder = Arc::new(Recorder::default());
        navigator.add_subscriber(recorder.clone());

        navigator.layout();
        navigator.set_view_distance(3);
        navigator.sync();
        assert!(recorder.layouts.lock().is_empty());

        navigator.goto_index(Some(0));
        assert_eq!(*recorder.layouts.lock(), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_available_routes() {
        let navigator = Navigator::new(deck_of(3), 5);
        navigator.goto_index(Some(0));
        assert_eq!(navigator.available_routes(), Routes { left: false, right: true });
        navigator.goto_index(Some(2));
        assert_eq!(navigator.available_routes(), Routes { left: true, right: false });

        let empty = Navigator::new(Deck::empty(), 5);
        assert_eq!(empty.available_routes(), Routes { left: false, right: false });
    }

    #[test]
    fn test_rebuild_reapplies_current_index() {
        let navigator = Navigator::new(deck_of(5), 5);
        navigator.goto_index(Some(4));
        navigator.rebuild(deck_of(2));
        assert_eq!(navigator.index(), 1);
        assert_eq!(present_count(&navigator), 1);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let navigator = Navigator::new(deck_of(3), 5);
        let recorder = Arc::new(Recorder::default());
        navigator.add_subscriber(recorder.clone());
        drop(recorder);

        navigator.goto_index(Some(1));
        assert!(navigator.subscribers.read().is_empty());
    }
}
