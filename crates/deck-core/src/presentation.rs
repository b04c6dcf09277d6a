//! Presentation lifecycle
//!
//! Startup happens in two explicit phases. [`Presentation::build`] inspects
//! the host and prepares the navigator without navigating or notifying.
//! [`Presentation::start`] loads dependencies, applies configuration,
//! resolves the initial location and only then announces `ready`.

use std::sync::Arc;

use indexmap::IndexSet;
use tracing::{debug, info, warn};

use crate::config::{ConfigOverrides, DeckConfig, Dependency, Transition};
use crate::deck::Deck;
use crate::location::LocationBar;
use crate::navigation::Navigator;
use crate::Result;

/// Class set on the document body when the host cannot run the presentation
pub const NO_TRANSFORMS_CLASS: &str = "no-transforms";
const NO_TRANSITION_CLASS: &str = "no-transition";
const CENTER_CLASS: &str = "center";

/// What the host can do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCapabilities {
    pub transforms_2d: bool,
    pub transforms_3d: bool,
    /// Named feature flags, checked by dependency conditions
    pub features: Vec<String>,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            transforms_2d: true,
            transforms_3d: true,
            features: Vec::new(),
        }
    }
}

impl HostCapabilities {
    /// A host with no transform support at all
    pub fn static_only() -> Self {
        Self {
            transforms_2d: false,
            transforms_3d: false,
            features: Vec::new(),
        }
    }

    pub fn supports_transforms(&self) -> bool {
        self.transforms_2d || self.transforms_3d
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Loads external resources named by the configuration
pub trait ResourceLoader {
    fn load(&mut self, dependency: &Dependency);
}

impl<F> ResourceLoader for F
where
    F: FnMut(&Dependency),
{
    fn load(&mut self, dependency: &Dependency) {
        self(dependency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Built,
    Started,
    /// Host lacks transforms; every operation is a no-op
    Disabled,
}

pub struct Presentation {
    config: DeckConfig,
    capabilities: HostCapabilities,
    navigator: Arc<Navigator>,
    phase: Phase,
    wrapper_classes: IndexSet<String>,
    body_classes: IndexSet<String>,
    role: Option<&'static str>,
    transition_speed: Option<&'static str>,
}

impl Presentation {
    /// First phase: validate the configuration and inspect the host.
    pub fn build(mut deck: Deck, config: DeckConfig, capabilities: HostCapabilities) -> Result<Self> {
        config.validate()?;

        let mut body_classes = IndexSet::new();
        let phase = if capabilities.supports_transforms() {
            Phase::Built
        } else {
            // Nothing will drive the deck, so load every deferred source now
            let loaded = deck.eager_load_media();
            body_classes.insert(NO_TRANSFORMS_CLASS.to_string());
            warn!(
                "presentation: host has no transform support, showing static content ({} media loaded eagerly)",
                loaded
            );
            Phase::Disabled
        };

        let navigator = Arc::new(Navigator::new(deck, config.view_distance));

        Ok(Self {
            config,
            capabilities,
            navigator,
            phase,
            wrapper_classes: IndexSet::new(),
            body_classes,
            role: None,
            transition_speed: None,
        })
    }

    /// Second phase: load dependencies, configure, navigate to `location`
    /// and announce `ready`. Returns the starting index.
    pub fn start(&mut self, location: &LocationBar, loader: &mut dyn ResourceLoader) -> usize {
        match self.phase {
            Phase::Disabled => return 0,
            Phase::Started => {
                debug!("presentation: already started");
                return self.navigator.index();
            }
            Phase::Built => {}
        }

        let capabilities = &self.capabilities;
        let plan = self.config.dependency_plan(|feature| capabilities.has_feature(feature));
        for dependency in &plan.blocking {
            debug!("presentation: loading {}", dependency.src);
            loader.load(dependency);
        }
        for dependency in &plan.deferred {
            debug!("presentation: loading {} (async)", dependency.src);
            loader.load(dependency);
        }

        // Prevent transitions while we're loading
        self.wrapper_classes.insert(NO_TRANSITION_CLASS.to_string());
        self.role = Some("application");

        self.apply_config();
        let index = self.navigator.resolve_from_location(&location.fragment());

        self.wrapper_classes.shift_remove(NO_TRANSITION_CLASS);
        self.phase = Phase::Started;

        info!(
            "presentation: ready at slide {} of {} ({} transition)",
            index,
            self.navigator.len(),
            self.config.transition
        );
        self.navigator.announce_ready();
        index
    }

    /// Merge `overrides` into the configuration and re-apply it.
    pub fn configure(&mut self, overrides: ConfigOverrides) -> Result<()> {
        if self.phase == Phase::Disabled {
            return Ok(());
        }

        let previous = self.config.transition;
        self.config.merge(overrides)?;
        self.wrapper_classes.shift_remove(previous.class_name());
        self.apply_config();
        Ok(())
    }

    fn apply_config(&mut self) {
        if !self.capabilities.transforms_3d && self.config.transition != Transition::Linear {
            debug!("presentation: no 3D transforms, forcing linear transition");
            self.config.transition = Transition::Linear;
        }

        self.wrapper_classes.insert(self.config.transition.class_name().to_string());
        self.wrapper_classes.insert(CENTER_CLASS.to_string());
        self.transition_speed = Some("default");

        self.navigator.set_view_distance(self.config.view_distance);
    }

    /// Handler for fragment-change notifications. Ignored before start.
    pub fn on_hash_change(&self, location: &LocationBar) -> Option<usize> {
        if self.phase != Phase::Started {
            return None;
        }
        Some(self.navigator.resolve_from_location(&location.fragment()))
    }

    /// Handler for resize notifications
    pub fn on_resize(&self) {
        if self.phase == Phase::Started {
            self.navigator.layout();
        }
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &HostCapabilities {
        &self.capabilities
    }

    pub fn is_disabled(&self) -> bool {
        self.phase == Phase::Disabled
    }

    pub fn is_started(&self) -> bool {
        self.phase == Phase::Started
    }

    pub fn wrapper_classes(&self) -> Vec<String> {
        self.wrapper_classes.iter().cloned().collect()
    }

    pub fn body_classes(&self) -> Vec<String> {
        self.body_classes.iter().cloned().collect()
    }

    pub fn role(&self) -> Option<&'static str> {
        self.role
    }

    pub fn transition_speed(&self) -> Option<&'static str> {
        self.transition_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{LazyMedia, MediaKind, Slide};
    use crate::navigation::{DeckSubscriber, LayoutEvent, ReadyEvent, SlideChangedEvent};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        log: Mutex<Vec<String>>,
        layouts: Mutex<Vec<Vec<usize>>>,
    }

    impl DeckSubscriber for Recorder {
        fn on_ready(&self, event: &ReadyEvent) {
            let slide = event.current_slide.as_ref().map(|s| s.index);
            self.log.lock().push(format!("ready:{}:{:?}", event.index, slide));
        }

        fn on_slide_changed(&self, event: &SlideChangedEvent) {
            self.log.lock().push(format!("changed:{}", event.index));
        }

        fn on_layout(&self, event: &LayoutEvent) {
            self.layouts.lock().push(event.displayed.clone());
        }
    }

    fn deck_of(n: usize) -> Deck {
        Deck::new((0..n).map(Slide::new).collect()).unwrap()
    }

    fn no_loading(_: &Dependency) {}

    #[test]
    fn test_ready_follows_initial_navigation() {
        let mut presentation =
            Presentation::build(deck_of(5), DeckConfig::default(), HostCapabilities::default()).unwrap();
        let recorder = Arc::new(Recorder::default());
        presentation.navigator().add_subscriber(recorder.clone());

        // Building alone never notifies
        assert!(recorder.log.lock().is_empty());

        let index = presentation.start(&LocationBar::new("#/3"), &mut no_loading);
        assert_eq!(index, 3);
        assert_eq!(*recorder.log.lock(), vec!["changed:3", "ready:3:Some(3)"]);

        presentation.start(&LocationBar::new("#/1"), &mut no_loading);
        assert_eq!(recorder.log.lock().len(), 2);
    }

    #[test]
    fn test_start_applies_wrapper_state() {
        let mut presentation =
            Presentation::build(deck_of(2), DeckConfig::default(), HostCapabilities::default()).unwrap();
        presentation.start(&LocationBar::default(), &mut no_loading);

        assert_eq!(presentation.wrapper_classes(), vec!["convex", "center"]);
        assert_eq!(presentation.role(), Some("application"));
        assert_eq!(presentation.transition_speed(), Some("default"));
        assert!(presentation.is_started());
    }

    #[test]
    fn test_static_host_disables_and_loads_media() {
        let deck = Deck::new(vec![Slide::new(0).with_media(LazyMedia {
            kind: MediaKind::Image,
            src: None,
            data_src: Some("photo.jpg".into()),
        })])
        .unwrap();

        let mut presentation =
            Presentation::build(deck, DeckConfig::default(), HostCapabilities::static_only()).unwrap();
        assert!(presentation.is_disabled());
        assert_eq!(presentation.body_classes(), vec![NO_TRANSFORMS_CLASS]);

        let deck = presentation.navigator().deck();
        let media = &deck.get(0).unwrap().media[0];
        assert_eq!(media.src.as_deref(), Some("photo.jpg"));

        presentation.start(&LocationBar::new("#/0"), &mut no_loading);
        assert!(!presentation.navigator().has_navigated());
        assert_eq!(presentation.on_hash_change(&LocationBar::new("#/0")), None);
    }

    #[test]
    fn test_missing_3d_transforms_forces_linear() {
        let capabilities = HostCapabilities { transforms_3d: false, ..Default::default() };
        let mut presentation = Presentation::build(deck_of(3), DeckConfig::default(), capabilities).unwrap();
        presentation.start(&LocationBar::default(), &mut no_loading);
        assert_eq!(presentation.config().transition, Transition::Linear);

        presentation
            .configure(ConfigOverrides { transition: Some(Transition::Zoom), ..Default::default() })
            .unwrap();
        assert_eq!(presentation.config().transition, Transition::Linear);
        assert!(!presentation.wrapper_classes().contains(&"zoom".to_string()));
    }

    #[test]
    fn test_configure_swaps_transition_class() {
        let mut presentation =
            Presentation::build(deck_of(3), DeckConfig::default(), HostCapabilities::default()).unwrap();
        presentation.start(&LocationBar::default(), &mut no_loading);

        presentation
            .configure(ConfigOverrides {
                transition: Some(Transition::Fade),
                view_distance: Some(1),
                ..Default::default()
            })
            .unwrap();

        let classes = presentation.wrapper_classes();
        assert!(classes.contains(&"fade".to_string()));
        assert!(!classes.contains(&"convex".to_string()));
        assert_eq!(presentation.navigator().view_distance(), 1);
    }

    #[test]
    fn test_dependencies_load_blocking_first() {
        let config = DeckConfig {
            dependencies: vec![
                Dependency { src: "async.js".into(), async_load: true, condition: None },
                Dependency { src: "sync.js".into(), async_load: false, condition: None },
                Dependency { src: "touch.js".into(), async_load: false, condition: Some("touch".into()) },
            ],
            ..Default::default()
        };
        let mut presentation =
            Presentation::build(deck_of(1), config, HostCapabilities::default()).unwrap();

        let mut loaded = Vec::new();
        let mut loader = |dependency: &Dependency| loaded.push(dependency.src.clone());
        presentation.start(&LocationBar::default(), &mut loader);

        assert_eq!(loaded, vec!["sync.js", "async.js"]);
    }

    #[test]
    fn test_ready_carries_current_slide() {
        let deck = Deck::new(vec![Slide::new(0), Slide::new(1).with_id("intro"), Slide::new(2)]).unwrap();
        let mut presentation =
            Presentation::build(deck, DeckConfig::default(), HostCapabilities::default()).unwrap();
        let recorder = Arc::new(Recorder::default());
        presentation.navigator().add_subscriber(recorder.clone());

        presentation.start(&LocationBar::new("#/intro"), &mut no_loading);
        assert_eq!(*recorder.log.lock(), vec!["changed:1", "ready:1:Some(1)"]);
        assert_eq!(
            presentation.navigator().current_slide().and_then(|s| s.id),
            Some("intro".to_string())
        );
    }

    #[test]
    fn test_resize_emits_layout_only_after_start() {
        let config = DeckConfig { view_distance: 2, ..Default::default() };
        let mut presentation =
            Presentation::build(deck_of(11), config, HostCapabilities::default()).unwrap();
        let recorder = Arc::new(Recorder::default());
        presentation.navigator().add_subscriber(recorder.clone());

        presentation.on_resize();
        assert!(recorder.layouts.lock().is_empty());

        presentation.start(&LocationBar::new("#/5"), &mut no_loading);
        assert_eq!(*recorder.layouts.lock(), vec![vec![4, 5, 6]]);

        presentation.on_resize();
        presentation.navigator().goto_index(Some(99));
        assert_eq!(
            *recorder.layouts.lock(),
            vec![vec![4, 5, 6], vec![4, 5, 6], vec![9, 10]]
        );
    }

    #[test]
    fn test_hash_change_after_start() {
        let mut presentation =
            Presentation::build(deck_of(4), DeckConfig::default(), HostCapabilities::default()).unwrap();
        assert_eq!(presentation.on_hash_change(&LocationBar::new("#/2")), None);

        presentation.start(&LocationBar::default(), &mut no_loading);
        assert_eq!(presentation.on_hash_change(&LocationBar::new("#/2")), Some(2));
        assert_eq!(presentation.navigator().index(), 2);
    }
}
