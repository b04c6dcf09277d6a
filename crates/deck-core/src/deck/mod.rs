//! Immutable deck snapshot
//!
//! A [`Deck`] is read once from the presentation document and handed to the
//! navigator. Inserting slides means building a new deck and calling
//! [`crate::Navigator::rebuild`].

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DeckError, Result};

/// Kind of element whose source may be deferred
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Frame,
}

/// A media element that may carry a deferred source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LazyMedia {
    pub kind: MediaKind,

    /// Source currently in use
    #[serde(default)]
    pub src: Option<String>,

    /// Deferred source, moved into `src` when loaded
    #[serde(default)]
    pub data_src: Option<String>,
}

impl LazyMedia {
    /// Move the deferred source into place. Returns true if anything changed.
    pub fn load_now(&mut self) -> bool {
        match self.data_src.take() {
            Some(src) if !src.is_empty() => {
                self.src = Some(src);
                true
            }
            _ => false,
        }
    }
}

/// A single slide in the deck
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// 0-based position in the deck
    pub index: usize,

    /// Optional identifier, addressable through `#/<id>`
    pub id: Option<String>,

    /// State tags applied to the document while this slide is present
    pub state: Vec<String>,

    /// Media elements inside the slide
    pub media: Vec<LazyMedia>,
}

impl Slide {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            id: None,
            state: Vec::new(),
            media: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set state tags from a whitespace separated annotation
    pub fn with_state(mut self, annotation: &str) -> Self {
        self.state = parse_state_annotation(annotation);
        self
    }

    pub fn with_media(mut self, media: LazyMedia) -> Self {
        self.media.push(media);
        self
    }
}

/// Split a state annotation into tags, dropping repeats of the same tag.
pub fn parse_state_annotation(annotation: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in annotation.split_whitespace() {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// On-disk form of a slide
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideSpec {
    #[serde(default)]
    pub id: Option<String>,

    /// Whitespace separated state tags
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub media: Vec<LazyMedia>,
}

/// On-disk form of a deck
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckSpec {
    #[serde(default)]
    pub slides: Vec<SlideSpec>,
}

/// Ordered, immutable collection of slides
#[derive(Debug, Clone, Default)]
pub struct Deck {
    slides: Vec<Slide>,
    ids: AHashMap<String, usize>,
}

impl Deck {
    /// Build a deck from slides, renumbering them by position
    pub fn new(slides: Vec<Slide>) -> Result<Self> {
        let mut ids = AHashMap::new();
        let slides: Vec<Slide> = slides
            .into_iter()
            .enumerate()
            .map(|(index, slide)| Slide { index, ..slide })
            .collect();

        for slide in &slides {
            if let Some(id) = &slide.id {
                if id.is_empty() || id.chars().any(char::is_whitespace) {
                    return Err(DeckError::InvalidId(id.clone()));
                }
                if ids.insert(id.clone(), slide.index).is_some() {
                    return Err(DeckError::DuplicateId(id.clone()));
                }
            }
        }

        debug!("deck: built {} slides, {} addressable", slides.len(), ids.len());
        Ok(Self { slides, ids })
    }

    /// An empty deck
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_spec(spec: DeckSpec) -> Result<Self> {
        let slides = spec
            .slides
            .into_iter()
            .enumerate()
            .map(|(index, s)| Slide {
                index,
                id: s.id,
                state: s.state.as_deref().map(parse_state_annotation).unwrap_or_default(),
                media: s.media,
            })
            .collect();
        Self::new(slides)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let spec: DeckSpec = serde_json::from_str(json)?;
        Self::from_spec(spec)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Position of the slide carrying `id`
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.ids.get(id).copied()
    }

    /// Load every deferred media source up front. Returns how many moved.
    pub fn eager_load_media(&mut self) -> usize {
        self.slides
            .iter_mut()
            .flat_map(|slide| slide.media.iter_mut())
            .map(LazyMedia::load_now)
            .filter(|loaded| *loaded)
            .count()
    }
}
