//! Presentation configuration
//!
//! Applied at startup and re-appliable afterwards through
//! [`crate::Presentation::configure`].

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{DeckError, Result};

/// Visual transition between slides
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    None,
    Fade,
    Slide,
    #[default]
    Convex,
    Concave,
    Zoom,
    /// Forced when the host lacks 3D transforms
    Linear,
}

impl Transition {
    /// Class name applied to the presentation wrapper
    pub fn class_name(&self) -> &'static str {
        match self {
            Transition::None => "none",
            Transition::Fade => "fade",
            Transition::Slide => "slide",
            Transition::Convex => "convex",
            Transition::Concave => "concave",
            Transition::Zoom => "zoom",
            Transition::Linear => "linear",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// An external resource loaded before (or, when `async`, after) start
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dependency {
    pub src: String,

    #[serde(default, rename = "async")]
    pub async_load: bool,

    /// Host feature flag that must be present for the resource to load
    #[serde(default)]
    pub condition: Option<String>,
}

/// Dependencies split by load phase, conditions already evaluated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyPlan {
    pub blocking: Vec<Dependency>,
    pub deferred: Vec<Dependency>,
}

impl DependencyPlan {
    pub fn is_empty(&self) -> bool {
        self.blocking.is_empty() && self.deferred.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DeckConfig {
    pub transition: Transition,

    /// Number of slides away from the current that stay displayed
    pub view_distance: usize,

    /// Script dependencies to load
    pub dependencies: Vec<Dependency>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            transition: Transition::Convex,
            view_distance: 5,
            dependencies: Vec::new(),
        }
    }
}

/// Partial configuration, merged over the current one
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub transition: Option<Transition>,
    pub view_distance: Option<usize>,
    pub dependencies: Option<Vec<Dependency>>,
}

impl DeckConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DeckConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.view_distance == 0 {
            return Err(DeckError::InvalidConfig("viewDistance must be positive".into()));
        }
        Ok(())
    }

    /// Copy every set override over this configuration
    pub fn merge(&mut self, overrides: ConfigOverrides) -> Result<()> {
        let mut merged = self.clone();
        if let Some(transition) = overrides.transition {
            merged.transition = transition;
        }
        if let Some(view_distance) = overrides.view_distance {
            merged.view_distance = view_distance;
        }
        if let Some(dependencies) = overrides.dependencies {
            merged.dependencies = dependencies;
        }
        merged.validate()?;
        *self = merged;
        Ok(())
    }

    /// Split dependencies into load phases, skipping those whose condition
    /// the host does not satisfy.
    pub fn dependency_plan(&self, has_feature: impl Fn(&str) -> bool) -> DependencyPlan {
        let mut plan = DependencyPlan::default();
        for dependency in &self.dependencies {
            let wanted = dependency.condition.as_deref().map_or(true, &has_feature);
            if !wanted {
                continue;
            }
            if dependency.async_load {
                plan.deferred.push(dependency.clone());
            } else {
                plan.blocking.push(dependency.clone());
            }
        }
        plan
    }
}
