//! Navigation affordances: keyboard, swipe and menu.
//!
//! None of these touch the navigator directly. They move a menu cursor and
//! write the matching fragment into the location bar; the navigator reacts
//! to the fragment change.

use anyhow::{bail, Context, Result};
use deck_core::Fragment;

/// Minimum horizontal travel for a swipe
pub const SWIPE_THRESHOLD: f32 = 100.0;
/// Maximum vertical drift for a swipe
pub const SWIPE_MAX_DRIFT: f32 = 100.0;
/// Maximum duration of a swipe
pub const SWIPE_ALLOWED_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Forward,
}

/// A finished touch gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub dx: f32,
    pub dy: f32,
    pub elapsed_ms: u64,
}

impl Swipe {
    /// Direction of the gesture, if it qualifies as a swipe at all
    pub fn direction(&self) -> Option<Direction> {
        let qualifies = self.elapsed_ms <= SWIPE_ALLOWED_MS
            && self.dx.abs() >= SWIPE_THRESHOLD
            && self.dy.abs() <= SWIPE_MAX_DRIFT;
        if !qualifies {
            return None;
        }
        if self.dx < 0.0 {
            Some(Direction::Back)
        } else {
            Some(Direction::Forward)
        }
    }
}

/// Section menu with a 1-based, wrapping cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    prefix: String,
    sections: usize,
    selected: usize,
}

impl Menu {
    pub fn new(prefix: impl Into<String>, sections: usize) -> Self {
        Self {
            prefix: prefix.into(),
            sections: sections.max(1),
            selected: 1,
        }
    }

    /// Highlight the section named by the startup fragment, or the first one
    pub fn with_fragment(mut self, fragment: &Fragment) -> Self {
        self.selected = 1;
        if let Fragment::Named(name) = fragment {
            if let Some(section) = name
                .strip_prefix(self.prefix.as_str())
                .and_then(|rest| rest.parse::<usize>().ok())
            {
                self.select(section);
            }
        }
        self
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn sections(&self) -> usize {
        self.sections
    }

    pub fn select(&mut self, section: usize) {
        self.selected = section.clamp(1, self.sections);
    }

    /// Move the cursor one step, wrapping at both ends
    pub fn step(&mut self, direction: Direction) -> Fragment {
        self.selected = match direction {
            Direction::Back if self.selected <= 1 => self.sections,
            Direction::Back => self.selected - 1,
            Direction::Forward if self.selected >= self.sections => 1,
            Direction::Forward => self.selected + 1,
        };
        self.fragment()
    }

    /// Fragment addressing the selected section
    pub fn fragment(&self) -> Fragment {
        if self.prefix.is_empty() {
            Fragment::Index(self.selected - 1)
        } else {
            Fragment::for_index(&self.prefix, self.selected)
        }
    }
}

/// A line of input from the console
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Goto(usize),
    Hash(String),
    Left,
    Right,
    Swipe(Swipe),
    Click(usize),
    Routes,
    Status,
    Resize,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb, args.as_slice()) {
            ("goto", [index]) => Command::Goto(index.parse::<usize>().context("goto expects a slide index")?),
            ("hash", [fragment]) => Command::Hash(fragment.to_string()),
            ("hash", []) => Command::Hash(String::new()),
            ("left", []) => Command::Left,
            ("right", []) => Command::Right,
            ("swipe", [dx, dy, ms]) => Command::Swipe(Swipe {
                dx: dx.parse::<f32>().context("swipe dx must be a number")?,
                dy: dy.parse::<f32>().context("swipe dy must be a number")?,
                elapsed_ms: ms.parse::<u64>().context("swipe duration must be milliseconds")?,
            }),
            ("click", [section]) => Command::Click(section.parse::<usize>().context("click expects a section number")?),
            ("routes", []) => Command::Routes,
            ("status", []) => Command::Status,
            ("resize", []) => Command::Resize,
            ("quit" | "exit", []) => Command::Quit,
            _ => bail!("unknown command '{}'", line.trim()),
        };
        Ok(Some(command))
    }
}
