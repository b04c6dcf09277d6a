//! Console session wiring the affordances to a presentation

use deck_core::{Fragment, LocationBar, Presentation};
use tracing::debug;

use crate::console;
use crate::input::{Command, Direction, Menu};

pub struct Session {
    presentation: Presentation,
    location: LocationBar,
    menu: Menu,
}

impl Session {
    pub fn new(presentation: Presentation, location: LocationBar, menu: Menu) -> Self {
        Self { presentation, location, menu }
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn location(&self) -> &LocationBar {
        &self.location
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Write a fragment the way a link click would and forward the change.
    /// Returns false when the location already held that fragment.
    fn navigate_to(&mut self, fragment: Fragment) -> bool {
        let hash = fragment.to_string();
        if !self.location.set_hash(hash.as_str()) {
            return false;
        }
        debug!("location: {}", hash);
        self.presentation.on_hash_change(&self.location);
        true
    }

    fn step(&mut self, direction: Direction) {
        let fragment = self.menu.step(direction);
        self.navigate_to(fragment);
    }

    /// Returns false when the session should end
    pub fn handle(&mut self, command: Command) -> bool {
        let navigator = self.presentation.navigator().clone();
        match command {
            Command::Goto(index) => {
                if !self.presentation.is_started() {
                    return true;
                }
                // Keep the location and menu in step with direct jumps
                if !self.navigate_to(Fragment::Index(index)) {
                    navigator.goto_index(Some(index));
                }
                self.menu.select(navigator.index() + 1);
            }
            Command::Hash(hash) => {
                if self.location.set_hash(hash) {
                    self.presentation.on_hash_change(&self.location);
                }
            }
            Command::Left => self.step(Direction::Back),
            Command::Right => self.step(Direction::Forward),
            Command::Swipe(swipe) => match swipe.direction() {
                Some(direction) => self.step(direction),
                None => debug!("gesture {:?} is not a swipe", swipe),
            },
            Command::Click(section) => {
                self.menu.select(section);
                let fragment = self.menu.fragment();
                self.navigate_to(fragment);
            }
            Command::Routes => {
                let routes = navigator.available_routes();
                println!("left: {}, right: {}", routes.left, routes.right);
            }
            Command::Status => {
                println!("{}", console::render_status(&self.presentation, &navigator));
                println!("menu  {}/{}", self.menu.selected(), self.menu.sections());
            }
            Command::Resize => self.presentation.on_resize(),
            Command::Quit => return false,
        }
        true
    }
}
