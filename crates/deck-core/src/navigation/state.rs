/// Result of comparing the active state tags across a transition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDiff {
    /// Tags to add, in the order they appear on the new slide
    pub entered: Vec<String>,
    /// Tags to remove, applied after every entry
    pub exited: Vec<String>,
}

impl StateDiff {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

/// Diff two state lists. Tags present on both sides are left alone.
pub fn diff_state(before: &[String], after: &[String]) -> StateDiff {
    let mut remaining: Vec<&String> = before.iter().collect();
    let mut entered = Vec::new();

    for tag in after {
        match remaining.iter().position(|t| *t == tag) {
            Some(pos) => {
                remaining.remove(pos);
            }
            None => entered.push(tag.clone()),
        }
    }

    // Leftovers are cleaned up last-in first-out
    let exited = remaining.into_iter().rev().cloned().collect();

    StateDiff { entered, exited }
}
