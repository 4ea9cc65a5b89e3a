use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of someone sitting at the board.
///
/// The engine only compares participants for equality and asks for a display
/// handle; everything else about who they are belongs to the front-end.
pub trait Participant: Clone + Eq {
    /// Human-readable handle used in announcements, e.g. a mention string.
    fn handle(&self) -> String;

    /// Automated accounts cannot be seated.
    fn is_human(&self) -> bool {
        true
    }
}

/// A participant sharing the local terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalPlayer {
    name: String,
}

impl LocalPlayer {
    pub fn new(name: impl Into<String>) -> Self {
        LocalPlayer { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for LocalPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Participant for LocalPlayer {
    fn handle(&self) -> String {
        self.name.clone()
    }
}
