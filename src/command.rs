// src/command.rs
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Left,
    Right,
    Up,
    Down,
    /// Centre zone / jump, sent as the space bar.
    Action,
    #[default]
    None,
}

impl Command {
    pub const KEYS: [Command; 5] = [
        Command::Left,
        Command::Right,
        Command::Up,
        Command::Down,
        Command::Action,
    ];

    /// Key name handed to the dispatcher, `None` for the no-op command.
    pub fn key_name(&self) -> Option<&'static str> {
        match self {
            Self::Left => Some("left"),
            Self::Right => Some("right"),
            Self::Up => Some("up"),
            Self::Down => Some("down"),
            Self::Action => Some("space"),
            Self::None => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Action => "ACTION",
            Self::None => "NONE",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
