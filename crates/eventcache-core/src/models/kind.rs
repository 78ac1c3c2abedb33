use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The two cached entity kinds. Each has its own table and refresh guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Events,
    Schedule,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Events, EntityKind::Schedule];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Events => "events",
            EntityKind::Schedule => "schedule",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown entity kind: {0} (expected 'events' or 'schedule')")]
pub struct ParseKindError(pub String);

impl FromStr for EntityKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "events" | "event" => Ok(EntityKind::Events),
            "schedule" | "schedules" => Ok(EntityKind::Schedule),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}
