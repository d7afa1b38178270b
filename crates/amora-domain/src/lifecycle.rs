//! User account lifecycle events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account state transition announced to downstream subscribers.
///
/// Wire format: lower-case string (`"deactivated"`, `"reactivated"`, `"deleted"`),
/// both in the `user_lifecycle_outbox.event_type` column and in broker messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEventType {
    Deactivated,
    Reactivated,
    Deleted,
}

impl LifecycleEventType {
    pub const ALL: [Self; 3] = [Self::Deactivated, Self::Reactivated, Self::Deleted];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deactivated => "deactivated",
            Self::Reactivated => "reactivated",
            Self::Deleted => "deleted",
        }
    }

    /// Topic-exchange routing key, one per transition (`user.<event_type>`).
    pub fn routing_key(self) -> String {
        format!("user.{}", self.as_str())
    }
}

impl fmt::Display for LifecycleEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown lifecycle event type: {0}")]
pub struct UnknownLifecycleEventType(pub String);

impl FromStr for LifecycleEventType {
    type Err = UnknownLifecycleEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deactivated" => Ok(Self::Deactivated),
            "reactivated" => Ok(Self::Reactivated),
            "deleted" => Ok(Self::Deleted),
            other => Err(UnknownLifecycleEventType(other.to_owned())),
        }
    }
}
