//! Release stability tiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stability tier of a release.
///
/// Variant order is the tier rank: `Unstable < Testing < Stable`. The status a
/// user asks for is the least stable tier they accept, so a release is visible
/// when its tier ranks at or above the requested status.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unstable,
    Testing,
    #[default]
    Stable,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Unstable, Status::Testing, Status::Stable];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unstable => "unstable",
            Status::Testing => "testing",
            Status::Stable => "stable",
        }
    }

    /// Whether releases in this tier are visible when `requested` is asked for
    pub fn visible_at(&self, requested: Status) -> bool {
        *self >= requested
    }
}

impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unstable" => Ok(Status::Unstable),
            "testing" => Ok(Status::Testing),
            "stable" => Ok(Status::Stable),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
