//! Variability interface of associations and compositions
//!
//! A relation's interface is a set of delimiters over the (variant, version)
//! coordinates of its target. A candidate target is compatible iff it
//! matches at least one delimiter; an empty interface accepts nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::annotation::Annotation;

/// A single variant, optionally narrowed to one version
///
/// Absent fields do not constrain the candidate. An all-absent point
/// accepts any target.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub variant_time: Option<DateTime<Utc>>,
    pub variant_id: Option<String>,
    pub version_time: Option<DateTime<Utc>>,
    pub version_id: Option<String>,
}

/// Closed version range `[left, right]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub left_border_version_time: DateTime<Utc>,
    pub right_border_version_time: DateTime<Utc>,
    pub left_border_version_id: Option<String>,
    pub right_border_version_id: Option<String>,
}

/// Open towards the past: every version up to and including the border
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeftOpen {
    pub border_version_time: DateTime<Utc>,
    pub border_version_id: Option<String>,
}

/// Open towards the future: every version from the border on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightOpen {
    pub border_version_time: DateTime<Utc>,
    pub border_version_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delimiter {
    Point(Point),
    Region(Region),
    LeftOpen(LeftOpen),
    RightOpen(RightOpen),
}

fn id_matches(border: &Option<String>, candidate: &str) -> bool {
    border.as_deref().is_some_and(|b| b == candidate)
}

impl Delimiter {
    pub fn matches(&self, candidate: &Annotation) -> bool {
        match self {
            Delimiter::Point(p) => {
                p.variant_time.map_or(true, |t| t == candidate.variant_time)
                    && p
                        .variant_id
                        .as_deref()
                        .map_or(true, |id| id == candidate.variant_id)
                    && p.version_time.map_or(true, |t| t == candidate.version_time)
                    && p
                        .version_id
                        .as_deref()
                        .map_or(true, |id| id == candidate.version_id)
            }
            Delimiter::Region(r) => {
                (r.left_border_version_time <= candidate.version_time
                    && candidate.version_time <= r.right_border_version_time)
                    || id_matches(&r.left_border_version_id, &candidate.version_id)
                    || id_matches(&r.right_border_version_id, &candidate.version_id)
            }
            Delimiter::LeftOpen(l) => {
                candidate.version_time <= l.border_version_time
                    || id_matches(&l.border_version_id, &candidate.version_id)
            }
            Delimiter::RightOpen(r) => {
                candidate.version_time >= r.border_version_time
                    || id_matches(&r.border_version_id, &candidate.version_id)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interface {
    #[serde(default)]
    pub delimiters: Vec<Delimiter>,
}

impl Interface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a delimiter unless an equal one is already present.
    /// Returns whether the interface changed.
    pub fn add(&mut self, delimiter: Delimiter) -> bool {
        if self.delimiters.contains(&delimiter) {
            return false;
        }
        self.delimiters.push(delimiter);
        true
    }

    /// Remove an equal delimiter. Returns whether one was present.
    pub fn remove(&mut self, delimiter: &Delimiter) -> bool {
        let before = self.delimiters.len();
        self.delimiters.retain(|d| d != delimiter);
        before != self.delimiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delimiters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.delimiters.len()
    }

    pub fn is_compatible(&self, candidate: &Annotation) -> bool {
        self.delimiters.iter().any(|d| d.matches(candidate))
    }
}
