use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Variability coordinates of a single model element
///
/// The variant half (space axis) is owned by the enclosing Fragment and is
/// re-stamped whenever the Fragment changes branch. The version half (time
/// axis) moves independently, each time the element or one of its children
/// is edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub variant_id: String,
    pub variant_time: DateTime<Utc>,
    pub version_id: String,
    pub version_time: DateTime<Utc>,
}

impl Annotation {
    /// Fresh annotation inside the given variant with a new version
    pub fn in_variant(variant_id: impl Into<String>, variant_time: DateTime<Utc>) -> Self {
        Self {
            variant_id: variant_id.into(),
            variant_time,
            version_id: Uuid::new_v4().to_string(),
            version_time: Utc::now(),
        }
    }

    /// Start a new version of the annotated element
    pub fn bump_version(&mut self) {
        self.version_id = Uuid::new_v4().to_string();
        self.version_time = Utc::now();
    }

    pub fn set_variant(&mut self, variant_id: &str, variant_time: DateTime<Utc>) {
        self.variant_id = variant_id.to_string();
        self.variant_time = variant_time;
    }
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            variant_id: String::new(),
            variant_time: DateTime::<Utc>::default(),
            version_id: String::new(),
            version_time: DateTime::<Utc>::default(),
        }
    }
}
