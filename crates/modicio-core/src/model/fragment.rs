use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::graph::Model;
use super::instance::Instance;

/// One textual change descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub content: String,
    /// Uri of the element the change applied to, empty when none was open
    #[serde(default)]
    pub target: String,
}

/// Ordered change log of a Fragment
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub deltas: Vec<Delta>,
}

impl Trace {
    pub fn push(&mut self, content: impl Into<String>, target: impl Into<String>) {
        self.deltas.push(Delta {
            content: content.into(),
            target: target.into(),
        });
    }

    pub fn clear(&mut self) {
        self.deltas.clear();
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

/// Immutable snapshot of a (variant, running version) coordinate
///
/// Holds the type graph, optionally one instance of it, and the change
/// trace. Once handed to a store a Fragment is never mutated; every change
/// produces a new Fragment with fresh `running_id` and `global_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Technical id assigned by the store on persist
    #[serde(default)]
    pub data_id: Option<i64>,
    pub global_id: String,
    #[serde(default)]
    pub predecessor_id: Option<String>,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub is_reference: bool,
    #[serde(default)]
    pub variant_name: Option<String>,
    pub variant_id: String,
    pub variant_time: DateTime<Utc>,
    pub running_id: String,
    pub running_time: DateTime<Utc>,
    #[serde(default)]
    pub model: Model,
    #[serde(default)]
    pub instance: Option<Instance>,
    #[serde(default)]
    pub trace: Trace,
}

impl Fragment {
    /// First snapshot of a brand-new variant holding `model`
    pub fn new_variant(variant_name: Option<String>, model: Model) -> Self {
        let now = Utc::now();
        let mut fragment = Self {
            data_id: None,
            global_id: Uuid::new_v4().to_string(),
            predecessor_id: None,
            open: false,
            is_reference: false,
            variant_name,
            variant_id: Uuid::new_v4().to_string(),
            variant_time: now,
            running_id: Uuid::new_v4().to_string(),
            running_time: now,
            model,
            instance: None,
            trace: Trace::default(),
        };
        fragment.sync_annotations();
        fragment
    }

    /// Move the fragment (and every node annotation) onto another variant
    pub fn set_variant(&mut self, variant_id: impl Into<String>, variant_time: DateTime<Utc>) {
        self.variant_id = variant_id.into();
        self.variant_time = variant_time;
        self.sync_annotations();
    }

    /// Start a new running version: fresh running coordinate and global id,
    /// predecessor pointing at the current global id
    pub fn next_running_version(&mut self) {
        self.predecessor_id = Some(self.global_id.clone());
        self.running_id = Uuid::new_v4().to_string();
        self.running_time = Utc::now();
        self.global_id = Uuid::new_v4().to_string();
        self.data_id = None;
    }

    pub fn assign_fresh_global_id(&mut self) {
        self.global_id = Uuid::new_v4().to_string();
    }

    pub fn sync_annotations(&mut self) {
        let variant_id = self.variant_id.clone();
        self.model.stamp_variant(&variant_id, self.variant_time);
    }

    pub fn is_model_only(&self) -> bool {
        self.instance.is_none()
    }

    /// Short coordinate label for logs and error messages
    pub fn coordinate(&self) -> String {
        format!("{}@{}", self.variant_id, self.running_id)
    }
}
