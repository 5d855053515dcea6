//! Store contract and lookup queries

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use modicio_core::Fragment;

use crate::errors::Result;

/// Coordinate lookup for a single Fragment
///
/// Every `Some` field must match. `variant_time` compares at millisecond
/// precision, the resolution the stores keep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentQuery {
    pub variant_id: Option<String>,
    pub running_id: Option<String>,
    pub variant_name: Option<String>,
    pub variant_time: Option<DateTime<Utc>>,
    /// Skip fragments still marked open
    pub closed_only: bool,
    /// Skip instance-bearing fragments
    pub model_only: bool,
}

impl FragmentQuery {
    pub fn variant(variant_id: impl Into<String>) -> Self {
        Self {
            variant_id: Some(variant_id.into()),
            ..Self::default()
        }
    }

    pub fn version(variant_id: impl Into<String>, running_id: impl Into<String>) -> Self {
        Self {
            variant_id: Some(variant_id.into()),
            running_id: Some(running_id.into()),
            ..Self::default()
        }
    }

    pub fn named(variant_name: impl Into<String>) -> Self {
        Self {
            variant_name: Some(variant_name.into()),
            ..Self::default()
        }
    }

    pub fn at_time(variant_time: DateTime<Utc>) -> Self {
        Self {
            variant_time: Some(variant_time),
            ..Self::default()
        }
    }

    pub fn closed_only(mut self) -> Self {
        self.closed_only = true;
        self
    }

    pub fn model_only(mut self) -> Self {
        self.model_only = true;
        self
    }

    pub fn matches(&self, fragment: &Fragment) -> bool {
        self.variant_id
            .as_ref()
            .map_or(true, |id| *id == fragment.variant_id)
            && self
                .running_id
                .as_ref()
                .map_or(true, |id| *id == fragment.running_id)
            && self
                .variant_name
                .as_ref()
                .map_or(true, |name| fragment.variant_name.as_ref() == Some(name))
            && self.variant_time.map_or(true, |time| {
                time.timestamp_millis() == fragment.variant_time.timestamp_millis()
            })
            && !(self.closed_only && fragment.open)
            && !(self.model_only && fragment.instance.is_some())
    }
}

impl std::fmt::Display for FragmentQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(id) = &self.variant_id {
            parts.push(format!("variant_id={}", id));
        }
        if let Some(id) = &self.running_id {
            parts.push(format!("running_id={}", id));
        }
        if let Some(name) = &self.variant_name {
            parts.push(format!("variant_name={}", name));
        }
        if let Some(time) = &self.variant_time {
            parts.push(format!("variant_time={}", time.to_rfc3339()));
        }
        if parts.is_empty() {
            parts.push("any".to_string());
        }
        write!(f, "{}", parts.join(","))
    }
}

/// Lookup over instance-bearing Fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceQuery {
    /// Case-insensitive substring of the instance's root node uri
    pub type_pattern: Option<String>,
    pub variant_id: Option<String>,
    pub running_id: Option<String>,
    pub limit: usize,
}

impl Default for InstanceQuery {
    fn default() -> Self {
        Self {
            type_pattern: None,
            variant_id: None,
            running_id: None,
            limit: 100,
        }
    }
}

impl InstanceQuery {
    pub fn matches(&self, fragment: &Fragment) -> bool {
        let Some(instance) = &fragment.instance else {
            return false;
        };
        self.type_pattern.as_ref().map_or(true, |pattern| {
            instance
                .model_root
                .to_lowercase()
                .contains(&pattern.to_lowercase())
        }) && self
            .variant_id
            .as_ref()
            .map_or(true, |id| *id == fragment.variant_id)
            && self
                .running_id
                .as_ref()
                .map_or(true, |id| *id == fragment.running_id)
    }
}

/// Durable home of immutable Fragment snapshots
///
/// Fetches return detached copies; mutating them never affects the store.
pub trait FragmentStore: Send + Sync {
    /// Most recent matching Fragment by running time, then by data id
    fn fetch_fragment(&self, query: &FragmentQuery) -> Result<Option<Fragment>>;

    fn fetch_by_data_id(&self, data_id: i64) -> Result<Option<Fragment>>;

    fn fetch_reference_fragment(&self) -> Result<Option<Fragment>>;

    /// Store a new snapshot and return it with its `data_id`
    ///
    /// Coordinates are kept as given. The stored copy is never the
    /// reference; use `set_reference` for that.
    fn persist(&self, fragment: Fragment) -> Result<Fragment>;

    /// Make the latest closed, model-only Fragment at the coordinate the
    /// single reference, clearing the flag everywhere else atomically
    fn set_reference(&self, variant_id: &str, running_id: &str) -> Result<Fragment>;

    /// One model-only Fragment per variant (its latest running version),
    /// newest variant first
    fn list_variants(&self, limit: usize, closed_only: bool) -> Result<Vec<Fragment>>;

    /// One model-only Fragment per running version of `variant_id`, newest
    /// first
    fn list_running_versions(
        &self,
        variant_id: &str,
        limit: usize,
        closed_only: bool,
    ) -> Result<Vec<Fragment>>;

    /// Latest snapshot per instance uri among instance-bearing Fragments
    fn find_instances(&self, query: &InstanceQuery) -> Result<Vec<Fragment>>;

    /// Returns whether a row was removed
    fn delete_fragment(&self, data_id: i64) -> Result<bool>;
}

/// Ordering key shared by both stores: running time, then insertion order
pub(crate) fn recency(fragment: &Fragment) -> (i64, i64) {
    (
        fragment.running_time.timestamp_millis(),
        fragment.data_id.unwrap_or_default(),
    )
}

/// Sort newest first, keep the first per `key`, cap at `limit`
pub(crate) fn latest_per<K, F>(mut fragments: Vec<Fragment>, limit: usize, key: F) -> Vec<Fragment>
where
    K: std::hash::Hash + Eq,
    F: Fn(&Fragment) -> K,
{
    fragments.sort_by_key(|f| std::cmp::Reverse(recency(f)));
    let mut seen = HashSet::new();
    fragments
        .into_iter()
        .filter(|f| seen.insert(key(f)))
        .take(limit)
        .collect()
}

/// Variants newest first by variant time, represented by their latest
/// running version
pub(crate) fn variant_heads(fragments: Vec<Fragment>, limit: usize) -> Vec<Fragment> {
    let mut heads = latest_per(fragments, usize::MAX, |f| f.variant_id.clone());
    heads.sort_by_key(|f| std::cmp::Reverse(f.variant_time.timestamp_millis()));
    heads.truncate(limit);
    heads
}

pub(crate) fn instance_heads(fragments: Vec<Fragment>, limit: usize) -> Vec<Fragment> {
    latest_per(fragments, limit, |f| {
        f.instance
            .as_ref()
            .map(|i| i.uri.clone())
            .unwrap_or_default()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use modicio_core::{create_instance, Model, Node};

    fn fragment() -> Fragment {
        let model = Model::from_nodes([Node::new("modicio:Todo", "Todo", false)]).unwrap();
        Fragment::new_variant(Some("main".to_string()), model)
    }

    #[test]
    fn test_query_matches_coordinates() {
        let f = fragment();
        assert!(FragmentQuery::default().matches(&f));
        assert!(FragmentQuery::version(&f.variant_id, &f.running_id).matches(&f));
        assert!(FragmentQuery::named("main").matches(&f));
        assert!(!FragmentQuery::named("other").matches(&f));
        assert!(FragmentQuery::at_time(f.variant_time).matches(&f));
    }

    #[test]
    fn test_query_flags() {
        let mut f = fragment();
        f.open = true;
        assert!(!FragmentQuery::default().closed_only().matches(&f));

        f.open = false;
        f.instance = Some(create_instance(&f.model, "modicio:Todo", "t", "inst:t").unwrap());
        assert!(!FragmentQuery::default().model_only().matches(&f));
        assert!(FragmentQuery::default().matches(&f));
    }

    #[test]
    fn test_instance_query_pattern_is_case_insensitive() {
        let mut f = fragment();
        f.instance = Some(create_instance(&f.model, "modicio:Todo", "t", "inst:t").unwrap());
        let query = InstanceQuery {
            type_pattern: Some("TODO".to_string()),
            ..InstanceQuery::default()
        };
        assert!(query.matches(&f));
        assert!(!InstanceQuery::default().matches(&fragment()));
    }

    #[test]
    fn test_latest_per_keeps_newest() {
        let mut a = fragment();
        a.data_id = Some(1);
        let mut b = a.clone();
        b.data_id = Some(2);
        let heads = latest_per(vec![a, b], 10, |f| f.variant_id.clone());
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].data_id, Some(2));
    }
}
