//! Metadata service: variant and running-version listings, reference switch

use chrono::{DateTime, Utc};
use modicio_core::Fragment;
use modicio_core_types::RequestContext;
use modicio_store::FragmentStore;
use serde::{Deserialize, Serialize};

use super::instrumented;
use crate::errors::Result;

/// Identity of a variant or a running version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData {
    pub timestamp: DateTime<Utc>,
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl MetaData {
    pub fn of_variant(fragment: &Fragment) -> Self {
        Self {
            timestamp: fragment.variant_time,
            id: fragment.variant_id.clone(),
            name: fragment.variant_name.clone(),
        }
    }

    pub fn of_running_version(fragment: &Fragment) -> Self {
        Self {
            timestamp: fragment.running_time,
            id: fragment.running_id.clone(),
            name: fragment.variant_name.clone(),
        }
    }
}

/// Variant selector; the first present field wins: uuid, then time, then
/// name. No field selects every variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantLookup {
    pub uuid: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub name: Option<String>,
}

impl VariantLookup {
    fn matches(&self, fragment: &Fragment) -> bool {
        if let Some(uuid) = &self.uuid {
            return fragment.variant_id == *uuid;
        }
        if let Some(timestamp) = &self.timestamp {
            return fragment.variant_time.timestamp_millis() == timestamp.timestamp_millis();
        }
        if let Some(name) = &self.name {
            return fragment.variant_name.as_ref() == Some(name);
        }
        true
    }
}

pub struct MetadataService<'a> {
    store: &'a dyn FragmentStore,
}

impl<'a> MetadataService<'a> {
    pub fn new(store: &'a dyn FragmentStore) -> Self {
        Self { store }
    }

    /// Variants selected by `lookup`, newest first
    pub fn variant_metadata(
        &self,
        ctx: &RequestContext,
        lookup: &VariantLookup,
        limit: usize,
        closed_only: bool,
    ) -> Result<Vec<MetaData>> {
        instrumented("variant_metadata", ctx, || {
            Ok(self
                .store
                .list_variants(usize::MAX, closed_only)?
                .iter()
                .filter(|f| lookup.matches(f))
                .take(limit)
                .map(MetaData::of_variant)
                .collect())
        })
    }

    pub fn all_variants_metadata(
        &self,
        ctx: &RequestContext,
        limit: usize,
        closed_only: bool,
    ) -> Result<Vec<MetaData>> {
        self.variant_metadata(ctx, &VariantLookup::default(), limit, closed_only)
    }

    /// Running versions of `variant_id`, newest first
    pub fn running_versions_of_variant(
        &self,
        ctx: &RequestContext,
        variant_id: &str,
        limit: usize,
        closed_only: bool,
    ) -> Result<Vec<MetaData>> {
        instrumented("running_versions_of_variant", ctx, || {
            Ok(self
                .store
                .list_running_versions(variant_id, limit, closed_only)?
                .iter()
                .map(MetaData::of_running_version)
                .collect())
        })
    }

    /// Make (variant, running version) the single reference model
    ///
    /// # Errors
    /// * `FragmentNotFound` - no model fragment at the coordinate
    /// * `InvalidReference` - the fragment is open
    pub fn set_reference_fragment(
        &self,
        ctx: &RequestContext,
        variant_id: &str,
        running_id: &str,
    ) -> Result<Fragment> {
        instrumented("set_reference_fragment", ctx, || {
            self.store.set_reference(variant_id, running_id)
        })
    }
}
