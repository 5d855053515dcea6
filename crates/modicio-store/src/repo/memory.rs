//! In-memory Fragment store

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use modicio_core::errors::{ExError, ExErrorKind, ModicioError};
use modicio_core::rules::validate_reference_candidate;
use modicio_core::{log_op_end, log_op_error, log_op_start, Fragment};

use super::fragment_store::{
    instance_heads, latest_per, recency, variant_heads, FragmentQuery, FragmentStore,
    InstanceQuery,
};
use crate::errors::{lock_poisoned, Result};

#[derive(Debug, Default)]
struct Rows {
    next_id: i64,
    fragments: BTreeMap<i64, Fragment>,
}

/// Fragment store held in process memory
///
/// A single `RwLock` serializes writers, so `set_reference` clears and sets
/// the flag under one write guard.
#[derive(Debug, Default)]
pub struct InMemoryFragmentStore {
    rows: RwLock<Rows>,
}

impl InMemoryFragmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read("len")?.fragments.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self, op: &str) -> Result<RwLockReadGuard<'_, Rows>> {
        self.rows.read().map_err(|_| lock_poisoned(op))
    }

    fn write(&self, op: &str) -> Result<RwLockWriteGuard<'_, Rows>> {
        self.rows.write().map_err(|_| lock_poisoned(op))
    }

    fn collect<F>(&self, op: &str, filter: F) -> Result<Vec<Fragment>>
    where
        F: Fn(&Fragment) -> bool,
    {
        Ok(self
            .read(op)?
            .fragments
            .values()
            .filter(|f| filter(f))
            .cloned()
            .collect())
    }
}

impl FragmentStore for InMemoryFragmentStore {
    fn fetch_fragment(&self, query: &FragmentQuery) -> Result<Option<Fragment>> {
        Ok(self
            .read("fetch_fragment")?
            .fragments
            .values()
            .filter(|f| query.matches(f))
            .max_by_key(|f| recency(f))
            .cloned())
    }

    fn fetch_by_data_id(&self, data_id: i64) -> Result<Option<Fragment>> {
        Ok(self
            .read("fetch_by_data_id")?
            .fragments
            .get(&data_id)
            .cloned())
    }

    fn fetch_reference_fragment(&self) -> Result<Option<Fragment>> {
        Ok(self
            .read("fetch_reference_fragment")?
            .fragments
            .values()
            .find(|f| f.is_reference)
            .cloned())
    }

    fn persist(&self, mut fragment: Fragment) -> Result<Fragment> {
        log_op_start!("persist", global_id = %fragment.global_id);
        let start = std::time::Instant::now();

        let mut rows = self.write("persist")?;
        if rows
            .fragments
            .values()
            .any(|f| f.global_id == fragment.global_id)
        {
            let err = ExError::new(ExErrorKind::AlreadyExists)
                .with_op("persist")
                .with_entity_id(fragment.global_id.clone())
                .with_message("fragment with this global id already stored");
            log_op_error!(
                "persist",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            return Err(err);
        }

        rows.next_id += 1;
        let data_id = rows.next_id;
        fragment.data_id = Some(data_id);
        fragment.is_reference = false;
        rows.fragments.insert(data_id, fragment.clone());

        log_op_end!(
            "persist",
            duration_ms = start.elapsed().as_millis() as u64,
            data_id = data_id
        );
        Ok(fragment)
    }

    fn set_reference(&self, variant_id: &str, running_id: &str) -> Result<Fragment> {
        log_op_start!("set_reference", variant_id = variant_id, running_id = running_id);
        let start = std::time::Instant::now();

        let mut rows = self.write("set_reference")?;
        let query = FragmentQuery::version(variant_id, running_id).model_only();
        let result = rows
            .fragments
            .values()
            .filter(|f| query.matches(f))
            .max_by_key(|f| recency(f))
            .ok_or_else(|| ModicioError::FragmentNotFound {
                query: query.to_string(),
            })
            .and_then(|candidate| {
                validate_reference_candidate(candidate)?;
                Ok(candidate.data_id.unwrap_or_default())
            });

        let data_id = match result {
            Ok(data_id) => data_id,
            Err(e) => {
                log_op_error!(
                    "set_reference",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                return Err(e.into());
            }
        };

        for (id, fragment) in rows.fragments.iter_mut() {
            fragment.is_reference = *id == data_id;
        }
        let reference = rows.fragments.get(&data_id).cloned().ok_or_else(|| {
            ExError::from(ModicioError::FragmentNotFound {
                query: format!("data_id={}", data_id),
            })
        })?;

        log_op_end!(
            "set_reference",
            duration_ms = start.elapsed().as_millis() as u64,
            data_id = data_id
        );
        Ok(reference)
    }

    fn list_variants(&self, limit: usize, closed_only: bool) -> Result<Vec<Fragment>> {
        let query = FragmentQuery {
            closed_only,
            ..FragmentQuery::default()
        }
        .model_only();
        let candidates = self.collect("list_variants", |f| query.matches(f))?;
        Ok(variant_heads(candidates, limit))
    }

    fn list_running_versions(
        &self,
        variant_id: &str,
        limit: usize,
        closed_only: bool,
    ) -> Result<Vec<Fragment>> {
        let query = FragmentQuery {
            closed_only,
            ..FragmentQuery::variant(variant_id)
        }
        .model_only();
        let candidates = self.collect("list_running_versions", |f| query.matches(f))?;
        Ok(latest_per(candidates, limit, |f| f.running_id.clone()))
    }

    fn find_instances(&self, query: &InstanceQuery) -> Result<Vec<Fragment>> {
        let candidates = self.collect("find_instances", |f| query.matches(f))?;
        Ok(instance_heads(candidates, query.limit))
    }

    fn delete_fragment(&self, data_id: i64) -> Result<bool> {
        Ok(self
            .write("delete_fragment")?
            .fragments
            .remove(&data_id)
            .is_some())
    }
}
