//! Property tests: at most one reference Fragment across any sequence of
//! `set_reference` calls, on both stores
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{model_fragment, stores};
use modicio_core::{create_instance, ExErrorKind, Fragment};
use modicio_store::FragmentStore;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Three closed model fragments, then an open one, then one holding an
/// instance
fn candidates(store: &dyn FragmentStore) -> Vec<Fragment> {
    let mut stored: Vec<Fragment> = ["a", "b", "c"]
        .iter()
        .map(|name| store.persist(model_fragment(name)).unwrap())
        .collect();

    let mut open = model_fragment("open");
    open.open = true;
    stored.push(store.persist(open).unwrap());

    let mut instance = model_fragment("instance");
    instance.instance =
        Some(create_instance(&instance.model, "modicio:Todo", "t", "inst:t").unwrap());
    stored.push(store.persist(instance).unwrap());

    stored
}

fn flagged(store: &dyn FragmentStore, stored: &[Fragment]) -> Vec<String> {
    stored
        .iter()
        .filter_map(|f| store.fetch_by_data_id(f.data_id.unwrap()).unwrap())
        .filter(|f| f.is_reference)
        .map(|f| f.global_id)
        .collect()
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every call leaves exactly one flagged Fragment once any call has
    /// succeeded, none before; rejected candidates keep the previous one
    #[test]
    fn reference_stays_unique(calls in prop::collection::vec(0usize..5, 1..16)) {
        let (_dir, stores) = stores();
        for (label, store) in stores {
            let stored = candidates(store.as_ref());
            let mut current: Option<String> = None;

            for &pick in &calls {
                let target = &stored[pick];
                let result = store.set_reference(&target.variant_id, &target.running_id);

                match pick {
                    0..=2 => {
                        let reference = result.unwrap();
                        prop_assert!(reference.is_reference, "{}", label);
                        prop_assert_eq!(&reference.global_id, &target.global_id, "{}", label);
                        current = Some(target.global_id.clone());
                    }
                    3 => {
                        let err = result.unwrap_err();
                        prop_assert_eq!(err.kind(), ExErrorKind::InvariantViolation, "{}", label);
                    }
                    _ => prop_assert!(result.is_err(), "{}", label),
                }

                let flags = flagged(store.as_ref(), &stored);
                match &current {
                    None => {
                        prop_assert!(flags.is_empty(), "{}", label);
                        prop_assert!(store.fetch_reference_fragment().unwrap().is_none(), "{}", label);
                    }
                    Some(global_id) => {
                        prop_assert_eq!(&flags, &vec![global_id.clone()], "{}", label);
                        let reference = store.fetch_reference_fragment().unwrap().unwrap();
                        prop_assert_eq!(&reference.global_id, global_id, "{}", label);
                    }
                }
            }
        }
    }
}
