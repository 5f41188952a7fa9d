//! Propiedades de naming y selección sobre entradas arbitrarias:
//! 1. el orden de las keys es el orden cronológico de los runs
//! 2. `parse_key` invierte a `key_for`
//! 3. `select_latest` devuelve un elemento del conjunto y es idempotente

use chrono::NaiveDate;
use listing_core::{select_latest, ArtifactNaming, RunTimestamp};
use proptest::prelude::*;

fn naming() -> ArtifactNaming {
    ArtifactNaming::new("response_data", "csv")
}

fn arb_timestamp() -> impl Strategy<Value = RunTimestamp> {
    (0..=9999_i32, 1..=12_u32, 1..=28_u32, 0..24_u32, 0..60_u32, 0..60_u32).prop_map(|(y, mo, d, h, mi, s)| {
        let dt = NaiveDate::from_ymd_opt(y, mo, d).and_then(|date| date.and_hms_opt(h, mi, s))
                                                  .expect("valid calendar fields");
        RunTimestamp::new(dt).expect("year in range")
    })
}

fn arb_candidates() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z0-9_./-]{0,24}", 1..16)
}

proptest! {
    #[test]
    fn key_order_follows_run_order(t1 in arb_timestamp(), t2 in arb_timestamp()) {
        let n = naming();
        prop_assert_eq!(t1.cmp(&t2), n.key_for(&t1).cmp(&n.key_for(&t2)));
    }

    #[test]
    fn parse_key_inverts_key_for(t in arb_timestamp()) {
        let n = naming();
        prop_assert_eq!(n.parse_key(&n.key_for(&t)), Some(t));
    }

    #[test]
    fn latest_is_a_candidate_and_stable(candidates in arb_candidates()) {
        let latest = select_latest(&candidates).expect("non-empty set");
        prop_assert!(candidates.contains(&latest));
        prop_assert_eq!(select_latest([latest.as_str()]).expect("singleton"), latest.clone());
    }
}
