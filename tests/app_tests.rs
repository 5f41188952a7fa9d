use std::sync::Arc;

use listing_adapters::{Adapters, FileListingsSource, FsWarehouse, InMemoryObjectStore};
use listing_core::adapter::ObjectStore;
use listing_core::{CancelToken, ManualClock, RunTimestamp};
use listing_flow::{App, AppConfig};

const CSV: &[u8] = b"zpid,city,price\n1,Columbus,250000\n2,Dublin,310000\n";

fn ts(s: &str) -> RunTimestamp {
    RunTimestamp::parse(s).expect("timestamp")
}

struct Fixture {
    _dir: tempfile::TempDir,
    store: Arc<InMemoryObjectStore>,
    warehouse: Arc<FsWarehouse>,
    app: App,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("tmp");
    let source_path = dir.path().join("listings.csv");
    std::fs::write(&source_path, CSV).expect("write source");
    let source = source_path.to_string_lossy().into_owned();

    let config = AppConfig::from_lookup(|key| match key {
                     "LISTING_SOURCE_FILE" => Some(source.clone()),
                     _ => None,
                 }).expect("config");

    let store = Arc::new(InMemoryObjectStore::new());
    let warehouse = Arc::new(FsWarehouse::new(dir.path().join("warehouse"), store.clone()));
    let adapters = Adapters { source: Arc::new(FileListingsSource::new(source_path)),
                              store: store.clone(),
                              warehouse: warehouse.clone() };
    let app = App::with_adapters(config, adapters, Arc::new(ManualClock::new())).expect("app");
    Fixture { _dir: dir,
              store,
              warehouse,
              app }
}

#[test]
fn single_trigger_loads_the_run_artifact() {
    let fx = fixture();
    let report = fx.app.trigger(ts("2025-03-01-00:00:00"), &CancelToken::new());

    assert!(report.is_success(), "{}", report.summary());
    let rows = fx.warehouse
                 .loaded_rows("PUBLIC", "zillowdata", "response_data_2025-03-01-00-00-00.csv")
                 .expect("read")
                 .expect("loaded");
    assert_eq!(rows.len(), 2);
}

#[test]
fn backfill_runs_each_tick_in_isolation() {
    let fx = fixture();
    let reports = fx.app.backfill(ts("2025-02-27-00:00:00"), ts("2025-03-01-00:00:00")).expect("backfill");

    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.is_success()));
    let stamps: Vec<_> = reports.iter().filter_map(|r| r.logical_ts).collect();
    assert_eq!(stamps,
               vec![ts("2025-02-27-00:00:00"), ts("2025-02-28-00:00:00"), ts("2025-03-01-00:00:00")]);

    let landed = fx.store.list("response_data").expect("list");
    assert_eq!(landed.len(), 3);
    let mut run_ids: Vec<_> = reports.iter().map(|r| r.run_id).collect();
    run_ids.dedup();
    assert_eq!(run_ids.len(), 3);
}

#[test]
fn rerunning_the_same_tick_reuses_the_key() {
    let fx = fixture();
    let first = fx.app.trigger(ts("2025-03-01-00:00:00"), &CancelToken::new());
    let second = fx.app.trigger(ts("2025-03-01-00:00:00"), &CancelToken::new());

    assert!(first.is_success() && second.is_success());
    assert_eq!(fx.store.list("response_data").expect("list").len(), 1);
    assert_eq!(first.output("transfer", "landed_key"), second.output("transfer", "landed_key"));
}
