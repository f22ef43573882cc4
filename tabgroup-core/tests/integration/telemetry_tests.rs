//! Integration tests for background session counting

use std::sync::Arc;
use std::time::Duration;

use tabgroup_core::{
    FileSessionCountStore, FilterSettings, LaunchCause, MemorySessionCountStore, Partition,
    SessionTelemetry, TabGroupModelFilter, TabId, TabRecord, VecTabModel, session_count_key,
};
use tempfile::TempDir;
use tokio::runtime::Handle;

fn counting() -> FilterSettings {
    FilterSettings {
        record_session_counts: true,
        ..FilterSettings::default()
    }
}

/// Polls `check` until it holds or about a second has passed.
async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

fn grouped_filter(
    ids: &[u32],
    store: &Arc<MemorySessionCountStore>,
) -> (VecTabModel, TabGroupModelFilter) {
    let mut model = VecTabModel::restored_with(Partition::Normal, ids);
    let mut filter = TabGroupModelFilter::from_model(&model, counting())
        .unwrap()
        .with_telemetry(SessionTelemetry::on_current_runtime(store.clone()));
    for &raw in &ids[1..] {
        filter.merge_tabs(&mut model, TabId(raw), TabId(ids[0])).unwrap();
    }
    (model, filter)
}

#[tokio::test]
async fn counts_sessions_of_real_groups() {
    let store = Arc::new(MemorySessionCountStore::new());
    let (mut model, mut filter) = grouped_filter(&[1, 2], &store);
    model.append_tab(TabRecord::new(TabId(3))).unwrap();
    filter
        .did_add_tab(&mut model, TabId(3), LaunchCause::Other)
        .unwrap();

    let first = filter.record_sessions_count(&model, TabId(2)).unwrap();
    assert_eq!(first.await.unwrap(), Some(1));
    let second = filter.record_sessions_count(&model, TabId(1)).unwrap();
    assert_eq!(second.await.unwrap(), Some(2));

    assert!(filter.record_sessions_count(&model, TabId(3)).is_none());
    assert_eq!(store.get(&session_count_key(TabId(1))), Some(2));
    assert_eq!(store.get(&session_count_key(TabId(3))), None);
}

#[tokio::test]
async fn counting_is_off_by_default() {
    let store = Arc::new(MemorySessionCountStore::new());
    let mut model = VecTabModel::restored_with(Partition::Normal, &[1, 2]);
    let mut filter = TabGroupModelFilter::from_model(&model, FilterSettings::default())
        .unwrap()
        .with_telemetry(SessionTelemetry::on_current_runtime(store.clone()));
    filter.merge_tabs(&mut model, TabId(2), TabId(1)).unwrap();

    assert!(filter.record_sessions_count(&model, TabId(1)).is_none());
}

#[tokio::test]
async fn closing_a_group_forgets_its_count() {
    let store = Arc::new(MemorySessionCountStore::new());
    let (mut model, mut filter) = grouped_filter(&[1, 2], &store);
    let key = session_count_key(TabId(1));
    filter
        .record_sessions_count(&model, TabId(1))
        .unwrap()
        .await
        .unwrap();
    assert_eq!(store.get(&key), Some(1));

    model.remove_tab(TabId(2)).unwrap();
    filter.did_close_tab(&mut model, TabId(2)).unwrap();
    model.remove_tab(TabId(1)).unwrap();
    filter.did_close_tab(&mut model, TabId(1)).unwrap();

    assert!(eventually(|| store.get(&key).is_none()).await);
}

#[tokio::test]
async fn re_anchoring_restarts_counting_under_the_new_root() {
    let store = Arc::new(MemorySessionCountStore::new());
    let (mut model, mut filter) = grouped_filter(&[1, 2, 3], &store);
    filter
        .record_sessions_count(&model, TabId(3))
        .unwrap()
        .await
        .unwrap();

    model.remove_tab(TabId(1)).unwrap();
    filter.did_close_tab(&mut model, TabId(1)).unwrap();

    assert!(eventually(|| store.get(&session_count_key(TabId(1))).is_none()).await);
    let count = filter
        .record_sessions_count(&model, TabId(3))
        .unwrap()
        .await
        .unwrap();
    assert_eq!(count, Some(1));
    assert_eq!(store.get(&session_count_key(TabId(2))), Some(1));
}

#[tokio::test]
async fn file_store_from_settings_persists_counts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("sessions.toml");
    let settings = FilterSettings {
        session_count_store: Some(path.clone()),
        ..counting()
    };
    let telemetry = SessionTelemetry::from_settings(&settings, Handle::current());

    assert_eq!(telemetry.record(TabId(7)).await.unwrap(), Some(1));
    assert_eq!(telemetry.record(TabId(7)).await.unwrap(), Some(2));
    assert_eq!(telemetry.record(TabId(9)).await.unwrap(), Some(1));

    let counts = FileSessionCountStore::new(path.clone()).read_all().unwrap();
    assert_eq!(counts.get("SessionsCountForGroup-7"), Some(&2));
    assert_eq!(counts.get("SessionsCountForGroup-9"), Some(&1));

    telemetry.forget(TabId(7)).await.unwrap();
    let counts = FileSessionCountStore::new(path).read_all().unwrap();
    assert!(!counts.contains_key("SessionsCountForGroup-7"));
}
