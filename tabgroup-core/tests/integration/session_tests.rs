//! Integration tests for sessions and their settings

use std::sync::Arc;

use tabgroup_core::{
    EventLog, FilterSettings, LaunchCause, Partition, TabGroupError, TabGroupEvent, TabId,
    TabModel, TabRecord, TabSession, VecTabModel,
};
use tempfile::TempDir;

fn restored_session(settings: FilterSettings) -> TabSession<VecTabModel> {
    let mut session = TabSession::new(settings);
    for (partition, first) in [(Partition::Normal, 1), (Partition::Private, 100)] {
        let strip = session.partition_mut(partition);
        strip
            .append_tab(
                TabRecord::new(TabId(first)).with_partition(partition),
                LaunchCause::FromRestore,
            )
            .unwrap();
        strip.finish_restore().unwrap();
    }
    session
}

#[test]
fn settings_file_controls_group_inheritance() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tabgroups.toml");
    std::fs::write(&path, "group_auto_creation = false\n").unwrap();
    let settings = FilterSettings::load(&path).unwrap();
    assert!(!settings.group_auto_creation);

    let mut session = restored_session(settings);
    let strip = session.partition_mut(Partition::Normal);
    strip
        .append_tab(TabRecord::new(TabId(2)).with_parent(TabId(1)), LaunchCause::FromLink)
        .unwrap();
    strip
        .append_tab(
            TabRecord::new(TabId(3)).with_parent(TabId(1)),
            LaunchCause::FromTabGroupUi,
        )
        .unwrap();

    let filter = strip.filter();
    assert_eq!(filter.related_tabs_for_root(TabId(1)), vec![TabId(1), TabId(3)]);
    assert_eq!(filter.related_tabs_for_root(TabId(2)), vec![TabId(2)]);
    assert_eq!(filter.group_ids_in_order(), vec![TabId(1), TabId(2)]);
}

#[test]
fn auto_creation_groups_every_child() {
    let mut session = restored_session(FilterSettings::default());
    let strip = session.partition_mut(Partition::Normal);
    strip
        .open_tab(0, TabRecord::new(TabId(2)).with_parent(TabId(1)), LaunchCause::FromLink)
        .unwrap();

    assert_eq!(strip.model().tab_ids(), vec![TabId(2), TabId(1)]);
    let filter = strip.filter();
    assert_eq!(filter.related_tabs_for_root(TabId(1)), vec![TabId(2), TabId(1)]);
    assert_eq!(filter.real_group_count(), 1);
    filter.check_consistency(strip.model()).unwrap();
}

#[test]
fn partitions_share_observers_but_not_groups() {
    let mut session = restored_session(FilterSettings::default());
    let log = EventLog::new();
    session.observers().add(Arc::new(log.clone()));
    for (partition, ids) in [(Partition::Normal, [2, 3]), (Partition::Private, [101, 102])] {
        let strip = session.partition_mut(partition);
        for id in ids {
            strip
                .append_tab(
                    TabRecord::new(TabId(id)).with_partition(partition),
                    LaunchCause::Other,
                )
                .unwrap();
        }
    }
    // Auto-creation has no parent to follow here, every tab stands alone.
    assert_eq!(session.partition(Partition::Private).filter().group_count(), 3);

    session.merge_tabs(TabId(3), TabId(1)).unwrap();
    session.merge_tabs(TabId(102), TabId(100)).unwrap();

    let merged: Vec<_> = log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            TabGroupEvent::DidMergeTabToGroup { moved_tab, .. } => Some(moved_tab),
            _ => None,
        })
        .collect();
    assert_eq!(merged, vec![TabId(3), TabId(102)]);
    assert_eq!(session.partition(Partition::Normal).filter().real_group_count(), 1);
    assert_eq!(session.partition(Partition::Private).filter().real_group_count(), 1);
    assert_eq!(
        session.merge_tabs(TabId(2), TabId(101)),
        Err(TabGroupError::CrossPartitionOperation {
            tab: TabId(2),
            expected: Partition::Private,
            actual: Partition::Normal,
        })
    );
}

#[test]
fn foreign_partition_tab_is_rejected_by_the_strip() {
    let mut session = restored_session(FilterSettings::default());
    let strip = session.partition_mut(Partition::Private);

    let result = strip.append_tab(TabRecord::new(TabId(5)), LaunchCause::Other);

    assert!(matches!(
        result,
        Err(TabGroupError::CrossPartitionOperation { tab: TabId(5), .. })
    ));
    assert_eq!(strip.model().count(), 1);
    assert_eq!(strip.filter().group_count(), 1);
}

#[test]
fn closing_the_selected_tab_moves_the_current_group() {
    let mut session = restored_session(FilterSettings::default());
    let strip = session.partition_mut(Partition::Normal);
    for id in [2, 3] {
        strip
            .append_tab(TabRecord::new(TabId(id)), LaunchCause::Other)
            .unwrap();
    }
    strip.select_tab(TabId(2)).unwrap();
    assert_eq!(strip.filter().current_group_index(), Some(1));

    strip.close_tab(TabId(2)).unwrap();

    assert_eq!(strip.model().selected(), Some(TabId(3)));
    assert_eq!(strip.filter().current_group_index(), Some(1));
    assert_eq!(strip.filter().representative_at(1), Some(TabId(3)));
}

#[test]
fn saved_settings_load_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("tabgroups.toml");
    let settings = FilterSettings {
        group_auto_creation: false,
        record_session_counts: true,
        session_count_store: Some(dir.path().join("sessions.toml")),
    };

    settings.save(&path).unwrap();

    assert_eq!(FilterSettings::load(&path).unwrap(), settings);
    let session = TabSession::new(FilterSettings::load(&path).unwrap());
    assert_eq!(session.settings(), &settings);
}
