//! Property tests for the classification of raw tab moves

use std::sync::Arc;

use proptest::prelude::*;
use tabgroup_core::{
    EventLog, FilterSettings, ObserverList, Partition, TabGroupEvent, TabId, TabModel, TabRecord,
    TabStrip, VecTabModel,
};

use super::support::{Harness, strip_op};

/// A strip whose first `grouped` tabs form one group anchored at tab 1.
fn grouped_strip(grouped: u32, loose: u32) -> (TabStrip<VecTabModel>, EventLog) {
    let mut model = VecTabModel::new(Partition::Normal);
    for raw in 1..=grouped {
        model
            .append_tab(TabRecord::new(TabId(raw)).with_root(TabId(1)))
            .unwrap();
    }
    for raw in grouped + 1..=grouped + loose {
        model.append_tab(TabRecord::new(TabId(raw))).unwrap();
    }
    model.mark_restored();
    let log = EventLog::new();
    let observers = ObserverList::new();
    observers.add(Arc::new(log.clone()));
    let strip = TabStrip::new(model, FilterSettings::default(), observers).unwrap();
    (strip, log)
}

proptest! {
    /// With no real groups, every move that changes the order is a whole
    /// group move carrying the model's indices.
    #[test]
    fn ungrouped_moves_are_group_moves(
        tabs in 2_u32..10,
        from in any::<usize>(),
        slot in any::<usize>(),
    ) {
        let mut h = Harness::new(tabs, FilterSettings::default());
        let count = h.model().count();
        let tab = h.tab(from).unwrap();
        let old_index = h.model().index_of(tab).unwrap();
        let slot = slot % (count + 1);
        prop_assume!(slot != old_index && slot != old_index + 1);
        let new_index = if slot > old_index { slot - 1 } else { slot };

        h.strip.move_tab(tab, slot).unwrap();

        prop_assert_eq!(
            h.log.events(),
            vec![TabGroupEvent::DidMoveTabGroup { moved_tab: tab, old_index, new_index }]
        );
    }

    /// Moving a member inside its contiguous group is a within-group move.
    #[test]
    fn moves_inside_a_group_stay_within(
        grouped in 2_u32..6,
        loose in 0_u32..4,
        member in any::<usize>(),
        slot in any::<usize>(),
    ) {
        let (mut strip, log) = grouped_strip(grouped, loose);
        let size = grouped as usize;
        let old_index = member % size;
        let slot = slot % (size + 1);
        prop_assume!(slot != old_index && slot != old_index + 1);
        let tab = strip.model().tab_at(old_index).unwrap();
        let new_index = if slot > old_index { slot - 1 } else { slot };

        strip.move_tab(tab, slot).unwrap();

        prop_assert_eq!(
            log.events(),
            vec![TabGroupEvent::DidMoveWithinGroup { moved_tab: tab, old_index, new_index }]
        );
        prop_assert_eq!(strip.filter().related_tabs_for_root(TabId(1)).len(), size);
    }

    /// A raw move never changes which group a tab belongs to.
    #[test]
    fn raw_moves_keep_membership(
        tabs in 2_u32..8,
        ops in prop::collection::vec(strip_op(), 0..20),
        from in any::<usize>(),
        slot in any::<usize>(),
    ) {
        let mut h = Harness::new(tabs, FilterSettings::default());
        for op in &ops {
            h.apply(op).unwrap();
        }
        let count = h.model().count();
        prop_assume!(count > 0);
        let roots = |model: &VecTabModel| {
            let mut roots: Vec<_> = model
                .tab_ids()
                .into_iter()
                .map(|t| (t, model.root_id(t)))
                .collect();
            roots.sort();
            roots
        };
        let before = roots(h.model());
        let groups = h.strip.filter().group_count();
        let tab = h.tab(from).unwrap();
        h.log.clear();

        h.strip.move_tab(tab, slot % (count + 1)).unwrap();

        prop_assert_eq!(roots(h.model()), before);
        prop_assert_eq!(h.strip.filter().group_count(), groups);
        for event in h.log.events() {
            let reorder = matches!(
                event,
                TabGroupEvent::DidMoveTabGroup { .. } | TabGroupEvent::DidMoveWithinGroup { .. }
            );
            prop_assert!(reorder, "unexpected {:?}", event);
        }
    }
}
