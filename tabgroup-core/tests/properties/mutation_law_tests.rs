//! Property tests for the algebra of group mutations

use proptest::prelude::*;
use tabgroup_core::{FilterSettings, TabGroupEvent, TabId, TabModel, VecTabModel};

use super::support::{Harness, strip_op};

fn is_contiguous(model: &VecTabModel, tabs: &[TabId]) -> bool {
    let Some(start) = tabs.first().and_then(|&t| model.index_of(t)) else {
        return false;
    };
    tabs.iter()
        .enumerate()
        .all(|(i, &t)| model.index_of(t) == Some(start + i))
}

proptest! {
    /// Merging an ungrouped tab and undoing it with the recorded index and
    /// root id restores the flat order and every root id.
    #[test]
    fn undo_reverts_merge(
        tabs in 2_u32..8,
        ops in prop::collection::vec(strip_op(), 0..30),
        source in any::<usize>(),
        destination in any::<usize>(),
    ) {
        let mut h = Harness::new(tabs, FilterSettings::default());
        for op in &ops {
            h.apply(op).unwrap();
        }
        prop_assume!(h.model().count() > 0);
        let source = h.tab(source).unwrap();
        let destination = h.tab(destination).unwrap();
        prop_assume!(source != destination);
        prop_assume!(!h.strip.filter().has_other_related_tabs(h.model(), source));
        prop_assume!(h.model().root_id(source) == Some(source));

        let order = h.model().tab_ids();
        let roots: Vec<_> = order.iter().map(|&t| h.model().root_id(t)).collect();
        let index = h.model().index_of(source).unwrap();

        h.strip.merge_tabs(source, destination).unwrap();
        prop_assert_eq!(h.model().root_id(source), h.model().root_id(destination));
        h.strip.undo_group(source, index, source).unwrap();

        prop_assert_eq!(h.model().tab_ids(), order.clone());
        let roots_after: Vec<_> = order.iter().map(|&t| h.model().root_id(t)).collect();
        prop_assert_eq!(roots_after, roots);
        prop_assert_eq!(h.strip.filter().check_consistency(h.model()), Ok(()));
    }

    /// Moving a group to where it already starts changes nothing and emits
    /// nothing.
    #[test]
    fn move_related_tabs_in_place_is_silent(
        tabs in 1_u32..8,
        ops in prop::collection::vec(strip_op(), 0..30),
        pick in any::<usize>(),
    ) {
        let mut h = Harness::new(tabs, FilterSettings::default());
        for op in &ops {
            h.apply(op).unwrap();
        }
        prop_assume!(h.model().count() > 0);
        let tab = h.tab(pick).unwrap();
        let first = h.strip.filter().related_tabs(h.model(), tab)[0];
        let start = h.model().index_of(first).unwrap();
        let order = h.model().tab_ids();
        let groups = h.strip.filter().group_ids_in_order();
        h.log.clear();

        h.strip.move_related_tabs(tab, start).unwrap();

        prop_assert_eq!(h.model().tab_ids(), order);
        prop_assert_eq!(h.strip.filter().group_ids_in_order(), groups);
        prop_assert!(h.log.events().is_empty());
    }

    /// Merging two tabs that already share a group is a no-op.
    #[test]
    fn merge_within_group_is_noop(
        tabs in 2_u32..8,
        ops in prop::collection::vec(strip_op(), 0..30),
        pick in any::<usize>(),
    ) {
        let mut h = Harness::new(tabs, FilterSettings::default());
        for op in &ops {
            h.apply(op).unwrap();
        }
        prop_assume!(h.model().count() > 0);
        let tab = h.tab(pick).unwrap();
        let members = h.strip.filter().related_tabs(h.model(), tab);
        prop_assume!(members.len() > 1);
        let order = h.model().tab_ids();
        h.log.clear();

        h.strip.merge_tabs(members[members.len() - 1], members[0]).unwrap();

        prop_assert_eq!(h.model().tab_ids(), order);
        prop_assert!(h.log.events().is_empty());
    }

    /// After a merge the source tabs sit directly behind the destination
    /// group, in their previous member order, even when the source group
    /// was split across the strip.
    #[test]
    fn merge_places_source_behind_destination(
        tabs in 2_u32..8,
        ops in prop::collection::vec(strip_op(), 0..30),
        source in any::<usize>(),
        destination in any::<usize>(),
    ) {
        let mut h = Harness::new(tabs, FilterSettings::default());
        for op in &ops {
            h.apply(op).unwrap();
        }
        prop_assume!(h.model().count() > 0);
        let source = h.tab(source).unwrap();
        let destination = h.tab(destination).unwrap();
        prop_assume!(h.model().root_id(source) != h.model().root_id(destination));
        let moved = h.strip.filter().related_tabs(h.model(), source);
        let target = h.strip.filter().related_tabs(h.model(), destination);
        prop_assume!(is_contiguous(h.model(), &target));

        h.strip.merge_tabs(source, destination).unwrap();

        let root = h.model().root_id(destination).unwrap();
        let mut expected = target.clone();
        expected.extend(&moved);
        prop_assert_eq!(h.strip.filter().related_tabs_for_root(root), expected.clone());
        let start = h.model().index_of(expected[0]).unwrap();
        for (i, &t) in expected.iter().enumerate() {
            prop_assert_eq!(h.model().index_of(t), Some(start + i));
        }
        let merged = h
            .log
            .events()
            .into_iter()
            .filter(|e| matches!(e, TabGroupEvent::WillMergeTabToGroup { .. }))
            .count();
        prop_assert!(merged >= 1);
    }
}
