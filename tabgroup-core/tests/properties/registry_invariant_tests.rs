//! Property tests for the group registry under arbitrary tab strip edits

use proptest::prelude::*;
use tabgroup_core::{FilterSettings, TabModel};

use super::support::{Harness, edit_op, first_appearance_order, flat_members, strip_op};

fn settings(group_auto_creation: bool) -> FilterSettings {
    FilterSettings {
        group_auto_creation,
        ..FilterSettings::default()
    }
}

proptest! {
    /// Every edit leaves the registry consistent with the model.
    #[test]
    fn edits_keep_registry_consistent(
        tabs in 0_u32..8,
        auto in any::<bool>(),
        ops in prop::collection::vec(strip_op(), 0..40),
    ) {
        let mut h = Harness::new(tabs, settings(auto));
        for op in &ops {
            prop_assert_eq!(h.apply(op), Ok(()), "op {:?}", op);
            prop_assert_eq!(h.strip.filter().check_consistency(h.model()), Ok(()), "after {:?}", op);
        }
    }

    /// Group sizes add up to the number of tabs, and the real group counter
    /// matches the groups with more than one member.
    #[test]
    fn member_counts_add_up(
        tabs in 1_u32..8,
        ops in prop::collection::vec(strip_op(), 0..40),
    ) {
        let mut h = Harness::new(tabs, FilterSettings::default());
        for op in &ops {
            h.apply(op).unwrap();
        }
        let filter = h.strip.filter();
        let roots = filter.group_ids_in_order();
        let total: usize = roots.iter().map(|&r| filter.related_tab_count_for_root(r)).sum();
        prop_assert_eq!(total, h.model().count());
        let real = roots.iter().filter(|&&r| filter.related_tab_count_for_root(r) > 1).count();
        prop_assert_eq!(filter.real_group_count(), real);
        prop_assert_eq!(filter.group_count(), roots.len());
    }

    /// The grouped view lists groups in order of first appearance.
    #[test]
    fn projection_follows_first_appearance(
        tabs in 0_u32..8,
        ops in prop::collection::vec(strip_op(), 0..40),
    ) {
        let mut h = Harness::new(tabs, FilterSettings::default());
        for op in &ops {
            h.apply(op).unwrap();
            prop_assert_eq!(
                h.strip.filter().group_ids_in_order(),
                first_appearance_order(h.model()),
                "after {:?}", op
            );
        }
    }

    /// Member order mirrors flat order and every group has a member as its
    /// representative.
    #[test]
    fn members_follow_flat_order(
        tabs in 1_u32..8,
        ops in prop::collection::vec(strip_op(), 0..40),
    ) {
        let mut h = Harness::new(tabs, FilterSettings::default());
        for op in &ops {
            h.apply(op).unwrap();
        }
        let filter = h.strip.filter();
        for (index, root) in filter.group_ids_in_order().into_iter().enumerate() {
            let members = filter.related_tabs_for_root(root);
            prop_assert_eq!(&members, &flat_members(h.model(), root));
            let representative = filter.representative_at(index);
            prop_assert!(representative.is_some_and(|t| members.contains(&t)));
        }
    }

    /// With nothing selected, a group's representative survives the closing
    /// of any other member.
    #[test]
    fn representative_survives_closing_other_members(
        tabs in 2_u32..8,
        ops in prop::collection::vec(edit_op(), 0..30),
        pick in any::<usize>(),
    ) {
        let mut h = Harness::new(tabs, FilterSettings::default());
        for op in &ops {
            h.apply(op).unwrap();
        }
        let filter = h.strip.filter();
        let real: Vec<_> = filter
            .group_ids_in_order()
            .into_iter()
            .filter(|&r| filter.related_tab_count_for_root(r) > 1)
            .collect();
        prop_assume!(!real.is_empty());
        let root = real[pick % real.len()];
        let representative = filter.representative_of(root).unwrap();
        let members = filter.related_tabs_for_root(root);
        let victim = members.iter().copied().find(|&t| t != representative).unwrap();

        h.strip.close_tab(victim).unwrap();

        let root_now = h.model().root_id(representative).unwrap();
        prop_assert_eq!(h.strip.filter().representative_of(root_now), Some(representative));
    }

    /// Closing a representative hands the role to a member that was next to
    /// it in member order.
    #[test]
    fn closed_representative_passes_to_neighbour(
        tabs in 2_u32..8,
        ops in prop::collection::vec(edit_op(), 0..30),
        pick in any::<usize>(),
    ) {
        let mut h = Harness::new(tabs, FilterSettings::default());
        for op in &ops {
            h.apply(op).unwrap();
        }
        let filter = h.strip.filter();
        let real: Vec<_> = filter
            .group_ids_in_order()
            .into_iter()
            .filter(|&r| filter.related_tab_count_for_root(r) > 1)
            .collect();
        prop_assume!(!real.is_empty());
        let root = real[pick % real.len()];
        let representative = filter.representative_of(root).unwrap();
        let members = filter.related_tabs_for_root(root);
        let position = members.iter().position(|&t| t == representative).unwrap();
        let neighbours: Vec<_> = [position.checked_sub(1), Some(position + 1)]
            .into_iter()
            .flatten()
            .filter_map(|i| members.get(i).copied())
            .collect();
        let survivor = members.iter().copied().find(|&t| t != representative).unwrap();

        h.strip.close_tab(representative).unwrap();

        let root_now = h.model().root_id(survivor).unwrap();
        let successor = h.strip.filter().representative_of(root_now).unwrap();
        prop_assert!(neighbours.contains(&successor), "{} not in {:?}", successor, neighbours);
    }
}
