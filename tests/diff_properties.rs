//! Property tests for the membership diff

use proptest::prelude::*;
use proptest::test_runner::Config;
use team_roster_sync::domain::{MemberId, MemberList, MembershipDiff};

fn roster() -> impl Strategy<Value = MemberList> {
    prop::collection::vec("[a-e][0-9]@example\\.com", 0..8).prop_map(|ids| {
        ids.into_iter()
            .map(|id| MemberId::new(id).expect("generated id is valid"))
            .collect()
    })
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn applying_diff_yields_desired_set(desired in roster(), actual in roster()) {
        let diff = MembershipDiff::compute(&desired, &actual);

        prop_assert_eq!(diff.apply_to(&actual.to_set()), desired.to_set());
    }

    #[test]
    fn diff_ignores_order(desired in roster(), actual in roster()) {
        let reversed: MemberList = desired.iter().rev().cloned().collect();

        prop_assert_eq!(
            MembershipDiff::compute(&desired, &actual).len(),
            MembershipDiff::compute(&reversed, &actual).len()
        );
        prop_assert!(MembershipDiff::compute(&reversed, &desired).is_empty());
    }

    #[test]
    fn diff_sides_are_disjoint(desired in roster(), actual in roster()) {
        let diff = MembershipDiff::compute(&desired, &actual);

        for member in &diff.to_add {
            prop_assert!(!actual.contains(member));
            prop_assert!(!diff.to_remove.contains(member));
        }
        for member in &diff.to_remove {
            prop_assert!(!desired.contains(member));
        }
    }
}
