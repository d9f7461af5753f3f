//! Membership diff engine

use crate::domain::team::{MemberId, MemberList, MemberSet};

use super::operation::MemberOperation;

/// Changes needed to turn an actual roster into a desired one.
///
/// Computed on set membership: a roster that differs only in order produces
/// an empty diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    /// Desired but not present, in desired order
    pub to_add: Vec<MemberId>,
    /// Present but not desired, in actual order
    pub to_remove: Vec<MemberId>,
}

impl MembershipDiff {
    /// Compare a desired roster against the actual one
    pub fn compute(desired: &MemberList, actual: &MemberList) -> Self {
        let desired_set = desired.to_set();
        let actual_set = actual.to_set();

        let to_add = desired
            .iter()
            .filter(|m| !actual_set.contains(m))
            .cloned()
            .collect();

        let to_remove = actual
            .iter()
            .filter(|m| !desired_set.contains(m))
            .cloned()
            .collect();

        Self { to_add, to_remove }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }

    /// Operations in application order: every removal, then every addition
    pub fn operations(&self) -> Vec<MemberOperation> {
        self.to_remove
            .iter()
            .cloned()
            .map(MemberOperation::Remove)
            .chain(self.to_add.iter().cloned().map(MemberOperation::Add))
            .collect()
    }

    /// The membership that results from applying this diff to `actual`
    pub fn apply_to(&self, actual: &MemberSet) -> MemberSet {
        let mut result = actual.clone();

        for member in &self.to_remove {
            result.remove(member);
        }

        for member in &self.to_add {
            result.insert(member.clone());
        }

        result
    }
}
