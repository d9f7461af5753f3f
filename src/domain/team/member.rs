//! Member identifiers and the two shapes a roster takes
//!
//! A declared roster is an ordered [`MemberList`]; the remote directory stores
//! membership as an unordered set, modelled by [`MemberSet`]. Diffing happens
//! on sets, while observed state is always reported as a list whose order is
//! derived from the declared roster.

use std::collections::BTreeSet;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::validation::{validate_member_id, TeamValidationError};

/// Member identifier - an email address or login of a remote user
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId(String);

impl MemberId {
    /// Create a new MemberId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, TeamValidationError> {
        let id = id.into();
        validate_member_id(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MemberId {
    type Error = TeamValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MemberId> for String {
    fn from(id: MemberId) -> Self {
        id.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered roster with duplicates collapsed to their first occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<MemberId>", into = "Vec<MemberId>")]
pub struct MemberList(Vec<MemberId>);

impl MemberList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw identifiers, validating each one
    pub fn parse<I, S>(raw: I) -> Result<Self, TeamValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        raw.into_iter()
            .map(MemberId::new)
            .collect::<Result<Self, _>>()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.0.contains(member)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MemberId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[MemberId] {
        &self.0
    }

    /// Collapse into the unordered form used for diffing
    pub fn to_set(&self) -> MemberSet {
        self.0.iter().cloned().collect()
    }

    /// Same members regardless of order
    pub fn same_members(&self, other: &MemberList) -> bool {
        self.to_set() == other.to_set()
    }

    /// Reorder these (observed) members to follow `declared`.
    ///
    /// Members named in `declared` come first, in declared order. Members the
    /// declaration does not mention keep their observed order at the end.
    pub fn aligned_to(&self, declared: &MemberList) -> MemberList {
        let observed = self.to_set();
        let mut aligned: Vec<MemberId> = declared
            .iter()
            .filter(|m| observed.contains(m))
            .cloned()
            .collect();

        let declared = declared.to_set();
        aligned.extend(self.iter().filter(|m| !declared.contains(m)).cloned());

        MemberList(aligned)
    }
}

impl FromIterator<MemberId> for MemberList {
    fn from_iter<T: IntoIterator<Item = MemberId>>(iter: T) -> Self {
        let mut seen = HashSet::new();
        let members = iter
            .into_iter()
            .filter(|m| seen.insert(m.clone()))
            .collect();
        Self(members)
    }
}

impl From<Vec<MemberId>> for MemberList {
    fn from(members: Vec<MemberId>) -> Self {
        members.into_iter().collect()
    }
}

impl From<MemberList> for Vec<MemberId> {
    fn from(list: MemberList) -> Self {
        list.0
    }
}

impl<'a> IntoIterator for &'a MemberList {
    type Item = &'a MemberId;
    type IntoIter = std::slice::Iter<'a, MemberId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Unordered membership, as the remote directory sees it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberSet(BTreeSet<MemberId>);

impl MemberSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.0.contains(member)
    }

    pub fn insert(&mut self, member: MemberId) -> bool {
        self.0.insert(member)
    }

    pub fn remove(&mut self, member: &MemberId) -> bool {
        self.0.remove(member)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemberId> {
        self.0.iter()
    }
}

impl FromIterator<MemberId> for MemberSet {
    fn from_iter<T: IntoIterator<Item = MemberId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
