//! Stable mapping between a sparse, filtered group id space and dense arm indices.
//!
//! A map discretization may have hundreds of groups of which only some are usable
//! (sea vs. land, open vs. closed ports). Bandits only ever see the usable ones, as
//! arms `0..number_of_arms()`, assigned in ascending group order.

/// Immutable bijection between valid groups and arms.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionSwitch {
    /// `arm -> group`
    groups: Vec<usize>,
    /// `group -> arm`, `None` for invalid groups.
    arms: Vec<Option<usize>>,
}

impl OptionSwitch {
    /// Keep every group in `0..number_of_groups` for which `is_valid` holds.
    pub fn new(number_of_groups: usize, mut is_valid: impl FnMut(usize) -> bool) -> Self {
        let mut groups = Vec::new();
        let mut arms = vec![None; number_of_groups];
        for (group, slot) in arms.iter_mut().enumerate() {
            if is_valid(group) {
                *slot = Some(groups.len());
                groups.push(group);
            }
        }
        Self { groups, arms }
    }

    /// Number of valid groups (may be smaller than the group count).
    pub fn number_of_arms(&self) -> usize {
        self.groups.len()
    }

    /// Size of the full group space.
    pub fn number_of_groups(&self) -> usize {
        self.arms.len()
    }

    /// Arm for `group`, or `None` if the group is invalid or out of range.
    pub fn arm(&self, group: usize) -> Option<usize> {
        self.arms.get(group).copied().flatten()
    }

    /// Group behind `arm`. Panics if `arm` is out of range.
    pub fn group(&self, arm: usize) -> usize {
        assert!(
            arm < self.groups.len(),
            "arm {arm} out of range for {} arms",
            self.groups.len()
        );
        self.groups[arm]
    }

    pub fn contains_group(&self, group: usize) -> bool {
        self.arm(group).is_some()
    }

    /// Valid groups in arm order.
    pub fn groups(&self) -> &[usize] {
        &self.groups
    }
}
