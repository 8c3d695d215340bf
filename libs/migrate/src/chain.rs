//! Chain resolution and walk planning
//!
//! A chain is resolved from an unordered slice of change-sets by following
//! their `down_revision` links back to the root. Resolution enforces the
//! total-order invariant: one root, one successor per change-set, no
//! duplicates, no unreachable links.

use std::collections::HashMap;

use crate::changeset::ChangeSet;
use crate::error::{MigrateError, MigrateResult};

/// A migration chain resolved into total order, root first.
#[derive(Debug, Clone)]
pub struct Chain {
    ordered: Vec<ChangeSet>,
}

impl Chain {
    /// Resolve a slice of change-sets into a total order.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ChainIntegrity`] when the change-sets do not
    /// form a single linked chain: duplicate ids, a `down_revision` pointing
    /// at an unknown id, no root or more than one root, a change-set with two
    /// successors, or links unreachable from the root (cycles).
    pub fn resolve(changesets: &[ChangeSet]) -> MigrateResult<Self> {
        if changesets.is_empty() {
            return Ok(Self {
                ordered: Vec::new(),
            });
        }

        let mut by_id: HashMap<&str, ChangeSet> = HashMap::with_capacity(changesets.len());
        for cs in changesets {
            if by_id.insert(cs.id, *cs).is_some() {
                return Err(MigrateError::ChainIntegrity(format!(
                    "duplicate revision id '{}'",
                    cs.id
                )));
            }
        }

        let mut successor: HashMap<&str, &str> = HashMap::new();
        let mut root: Option<&str> = None;
        for cs in changesets {
            match cs.down_revision {
                None => {
                    if let Some(other) = root.replace(cs.id) {
                        return Err(MigrateError::ChainIntegrity(format!(
                            "multiple root revisions: '{}' and '{}'",
                            other, cs.id
                        )));
                    }
                }
                Some(prev) => {
                    if !by_id.contains_key(prev) {
                        return Err(MigrateError::ChainIntegrity(format!(
                            "revision '{}' revises unknown revision '{}'",
                            cs.id, prev
                        )));
                    }
                    if let Some(other) = successor.insert(prev, cs.id) {
                        return Err(MigrateError::ChainIntegrity(format!(
                            "revision '{}' has more than one successor: '{}' and '{}'",
                            prev, other, cs.id
                        )));
                    }
                }
            }
        }

        let root = root.ok_or_else(|| {
            MigrateError::ChainIntegrity(
                "no root revision: every change-set revises another".to_string(),
            )
        })?;

        let mut ordered = Vec::with_capacity(changesets.len());
        let mut cursor = Some(root);
        while let Some(id) = cursor {
            ordered.push(by_id[id]);
            cursor = successor.get(id).copied();
        }

        if ordered.len() != changesets.len() {
            return Err(MigrateError::ChainIntegrity(format!(
                "{} change-set(s) are not reachable from the root",
                changesets.len() - ordered.len()
            )));
        }

        Ok(Self { ordered })
    }

    /// Change-sets in chain order, root first.
    pub fn changesets(&self) -> &[ChangeSet] {
        &self.ordered
    }

    /// Number of change-sets in the chain.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// True when the chain has no change-sets.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// The most recently authored change-set, the default upgrade target.
    pub fn tip(&self) -> Option<&ChangeSet> {
        self.ordered.last()
    }

    /// Position of a revision in chain order.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ordered.iter().position(|cs| cs.id == id)
    }

    /// True when the revision is part of the chain.
    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    /// Change-sets to execute, in order, to move forward from `current` to
    /// `target`. Empty when the database is already at `target`.
    ///
    /// # Errors
    ///
    /// - [`MigrateError::UnknownTarget`] when `target` is not in the chain
    /// - [`MigrateError::UnrecognizedRevision`] when `current` is not in the
    ///   chain
    /// - [`MigrateError::TargetBehindCurrent`] when `target` precedes
    ///   `current`
    pub fn upgrade_plan(&self, current: Option<&str>, target: &str) -> MigrateResult<&[ChangeSet]> {
        let target_idx = self
            .index_of(target)
            .ok_or_else(|| MigrateError::UnknownTarget(target.to_string()))?;

        let start = match current {
            None => 0,
            Some(current) => {
                let current_idx = self
                    .index_of(current)
                    .ok_or_else(|| MigrateError::UnrecognizedRevision(current.to_string()))?;
                if current_idx > target_idx {
                    return Err(MigrateError::TargetBehindCurrent {
                        target: target.to_string(),
                        current: current.to_string(),
                    });
                }
                current_idx + 1
            }
        };

        Ok(&self.ordered[start..target_idx + 1])
    }

    /// Change-sets to revert, tip-most first, to move backward from `current`
    /// to `target` (`None` = base, the empty schema). Empty when the database
    /// is already at `target`.
    ///
    /// # Errors
    ///
    /// Mirror of [`Chain::upgrade_plan`], with
    /// [`MigrateError::TargetAheadOfCurrent`] when `target` follows `current`.
    pub fn downgrade_plan(
        &self,
        current: Option<&str>,
        target: Option<&str>,
    ) -> MigrateResult<Vec<ChangeSet>> {
        let current = match current {
            Some(current) => current,
            None => {
                // Already at base; only base is a valid target.
                return match target {
                    None => Ok(Vec::new()),
                    Some(target) if self.contains(target) => {
                        Err(MigrateError::TargetAheadOfCurrent {
                            target: target.to_string(),
                            current: "base".to_string(),
                        })
                    }
                    Some(target) => Err(MigrateError::UnknownTarget(target.to_string())),
                };
            }
        };

        let current_idx = self
            .index_of(current)
            .ok_or_else(|| MigrateError::UnrecognizedRevision(current.to_string()))?;

        let stop = match target {
            None => 0,
            Some(target) => {
                let target_idx = self
                    .index_of(target)
                    .ok_or_else(|| MigrateError::UnknownTarget(target.to_string()))?;
                if target_idx > current_idx {
                    return Err(MigrateError::TargetAheadOfCurrent {
                        target: target.to_string(),
                        current: current.to_string(),
                    });
                }
                target_idx + 1
            }
        };

        Ok(self.ordered[stop..current_idx + 1]
            .iter()
            .rev()
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: ChangeSet = ChangeSet {
        id: "202507312300_create_users_table",
        description: "create users table",
        down_revision: None,
        up_sql: "",
        down_sql: "",
    };

    const SECOND: ChangeSet = ChangeSet {
        id: "202508010915_add_login_id_unique_constraint",
        description: "add login_id unique constraint",
        down_revision: Some("202507312300_create_users_table"),
        up_sql: "",
        down_sql: "",
    };

    const THIRD: ChangeSet = ChangeSet {
        id: "202508021140_add_email_column",
        description: "add email column",
        down_revision: Some("202508010915_add_login_id_unique_constraint"),
        up_sql: "",
        down_sql: "",
    };

    #[test]
    fn resolves_regardless_of_input_order() {
        let chain = Chain::resolve(&[THIRD, ROOT, SECOND]).unwrap();
        let ids: Vec<&str> = chain.changesets().iter().map(|cs| cs.id).collect();
        assert_eq!(ids, vec![ROOT.id, SECOND.id, THIRD.id]);
        assert_eq!(chain.tip().unwrap().id, THIRD.id);
    }

    #[test]
    fn empty_chain_resolves() {
        let chain = Chain::resolve(&[]).unwrap();
        assert!(chain.is_empty());
        assert!(chain.tip().is_none());
    }

    #[test]
    fn duplicate_id_is_an_integrity_violation() {
        let err = Chain::resolve(&[ROOT, ROOT]).unwrap_err();
        assert!(matches!(err, MigrateError::ChainIntegrity(_)));
    }

    #[test]
    fn missing_predecessor_is_an_integrity_violation() {
        let err = Chain::resolve(&[ROOT, THIRD]).unwrap_err();
        assert!(matches!(err, MigrateError::ChainIntegrity(_)));
    }

    #[test]
    fn two_roots_is_an_integrity_violation() {
        let other_root = ChangeSet {
            id: "202508031000_second_root",
            down_revision: None,
            ..ROOT
        };
        let err = Chain::resolve(&[ROOT, other_root]).unwrap_err();
        assert!(matches!(err, MigrateError::ChainIntegrity(_)));
    }

    #[test]
    fn two_successors_is_an_integrity_violation() {
        let rival = ChangeSet {
            id: "202508031000_rival_successor",
            down_revision: Some(ROOT.id),
            ..ROOT
        };
        let err = Chain::resolve(&[ROOT, SECOND, rival]).unwrap_err();
        assert!(matches!(err, MigrateError::ChainIntegrity(_)));
    }

    #[test]
    fn cycle_is_an_integrity_violation() {
        let a = ChangeSet {
            id: "202508031000_a",
            down_revision: Some("202508031005_b"),
            ..ROOT
        };
        let b = ChangeSet {
            id: "202508031005_b",
            down_revision: Some("202508031000_a"),
            ..ROOT
        };
        let err = Chain::resolve(&[ROOT, a, b]).unwrap_err();
        assert!(matches!(err, MigrateError::ChainIntegrity(_)));
    }

    #[test]
    fn upgrade_plan_from_base_to_tip_covers_whole_chain() {
        let chain = Chain::resolve(&[ROOT, SECOND, THIRD]).unwrap();
        let plan = chain.upgrade_plan(None, THIRD.id).unwrap();
        let ids: Vec<&str> = plan.iter().map(|cs| cs.id).collect();
        assert_eq!(ids, vec![ROOT.id, SECOND.id, THIRD.id]);
    }

    #[test]
    fn upgrade_plan_starts_after_current() {
        let chain = Chain::resolve(&[ROOT, SECOND, THIRD]).unwrap();
        let plan = chain.upgrade_plan(Some(ROOT.id), THIRD.id).unwrap();
        let ids: Vec<&str> = plan.iter().map(|cs| cs.id).collect();
        assert_eq!(ids, vec![SECOND.id, THIRD.id]);
    }

    #[test]
    fn upgrade_plan_at_target_is_a_no_op() {
        let chain = Chain::resolve(&[ROOT, SECOND]).unwrap();
        let plan = chain.upgrade_plan(Some(SECOND.id), SECOND.id).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn upgrade_plan_rejects_unknown_target() {
        let chain = Chain::resolve(&[ROOT, SECOND]).unwrap();
        let err = chain.upgrade_plan(None, "999901010000_nope").unwrap_err();
        assert!(matches!(err, MigrateError::UnknownTarget(_)));
    }

    #[test]
    fn upgrade_plan_rejects_target_behind_current() {
        let chain = Chain::resolve(&[ROOT, SECOND]).unwrap();
        let err = chain.upgrade_plan(Some(SECOND.id), ROOT.id).unwrap_err();
        assert!(matches!(err, MigrateError::TargetBehindCurrent { .. }));
    }

    #[test]
    fn upgrade_plan_rejects_unrecognized_current() {
        let chain = Chain::resolve(&[ROOT, SECOND]).unwrap();
        let err = chain
            .upgrade_plan(Some("999901010000_elsewhere"), SECOND.id)
            .unwrap_err();
        assert!(matches!(err, MigrateError::UnrecognizedRevision(_)));
    }

    #[test]
    fn downgrade_plan_to_base_reverses_the_chain() {
        let chain = Chain::resolve(&[ROOT, SECOND, THIRD]).unwrap();
        let plan = chain.downgrade_plan(Some(THIRD.id), None).unwrap();
        let ids: Vec<&str> = plan.iter().map(|cs| cs.id).collect();
        assert_eq!(ids, vec![THIRD.id, SECOND.id, ROOT.id]);
    }

    #[test]
    fn downgrade_plan_stops_at_target() {
        let chain = Chain::resolve(&[ROOT, SECOND, THIRD]).unwrap();
        let plan = chain.downgrade_plan(Some(THIRD.id), Some(ROOT.id)).unwrap();
        let ids: Vec<&str> = plan.iter().map(|cs| cs.id).collect();
        assert_eq!(ids, vec![THIRD.id, SECOND.id]);
    }

    #[test]
    fn downgrade_plan_at_base_is_a_no_op() {
        let chain = Chain::resolve(&[ROOT, SECOND]).unwrap();
        assert!(chain.downgrade_plan(None, None).unwrap().is_empty());
    }

    #[test]
    fn downgrade_plan_rejects_target_ahead_of_current() {
        let chain = Chain::resolve(&[ROOT, SECOND]).unwrap();
        let err = chain
            .downgrade_plan(Some(ROOT.id), Some(SECOND.id))
            .unwrap_err();
        assert!(matches!(err, MigrateError::TargetAheadOfCurrent { .. }));
    }

    #[test]
    fn downgrade_plan_rejects_unknown_target() {
        let chain = Chain::resolve(&[ROOT, SECOND]).unwrap();
        let err = chain
            .downgrade_plan(Some(SECOND.id), Some("999901010000_nope"))
            .unwrap_err();
        assert!(matches!(err, MigrateError::UnknownTarget(_)));
    }
}
