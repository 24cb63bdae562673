//! Expand/collapse state and incremental updates of the flat sequence.

use std::sync::Arc;

use im::HashMap;

use serde::{Deserialize, Serialize};

use crate::flatten::{PhysicalRow, flatten};
use crate::key::RowKey;
use crate::row::RowRef;

/// The flattened row sequence. Replaced wholesale on every change.
pub type FlatRows<T> = Arc<[PhysicalRow<T>]>;

// =============================================================================
// ExpandState
// =============================================================================

/// Per-row expand/collapse overrides.
///
/// A missing key means "use the default policy", not "collapsed". Every
/// write returns a new state and leaves the old one untouched, so holders of
/// the previous value never observe a change and can detect updates with
/// [`ExpandState::same_as`].
///
/// The map is persistent: a write copies only the path to the changed entry
/// and shares everything else with the previous state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpandState {
    map: Arc<HashMap<RowKey, bool>>,
}

impl ExpandState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The explicit state of `key`, if any.
    pub fn get(&self, key: RowKey) -> Option<bool> {
        self.map.get(&key).copied()
    }

    /// The effective state of `key` under `default_expand`.
    pub fn resolve(&self, key: RowKey, default_expand: bool) -> bool {
        self.get(key).unwrap_or(default_expand)
    }

    /// A copy of this state with `key` set to `expanded`.
    pub fn with(&self, key: RowKey, expanded: bool) -> Self {
        self.with_all([(key, expanded)])
    }

    /// A copy of this state with several keys set at once.
    pub fn with_all(&self, entries: impl IntoIterator<Item = (RowKey, bool)>) -> Self {
        let mut map = HashMap::clone(&self.map);
        for (key, expanded) in entries {
            map.insert(key, expanded);
        }
        Self { map: Arc::new(map) }
    }

    /// A copy of this state with `key` reverted to the default policy.
    pub fn without(&self, key: RowKey) -> Self {
        if !self.map.contains_key(&key) {
            return self.clone();
        }
        Self {
            map: Arc::new(self.map.without(&key)),
        }
    }

    /// Whether both values share the same underlying map.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.map, &other.map)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RowKey, bool)> + '_ {
        self.map.iter().map(|(key, expanded)| (*key, *expanded))
    }

    /// Set every expandable row of the forest to `expanded`.
    ///
    /// Walks the whole logical tree, loading lazy children.
    pub fn with_forest<T>(&self, roots: &[RowRef<T>], expanded: bool) -> Self {
        let mut keys = Vec::new();
        collect_expandable(roots, &mut keys);
        self.with_all(keys.into_iter().map(|key| (key, expanded)))
    }
}

fn collect_expandable<T>(rows: &[RowRef<T>], out: &mut Vec<RowKey>) {
    for row in rows {
        let children = row.children();
        if !children.is_empty() {
            out.push(row.key());
            collect_expandable(&children, out);
        }
    }
}

// =============================================================================
// Incremental toggle
// =============================================================================

/// Flip the row at `index` between expanded and collapsed.
///
/// Collapsing removes the row's visible subtree; expanding flattens only the
/// toggled row and splices its subtree in after it. Ancestors' subtree sizes
/// are adjusted in both cases. An out-of-range index or a row without
/// children returns the inputs unchanged.
pub fn toggle<T>(
    rows: &FlatRows<T>,
    state: &ExpandState,
    index: usize,
    default_expand: bool,
) -> (FlatRows<T>, ExpandState) {
    let Some(target) = rows.get(index) else {
        return (rows.clone(), state.clone());
    };
    if !target.expandable {
        return (rows.clone(), state.clone());
    }

    if target.expanded {
        let next_state = state.with(target.key(), false);
        let removed = target.num_children;
        let end = (index + 1 + removed).min(rows.len());

        let mut next = Vec::with_capacity(rows.len() - (end - index - 1));
        next.extend_from_slice(&rows[..=index]);
        next.extend_from_slice(&rows[end..]);
        next[index].expanded = false;
        next[index].num_children = 0;
        adjust_ancestors(&mut next, index, |count| count.saturating_sub(removed));

        log::debug!("collapsed row {} (-{} rows)", target.key(), removed);
        (next.into(), next_state)
    } else {
        let next_state = state.with(target.key(), true);
        let mut subtree = flatten(&target.row, &next_state, target.level, default_expand);
        let added = subtree.len().saturating_sub(1);

        let mut next = Vec::with_capacity(rows.len() + added);
        next.extend_from_slice(&rows[..=index]);
        next.extend(subtree.drain(1..));
        next.extend_from_slice(&rows[index + 1..]);
        next[index].expanded = added > 0;
        next[index].num_children = added;
        adjust_ancestors(&mut next, index, |count| count + added);

        log::debug!("expanded row {} (+{} rows)", target.key(), added);
        (next.into(), next_state)
    }
}

/// Apply `update` to the subtree size of every ancestor of `index`.
fn adjust_ancestors<T>(rows: &mut [PhysicalRow<T>], index: usize, update: impl Fn(usize) -> usize) {
    let mut level = rows[index].level;
    for row in rows[..index].iter_mut().rev() {
        if level == 0 {
            break;
        }
        if row.level < level {
            row.num_children = update(row.num_children);
            level = row.level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten_forest;
    use crate::row::LogicalRow;

    fn key(raw: i64) -> RowKey {
        RowKey::from_raw(raw)
    }

    fn leaf(raw: i64) -> RowRef<()> {
        LogicalRow::leaf(key(raw), ()).into_ref()
    }

    fn branch(raw: i64, children: Vec<RowRef<()>>) -> RowRef<()> {
        LogicalRow::branch(key(raw), (), children).into_ref()
    }

    #[test]
    fn test_adjust_ancestors_stops_at_root() {
        let roots = vec![
            branch(1, vec![branch(2, vec![leaf(3)])]),
            branch(4, vec![leaf(5)]),
        ];
        let mut rows = flatten_forest(&roots, &ExpandState::new(), true);
        // rows: 1, 2, 3, 4, 5
        adjust_ancestors(&mut rows, 2, |n| n + 10);
        assert_eq!(rows[0].num_children, 12);
        assert_eq!(rows[1].num_children, 11);
        assert_eq!(rows[3].num_children, 1);
    }

    #[test]
    fn test_writes_leave_previous_state_untouched() {
        let base = ExpandState::new().with_all((0..1000).map(|i| (key(i), i % 2 == 0)));
        let next = base.with(key(3), true);

        assert!(!next.same_as(&base));
        assert_eq!(base.get(key(3)), Some(false));
        assert_eq!(next.get(key(3)), Some(true));
        assert_eq!(next.len(), base.len());

        let reverted = next.without(key(3));
        assert_eq!(reverted.get(key(3)), None);
        assert_eq!(reverted.len(), 999);
        assert_eq!(next.len(), 1000);
    }

    #[test]
    fn test_without_missing_key_keeps_identity() {
        let state = ExpandState::new().with(key(1), true);
        assert!(state.without(key(2)).same_as(&state));
    }

    #[test]
    fn test_without_restores_default() {
        let state = ExpandState::new().with(key(1), false);
        assert_eq!(state.get(key(1)), Some(false));
        let reverted = state.without(key(1));
        assert_eq!(reverted.get(key(1)), None);
        assert!(reverted.resolve(key(1), true));
    }
}
