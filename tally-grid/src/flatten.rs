//! Flattening a logical tree into physical rows.
//!
//! The physical sequence is the pre-order traversal of the logical tree,
//! restricted to nodes whose ancestors are all expanded. Each physical row
//! records how many visible rows its subtree contributes so that the
//! sequence can later be patched in place of a full rebuild.

use std::fmt;

use crate::expand::ExpandState;
use crate::key::RowKey;
use crate::row::RowRef;

/// One entry in the flattened, renderable sequence.
pub struct PhysicalRow<T> {
    /// The logical row this entry renders.
    pub row: RowRef<T>,
    /// Depth in the tree (0 = root level).
    pub level: usize,
    /// Whether the logical row has children.
    pub expandable: bool,
    /// Whether the children are currently part of the sequence.
    pub expanded: bool,
    /// Number of visible rows contributed by this row's subtree,
    /// excluding the row itself.
    pub num_children: usize,
}

impl<T> PhysicalRow<T> {
    pub fn key(&self) -> RowKey {
        self.row.key()
    }

    pub fn data(&self) -> &T {
        self.row.data()
    }
}

impl<T> Clone for PhysicalRow<T> {
    fn clone(&self) -> Self {
        Self {
            row: self.row.clone(),
            level: self.level,
            expandable: self.expandable,
            expanded: self.expanded,
            num_children: self.num_children,
        }
    }
}

// Content equality: two rows are equal when they describe the same node in
// the same visible shape, even if the logical rows were loaded separately.
impl<T> PartialEq for PhysicalRow<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
            && self.level == other.level
            && self.expandable == other.expandable
            && self.expanded == other.expanded
            && self.num_children == other.num_children
    }
}

impl<T> fmt::Debug for PhysicalRow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicalRow")
            .field("key", &self.key())
            .field("level", &self.level)
            .field("expandable", &self.expandable)
            .field("expanded", &self.expanded)
            .field("num_children", &self.num_children)
            .finish()
    }
}

/// Flatten `node` and its visible descendants.
///
/// The first returned row is always `node` itself at `level`.
pub fn flatten<T>(
    node: &RowRef<T>,
    expand: &ExpandState,
    level: usize,
    default_expand: bool,
) -> Vec<PhysicalRow<T>> {
    let mut out = Vec::new();
    flatten_into(node, expand, level, default_expand, &mut out);
    out
}

/// Flatten every root in order and concatenate the results.
pub fn flatten_forest<T>(
    roots: &[RowRef<T>],
    expand: &ExpandState,
    default_expand: bool,
) -> Vec<PhysicalRow<T>> {
    let mut out = Vec::new();
    for root in roots {
        flatten_into(root, expand, 0, default_expand, &mut out);
    }
    out
}

/// Number of rows `flatten` would produce for `node`, without allocating them.
pub fn visible_count<T>(node: &RowRef<T>, expand: &ExpandState, default_expand: bool) -> usize {
    let children = node.children();
    if children.is_empty() || !expand.resolve(node.key(), default_expand) {
        return 1;
    }
    1 + children
        .iter()
        .map(|child| visible_count(child, expand, default_expand))
        .sum::<usize>()
}

/// Push `node` and its visible subtree, returning how many rows were pushed.
fn flatten_into<T>(
    node: &RowRef<T>,
    expand: &ExpandState,
    level: usize,
    default_expand: bool,
    out: &mut Vec<PhysicalRow<T>>,
) -> usize {
    let children = node.children();
    let expandable = !children.is_empty();
    let expanded = expandable && expand.resolve(node.key(), default_expand);

    let index = out.len();
    out.push(PhysicalRow {
        row: node.clone(),
        level,
        expandable,
        expanded,
        num_children: 0,
    });

    if expanded {
        let mut appended = 0;
        for child in children.iter() {
            appended += flatten_into(child, expand, level + 1, default_expand, out);
        }
        out[index].num_children = appended;
    }

    1 + out[index].num_children
}
