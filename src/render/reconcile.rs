//! Positional reconciliation of a freshly parsed node list against the live
//! children of the managed region.
//!
//! Nodes are matched by position only. There is no key-based matching, so
//! inserting an item near the front of a list replaces every node after it.

use crate::dom::Node;

/// What one patch did to the live region.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PatchSummary {
    /// The region's children were swapped wholesale (first render).
    pub wholesale: bool,
    /// Live nodes left untouched because they equal the new node.
    pub kept: usize,
    /// Live nodes replaced by a clone of the new node.
    pub replaced: usize,
    /// New nodes added past the end of the live list.
    pub appended: usize,
    /// Live nodes removed past the end of the new list.
    pub pruned: usize,
}

impl PatchSummary {
    /// True when the live region was not modified.
    pub fn is_noop(&self) -> bool {
        !self.wholesale && self.replaced == 0 && self.appended == 0 && self.pruned == 0
    }
}

/// Installs `nodes` as the region's children without comparing anything.
pub(crate) fn replace_all(mount: &Node, nodes: &[Node]) -> PatchSummary {
    mount.replace_children(nodes.to_vec());
    PatchSummary {
        wholesale: true,
        appended: nodes.len(),
        ..PatchSummary::default()
    }
}

/// Patches the live children of `mount` toward `nodes`.
///
/// A live child structurally equal to the new node at its position is kept as
/// is, along with its live state and listeners. A different one is replaced
/// by a clone of the new node. With `prune`, live children beyond the new
/// list's length are removed; without it they stay in place.
pub(crate) fn patch(mount: &Node, nodes: &[Node], prune: bool) -> PatchSummary {
    let mut summary = PatchSummary::default();

    for (index, node) in nodes.iter().enumerate() {
        match mount.child_at(index) {
            Some(live) if live.is_equal_node(node) => summary.kept += 1,
            Some(_) => {
                mount.replace_child_at(index, node.clone_node());
                summary.replaced += 1;
            }
            None => {
                mount.append_child(node.clone_node());
                summary.appended += 1;
            }
        }
    }

    if prune {
        summary.pruned = mount.truncate_children(nodes.len()).len();
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment;

    fn mount(markup: &str) -> Node {
        let mount = Node::element("div");
        mount.replace_children(parse_fragment(markup));
        mount
    }

    #[test]
    fn test_only_changed_positions_are_replaced() {
        let live = mount("<p>A</p><p>B</p><p>C</p>");
        let before = live.children();

        let summary = patch(&live, &parse_fragment("<p>A</p><p>X</p><p>C</p>"), true);
        assert_eq!(summary.kept, 2);
        assert_eq!(summary.replaced, 1);

        let after = live.children();
        assert!(after[0].ptr_eq(&before[0]));
        assert!(!after[1].ptr_eq(&before[1]));
        assert!(after[2].ptr_eq(&before[2]));
        assert_eq!(live.inner_html(), "<p>A</p><p>X</p><p>C</p>");
    }

    #[test]
    fn test_longer_list_appends() {
        let live = mount("<p>A</p>");
        let summary = patch(&live, &parse_fragment("<p>A</p><p>B</p>"), true);
        assert_eq!(summary.appended, 1);
        assert_eq!(live.inner_html(), "<p>A</p><p>B</p>");
    }

    #[test]
    fn test_shorter_list_prunes_only_when_asked() {
        let live = mount("<p>A</p><p>B</p>");
        let summary = patch(&live, &parse_fragment("<p>A</p>"), false);
        assert_eq!(summary.pruned, 0);
        assert!(summary.is_noop());
        assert_eq!(live.inner_html(), "<p>A</p><p>B</p>");

        let summary = patch(&live, &parse_fragment("<p>A</p>"), true);
        assert_eq!(summary.pruned, 1);
        assert_eq!(live.inner_html(), "<p>A</p>");
    }

    #[test]
    fn test_new_nodes_are_cloned_into_place() {
        let live = mount("<p>A</p>");
        let fresh = parse_fragment("<p>B</p>");
        patch(&live, &fresh, true);
        assert!(!live.children()[0].ptr_eq(&fresh[0]));
    }

    #[test]
    fn test_replace_all_reuses_nothing_from_before() {
        let live = mount("<span>template</span>");
        let old = live.children();
        let fresh = parse_fragment("<p>A</p><p>B</p>");

        let summary = replace_all(&live, &fresh);
        assert!(summary.wholesale);
        assert_eq!(summary.appended, 2);
        assert!(live.children().iter().all(|n| !n.ptr_eq(&old[0])));
    }
}
