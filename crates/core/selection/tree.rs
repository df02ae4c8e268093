//! Prefix grouping of a result set.
//!
//! Codes are grouped by their first 1, 2, 3 and 4 characters, and finally by
//! the full code, giving five levels of descent. A leaf holds every record
//! with that exact code (a table may list a code more than once).

use serde::Serialize;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use zipscope_types::record::{ZipCode, ZipRecord};

/// Number of prefix levels above the full-code leaves.
pub const GROUP_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixNode {
    /// Children keyed by the one-character-longer prefix.
    Group(BTreeMap<String, PrefixNode>),
    /// Records sharing one full code, in input order.
    Leaf(Vec<ZipRecord>),
}

impl PrefixNode {
    fn collect_records<'a>(&'a self, out: &mut Vec<&'a ZipRecord>) {
        match self {
            PrefixNode::Group(children) => {
                for child in children.values() {
                    child.collect_records(out);
                }
            }
            PrefixNode::Leaf(records) => out.extend(records.iter()),
        }
    }

    /// All records below this node, ordered by code.
    pub fn records(&self) -> Vec<&ZipRecord> {
        let mut out = Vec::new();
        self.collect_records(&mut out);
        out
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, PrefixNode::Leaf(_))
    }
}

/// One checkbox row of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixControl {
    pub prefix: String,
    /// 0 for single-character prefixes, 4 for full codes.
    pub depth: usize,
    pub is_leaf: bool,
}

/// The five-level prefix tree of a result set.
///
/// # Examples
///
/// ```
/// use zipscope::selection::PrefixTree;
/// use zipscope_types::record::{ZipCode, ZipRecord};
///
/// let records = vec![
///     ZipRecord::new(ZipCode::normalize("08001", 5).unwrap(), 48.0, 11.0),
///     ZipRecord::new(ZipCode::normalize("08002", 5).unwrap(), 48.01, 11.0),
/// ];
/// let tree = PrefixTree::build(&records);
///
/// assert_eq!(tree.codes_under("0800").len(), 2);
/// assert!(tree.node("08001").unwrap().is_leaf());
/// assert_eq!(PrefixTree::label("08"), "08XX");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrefixTree {
    roots: BTreeMap<String, PrefixNode>,
    len: usize,
}

fn group_keys(code: &ZipCode) -> SmallVec<[&str; GROUP_DEPTH]> {
    (1..=GROUP_DEPTH).map(|depth| code.prefix(depth)).collect()
}

impl PrefixTree {
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ZipRecord>,
    {
        let mut tree = Self::default();
        for record in records {
            tree.insert(record.clone());
        }
        tree
    }

    fn insert(&mut self, record: ZipRecord) {
        let code = record.code.clone();

        let mut children = &mut self.roots;
        for key in group_keys(&code) {
            let node = children
                .entry(key.to_string())
                .or_insert_with(|| PrefixNode::Group(BTreeMap::new()));
            // Group levels only ever hold groups; leaves live one level below.
            let PrefixNode::Group(next) = node else {
                log::warn!("prefix {} of code {} is not a group", key, code);
                return;
            };
            children = next;
        }

        let leaf = children
            .entry(code.as_str().to_string())
            .or_insert_with(|| PrefixNode::Leaf(Vec::new()));
        if let PrefixNode::Leaf(records) = leaf {
            records.push(record);
            self.len += 1;
        }
    }

    /// Top-level groups keyed by single-character prefix.
    pub fn roots(&self) -> &BTreeMap<String, PrefixNode> {
        &self.roots
    }

    /// Number of records in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every record in the tree, ordered by code, then input order.
    pub fn records(&self) -> Vec<&ZipRecord> {
        let mut out = Vec::with_capacity(self.len);
        for node in self.roots.values() {
            node.collect_records(&mut out);
        }
        out
    }

    /// The node for a group prefix (1 to 4 characters) or a full code.
    pub fn node(&self, prefix: &str) -> Option<&PrefixNode> {
        if prefix.is_empty() || !prefix.is_ascii() {
            return None;
        }

        let mut children = &self.roots;
        for depth in 1..=GROUP_DEPTH.min(prefix.len()) {
            let node = children.get(&prefix[..depth])?;
            if depth == prefix.len() {
                return Some(node);
            }
            match node {
                PrefixNode::Group(next) => children = next,
                PrefixNode::Leaf(_) => return None,
            }
        }
        children.get(prefix)
    }

    /// Distinct codes below `prefix`, ordered by code.
    pub fn codes_under(&self, prefix: &str) -> Vec<&ZipCode> {
        let mut codes: Vec<&ZipCode> = self
            .node(prefix)
            .map(|node| node.records().into_iter().map(|r| &r.code).collect())
            .unwrap_or_default();
        codes.dedup();
        codes
    }

    /// Every checkbox row, depth first, in display order.
    pub fn controls(&self) -> Vec<PrefixControl> {
        fn walk(
            children: &BTreeMap<String, PrefixNode>,
            depth: usize,
            out: &mut Vec<PrefixControl>,
        ) {
            for (prefix, node) in children {
                out.push(PrefixControl {
                    prefix: prefix.clone(),
                    depth,
                    is_leaf: node.is_leaf(),
                });
                if let PrefixNode::Group(next) = node {
                    walk(next, depth + 1, out);
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.roots, 0, &mut out);
        out
    }

    /// Display label of a group: the prefix padded with `X` to four
    /// characters. Full codes are shown as-is.
    pub fn label(prefix: &str) -> String {
        let missing = GROUP_DEPTH.saturating_sub(prefix.len());
        format!("{}{}", prefix, "X".repeat(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, lat: f64) -> ZipRecord {
        ZipRecord::new(ZipCode::normalize(code, 5).unwrap(), lat, 11.0)
    }

    fn sample() -> Vec<ZipRecord> {
        vec![
            record("50667", 1.0),
            record("08002", 2.0),
            record("08001", 3.0),
            record("10115", 4.0),
            record("08001", 5.0),
            record("10117", 6.0),
        ]
    }

    #[test]
    fn test_flatten_reproduces_input() {
        let input = sample();
        let tree = PrefixTree::build(&input);
        assert_eq!(tree.len(), input.len());

        let mut flattened: Vec<ZipRecord> = tree.records().into_iter().cloned().collect();
        let mut expected = input.clone();
        let key = |r: &ZipRecord| (r.code.clone(), r.lat.to_bits());
        flattened.sort_by_key(key);
        expected.sort_by_key(key);
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_five_levels_of_descent() {
        let tree = PrefixTree::build(&sample());
        let mut node = tree.roots().get("0").unwrap();
        for key in ["08", "080", "0800"] {
            match node {
                PrefixNode::Group(children) => node = children.get(key).unwrap(),
                PrefixNode::Leaf(_) => panic!("leaf above {}", key),
            }
        }
        match node {
            PrefixNode::Group(children) => {
                assert_eq!(children.keys().collect::<Vec<_>>(), vec!["08001", "08002"]);
                assert!(children.values().all(PrefixNode::is_leaf));
            }
            PrefixNode::Leaf(_) => panic!("0800 should be a group"),
        }
    }

    #[test]
    fn test_leaf_keeps_input_order() {
        let tree = PrefixTree::build(&sample());
        match tree.node("08001").unwrap() {
            PrefixNode::Leaf(records) => {
                let lats: Vec<f64> = records.iter().map(|r| r.lat).collect();
                assert_eq!(lats, vec![3.0, 5.0]);
            }
            PrefixNode::Group(_) => panic!("expected leaf"),
        }
    }

    #[test]
    fn test_shape_independent_of_insertion_order() {
        let forward = sample();
        let mut reversed = sample();
        reversed.reverse();

        let a = PrefixTree::build(&forward);
        let b = PrefixTree::build(&reversed);
        assert_eq!(a.controls(), b.controls());
        assert_eq!(a, PrefixTree::build(&forward));
    }

    #[test]
    fn test_node_lookup() {
        let tree = PrefixTree::build(&sample());
        assert!(tree.node("1").is_some());
        assert!(tree.node("1011").is_some());
        assert!(tree.node("10115").unwrap().is_leaf());
        assert!(tree.node("2").is_none());
        assert!(tree.node("").is_none());
        assert!(tree.node("101159").is_none());
    }

    #[test]
    fn test_codes_under_dedups() {
        let tree = PrefixTree::build(&sample());
        let codes: Vec<&str> = tree.codes_under("08").iter().map(|c| c.as_str()).collect();
        assert_eq!(codes, vec!["08001", "08002"]);
        assert!(tree.codes_under("9").is_empty());
    }

    #[test]
    fn test_controls_depths() {
        let tree = PrefixTree::build(&[record("50667", 0.0)]);
        let controls: Vec<(String, usize, bool)> = tree
            .controls()
            .into_iter()
            .map(|c| (c.prefix, c.depth, c.is_leaf))
            .collect();
        assert_eq!(
            controls,
            vec![
                ("5".to_string(), 0, false),
                ("50".to_string(), 1, false),
                ("506".to_string(), 2, false),
                ("5066".to_string(), 3, false),
                ("50667".to_string(), 4, true),
            ]
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(PrefixTree::label("5"), "5XXX");
        assert_eq!(PrefixTree::label("506"), "506X");
        assert_eq!(PrefixTree::label("5066"), "5066");
        assert_eq!(PrefixTree::label("50667"), "50667");
    }

    #[test]
    fn test_empty_tree() {
        let tree = PrefixTree::build(&[]);
        assert!(tree.is_empty());
        assert!(tree.controls().is_empty());
        assert!(tree.records().is_empty());
    }
}
