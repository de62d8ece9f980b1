//! Rebuild nested parameter trees from flat form submissions.
//!
//! Form-style sources submit one value per control under compound keys:
//! `qam.order_exp[1]`, `quantizer.choice`, ... [`explode`] turns such a flat
//! mapping back into a tree of mappings and sequences.
//!
//! Rules, applied level by level:
//! - a key with a dot is split once into `head` and `rest`; `rest` is grouped
//!   under `head` and resolved recursively,
//! - a key of the form `name[index]` (word characters, decimal index) is
//!   grouped under `name` with an integer key,
//! - anything else is kept verbatim.
//!
//! A group whose members are all indexed and include index `0` becomes a
//! sequence ordered by index. Any other group stays a mapping (so `a[2]` alone
//! yields `{a: {2: ..}}`, and `a[0]` next to `a.b` yields `{a: {0: .., b: ..}}`).
//!
//! Indices are ASCII decimal digits only; names may use any Unicode word
//! characters.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{DemoError, DemoResult};

/// A mapping key: either a name or an integer index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Index(i64),
    Name(String),
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Name(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Name(s)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Index(i)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(s) => f.write_str(s),
        }
    }
}

/// One node of an exploded tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested<V> {
    Leaf(V),
    Map(Tree<V>),
    Seq(Vec<Nested<V>>),
}

pub type Tree<V> = BTreeMap<Key, Nested<V>>;

/// Explode a flat mapping with compound keys into a nested tree.
///
/// Never fails: keys that look compound but do not match the patterns are
/// kept as plain keys. When a plain key and a compound key share a head, the
/// entry seen last wins.
pub fn explode<K, V, I>(flat: I) -> Tree<V>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<Key>,
{
    let mut leaves: BTreeMap<Key, V> = BTreeMap::new();
    let mut groups: BTreeMap<Key, Vec<(Key, V)>> = BTreeMap::new();

    for (key, value) in flat {
        let (slot, member) = match key.into() {
            Key::Name(name) => {
                if let Some((head, rest)) = name.split_once('.') {
                    (Key::from(head), Key::from(rest))
                } else if let Some((base, index)) = split_indexed(&name) {
                    (Key::from(base), Key::Index(index))
                } else {
                    groups.remove(&Key::Name(name.clone()));
                    leaves.insert(Key::Name(name), value);
                    continue;
                }
            }
            index @ Key::Index(_) => {
                groups.remove(&index);
                leaves.insert(index, value);
                continue;
            }
        };
        leaves.remove(&slot);
        groups.entry(slot).or_default().push((member, value));
    }

    let mut tree: Tree<V> = leaves
        .into_iter()
        .map(|(k, v)| (k, Nested::Leaf(v)))
        .collect();
    for (key, members) in groups {
        tree.insert(key, resolve_group(members));
    }
    tree
}

/// Like [`explode`], but rejects keys whose intent is ambiguous.
///
/// Rejected: empty path segments, brackets that are not `name[digits]`,
/// brackets before the last dot, index sets with gaps, a path that is both a
/// value and a group, and a group mixing indexed and dotted members.
pub fn explode_strict<K, V, I>(flat: I) -> DemoResult<Tree<V>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<Key>,
{
    let entries: Vec<(Key, V)> = flat.into_iter().map(|(k, v)| (k.into(), v)).collect();
    validate_keys(entries.iter().map(|(k, _)| k))?;
    Ok(explode(entries))
}

fn resolve_group<V>(members: Vec<(Key, V)>) -> Nested<V> {
    let all_indexed = members.iter().all(|(k, _)| matches!(k, Key::Index(_)));
    if all_indexed && members.iter().any(|(k, _)| *k == Key::Index(0)) {
        // Contiguity is assumed here; explode_strict checks it.
        let mut indexed: BTreeMap<i64, V> = BTreeMap::new();
        for (key, value) in members {
            if let Key::Index(i) = key {
                indexed.insert(i, value);
            }
        }
        Nested::Seq(indexed.into_values().map(Nested::Leaf).collect())
    } else {
        Nested::Map(explode(members))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn has_bracket(s: &str) -> bool {
    s.contains('[') || s.contains(']')
}

/// `name[12]` -> `("name", 12)`. The index must be ASCII decimal digits.
fn split_indexed(key: &str) -> Option<(&str, i64)> {
    let inner = key.strip_suffix(']')?;
    let (name, digits) = inner.split_once('[')?;
    if name.is_empty() || !name.chars().all(is_word_char) {
        return None;
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse().ok()?;
    Some((name, index))
}

fn validate_keys<'a>(keys: impl Iterator<Item = &'a Key>) -> DemoResult<()> {
    type Path = Vec<String>;

    let mut leaves: BTreeSet<Path> = BTreeSet::new();
    let mut dotted_parents: BTreeSet<Path> = BTreeSet::new();
    let mut indexed: BTreeMap<Path, (String, BTreeSet<i64>)> = BTreeMap::new();

    for key in keys {
        let Key::Name(name) = key else { continue };

        let segments: Vec<&str> = name.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(DemoError::malformed(name.clone(), "empty path segment"));
        }
        let Some((last, prefix)) = segments.split_last() else {
            continue;
        };
        if prefix.iter().any(|s| has_bracket(s)) {
            return Err(DemoError::malformed(
                name.clone(),
                "index brackets are only allowed in the last path segment",
            ));
        }

        let mut path: Path = Vec::with_capacity(segments.len());
        for seg in prefix {
            path.push(seg.to_string());
            dotted_parents.insert(path.clone());
        }

        if let Some((base, index)) = split_indexed(last) {
            path.push(base.to_string());
            indexed
                .entry(path)
                .or_insert_with(|| (name.clone(), BTreeSet::new()))
                .1
                .insert(index);
        } else if has_bracket(last) {
            return Err(DemoError::malformed(
                name.clone(),
                "brackets must hold a decimal index after a word name",
            ));
        } else {
            path.push(last.to_string());
            leaves.insert(path);
        }
    }

    for path in &leaves {
        if dotted_parents.contains(path) || indexed.contains_key(path) {
            return Err(DemoError::malformed(
                path.join("."),
                "path is used both as a value and as a group",
            ));
        }
    }

    for (path, (key, indices)) in &indexed {
        if dotted_parents.contains(path) {
            return Err(DemoError::malformed(
                key.clone(),
                "group mixes indexed and dotted members",
            ));
        }
        if indices.iter().copied().ne(0..indices.len() as i64) {
            return Err(DemoError::malformed(
                key.clone(),
                "indices are not contiguous from 0",
            ));
        }
    }

    Ok(())
}

impl<V: Into<Value>> Nested<V> {
    /// Convert to JSON. Integer map keys become decimal strings.
    pub fn into_json(self) -> Value {
        match self {
            Nested::Leaf(v) => v.into(),
            Nested::Map(tree) => tree_into_json(tree),
            Nested::Seq(items) => Value::Array(items.into_iter().map(Nested::into_json).collect()),
        }
    }
}

pub fn tree_into_json<V: Into<Value>>(tree: Tree<V>) -> Value {
    let mut map = Map::with_capacity(tree.len());
    for (key, node) in tree {
        map.insert(key.to_string(), node.into_json());
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(v: i32) -> Nested<i32> {
        Nested::Leaf(v)
    }

    #[test]
    fn empty_input_yields_empty_mapping() {
        let tree = explode(Vec::<(&str, i32)>::new());
        assert!(tree.is_empty());
    }

    #[test]
    fn contiguous_indices_become_a_sequence() {
        let tree = explode([("a[0]", 1), ("a[1]", 2)]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[&Key::from("a")], Nested::Seq(vec![leaf(1), leaf(2)]));
    }

    #[test]
    fn sequence_follows_index_order_not_submission_order() {
        let tree = explode([("a[2]", 30), ("a[0]", 10), ("a[1]", 20)]);
        assert_eq!(
            tree[&Key::from("a")],
            Nested::Seq(vec![leaf(10), leaf(20), leaf(30)])
        );
    }

    #[test]
    fn dotted_keys_nest() {
        let tree = explode([("a.b", 1), ("a.c", 2)]);
        let mut inner = Tree::new();
        inner.insert(Key::from("b"), leaf(1));
        inner.insert(Key::from("c"), leaf(2));
        assert_eq!(tree[&Key::from("a")], Nested::Map(inner));
    }

    #[test]
    fn missing_zero_index_stays_a_sparse_mapping() {
        let tree = explode([("a[2]", 9)]);
        let mut inner = Tree::new();
        inner.insert(Key::Index(2), leaf(9));
        assert_eq!(tree[&Key::from("a")], Nested::Map(inner));
    }

    #[test]
    fn indexed_keys_resolve_below_dotted_heads() {
        let tree = explode([("qam.order_exp[0]", 1), ("qam.order_exp[1]", 3), ("qam.phase", 0)]);
        let json = tree_into_json(tree);
        assert_eq!(json, json!({"qam": {"order_exp": [1, 3], "phase": 0}}));
    }

    #[test]
    fn dot_split_takes_precedence_over_index() {
        let tree = explode([("a[0].b", 5)]);
        let json = tree_into_json(tree);
        assert_eq!(json, json!({"a[0]": {"b": 5}}));
    }

    #[test]
    fn unmatched_bracket_patterns_are_plain_keys() {
        let tree = explode([("a[x]", 1), ("b[]", 2), ("[3]", 3), ("c[1", 4)]);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree[&Key::from("a[x]")], leaf(1));
        assert_eq!(tree[&Key::from("b[]")], leaf(2));
        assert_eq!(tree[&Key::from("[3]")], leaf(3));
        assert_eq!(tree[&Key::from("c[1")], leaf(4));
    }

    #[test]
    fn integer_keys_bypass_pattern_matching() {
        let tree = explode([(Key::Index(4), 1), (Key::from("x"), 2)]);
        assert_eq!(tree[&Key::Index(4)], leaf(1));
        assert_eq!(tree[&Key::from("x")], leaf(2));
    }

    #[test]
    fn later_entry_wins_between_plain_and_compound() {
        let tree = explode([("a", 1), ("a.b", 2)]);
        assert!(matches!(tree[&Key::from("a")], Nested::Map(_)));

        let tree = explode([("a.b", 2), ("a", 1)]);
        assert_eq!(tree[&Key::from("a")], leaf(1));
    }

    #[test]
    fn indexed_and_dotted_members_share_a_mapping() {
        let tree = explode([("a[0]", 1), ("a.b", 2)]);
        let mut expected = Tree::new();
        expected.insert(Key::Index(0), leaf(1));
        expected.insert(Key::from("b"), leaf(2));
        assert_eq!(tree[&Key::from("a")], Nested::Map(expected));
        assert_eq!(tree_into_json(tree), json!({"a": {"0": 1, "b": 2}}));
    }

    #[test]
    fn non_ascii_digits_are_not_indices() {
        let key = "a[\u{0663}]";
        let tree = explode([(key, 1)]);
        assert_eq!(tree[&Key::from(key)], leaf(1));
    }

    #[test]
    fn index_overflow_falls_back_to_plain_key() {
        let key = "a[99999999999999999999999]";
        let tree = explode([(key, 1)]);
        assert_eq!(tree[&Key::from(key)], leaf(1));
    }

    #[test]
    fn json_conversion_stringifies_sparse_indices() {
        let tree = explode([("a[3]", json!("x"))]);
        assert_eq!(tree_into_json(tree), json!({"a": {"3": "x"}}));
    }

    #[test]
    fn strict_accepts_well_formed_keys() {
        let tree = explode_strict([("a[0]", 1), ("a[1]", 2), ("b.c", 3)]).unwrap();
        assert_eq!(tree, explode([("a[0]", 1), ("a[1]", 2), ("b.c", 3)]));
    }

    #[test]
    fn strict_rejects_gaps() {
        let err = explode_strict([("a[0]", 1), ("a[2]", 2)]).unwrap_err();
        assert!(matches!(err, DemoError::MalformedKey { .. }));

        let err = explode_strict([("a[2]", 9)]).unwrap_err();
        assert!(err.to_string().contains("contiguous"));
    }

    #[test]
    fn strict_rejects_malformed_shapes() {
        for key in ["a..b", ".a", "a.", "a[x]", "a[0].b", "c[1"] {
            let res = explode_strict([(key, 1)]);
            assert!(res.is_err(), "expected {key} to be rejected");
        }
    }

    #[test]
    fn strict_rejects_conflicting_usage() {
        assert!(explode_strict([("a", 1), ("a.b", 2)]).is_err());
        assert!(explode_strict([("a", 1), ("a[0]", 2)]).is_err());
        assert!(explode_strict([("a[0]", 1), ("a.b", 2)]).is_err());
    }
}
