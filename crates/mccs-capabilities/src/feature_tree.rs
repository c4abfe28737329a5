use core::fmt;
use std::collections::{HashMap, hash_map::Entry};

/// A group from a parsed capability string.
///
/// Every key is either a bare token, which has no child, or the name of a
/// parenthesized group, which owns the child tree parsed from that group.
/// Key enumeration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureTree {
    members: HashMap<String, Option<FeatureTree>>,
}

impl FeatureTree {
    /// Creates a tree with no members.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member. The first insertion of a key wins, later duplicates are
    /// dropped and `false` is returned.
    pub fn insert<S: Into<String>>(&mut self, key: S, child: Option<Self>) -> bool {
        match self.members.entry(key.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(child);
                true
            }
        }
    }

    /// Returns whether the key is a member, as a bare token or as a group.
    pub fn has(&self, key: &str) -> bool {
        self.members.contains_key(key)
    }

    /// Returns the group attached to a key.
    ///
    /// `None` if the key is missing or is a bare token.
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.members.get(key).and_then(Option::as_ref)
    }

    /// Follows a chain of keys from this tree, e.g. `["vcp", "60"]`.
    pub fn path(&self, keys: &[&str]) -> Option<&Self> {
        keys.iter().try_fold(self, |tree, key| tree.get(key))
    }

    /// The member keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the tree has no members, as parsed from `()`.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Parenthesis nesting depth of this tree, a tree with only bare tokens has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .members
            .values()
            .flatten()
            .map(Self::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Serializes the structure back into capability string form with keys sorted.
/// Whitespace runs from the source are not preserved.
impl fmt::Display for FeatureTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.members.keys().collect();
        keys.sort();

        f.write_str("(")?;
        for (index, key) in keys.into_iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            f.write_str(key)?;

            if let Some(Some(child)) = self.members.get(key) {
                write!(f, "{child}")?;
            }
        }
        f.write_str(")")
    }
}
