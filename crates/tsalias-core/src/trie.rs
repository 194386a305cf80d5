//! Character prefix tree.
//!
//! Each node owns its children outright, keyed by the next character. A node's
//! `data` slot holds the value whose key ends exactly at that node. The trie is
//! built once and then only read, so it can be shared across tasks as-is.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct Trie<T> {
    children: FxHashMap<char, Trie<T>>,
    data: Option<T>,
}

impl<T> Default for Trie<T> {
    fn default() -> Self {
        Self {
            children: FxHashMap::default(),
            data: None,
        }
    }
}

impl<T> Trie<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `data` under `key`, replacing any previous value. Empty keys are ignored.
    pub fn add(&mut self, key: &str, data: T) {
        if key.is_empty() {
            return;
        }
        let mut node = self;
        for ch in key.chars() {
            node = node.children.entry(ch).or_default();
        }
        node.data = Some(data);
    }

    /// Value stored under the longest key that is a prefix of `name`.
    ///
    /// Walks one character at a time and stops at the first character with no
    /// matching child. The result is only a candidate: a key `b` is returned for
    /// `banana`, so callers re-check whether the match is acceptable.
    pub fn search(&self, name: &str) -> Option<&T> {
        let mut node = self;
        let mut best = None;
        for ch in name.chars() {
            match node.children.get(&ch) {
                Some(child) => {
                    node = child;
                    if let Some(data) = node.data.as_ref() {
                        best = Some(data);
                    }
                }
                None => break,
            }
        }
        best
    }

    /// Whether no key has been added.
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.children.is_empty()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        usize::from(self.data.is_some()) + self.children.values().map(Trie::len).sum::<usize>()
    }
}
