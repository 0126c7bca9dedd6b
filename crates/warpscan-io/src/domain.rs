//! Domain types for warpscan-io.

use warpscan_dtw::Sequence;

/// Identifier of one named sequence (for example a project id).
///
/// Written verbatim to the `Project1`/`Project2` output columns, so it must
/// be stable across runs for results to join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceKey(String);

impl SequenceKey {
    /// Create a key from any string-like value.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Return the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SequenceKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// An ordered collection of named sequences.
///
/// Slot `i` holds exactly one `(key, sequence)` pair. The slot index fixes
/// the pairwise enumeration order; the key carries the sequence's identity
/// into the output. Shared read-only across batch workers.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    slots: Vec<(SequenceKey, Sequence)>,
}

impl Dataset {
    /// Create a dataset from slots in enumeration order.
    #[must_use]
    pub fn new(slots: Vec<(SequenceKey, Sequence)>) -> Self {
        Self { slots }
    }

    /// Return the number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Return true if the dataset has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Return the key and sequence in slot `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<(&SequenceKey, &Sequence)> {
        self.slots.get(index).map(|(k, s)| (k, s))
    }

    /// Return the slot index holding `key`, if any.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.slots.iter().position(|(k, _)| k.as_str() == key)
    }

    /// Iterate slots in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (&SequenceKey, &Sequence)> + '_ {
        self.slots.iter().map(|(k, s)| (k, s))
    }

    /// Number of unordered pairs `(i, j)`, `i < j`.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        let n = self.slots.len();
        n * n.saturating_sub(1) / 2
    }
}
