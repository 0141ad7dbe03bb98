//! Keyed accumulator storage.

use std::collections::HashMap;

/// Accumulators keyed by string, created on first observation.
///
/// Entries live in a vector in first-observation order and the map only holds
/// their index, so iteration is deterministic and a stable sort over
/// [`Bucket::iter`] breaks ties by arrival order.
#[derive(Debug, Clone)]
pub struct Bucket<A> {
    index: HashMap<String, usize>,
    entries: Vec<(String, A)>,
}

impl<A> Default for Bucket<A> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<A> Bucket<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator for `key`, created with `init` if this is the first sighting.
    pub fn get_or_create(&mut self, key: &str, init: impl FnOnce() -> A) -> &mut A {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.entries.push((key.to_string(), init()));
                self.index.insert(key.to_string(), slot);
                slot
            }
        };
        &mut self.entries[slot].1
    }

    pub fn get(&self, key: &str) -> Option<&A> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    /// Entries in first-observation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &A)> {
        self.entries.iter().map(|(key, acc)| (key.as_str(), acc))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
