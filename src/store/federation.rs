//! Federations of stores.

use std::fmt;

use super::Store;

/// A named, ordered list of stores queried together. Pattern evaluation
/// visits every member and merges the per-member tables; described triples
/// are deduplicated across members.
#[derive(Default)]
pub struct Federation {
    name: String,
    stores: Vec<Box<dyn Store>>,
}

impl Federation {
    pub fn new(name: &str) -> Self {
        Federation {
            name: name.to_string(),
            stores: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_store(&mut self, store: Box<dyn Store>) -> &mut Self {
        self.stores.push(store);
        self
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Member stores, in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Store> {
        self.stores.iter().map(|s| &**s)
    }
}

impl fmt::Debug for Federation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Federation")
            .field("name", &self.name)
            .field("stores", &self.stores.len())
            .finish()
    }
}
