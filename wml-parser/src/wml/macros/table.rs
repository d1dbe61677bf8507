//! Macro table
//!
//!     An arena of rows in insertion order plus a name index pointing into it.
//!     Redefinition appends a row; lookups return the most recently defined row for
//!     a name. `undef` leaves a hole in the arena, holes are compacted once they
//!     outnumber the live rows.

use super::definition::MacroDefinition;
use rustc_hash::FxHashMap;

const COMPACTION_FLOOR: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    rows: Vec<Option<MacroDefinition>>,
    index: FxHashMap<String, Vec<usize>>,
    live: usize,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, definition: MacroDefinition) {
        let position = self.rows.len();
        self.index
            .entry(definition.name.clone())
            .or_default()
            .push(position);
        self.rows.push(Some(definition));
        self.live += 1;
    }

    /// The most recent definition of `name`.
    pub fn lookup(&self, name: &str) -> Option<&MacroDefinition> {
        let position = *self.index.get(name)?.last()?;
        self.rows.get(position)?.as_ref()
    }

    /// Every definition of `name`, oldest first.
    pub fn lookup_all(&self, name: &str) -> Vec<&MacroDefinition> {
        self.index
            .get(name)
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|&p| self.rows.get(p).and_then(Option::as_ref))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Removes every row for `name`. Returns how many rows were removed.
    pub fn undef(&mut self, name: &str) -> usize {
        let Some(positions) = self.index.remove(name) else {
            return 0;
        };
        for &position in &positions {
            if let Some(slot) = self.rows.get_mut(position) {
                *slot = None;
            }
        }
        self.live -= positions.len();
        self.compact_if_sparse();
        positions.len()
    }

    /// All rows in insertion order. The iterator can be recreated at any time.
    pub fn rows(&self) -> impl Iterator<Item = &MacroDefinition> + '_ {
        self.rows.iter().filter_map(Option::as_ref)
    }

    /// Distinct names, in order of first definition.
    pub fn names(&self) -> Vec<&str> {
        let mut seen = rustc_hash::FxHashSet::default();
        self.rows()
            .filter(|d| seen.insert(d.name.as_str()))
            .map(|d| d.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.index.clear();
        self.live = 0;
    }

    fn compact_if_sparse(&mut self) {
        let holes = self.rows.len() - self.live;
        if holes < COMPACTION_FLOOR || holes < self.live {
            return;
        }
        let rows: Vec<MacroDefinition> = self.rows.drain(..).flatten().collect();
        self.index.clear();
        self.live = 0;
        for definition in rows {
            self.define(definition);
        }
    }
}

impl FromIterator<MacroDefinition> for MacroTable {
    fn from_iter<I: IntoIterator<Item = MacroDefinition>>(iter: I) -> Self {
        let mut table = MacroTable::new();
        for definition in iter {
            table.define(definition);
        }
        table
    }
}
