//! Named cell zones assigned per block.
//!
//! Zone ids are handed out in first-seen order starting at 0 and stored in an
//! explicitly ordered list, so ids are stable across runs on identical input.

use crate::block::BlockDefinition;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A named group of cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellZone {
    pub name: String,
    pub id: usize,
    /// Ascending global cell indices.
    pub cells: Vec<usize>,
}

/// Incremental zone builder fed in block order.
#[derive(Clone, Debug, Default)]
pub struct ZoneTagger {
    zones: Vec<CellZone>,
    ids: HashMap<String, usize>,
}

impl ZoneTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zone id for `name`, allocating the next free id on first use.
    pub fn zone_id(&mut self, name: &str) -> usize {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.zones.len();
        log::info!("    {id}\t{name}");
        self.ids.insert(name.to_string(), id);
        self.zones.push(CellZone {
            name: name.to_string(),
            id,
            cells: Vec::new(),
        });
        id
    }

    /// Append a block's global cell range to its zone; unnamed or empty names
    /// contribute nothing.
    pub fn tag_block(&mut self, zone: Option<&str>, cells: Range<usize>) {
        let Some(name) = zone.filter(|n| !n.is_empty()) else {
            return;
        };
        let id = self.zone_id(name);
        self.zones[id].cells.extend(cells);
    }

    /// Zones in id order.
    pub fn finish(self) -> Vec<CellZone> {
        self.zones
    }
}

/// Tag zones for blocks whose cells are numbered consecutively in block order.
pub fn tag_zones(blocks: &[BlockDefinition]) -> Vec<CellZone> {
    let mut tagger = ZoneTagger::new();
    let mut start = 0;
    for block in blocks {
        let end = start + block.n_cells();
        tagger.tag_block(block.zone.as_deref(), start..end);
        start = end;
    }
    tagger.finish()
}

/// Cells of the zone called `name`.
pub fn cell_selection<'a>(zones: &'a [CellZone], name: &str) -> Option<&'a [usize]> {
    zones
        .iter()
        .find(|z| z.name == name)
        .map(|z| z.cells.as_slice())
}
