//! Two-tier transposition table.
//!
//! Each cluster holds a depth-preferred main entry and an always-replace
//! auxiliary entry, so deep results survive while fresh shallow results
//! still find a slot. Entries are 16 bytes: full hash, best move, value,
//! age (the move count of the recording position), depth, and a flags byte
//! packing the bound type and a PV bit.

use crate::types::{is_mate_value, Depth, Value, MATE, MAX_DEPTH};

/// Flags byte layout: bit 0 = PV node, bits 1-2 = bound type. The bound
/// encodings order EXACT < BETA < ALPHA so "at least as tight" is a simple
/// comparison.
pub const FLAG_PV: u8 = 0b001;
pub const BOUND_EXACT: u8 = 0b010;
pub const BOUND_BETA: u8 = 0b100;
pub const BOUND_ALPHA: u8 = 0b110;
const BOUND_MASK: u8 = 0b110;

#[derive(Debug, Clone, Copy, Default)]
pub struct TableEntry {
    pub hash: u64,
    pub mv: u16,
    pub value: Value,
    pub age: u16,
    pub depth: u8,
    pub flags: u8,
}

impl TableEntry {
    #[inline]
    pub fn is_pv(&self) -> bool {
        self.flags & FLAG_PV != 0
    }

    #[inline]
    pub fn bound(&self) -> u8 {
        self.flags & BOUND_MASK
    }
}

#[derive(Clone, Copy, Default)]
struct Cluster {
    main: TableEntry,
    aux: TableEntry,
}

pub struct TranspositionTable {
    clusters: Vec<Cluster>,
    root_age: u16,
}

impl TranspositionTable {
    /// Default allocation: 64 MiB.
    pub const DEFAULT_SIZE: usize = 64 * 1024 * 1024;

    pub fn new(bytes: usize) -> TranspositionTable {
        let count = (bytes / std::mem::size_of::<Cluster>()).max(1);
        TranspositionTable {
            clusters: vec![Cluster::default(); count],
            root_age: 0,
        }
    }

    pub fn with_default_size() -> TranspositionTable {
        TranspositionTable::new(TranspositionTable::DEFAULT_SIZE)
    }

    /// Stamps the age of the root position; entries recorded at or before it
    /// become replaceable.
    pub fn set_root_age(&mut self, age: u16) {
        self.root_age = age;
    }

    pub fn clear(&mut self) {
        self.clusters.fill(Cluster::default());
        self.root_age = 0;
    }

    /// Looks the position up; the main entry wins when both slots match.
    pub fn probe(&self, hash: u64) -> Option<TableEntry> {
        let cluster = &self.clusters[(hash % self.clusters.len() as u64) as usize];
        if cluster.main.hash == hash {
            Some(cluster.main)
        } else if cluster.aux.hash == hash {
            Some(cluster.aux)
        } else {
            None
        }
    }

    /// Records a search result. The main slot is taken when it is empty,
    /// aged, shallower, or matched at equal depth by an at-least-as-tight
    /// bound without losing PV status; otherwise the auxiliary slot is
    /// overwritten unconditionally.
    pub fn record(
        &mut self,
        flags: u8,
        hash: u64,
        mv: u16,
        mut value: Value,
        age: u16,
        depth: u8,
        ply: Depth,
    ) {
        // Store mate scores as distance from this node, not from the root,
        // so they stay valid wherever the position recurs.
        if is_mate_value(value) {
            if value > MATE - 2 * MAX_DEPTH as Value {
                value += ply as Value;
            } else {
                value -= ply as Value;
            }
        }

        let index = (hash % self.clusters.len() as u64) as usize;
        let cluster = &mut self.clusters[index];
        let main = &cluster.main;

        let replace_main = main.flags == 0
            || main.age <= self.root_age
            || depth > main.depth
            || (depth == main.depth
                && (flags & FLAG_PV) >= (main.flags & FLAG_PV)
                && (flags & BOUND_MASK) <= (main.flags & BOUND_MASK));

        let entry = TableEntry {
            hash,
            mv,
            value,
            age,
            depth,
            flags,
        };
        if replace_main {
            cluster.main = entry;
        } else if main.hash != hash {
            cluster.aux = entry;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> TranspositionTable {
        TranspositionTable::new(32 * 64)
    }

    #[test]
    fn store_and_probe() {
        let mut tt = small();
        tt.set_root_age(10);
        tt.record(BOUND_EXACT, 0x1234, 0xaa, 42, 11, 5, 0);

        let entry = tt.probe(0x1234).expect("entry stored");
        assert_eq!(entry.value, 42);
        assert_eq!(entry.depth, 5);
        assert_eq!(entry.mv, 0xaa);
        assert_eq!(entry.bound(), BOUND_EXACT);
        assert!(tt.probe(0x9999).is_none());
    }

    #[test]
    fn deeper_entry_survives_in_main() {
        let mut tt = TranspositionTable::new(32); // a single cluster
        tt.set_root_age(1);

        tt.record(BOUND_EXACT, 0x10, 1, 100, 5, 10, 0);
        // Shallower different position goes to the auxiliary slot.
        tt.record(BOUND_EXACT, 0x20, 2, 200, 5, 3, 0);

        let deep = tt.probe(0x10).expect("deep entry kept");
        assert_eq!(deep.depth, 10);
        let shallow = tt.probe(0x20).expect("shallow entry in aux");
        assert_eq!(shallow.depth, 3);

        // A third position displaces only the auxiliary slot.
        tt.record(BOUND_ALPHA, 0x30, 3, 300, 5, 4, 0);
        assert!(tt.probe(0x10).is_some());
        assert!(tt.probe(0x20).is_none());
        assert!(tt.probe(0x30).is_some());
    }

    #[test]
    fn aged_main_is_replaced() {
        let mut tt = TranspositionTable::new(32);
        tt.record(BOUND_EXACT, 0x10, 1, 100, 5, 10, 0);

        // Next game move: the old entry's age is now <= root age.
        tt.set_root_age(6);
        tt.record(BOUND_ALPHA, 0x20, 2, 200, 7, 2, 0);
        let entry = tt.probe(0x20).expect("aged main replaced");
        assert_eq!(entry.depth, 2);
    }

    #[test]
    fn equal_depth_bound_tightness() {
        let mut tt = TranspositionTable::new(32);
        tt.set_root_age(1);

        tt.record(BOUND_ALPHA, 0x10, 1, 100, 5, 6, 0);
        // Same position, same depth, tighter bound: replaces in place.
        tt.record(BOUND_EXACT, 0x10, 2, 150, 5, 6, 0);
        let entry = tt.probe(0x10).expect("entry");
        assert_eq!(entry.bound(), BOUND_EXACT);
        assert_eq!(entry.value, 150);

        // A looser bound at the same depth does not displace it, and does
        // not shadow it through the auxiliary slot either.
        tt.record(BOUND_BETA, 0x10, 3, 90, 5, 6, 0);
        let entry = tt.probe(0x10).expect("entry");
        assert_eq!(entry.bound(), BOUND_EXACT);
    }

    #[test]
    fn mate_values_are_ply_adjusted_on_store() {
        let mut tt = small();
        tt.set_root_age(0);
        // A mate found 3 plies below a node at ply 4: value MATE - 7.
        tt.record(BOUND_EXACT | FLAG_PV, 0x77, 0, MATE - 7, 1, 9, 4);
        let entry = tt.probe(0x77).expect("entry");
        // Stored relative to the node: MATE - 3.
        assert_eq!(entry.value, MATE - 3);

        tt.record(BOUND_EXACT | FLAG_PV, 0x78, 0, -MATE + 9, 1, 9, 4);
        let entry = tt.probe(0x78).expect("entry");
        assert_eq!(entry.value, -MATE + 5);
    }
}
