//! Obliviously-indexed record table.
//!
//! `scatter` takes N equal-sized limb records and lays them out column-major
//! (limb index major, record slot minor) under a seed-derived permutation of
//! the physical slots. `gather` reconstructs one record by scanning every
//! slot of every column and accumulating under a constant-time mask, so the
//! sequence of addresses it touches is the same for every requested index —
//! the index only steers the mask. The permutation keeps the physical home
//! of a logical record unlinkable across tables built with different seeds.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::seed::expand_seed;

pub(crate) struct ProtMemory {
    /// Interleaved storage: limb w of slot s lives at `data[w * nr + s]`.
    data: Vec<u64>,
    /// Logical record index stored in each physical slot.
    order: Vec<u8>,
    nr: usize,
    words_per_record: usize,
}

impl ProtMemory {
    /// Build a table from equal-length records. At most 256 records; the
    /// ladders use 16 and 32.
    pub(crate) fn scatter(records: &[&[u64]], seed: u64) -> ProtMemory {
        let nr = records.len();
        debug_assert!(nr > 0 && nr <= 256);
        let words_per_record = records[0].len();
        debug_assert!(records.iter().all(|r| r.len() == words_per_record));

        // Fisher-Yates over the slot contents, driven by the seed stream.
        let mut order: Vec<u8> = (0..nr as u16).map(|i| i as u8).collect();
        let mut stream = vec![0u8; 2 * nr];
        expand_seed(seed, &mut stream);
        for i in (1..nr).rev() {
            let r = u16::from_le_bytes([stream[2 * i], stream[2 * i + 1]]) as usize;
            order.swap(i, r % (i + 1));
        }

        let mut data = vec![0u64; nr * words_per_record];
        for (slot, &logical) in order.iter().enumerate() {
            let record = records[logical as usize];
            for (w, &limb) in record.iter().enumerate() {
                data[w * nr + slot] = limb;
            }
        }

        ProtMemory {
            data,
            order,
            nr,
            words_per_record,
        }
    }

    /// Copy logical record `index` into `out`, touching every slot.
    pub(crate) fn gather(&self, out: &mut [u64], index: usize) {
        debug_assert!(index < self.nr);
        let idx = index as u8;
        let out = &mut out[..self.words_per_record];
        out.fill(0);
        for slot in 0..self.nr {
            let hit: Choice = self.order[slot].ct_eq(&idx);
            let mask = u64::conditional_select(&0, &u64::MAX, hit);
            for (w, limb) in out.iter_mut().enumerate() {
                *limb |= self.data[w * self.nr + slot] & mask;
            }
        }
    }
}
