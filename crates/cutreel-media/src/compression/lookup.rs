//! Palette-lookup dictionary generation.
//!
//! Every tile references the subset of palette colors it uses; the
//! smaller the subset, the fewer bits each pixel needs in the bitstream.
//! At encode time all subsets ("keys") used across a video are packed
//! into one shared buffer so that tiles with overlapping subsets share
//! bytes: a window that holds a superset of a key's colors can serve the
//! key, and near-identical palettes nest inside each other. The result
//! maps every key to a start offset such that
//! `buffer[offset..offset + key.size()]` holds exactly the key's colors.
//!
//! The packing is a greedy heuristic over an NP-hard covering problem;
//! it is deterministic (ordered key sets), not optimal.

use super::{TileDelta, PIXELS_PER_TILE};
use std::collections::{BTreeMap, BTreeSet};

/// Set of palette colors one tile uses: a 256-bit set plus its cached
/// population count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TilePaletteKey {
    used_colors: [u64; 4],
    size: u16,
}

impl TilePaletteKey {
    /// Key over the distinct colors of one tile.
    pub fn from_tile(tile: &TileDelta) -> Self {
        let mut key = Self::default();
        for &color in tile {
            key.use_color(color);
        }
        key
    }

    /// Mark a color as used.
    pub fn use_color(&mut self, index: u8) {
        if !self.has_color(index) {
            self.used_colors[usize::from(index / 64)] |= 1 << (index % 64);
            self.size += 1;
        }
    }

    /// Whether the color is in the set.
    pub fn has_color(&self, index: u8) -> bool {
        self.used_colors[usize::from(index / 64)] & (1 << (index % 64)) != 0
    }

    /// Number of colors in the set.
    pub fn size(&self) -> usize {
        usize::from(self.size)
    }

    /// Whether `other`'s colors are all contained in this set.
    pub fn contains(&self, other: &Self) -> bool {
        self.used_colors
            .iter()
            .zip(other.used_colors.iter())
            .all(|(own, theirs)| !own & theirs == 0)
    }

    /// The colors of this set that are not in `other`.
    pub fn without(&self, other: &Self) -> Self {
        let mut result = Self::default();
        for (slot, (own, theirs)) in self
            .used_colors
            .iter()
            .zip(other.used_colors.iter())
            .enumerate()
        {
            let bits = own & !theirs;
            result.used_colors[slot] = bits;
            result.size += bits.count_ones() as u16;
        }
        result
    }

    /// The set's colors in ascending order.
    pub fn color_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.size());
        for color in 0..=u8::MAX {
            if self.has_color(color) {
                result.push(color);
            }
        }
        result
    }

    /// The set's colors with `prefix` first, then the rest ascending.
    ///
    /// `prefix` must only hold colors of this set; the result always has
    /// exactly `size()` bytes. This is how nested chains interleave: the
    /// nested key's bytes lead, the remainder follows, and every level
    /// of the chain stays recoverable from its own offset.
    fn joined_buffer(&self, prefix: &[u8]) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.size());
        let mut placed = Self::default();
        for &color in prefix {
            placed.use_color(color);
            result.push(color);
        }
        for color in 0..=u8::MAX {
            if self.has_color(color) && !placed.has_color(color) {
                result.push(color);
            }
        }
        result
    }
}

/// Result of finding one tile in a lookup: where its subset lives and
/// how its pixels pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLookup {
    /// Byte offset of the subset within the lookup buffer.
    pub offset: usize,
    /// The subset's colors, in buffer order.
    pub palette: Vec<u8>,
    /// Tile pixels as subset ranks, `ceil(log2(size))` bits per pixel,
    /// pixel 0 in the least significant bits.
    pub mask: u64,
}

/// Immutable palette-lookup dictionary: the shared buffer plus each
/// key's start offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PaletteLookup {
    buffer: Vec<u8>,
    starts: BTreeMap<TilePaletteKey, usize>,
}

impl PaletteLookup {
    /// Wrap a hand-supplied buffer without offset information.
    ///
    /// Lookups against such a dictionary fall back to materializing each
    /// key's own colors.
    pub fn with_buffer(buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            starts: BTreeMap::new(),
        }
    }

    /// The underlying shared buffer.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Recorded start offset for a key, if any.
    pub fn start_of(&self, key: &TilePaletteKey) -> Option<usize> {
        self.starts.get(key).copied()
    }

    /// Find a tile's subset and pack its pixels.
    pub fn lookup(&self, tile: &TileDelta) -> TileLookup {
        let key = TilePaletteKey::from_tile(tile);
        let (offset, palette) = match self.starts.get(&key) {
            Some(&start) => (start, self.buffer[start..start + key.size()].to_vec()),
            None => (0, key.color_bytes()),
        };

        let mut rank = [0u8; 256];
        for (index, &color) in palette.iter().enumerate() {
            rank[usize::from(color)] = index as u8;
        }
        let bit_size = bit_width(key.size().saturating_sub(1));
        let mut mask = 0u64;
        for &pixel in tile.iter().rev() {
            mask <<= bit_size;
            mask |= u64::from(rank[usize::from(pixel)]);
        }

        TileLookup {
            offset,
            palette,
            mask,
        }
    }
}

fn bit_width(value: usize) -> u32 {
    usize::BITS - value.leading_zeros()
}

/// Accumulates tile color subsets and generates the shared dictionary.
///
/// `generate` is a pure function of the accumulated usage table: the
/// same tiles always yield byte-identical buffers and offsets.
#[derive(Debug, Default)]
pub struct PaletteLookupGenerator {
    key_uses: BTreeMap<TilePaletteKey, u32>,
}

/// A chain of subset keys sharing one contiguous buffer region.
struct NestedEntry {
    key: TilePaletteKey,
    nested: Vec<NestedEntry>,
}

impl NestedEntry {
    fn new(key: TilePaletteKey) -> Self {
        Self {
            key,
            nested: Vec::new(),
        }
    }

    /// Total bytes this chain contributes when written.
    fn byte_size(&self) -> usize {
        self.key.size() + self.nested.iter().map(NestedEntry::byte_size).sum::<usize>()
    }

    /// Find the unresolved strict subset with the largest nested
    /// footprint and chain it under this entry, recursively.
    ///
    /// Sizes are probed descending and the search stops at the first
    /// size class that yields a candidate; equal footprints resolve to
    /// the key that orders first, keeping the result deterministic.
    fn populate(&mut self, keys: &BTreeSet<TilePaletteKey>) {
        let mut best: Option<NestedEntry> = None;
        let mut best_size = 0usize;
        let mut key_size = self.key.size();
        while key_size > 3 && best.is_none() {
            key_size -= 1;
            for other in keys {
                if other.size() == key_size && self.key.contains(other) {
                    let mut candidate = NestedEntry::new(*other);
                    candidate.populate(keys);
                    let candidate_size = candidate.byte_size();
                    if candidate_size > best_size {
                        best_size = candidate_size;
                        best = Some(candidate);
                    }
                }
            }
        }
        if let Some(found) = best {
            self.nested.push(found);
        }
    }

    /// Write the chain's bytes, reporting every level's key and offset.
    fn extract_buffer(
        &self,
        start_offset: usize,
        mark: &mut impl FnMut(TilePaletteKey, usize),
    ) -> Vec<u8> {
        mark(self.key, start_offset);
        let mut nested_bytes = Vec::new();
        let mut relative_offset = 0;
        for nested in &self.nested {
            nested_bytes.extend(nested.extract_buffer(start_offset + relative_offset, mark));
            relative_offset += nested.key.size();
        }
        self.key.joined_buffer(&nested_bytes)
    }
}

impl PaletteLookupGenerator {
    /// Register one tile's color subset.
    ///
    /// Keys of one or two colors are cheap enough to encode inline and
    /// are never given a dictionary entry.
    pub fn add(&mut self, tile: &TileDelta) {
        let key = TilePaletteKey::from_tile(tile);
        if key.size() > 2 {
            *self.key_uses.entry(key).or_insert(0) += 1;
        }
    }

    /// Number of distinct registered keys.
    pub fn key_count(&self) -> usize {
        self.key_uses.len()
    }

    /// Build the lookup for all registered tiles.
    pub fn generate(&self) -> PaletteLookup {
        let mut buffer: Vec<u8> = Vec::new();
        let mut starts: BTreeMap<TilePaletteKey, usize> = BTreeMap::new();
        let mut remainder: BTreeSet<TilePaletteKey> = self.key_uses.keys().copied().collect();

        for size in (3..=PIXELS_PER_TILE).rev() {
            // Keys whose colors already sit contiguous in the buffer can
            // reuse that window without contributing bytes.
            let reused: Vec<TilePaletteKey> = remainder
                .iter()
                .filter(|key| key.size() == size)
                .filter_map(|key| find_window(&buffer, key).map(|start| (*key, start)))
                .map(|(key, start)| {
                    starts.insert(key, start);
                    key
                })
                .collect();
            for key in &reused {
                remainder.remove(key);
            }

            let keys_in_size: Vec<TilePaletteKey> = remainder
                .iter()
                .filter(|key| key.size() == size)
                .copied()
                .collect();

            let mut resolved = keys_in_size.clone();
            for key in keys_in_size {
                let mut root = NestedEntry::new(key);
                root.populate(&remainder);

                let chain_bytes = root.extract_buffer(buffer.len(), &mut |nested_key, offset| {
                    resolved.push(nested_key);
                    starts.insert(nested_key, offset);
                });
                buffer.extend_from_slice(&chain_bytes);
            }
            for key in resolved {
                remainder.remove(&key);
            }
        }

        // Anything left had no size class above; append verbatim.
        for key in remainder {
            starts.insert(key, buffer.len());
            buffer.extend_from_slice(&key.color_bytes());
        }

        PaletteLookup { buffer, starts }
    }
}

/// Scan the buffer for a window of `key.size()` bytes whose colors cover
/// the key.
fn find_window(buffer: &[u8], key: &TilePaletteKey) -> Option<usize> {
    let size = key.size();
    if buffer.len() < size {
        return None;
    }
    (0..=buffer.len() - size).find(|&start| {
        let mut window = TilePaletteKey::default();
        for &color in &buffer[start..start + size] {
            window.use_color(color);
        }
        window.contains(key)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_of(colors: &[u8]) -> TileDelta {
        let mut tile = [colors[0]; PIXELS_PER_TILE];
        for (slot, &color) in tile.iter_mut().zip(colors.iter()) {
            *slot = color;
        }
        tile
    }

    fn key_of(colors: &[u8]) -> TilePaletteKey {
        let mut key = TilePaletteKey::default();
        for &color in colors {
            key.use_color(color);
        }
        key
    }

    fn window_matches(lookup: &PaletteLookup, key: &TilePaletteKey) -> bool {
        let start = match lookup.start_of(key) {
            Some(start) => start,
            None => return false,
        };
        let window = &lookup.buffer()[start..start + key.size()];
        let mut seen = TilePaletteKey::default();
        for &color in window {
            seen.use_color(color);
        }
        seen == *key
    }

    #[test]
    fn test_key_bitset_basics() {
        let mut key = TilePaletteKey::default();
        key.use_color(0);
        key.use_color(255);
        key.use_color(255);
        assert_eq!(key.size(), 2);
        assert!(key.has_color(0));
        assert!(key.has_color(255));
        assert!(!key.has_color(7));
        assert_eq!(key.color_bytes(), vec![0, 255]);
    }

    #[test]
    fn test_key_contains_and_without() {
        let big = key_of(&[1, 2, 3, 4, 5]);
        let small = key_of(&[2, 4]);
        assert!(big.contains(&small));
        assert!(!small.contains(&big));
        assert_eq!(big.without(&small).color_bytes(), vec![1, 3, 5]);
    }

    #[test]
    fn test_small_keys_are_never_registered() {
        let mut gen = PaletteLookupGenerator::default();
        gen.add(&tile_of(&[5]));
        gen.add(&tile_of(&[5, 9]));
        assert_eq!(gen.key_count(), 0);
        let lookup = gen.generate();
        assert!(lookup.buffer().is_empty());
    }

    #[test]
    fn test_single_key_verbatim() {
        let mut gen = PaletteLookupGenerator::default();
        gen.add(&tile_of(&[30, 10, 20]));
        let lookup = gen.generate();
        assert_eq!(lookup.buffer(), &[10, 20, 30]);
        assert_eq!(lookup.start_of(&key_of(&[10, 20, 30])), Some(0));
    }

    #[test]
    fn test_subset_nests_inside_superset() {
        let mut gen = PaletteLookupGenerator::default();
        gen.add(&tile_of(&[1, 2, 3, 4, 5, 6, 7, 8]));
        gen.add(&tile_of(&[1, 2, 3, 4, 5]));
        let lookup = gen.generate();

        // The subset shares the superset's region: 8 bytes total, both
        // keys resolvable, subset bytes leading.
        assert_eq!(lookup.buffer().len(), 8);
        assert_eq!(&lookup.buffer()[0..5], &[1, 2, 3, 4, 5]);
        assert!(window_matches(&lookup, &key_of(&[1, 2, 3, 4, 5, 6, 7, 8])));
        assert!(window_matches(&lookup, &key_of(&[1, 2, 3, 4, 5])));
    }

    #[test]
    fn test_early_reuse_of_existing_window() {
        let mut gen = PaletteLookupGenerator::default();
        gen.add(&tile_of(&[0, 1, 2, 3, 4, 5, 6, 7]));
        gen.add(&tile_of(&[2, 3, 4]));
        gen.add(&tile_of(&[5, 6, 7]));
        let lookup = gen.generate();

        // One size-3 key nests into the size-8 chain; the other finds
        // its colors contiguous in the written buffer and reuses them.
        assert_eq!(lookup.buffer().len(), 8);
        assert!(window_matches(&lookup, &key_of(&[0, 1, 2, 3, 4, 5, 6, 7])));
        assert!(window_matches(&lookup, &key_of(&[2, 3, 4])));
        assert!(window_matches(&lookup, &key_of(&[5, 6, 7])));
    }

    #[test]
    fn test_every_registered_key_is_recoverable() {
        let mut gen = PaletteLookupGenerator::default();
        let color_sets: Vec<Vec<u8>> = vec![
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16],
            vec![1, 2, 3, 4, 5, 6, 7, 8],
            vec![3, 4, 5, 6],
            vec![200, 201, 202, 203, 204],
            vec![200, 202, 204],
            vec![90, 91, 92],
            vec![1, 100, 200],
            vec![7, 8, 9, 10],
        ];
        for colors in &color_sets {
            gen.add(&tile_of(colors));
        }
        let lookup = gen.generate();
        for colors in &color_sets {
            let key = key_of(colors);
            assert!(window_matches(&lookup, &key), "key {colors:?} not recoverable");
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let sets: Vec<Vec<u8>> = vec![
            vec![10, 20, 30, 40],
            vec![10, 20, 30],
            vec![5, 6, 7, 8, 9],
            vec![100, 110, 120],
        ];
        let mut forward = PaletteLookupGenerator::default();
        for colors in &sets {
            forward.add(&tile_of(colors));
        }
        let mut reverse = PaletteLookupGenerator::default();
        for colors in sets.iter().rev() {
            reverse.add(&tile_of(colors));
        }
        let a = forward.generate();
        let b = reverse.generate();
        assert_eq!(a.buffer(), b.buffer());
        assert_eq!(a, b);
    }

    #[test]
    fn test_lookup_mask_packing() {
        let mut gen = PaletteLookupGenerator::default();
        let mut tile = [10u8; PIXELS_PER_TILE];
        tile[0] = 40;
        tile[1] = 20;
        tile[4] = 30;
        gen.add(&tile);
        let lookup = gen.generate();

        let found = lookup.lookup(&tile);
        // Subset {10,20,30,40} in ascending order, 2 bits per pixel.
        assert_eq!(found.palette, vec![10, 20, 30, 40]);
        assert_eq!(found.offset, 0);
        let expected = 3 | (1 << 2) | (2 << 8);
        assert_eq!(found.mask, expected);
    }

    #[test]
    fn test_lookup_fallback_without_entry() {
        let lookup = PaletteLookup::with_buffer(vec![9, 9, 9]);
        let tile = tile_of(&[3, 1, 2]);
        let found = lookup.lookup(&tile);
        assert_eq!(found.palette, vec![1, 2, 3]);
        assert_eq!(found.offset, 0);
    }

    #[test]
    fn test_single_color_tile_masks_to_zero() {
        let lookup = PaletteLookup::default();
        let found = lookup.lookup(&[77u8; PIXELS_PER_TILE]);
        assert_eq!(found.palette, vec![77]);
        assert_eq!(found.mask, 0);
    }
}
