//! Placement of entry data inside a normal archive.
//!
//! The PS2 reads archive contents with DMA transfers, every data offset has to sit on a multiple
//! of the alignment quantum or the game refuses the archive.

use crate::format::PakKind;

/// Alignment of entry data in normal archives, one CD sector
pub const NORMAL_ALIGNMENT: u64 = 0x800;

/// Alignment of entry data in archives that get compressed afterwards
pub const COMPRESSED_ALIGNMENT: u64 = 0x10;

/// The alignment quantum used when writing an archive of the given kind
pub fn alignment_for(kind: PakKind) -> u64 {
    match kind {
        PakKind::Compressed => COMPRESSED_ALIGNMENT,
        PakKind::Normal | PakKind::Unknown => NORMAL_ALIGNMENT,
    }
}

/// Round `value` up to the next multiple of `quantum`
pub fn align_up(value: u64, quantum: u64) -> u64 {
    debug_assert!(quantum > 0);
    value.div_ceil(quantum) * quantum
}

/// Compute the data offset of each entry.
///
/// The first entry starts at the first boundary at or after `start`, every following entry at
/// the first boundary at or after the end of the previous one.
pub fn plan_offsets<I>(start: u64, sizes: I, quantum: u64) -> Vec<u64>
where
    I: IntoIterator<Item = u64>,
{
    let mut end = start;
    sizes
        .into_iter()
        .map(|size| {
            let offset = align_up(end, quantum);
            end = offset + size;
            offset
        })
        .collect()
}
