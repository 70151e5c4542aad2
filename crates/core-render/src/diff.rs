//! Virtual/physical screen diffing (spec §4.4 "Diffing"): for each row,
//! find the leftmost differing column and repaint from there to the end of
//! the virtual line, clearing to end-of-line if the physical row was
//! longer; a flag mismatch forces a full-row repaint.

use crate::{Screen, VideoLine};

/// What a row needs to catch the terminal up with the virtual screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowPatch {
    /// Row already matches; nothing to send.
    Unchanged,
    /// Repaint from `from_col` to the end of the virtual row.
    Tail {
        from_col: usize,
        bytes: Vec<u8>,
        clear_to_eol: bool,
    },
    /// Attribute flags differ; repaint the whole row.
    Full { bytes: Vec<u8> },
}

/// Diff one row. `physical_len` is the length of content the physical row
/// actually holds (it may be shorter than `physical.bytes.len()` after a
/// narrower previous write; pass `physical.bytes.len()` when unknown).
fn diff_row(virt: &VideoLine, phys: &VideoLine, physical_len: usize) -> RowPatch {
    if virt.flags != phys.flags {
        return RowPatch::Full {
            bytes: virt.bytes.clone(),
        };
    }
    let leftmost = virt
        .bytes
        .iter()
        .zip(phys.bytes.iter())
        .position(|(a, b)| a != b);
    match leftmost {
        None if virt.bytes.len() == phys.bytes.len() => RowPatch::Unchanged,
        None => RowPatch::Tail {
            from_col: virt.bytes.len().min(phys.bytes.len()),
            bytes: virt.bytes[virt.bytes.len().min(phys.bytes.len())..].to_vec(),
            clear_to_eol: physical_len > virt.bytes.len(),
        },
        Some(col) => RowPatch::Tail {
            from_col: col,
            bytes: virt.bytes[col..].to_vec(),
            clear_to_eol: physical_len > virt.bytes.len(),
        },
    }
}

/// Diff every row of `virtual` against `physical`, then sync any changed
/// physical row to match (spec: "After each row-write the physical line is
/// updated to match").
pub fn diff_and_sync(virtual_screen: &Screen, physical_screen: &mut Screen) -> Vec<RowPatch> {
    let mut patches = Vec::with_capacity(virtual_screen.rows.len());
    for (virt, phys) in virtual_screen.rows.iter().zip(physical_screen.rows.iter_mut()) {
        let patch = diff_row(virt, phys, phys.bytes.len());
        if !matches!(patch, RowPatch::Unchanged) {
            *phys = virt.clone();
        }
        patches.push(patch);
    }
    patches
}
