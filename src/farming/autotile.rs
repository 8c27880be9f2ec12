//! Dual-grid autotiling.
//!
//! Terrain is not drawn per tile. Instead every tile *corner* gets one
//! sprite, picked from a 4×4 sheet by which of the four tiles meeting at
//! that corner are at or above the layer being drawn. Sixteen sprites per
//! layer cover every combination, and seams fall on tile centres.
//!
//! Mask bits: bit0 = top-left, bit1 = top-right, bit2 = bottom-left,
//! bit3 = bottom-right.

use bevy::prelude::*;
use thiserror::Error;

use super::tile::TileType;

pub const SHEET_COLUMNS: u32 = 4;
pub const SHEET_ROWS: u32 = 4;
pub const MASK_COUNT: usize = 16;

pub const TOP_LEFT: u8 = 1 << 0;
pub const TOP_RIGHT: u8 = 1 << 1;
pub const BOTTOM_LEFT: u8 = 1 << 2;
pub const BOTTOM_RIGHT: u8 = 1 << 3;

/// Sheet position (column, row) for each corner mask, as laid out in the
/// terrain art.
pub const ATLAS_ENTRIES: [(u8, (u32, u32)); MASK_COUNT] = [
    (0b1111, (2, 1)), // all corners
    (0b1000, (1, 3)), // outer bottom-right
    (0b0100, (0, 0)), // outer bottom-left
    (0b0010, (0, 2)), // outer top-right
    (0b0001, (3, 3)), // outer top-left
    // The four two-corner masks pair (1, 0)/(3, 2) with the diagonals and
    // (2, 3)/(0, 1) with the side edges. Sheets drawn with the side edges at
    // (1, 0)/(3, 2) need these four masks swapped.
    (0b0110, (1, 0)), // diagonal top-right/bottom-left
    (0b1001, (3, 2)), // diagonal top-left/bottom-right
    (0b1100, (3, 0)), // bottom edge
    (0b0011, (1, 2)), // top edge
    (0b1110, (1, 1)), // inner bottom-right
    (0b1101, (2, 0)), // inner bottom-left
    (0b1011, (2, 2)), // inner top-right
    (0b0111, (3, 1)), // inner top-left
    (0b1010, (2, 3)), // right edge
    (0b0101, (0, 1)), // left edge
    (0b0000, (0, 3)), // no corners
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("autotile table has no entry for corner mask {0:#06b}")]
    MissingMask(u8),
    #[error("autotile table lists corner mask {0:#06b} more than once")]
    DuplicateMask(u8),
    #[error("corner mask {0} is out of range")]
    MaskOutOfRange(u8),
    #[error("sheet cell ({col}, {row}) is outside the 4x4 sheet")]
    CellOutOfRange { col: u32, row: u32 },
    #[error("terrain sheet is {width}x{height}px; expected a square divisible into 4x4 cells")]
    BadSheetSize { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasCell {
    pub col: u32,
    pub row: u32,
}

impl AtlasCell {
    /// Index into a row-major `TextureAtlasLayout` built from the sheet.
    pub fn atlas_index(self) -> usize {
        (self.row * SHEET_COLUMNS + self.col) as usize
    }
}

/// Corner mask → sheet cell, complete for all sixteen masks.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct AutotileTable {
    cells: [AtlasCell; MASK_COUNT],
}

impl AutotileTable {
    pub fn from_entries(entries: &[(u8, (u32, u32))]) -> Result<Self, SetupError> {
        let mut cells: [Option<AtlasCell>; MASK_COUNT] = [None; MASK_COUNT];

        for &(mask, (col, row)) in entries {
            if mask as usize >= MASK_COUNT {
                return Err(SetupError::MaskOutOfRange(mask));
            }
            if col >= SHEET_COLUMNS || row >= SHEET_ROWS {
                return Err(SetupError::CellOutOfRange { col, row });
            }
            let slot = &mut cells[mask as usize];
            if slot.is_some() {
                return Err(SetupError::DuplicateMask(mask));
            }
            *slot = Some(AtlasCell { col, row });
        }

        let mut table = [AtlasCell { col: 0, row: 0 }; MASK_COUNT];
        for (mask, cell) in cells.iter().enumerate() {
            table[mask] = cell.ok_or(SetupError::MissingMask(mask as u8))?;
        }
        Ok(Self { cells: table })
    }

    pub fn standard() -> Result<Self, SetupError> {
        Self::from_entries(&ATLAS_ENTRIES)
    }

    pub fn cell(&self, mask: u8) -> AtlasCell {
        self.cells[(mask as usize) & (MASK_COUNT - 1)]
    }
}

/// Build the corner mask for `layer` from the four tiles around a corner,
/// given in bit order (top-left, top-right, bottom-left, bottom-right).
pub fn corner_mask(layer: TileType, corners: [TileType; 4]) -> u8 {
    corners
        .iter()
        .enumerate()
        .filter(|(_, tile_type)| **tile_type >= layer)
        .fold(0u8, |mask, (bit, _)| mask | (1 << bit))
}

/// Pixel size of one sheet cell, validating the sheet dimensions.
pub fn sheet_cell_size(width: u32, height: u32) -> Result<u32, SetupError> {
    if width == 0 || width != height || width % SHEET_COLUMNS != 0 {
        return Err(SetupError::BadSheetSize { width, height });
    }
    Ok(width / SHEET_COLUMNS)
}

/// Slice a terrain sheet into its sixteen candidate regions.
pub fn sheet_layout(width: u32, height: u32) -> Result<TextureAtlasLayout, SetupError> {
    let cell = sheet_cell_size(width, height)?;
    Ok(TextureAtlasLayout::from_grid(
        UVec2::splat(cell),
        SHEET_COLUMNS,
        SHEET_ROWS,
        None,
        None,
    ))
}
