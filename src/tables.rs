//! Zigzag scan order and the example quantization tables of ITU-T T.81 Annex K.

use crate::dct::Block;

/// Maps a row-major index (`row * 8 + col`) to its position in the zigzag scan.
#[rustfmt::skip]
pub const ZIG_ZAG_TABLE: [usize; 64] = [
     0,  1,  5,  6, 14, 15, 27, 28,
     2,  4,  7, 13, 16, 26, 29, 42,
     3,  8, 12, 17, 25, 30, 41, 43,
     9, 11, 18, 24, 31, 40, 44, 53,
    10, 19, 23, 32, 39, 45, 52, 54,
    20, 22, 33, 38, 46, 51, 55, 60,
    21, 34, 37, 47, 50, 56, 59, 61,
    35, 36, 48, 49, 57, 58, 62, 63,
];

/// Maps a zigzag scan position to its row-major index. Inverse of [`ZIG_ZAG_TABLE`].
pub const ZIG_ZAG_TABLE_INV: [usize; 64] = {
    let mut table = [0; 64];
    let mut i = 0;
    while i < 64 {
        table[ZIG_ZAG_TABLE[i]] = i;
        i += 1;
    }
    table
};

/// Table K.1, luminance.
#[rustfmt::skip]
pub const LUMINANCE_QUANT_TABLE: Block = [
    [16, 11, 10, 16,  24,  40,  51,  61],
    [12, 12, 14, 19,  26,  58,  60,  55],
    [14, 13, 16, 24,  40,  57,  69,  56],
    [14, 17, 22, 29,  51,  87,  80,  62],
    [18, 22, 37, 56,  68, 109, 103,  77],
    [24, 35, 55, 64,  81, 104, 113,  92],
    [49, 64, 78, 87, 103, 121, 120, 101],
    [72, 92, 95, 98, 112, 100, 103,  99],
];

/// Table K.2, chrominance.
#[rustfmt::skip]
pub const CHROMINANCE_QUANT_TABLE: Block = [
    [17, 18, 24, 47, 99, 99, 99, 99],
    [18, 21, 26, 66, 99, 99, 99, 99],
    [24, 26, 56, 99, 99, 99, 99, 99],
    [47, 66, 99, 99, 99, 99, 99, 99],
    [99, 99, 99, 99, 99, 99, 99, 99],
    [99, 99, 99, 99, 99, 99, 99, 99],
    [99, 99, 99, 99, 99, 99, 99, 99],
    [99, 99, 99, 99, 99, 99, 99, 99],
];

/// Serializes a block in zigzag order.
pub fn to_zigzag(block: &Block) -> [i32; 64] {
    let mut out = [0; 64];
    for (i, &v) in block.iter().flatten().enumerate() {
        out[ZIG_ZAG_TABLE[i]] = v;
    }
    out
}

/// Rebuilds a block from coefficients in zigzag order.
pub fn from_zigzag(coeffs: &[i32; 64]) -> Block {
    let mut block = [[0; 8]; 8];
    for (k, &v) in coeffs.iter().enumerate() {
        let i = ZIG_ZAG_TABLE_INV[k];
        block[i / 8][i % 8] = v;
    }
    block
}

/// Converts the 64 elements of a DQT table, which are stored in zigzag order, into a row-major
/// quantization matrix.
///
/// Returns `None` unless exactly 64 elements are given.
pub fn quant_matrix_from_dqt(elements: &[u8]) -> Option<Block> {
    let elements: &[u8; 64] = elements.try_into().ok()?;
    Some(from_zigzag(&elements.map(i32::from)))
}
