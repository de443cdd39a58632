//! 8×8 block extraction, forward/inverse DCT and quantization.
//!
//! These are straightforward (non-separable, floating point) implementations of the formulas in
//! ITU-T T.81 section A.3.3, meant for illustrating the codec rather than for speed.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::{color::clamp, context::Context};

/// An 8×8 block of samples or coefficients, indexed `[row][column]`.
pub type Block = [[i32; 8]; 8];

/// Returns the luma samples of the block at block coordinates `(block_x, block_y)`.
///
/// Samples outside the image, or missing from the luma plane (for example before
/// [`Context::convert_colors`] has run), are zero.
pub fn make_block_at(context: &Context, block_x: usize, block_y: usize) -> Block {
    let (width, height) = (context.width(), context.height());
    let mut block = [[0; 8]; 8];
    for (y, row) in block.iter_mut().enumerate() {
        let yy = block_y * 8 + y;
        if yy >= height {
            break;
        }
        for (x, sample) in row.iter_mut().enumerate() {
            let xx = block_x * 8 + x;
            if xx < width {
                *sample = context.yp.get(yy * width + xx).copied().unwrap_or(0);
            }
        }
    }
    block
}

/// `cos((2 * x + 1) * u * π / 16)`
fn basis(x: usize, u: usize) -> f64 {
    ((2 * x + 1) as f64 * u as f64 * PI / 16.0).cos()
}

fn norm(u: usize) -> f64 {
    if u == 0 {
        FRAC_1_SQRT_2
    } else {
        1.0
    }
}

/// Forward DCT of a block of samples in `0..=255`. Coefficients are rounded to integers.
pub fn dct(data: &Block) -> Block {
    let mut out = [[0; 8]; 8];
    for (v, row) in out.iter_mut().enumerate() {
        for (u, coeff) in row.iter_mut().enumerate() {
            let mut sum = 0.0;
            for (y, line) in data.iter().enumerate() {
                for (x, &sample) in line.iter().enumerate() {
                    sum += f64::from(sample - 128) * basis(x, u) * basis(y, v);
                }
            }
            *coeff = (0.25 * norm(u) * norm(v) * sum).round() as i32;
        }
    }
    out
}

/// Inverse DCT. Output samples are truncated and clamped to `0..=255`.
pub fn idct(data: &Block) -> Block {
    let mut out = [[0; 8]; 8];
    for (y, row) in out.iter_mut().enumerate() {
        for (x, sample) in row.iter_mut().enumerate() {
            let mut sum = 0.0;
            for (v, line) in data.iter().enumerate() {
                for (u, &coeff) in line.iter().enumerate() {
                    sum += norm(u) * norm(v) * f64::from(coeff) * basis(x, u) * basis(y, v);
                }
            }
            *sample = i32::from(clamp((128.0 + sum / 4.0).trunc()));
        }
    }
    out
}

/// Divides each coefficient by the matching quantization matrix entry, rounding to nearest.
pub fn quantize(data: &Block, quant: &Block) -> Block {
    let mut out = [[0; 8]; 8];
    for i in 0..8 {
        for j in 0..8 {
            out[i][j] = (f64::from(data[i][j]) / f64::from(quant[i][j])).round() as i32;
        }
    }
    out
}

pub fn unquantize(data: &Block, quant: &Block) -> Block {
    let mut out = [[0; 8]; 8];
    for i in 0..8 {
        for j in 0..8 {
            out[i][j] = data[i][j] * quant[i][j];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::tables::{CHROMINANCE_QUANT_TABLE, LUMINANCE_QUANT_TABLE};

    use super::*;

    fn random_block(rng: &mut fastrand::Rng) -> Block {
        let mut block = [[0; 8]; 8];
        for row in &mut block {
            for v in row {
                *v = rng.i32(0..=255);
            }
        }
        block
    }

    #[test]
    fn flat_block() {
        let coeffs = dct(&[[200; 8]; 8]);
        // DC = 8 * (200 - 128)
        assert_eq!(coeffs[0][0], 576);
        for (i, row) in coeffs.iter().enumerate() {
            for (j, &c) in row.iter().enumerate() {
                if (i, j) != (0, 0) {
                    assert_eq!(c, 0, "AC coefficient ({i}, {j})");
                }
            }
        }

        let mut dc_only = [[0; 8]; 8];
        dc_only[0][0] = -1024;
        assert_eq!(idct(&dc_only), [[0; 8]; 8]);
    }

    #[test]
    fn round_trip() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..32 {
            let block = random_block(&mut rng);
            let restored = idct(&dct(&block));
            for i in 0..8 {
                for j in 0..8 {
                    let diff = (restored[i][j] - block[i][j]).abs();
                    assert!(
                        diff <= 2,
                        "sample ({i}, {j}): {} -> {}",
                        block[i][j],
                        restored[i][j]
                    );
                }
            }
        }
    }

    #[test]
    fn quantization_error_is_bounded() {
        let mut rng = fastrand::Rng::with_seed(42);
        for quant in [LUMINANCE_QUANT_TABLE, CHROMINANCE_QUANT_TABLE] {
            for _ in 0..16 {
                let coeffs = dct(&random_block(&mut rng));
                let restored = unquantize(&quantize(&coeffs, &quant), &quant);
                for i in 0..8 {
                    for j in 0..8 {
                        assert!((restored[i][j] - coeffs[i][j]).abs() < quant[i][j]);
                    }
                }
            }
        }
    }

    #[test]
    fn quantize_rounds() {
        let mut data = [[0; 8]; 8];
        data[0][0] = 25;
        data[0][1] = -17;
        data[7][7] = 49;
        let q = quantize(&data, &[[10; 8]; 8]);
        assert_eq!((q[0][0], q[0][1], q[7][7]), (3, -2, 5));
        assert_eq!(unquantize(&q, &[[10; 8]; 8])[7][7], 50);
    }

    #[test]
    fn edge_blocks_are_zero_padded() {
        let rgba = vec![0xFF; 10 * 9 * 4];
        let mut ctx = Context::new(10, 9, rgba).unwrap();
        ctx.convert_colors();
        let white = ctx.yp[0];

        let block = make_block_at(&ctx, 1, 1);
        assert_eq!(block[0][0], white);
        assert_eq!(block[0][1], white);
        assert_eq!(block[0][2], 0);
        assert_eq!(block[1][0], 0);

        assert_eq!(make_block_at(&ctx, 0, 0), [[white; 8]; 8]);
        assert_eq!(make_block_at(&ctx, 2, 0), [[0; 8]; 8]);
    }

    #[test]
    fn missing_luma_is_zero() {
        let mut ctx = Context::new(8, 8, vec![0x80; 8 * 8 * 4]).unwrap();
        assert_eq!(make_block_at(&ctx, 0, 0), [[0; 8]; 8]);

        ctx.yp = vec![7; 12];
        let block = make_block_at(&ctx, 0, 0);
        assert_eq!(block[1][3], 7);
        assert_eq!(block[1][4], 0);
        assert_eq!(block[7][7], 0);
    }
}
