//! Chroma plane downsampling.

/// Returns the dimensions of a plane of `width × height` samples after subsampling it by the given
/// factors.
pub fn reduced_size(
    width: usize,
    height: usize,
    x_factor: usize,
    y_factor: usize,
) -> (usize, usize) {
    (
        (width + x_factor - 1) / x_factor,
        (height + y_factor - 1) / y_factor,
    )
}

/// Downsamples a row-major plane by averaging blocks of `x_factor × y_factor` samples.
///
/// Blocks overhanging the right or bottom edge of the plane only average the samples that lie
/// inside it. The average is floored.
///
/// # Panics
///
/// Panics if a factor is zero or if `plane` holds fewer than `width * height` samples.
pub fn reduce_chrominance_size(
    plane: &[i32],
    width: usize,
    height: usize,
    x_factor: usize,
    y_factor: usize,
) -> Vec<i32> {
    assert!(x_factor > 0 && y_factor > 0, "subsampling factors must be non-zero");
    assert!(plane.len() >= width * height);

    let (out_width, out_height) = reduced_size(width, height, x_factor, y_factor);
    let mut out = Vec::with_capacity(out_width * out_height);
    for y in 0..out_height {
        let rows = y * y_factor..(y * y_factor + y_factor).min(height);
        for x in 0..out_width {
            let cols = x * x_factor..(x * x_factor + x_factor).min(width);

            let mut sum = 0;
            for row in rows.clone() {
                sum += plane[row * width..][cols.clone()].iter().sum::<i32>();
            }
            let count = (rows.len() * cols.len()) as i32;
            out.push(sum.div_euclid(count));
        }
    }
    out
}
