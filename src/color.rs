//! RGB ↔ Y'CbCr conversion with the BT.601 coefficients used by JFIF.

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Luma and chroma samples.
///
/// Conversion results always lie in `0..=255`, but the fields are signed so that planes built
/// from them can be level-shifted and transformed without conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YCbCr {
    pub y: i32,
    pub cb: i32,
    pub cr: i32,
}

/// Clamps `v` to `0..=255`, flooring values inside the range.
pub fn clamp(v: f64) -> u8 {
    if v < 0.0 {
        0
    } else if v > 255.0 {
        255
    } else {
        v.floor() as u8
    }
}

/// Converts RGB to Y'CbCr. Results are floored, not rounded.
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> YCbCr {
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    YCbCr {
        y: (0.299 * r + 0.587 * g + 0.114 * b).floor() as i32,
        cb: (128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b).floor() as i32,
        cr: (128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b).floor() as i32,
    }
}

pub fn ycbcr_to_rgb(y: i32, cb: i32, cr: i32) -> Rgb {
    let y = f64::from(y);
    let cb = f64::from(cb - 128);
    let cr = f64::from(cr - 128);
    Rgb {
        r: clamp(y + 1.402 * cr),
        g: clamp(y - 0.344136 * cb - 0.714136 * cr),
        b: clamp(y + 1.772 * cb),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping() {
        assert_eq!(clamp(-0.5), 0);
        assert_eq!(clamp(-300.0), 0);
        assert_eq!(clamp(255.9), 255);
        assert_eq!(clamp(1000.0), 255);
        assert_eq!(clamp(12.99), 12);
    }

    #[test]
    fn primaries() {
        assert_eq!(
            rgb_to_ycbcr(0, 0, 0),
            YCbCr {
                y: 0,
                cb: 128,
                cr: 128
            }
        );
        let red = rgb_to_ycbcr(255, 0, 0);
        assert_eq!(red.y, 76);
        assert_eq!(red.cr, 255);
        assert_eq!(ycbcr_to_rgb(0, 128, 128), Rgb { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn round_trip_stays_close() {
        // Flooring in both directions loses up to a few levels per channel.
        const TOLERANCE: u8 = 3;

        for r in (0..=255).step_by(5) {
            for g in (0..=255).step_by(3) {
                for b in (0..=255).step_by(7) {
                    let ycc = rgb_to_ycbcr(r, g, b);
                    for v in [ycc.y, ycc.cb, ycc.cr] {
                        assert!((0..=255).contains(&v), "{ycc:?} out of range");
                    }
                    let rgb = ycbcr_to_rgb(ycc.y, ycc.cb, ycc.cr);
                    assert!(
                        rgb.r.abs_diff(r) <= TOLERANCE
                            && rgb.g.abs_diff(g) <= TOLERANCE
                            && rgb.b.abs_diff(b) <= TOLERANCE,
                        "({r}, {g}, {b}) -> {ycc:?} -> {rgb:?}"
                    );
                }
            }
        }
    }
}
