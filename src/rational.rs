use crate::marshal::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RationalU32 {
    pub n: u32,
    pub d: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RationalS32 {
    pub n: i32,
    pub d: u32,
}

impl RationalU32 {
    pub const fn new(n: u32, d: u32) -> Self {
        Self { n, d }
    }

    /// Same value, ignoring representation.
    pub fn equals(self, other: Self) -> bool {
        self.n as u64 * other.d as u64 == other.n as u64 * self.d as u64
    }
}

impl RationalS32 {
    pub const fn new(n: i32, d: u32) -> Self {
        Self { n, d }
    }

    /// Same value, ignoring representation.
    pub fn equals(self, other: Self) -> bool {
        self.n as i64 * other.d as i64 == other.n as i64 * self.d as i64
    }
}

/// Visible region as distances cut from each edge of the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crop {
    pub top: RationalU32,
    pub left: RationalU32,
    pub bottom: RationalU32,
    pub right: RationalU32,
}

/// Visible region as extents plus the offset of its center from the frame center, the
/// representation carried by the `clap` box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanAperture {
    pub width: RationalU32,
    pub height: RationalU32,
    pub horizontal_offset: RationalS32,
    pub vertical_offset: RationalS32,
}

impl CleanAperture {
    /// Whether every fraction has a usable denominator.
    pub fn is_specified(&self) -> bool {
        self.width.d != 0
            && self.height.d != 0
            && self.horizontal_offset.d != 0
            && self.vertical_offset.d != 0
    }
}

pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

pub fn lcm(a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 {
        return 0;
    }
    a / gcd(a, b) * b
}

fn reduce_unsigned(n: i128, d: i128) -> Result<RationalU32> {
    let divisor = gcd(n.unsigned_abs() as u64, d as u64).max(1) as i128;
    Ok(RationalU32 {
        n: u32::try_from(n / divisor).map_err(|_| Error::RationalOutOfRange)?,
        d: u32::try_from(d / divisor).map_err(|_| Error::RationalOutOfRange)?,
    })
}

fn reduce_signed(n: i128, d: i128) -> Result<RationalS32> {
    let divisor = gcd(n.unsigned_abs() as u64, d as u64).max(1) as i128;
    Ok(RationalS32 {
        n: i32::try_from(n / divisor).map_err(|_| Error::RationalOutOfRange)?,
        d: u32::try_from(d / divisor).map_err(|_| Error::RationalOutOfRange)?,
    })
}

/// `n / d` scaled to the denominator `common`, which must be a multiple of `d`.
fn scaled(n: i128, d: u32, common: u64) -> i128 {
    n * (common / d as u64) as i128
}

pub fn crop_to_clean_aperture(crop: &Crop, width: u32, height: u32) -> Result<CleanAperture> {
    if crop.top.d == 0 || crop.bottom.d == 0 || crop.left.d == 0 || crop.right.d == 0 {
        return Err(Error::ZeroDenominator);
    }

    let vertical_lcm = lcm(crop.top.d as u64, crop.bottom.d as u64);
    let horizontal_lcm = lcm(crop.left.d as u64, crop.right.d as u64);
    let top = scaled(crop.top.n as i128, crop.top.d, vertical_lcm);
    let bottom = scaled(crop.bottom.n as i128, crop.bottom.d, vertical_lcm);
    let left = scaled(crop.left.n as i128, crop.left.d, horizontal_lcm);
    let right = scaled(crop.right.n as i128, crop.right.d, horizontal_lcm);

    let vertical_lcm = vertical_lcm as i128;
    let horizontal_lcm = horizontal_lcm as i128;
    let clap_height = height as i128 * vertical_lcm - (top + bottom);
    let clap_width = width as i128 * horizontal_lcm - (left + right);
    if clap_height < 0 || clap_width < 0 {
        return Err(Error::RationalOutOfRange);
    }

    Ok(CleanAperture {
        width: reduce_unsigned(clap_width, horizontal_lcm)?,
        height: reduce_unsigned(clap_height, vertical_lcm)?,
        horizontal_offset: reduce_signed(left - right, 2 * horizontal_lcm)?,
        vertical_offset: reduce_signed(top - bottom, 2 * vertical_lcm)?,
    })
}

pub fn clean_aperture_to_crop(clap: &CleanAperture, width: u32, height: u32) -> Result<Crop> {
    if !clap.is_specified() {
        return Err(Error::ZeroDenominator);
    }

    // Twice the common denominator keeps the halved extent difference integral.
    let vertical = 2 * lcm(clap.height.d as u64, clap.vertical_offset.d as u64);
    let horizontal = 2 * lcm(clap.width.d as u64, clap.horizontal_offset.d as u64);
    let clap_height = scaled(clap.height.n as i128, clap.height.d, vertical);
    let clap_width = scaled(clap.width.n as i128, clap.width.d, horizontal);
    let vertical_offset = scaled(clap.vertical_offset.n as i128, clap.vertical_offset.d, vertical);
    let horizontal_offset = scaled(
        clap.horizontal_offset.n as i128,
        clap.horizontal_offset.d,
        horizontal,
    );

    let vertical = vertical as i128;
    let horizontal = horizontal as i128;
    let vertical_margin = (height as i128 * vertical - clap_height) / 2;
    let horizontal_margin = (width as i128 * horizontal - clap_width) / 2;
    let top = vertical_margin + vertical_offset;
    let bottom = vertical_margin - vertical_offset;
    let left = horizontal_margin + horizontal_offset;
    let right = horizontal_margin - horizontal_offset;
    if top < 0 || bottom < 0 || left < 0 || right < 0 {
        return Err(Error::RationalOutOfRange);
    }

    Ok(Crop {
        top: reduce_unsigned(top, vertical)?,
        left: reduce_unsigned(left, horizontal)?,
        bottom: reduce_unsigned(bottom, vertical)?,
        right: reduce_unsigned(right, horizontal)?,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn crop(top: (u32, u32), left: (u32, u32), bottom: (u32, u32), right: (u32, u32)) -> Crop {
        Crop {
            top: RationalU32::new(top.0, top.1),
            left: RationalU32::new(left.0, left.1),
            bottom: RationalU32::new(bottom.0, bottom.1),
            right: RationalU32::new(right.0, right.1),
        }
    }

    #[test]
    fn crop_to_clap_1080p() {
        let clap = crop_to_clean_aperture(&crop((0, 1), (0, 1), (8, 1), (0, 1)), 1920, 1088).unwrap();
        assert_eq!(clap.width, RationalU32::new(1920, 1));
        assert_eq!(clap.height, RationalU32::new(1080, 1));
        assert_eq!(clap.horizontal_offset, RationalS32::new(0, 1));
        assert_eq!(clap.vertical_offset, RationalS32::new(-4, 1));
    }

    #[test]
    fn crop_to_clap_is_reduced() {
        let clap = crop_to_clean_aperture(&crop((1, 2), (3, 4), (1, 3), (1, 4)), 100, 50).unwrap();
        // 50 - 1/2 - 1/3
        assert_eq!(clap.height, RationalU32::new(295, 6));
        // 100 - 3/4 - 1/4
        assert_eq!(clap.width, RationalU32::new(99, 1));
        // (3/4 - 1/4) / 2
        assert_eq!(clap.horizontal_offset, RationalS32::new(1, 4));
        // (1/2 - 1/3) / 2
        assert_eq!(clap.vertical_offset, RationalS32::new(1, 12));
    }

    #[test]
    fn clap_to_crop_1080p() {
        let clap = CleanAperture {
            width: RationalU32::new(1920, 1),
            height: RationalU32::new(1080, 1),
            horizontal_offset: RationalS32::new(0, 1),
            vertical_offset: RationalS32::new(-4, 1),
        };
        let crop = clean_aperture_to_crop(&clap, 1920, 1088).unwrap();
        assert_eq!(crop.top, RationalU32::new(0, 1));
        assert_eq!(crop.bottom, RationalU32::new(8, 1));
        assert_eq!(crop.left, RationalU32::new(0, 1));
        assert_eq!(crop.right, RationalU32::new(0, 1));
    }

    #[test]
    fn zero_denominators_are_rejected() {
        assert!(matches!(
            crop_to_clean_aperture(&crop((0, 1), (0, 0), (0, 1), (0, 1)), 16, 16),
            Err(Error::ZeroDenominator)
        ));
        let clap = CleanAperture {
            width: RationalU32::new(16, 1),
            height: RationalU32::new(16, 1),
            horizontal_offset: RationalS32::new(0, 1),
            vertical_offset: RationalS32::new(0, 0),
        };
        assert!(matches!(
            clean_aperture_to_crop(&clap, 16, 16),
            Err(Error::ZeroDenominator)
        ));
    }

    #[test]
    fn oversized_crop_is_rejected() {
        assert!(matches!(
            crop_to_clean_aperture(&crop((10, 1), (0, 1), (10, 1), (0, 1)), 16, 16),
            Err(Error::RationalOutOfRange)
        ));
    }

    fn side() -> impl Strategy<Value = (u32, u32)> {
        (0u32..64, 1u32..16)
    }

    proptest! {
        #[test]
        fn crop_round_trip_preserves_region(
            top in side(),
            left in side(),
            bottom in side(),
            right in side(),
            width in 128u32..4096,
            height in 128u32..4096,
        ) {
            let original = crop(top, left, bottom, right);
            let clap = crop_to_clean_aperture(&original, width, height).unwrap();
            let back = clean_aperture_to_crop(&clap, width, height).unwrap();
            prop_assert!(back.top.equals(original.top));
            prop_assert!(back.left.equals(original.left));
            prop_assert!(back.bottom.equals(original.bottom));
            prop_assert!(back.right.equals(original.right));
            for value in [back.top, back.left, back.bottom, back.right] {
                prop_assert_eq!(gcd(value.n as u64, value.d as u64), 1);
            }
        }

        #[test]
        fn clap_round_trip_preserves_region(
            top in side(),
            left in side(),
            bottom in side(),
            right in side(),
            width in 128u32..4096,
            height in 128u32..4096,
        ) {
            let original = crop_to_clean_aperture(&crop(top, left, bottom, right), width, height).unwrap();
            let crop = clean_aperture_to_crop(&original, width, height).unwrap();
            let back = crop_to_clean_aperture(&crop, width, height).unwrap();
            prop_assert!(back.width.equals(original.width));
            prop_assert!(back.height.equals(original.height));
            prop_assert!(back.horizontal_offset.equals(original.horizontal_offset));
            prop_assert!(back.vertical_offset.equals(original.vertical_offset));
        }
    }
}
