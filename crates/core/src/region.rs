//! Subregion classification for regional rollups
//!
//! Every cell falls in exactly one of three partitions. Natural subregion codes
//! 7-11, 14 and 18 are the mountain and foothill slopes; everything else is boreal,
//! split east/west at 114°W.

use serde::{Deserialize, Serialize};

/// Longitude separating east and west boreal (degrees, negative west).
pub const BOREAL_SPLIT_LONGITUDE: f64 = -114.0;

/// Regional partition of the province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Subregion {
    /// Rocky Mountain and foothill slopes
    Slopes,
    /// Boreal west of the split longitude
    WestBoreal,
    /// Boreal at or east of the split longitude
    EastBoreal,
}

impl Subregion {
    /// Classify a cell from its natural region code and longitude.
    pub fn classify(region_code: i32, longitude: f64) -> Self {
        if matches!(region_code, 7..=11 | 14 | 18) {
            Self::Slopes
        } else if longitude >= BOREAL_SPLIT_LONGITUDE {
            Self::EastBoreal
        } else {
            Self::WestBoreal
        }
    }

    /// Position in report order (slopes, west, east), used to index per-subregion arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::Slopes => 0,
            Self::WestBoreal => 1,
            Self::EastBoreal => 2,
        }
    }

    /// Short label for logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Slopes => "slopes",
            Self::WestBoreal => "west-boreal",
            Self::EastBoreal => "east-boreal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slopes_codes_ignore_longitude() {
        assert_eq!(Subregion::classify(9, -110.0), Subregion::Slopes);
        assert_eq!(Subregion::classify(9, -120.0), Subregion::Slopes);
        for code in [7, 8, 10, 11, 14, 18] {
            assert_eq!(Subregion::classify(code, -100.0), Subregion::Slopes);
        }
    }

    #[test]
    fn boreal_split_on_longitude() {
        assert_eq!(Subregion::classify(3, -110.0), Subregion::EastBoreal);
        assert_eq!(Subregion::classify(3, -120.0), Subregion::WestBoreal);
        assert_eq!(Subregion::classify(12, -114.0), Subregion::EastBoreal);
        assert_eq!(Subregion::classify(0, 0.0), Subregion::EastBoreal);
    }

    #[test]
    fn index_matches_report_order() {
        let order = [Subregion::Slopes, Subregion::WestBoreal, Subregion::EastBoreal];
        for (i, sub) in order.iter().enumerate() {
            assert_eq!(sub.index(), i);
        }
    }
}
