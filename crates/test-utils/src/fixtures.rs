//! Common test fixtures for collocation tests.

/// Named point locations (lon, lat) in degrees.
pub mod points {
    /// NDBC 46050, Stonewall Bank off Oregon
    pub const STONEWALL_BANK: (&str, f64, f64) = ("46050", -124.546, 44.669);

    /// NDBC 46029, Columbia River Bar
    pub const COLUMBIA_RIVER_BAR: (&str, f64, f64) = ("46029", -124.485, 46.163);

    /// NDBC 51101, northwest of Kauai
    pub const KAUAI_NW: (&str, f64, f64) = ("51101", -162.208, 24.361);

    /// Null Island, far from every fixture swath
    pub const NULL_ISLAND: (&str, f64, f64) = ("null-island", 0.0, 0.0);

    /// High-latitude site where the degree padding is least accurate
    pub const FRAM_STRAIT: (&str, f64, f64) = ("fram", 0.0, 79.0);
}

/// Common time values for testing.
pub mod time {
    /// A fixed reference time for tests (2024-01-15T12:00:00Z)
    pub const REFERENCE_TIME: &str = "2024-01-15T12:00:00Z";

    /// [`REFERENCE_TIME`] in seconds since the Unix epoch
    pub const REFERENCE_EPOCH: f64 = 1_705_320_000.0;

    /// Seconds per day
    pub const DAY: f64 = 86_400.0;
}

/// Common search radii in kilometers.
pub mod radius {
    /// Default buoy search radius
    pub const DEFAULT_KM: f64 = 25.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_epoch_matches_time_string() {
        // 2024-01-01T00:00:00Z is 1_704_067_200
        let expected = 1_704_067_200.0 + 14.0 * time::DAY + 12.0 * 3600.0;
        assert_eq!(time::REFERENCE_EPOCH, expected);
    }
}
