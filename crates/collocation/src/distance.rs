//! Great-circle distance on a spherical Earth.
//!
//! Longitude differences are taken linearly. The haversine term
//! sin²(Δλ/2) is 360°-periodic, so distances across the antimeridian come out
//! right; the wrap is only lost in the degree-box tests built on
//! [`degree_padding`].

use ndarray::{ArrayD, ArrayViewD, Zip};

use crate::error::{CollocationError, Result};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree used to turn a search radius into a degree padding.
///
/// Exact for latitude on the sphere to within 0.1%, but a degree of longitude
/// shrinks with cos(latitude), so at high latitude the padded box is narrower
/// in longitude than the search circle. Only the prefilter and the crop use it.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Degree padding for a search radius: `radius_km / 111.0`.
pub fn degree_padding(radius_km: f64) -> f64 {
    radius_km / KM_PER_DEGREE
}

/// Haversine distance in kilometers between two (lon, lat) pairs in degrees.
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Elementwise haversine distance from every grid cell to one point.
///
/// `lon` and `lat` must share a shape, which may have any number of axes.
/// Non-finite coordinates yield NaN distances.
pub fn haversine_grid_km(
    lon: ArrayViewD<'_, f64>,
    lat: ArrayViewD<'_, f64>,
    point_lon: f64,
    point_lat: f64,
) -> Result<ArrayD<f64>> {
    if lon.shape() != lat.shape() {
        return Err(CollocationError::ShapeMismatch {
            left: lon.shape().to_vec(),
            right: lat.shape().to_vec(),
        });
    }

    Ok(Zip::from(&lon)
        .and(&lat)
        .map_collect(|&x, &y| haversine_km(x, y, point_lon, point_lat)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, ArrayD, IxDyn};

    #[test]
    fn test_haversine_distance() {
        // Distance from London to Paris is approximately 344 km
        let london = (-0.1276, 51.5074);
        let paris = (2.3522, 48.8566);

        let distance = haversine_km(london.0, london.1, paris.0, paris.1);
        assert!((distance - 344.0).abs() < 5.0, "Distance was {} km", distance);
    }

    #[test]
    fn test_haversine_distance_same_point() {
        assert!(haversine_km(-97.5, 35.2, -97.5, 35.2).abs() < 1e-12);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let expected = EARTH_RADIUS_KM * 1.0_f64.to_radians();
        let distance = haversine_km(10.0, 0.0, 10.0, 1.0);
        assert!((distance - expected).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = haversine_km(-124.5, 46.1, -123.9, 45.7);
        let b = haversine_km(-123.9, 45.7, -124.5, 46.1);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_antimeridian_distance_wraps() {
        // 0.2 degrees of longitude on the equator
        let distance = haversine_km(179.9, 0.0, -179.9, 0.0);
        let expected = 0.2_f64.to_radians() * EARTH_RADIUS_KM;
        assert!((distance - expected).abs() < 1e-6);
        assert!((distance - 22.239).abs() < 1e-3);
    }

    #[test]
    fn test_grid_matches_scalar() {
        let lon = arr2(&[[0.0, 0.5, 1.0], [0.0, 0.5, 1.0]]).into_dyn();
        let lat = arr2(&[[10.0, 10.0, 10.0], [10.5, 10.5, 10.5]]).into_dyn();

        let grid = haversine_grid_km(lon.view(), lat.view(), 0.25, 10.25).unwrap();
        assert_eq!(grid.shape(), &[2, 3]);
        for ((idx, &d), (&x, &y)) in grid.indexed_iter().zip(lon.iter().zip(lat.iter())) {
            let expected = haversine_km(x, y, 0.25, 10.25);
            assert!((d - expected).abs() < 1e-12, "mismatch at {:?}", idx);
        }
    }

    #[test]
    fn test_grid_three_dimensional() {
        let lon = ArrayD::from_elem(IxDyn(&[2, 2, 2]), 5.0);
        let lat = ArrayD::from_elem(IxDyn(&[2, 2, 2]), 5.0);
        let grid = haversine_grid_km(lon.view(), lat.view(), 5.0, 5.0).unwrap();
        assert_eq!(grid.shape(), &[2, 2, 2]);
        assert!(grid.iter().all(|&d| d.abs() < 1e-12));
    }

    #[test]
    fn test_grid_nan_propagates() {
        let lon = arr2(&[[f64::NAN, 1.0]]).into_dyn();
        let lat = arr2(&[[1.0, 1.0]]).into_dyn();
        let grid = haversine_grid_km(lon.view(), lat.view(), 1.0, 1.0).unwrap();
        assert!(grid[[0, 0]].is_nan());
        assert!(grid[[0, 1]].abs() < 1e-12);
    }

    #[test]
    fn test_grid_shape_mismatch() {
        let lon = ArrayD::zeros(IxDyn(&[2, 3]));
        let lat = ArrayD::zeros(IxDyn(&[3, 2]));
        assert!(matches!(
            haversine_grid_km(lon.view(), lat.view(), 0.0, 0.0),
            Err(CollocationError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_degree_padding() {
        assert!((degree_padding(111.0) - 1.0).abs() < 1e-12);
        assert!((degree_padding(25.0) - 0.225_225_225).abs() < 1e-6);
    }
}
