//! Geodesy kernel: great-circle math on a spherical Earth.
//!
//! All angles are degrees at the API surface, radians internally. These
//! functions are the single source of truth for geodetic conversions — the
//! radar producer and the fusion loop both resolve ranges and projections
//! here.

/// Mean Earth radius, meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two geodetic points, in meters.
///
/// Symmetric in its arguments and zero on equal inputs.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + (d_lon / 2.0).sin().powi(2) * lat1.to_radians().cos() * lat2.to_radians().cos();
    EARTH_RADIUS_M * 2.0 * a.sqrt().asin()
}

/// Initial great-circle bearing from point 1 to point 2, degrees in [0, 360).
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_lam = (lon2 - lon1).to_radians();
    let y = d_lam.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lam.cos();
    let deg = y.atan2(x).to_degrees();
    if deg < 0.0 {
        deg + 360.0
    } else {
        deg
    }
}

/// Destination point: start at `(origin_lat, origin_lon)`, travel `range_m`
/// meters along the great circle with initial bearing `bearing_deg`.
pub fn polar_to_geo(origin_lat: f64, origin_lon: f64, range_m: f64, bearing_deg: f64) -> (f64, f64) {
    let ad = range_m / EARTH_RADIUS_M;
    let brng = bearing_deg.to_radians();
    let phi1 = origin_lat.to_radians();
    let lam1 = origin_lon.to_radians();

    let phi2 = (phi1.sin() * ad.cos() + phi1.cos() * ad.sin() * brng.cos()).asin();
    let lam2 = lam1 + (brng.sin() * ad.sin() * phi1.cos()).atan2(ad.cos() - phi1.sin() * phi2.sin());

    (phi2.to_degrees(), lam2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn haversine_zero_on_equal_points() {
        let d = haversine(39.92, 32.85, 39.92, 32.85);
        assert!(d.abs() < 1e-9, "distance to self must be zero, got {d}");
    }

    #[test]
    fn haversine_symmetric() {
        let ab = haversine(39.9, 32.8, 40.0, 32.9);
        let ba = haversine(40.0, 32.9, 39.9, 32.8);
        assert_abs_diff_eq!(ab, ba, epsilon = 1e-9);
    }

    #[test]
    fn bearing_always_in_range() {
        // Sweep a ring of destinations around one origin
        for i in 0..36 {
            let ang = f64::from(i) * 10.0;
            let (lat, lon) = polar_to_geo(39.9, 32.8, 50_000.0, ang);
            let b = bearing(39.9, 32.8, lat, lon);
            assert!((0.0..360.0).contains(&b), "bearing {b} out of [0,360)");
        }
    }

    #[test]
    fn bearing_due_north_is_zero() {
        let b = bearing(39.9, 32.8, 40.9, 32.8);
        assert_abs_diff_eq!(b, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn polar_round_trip_under_100_km() {
        // haversine(origin, polar_to_geo(origin, r, b)) ≈ r within 1 m and the
        // bearing back out matches within 0.01° for ranges below 100 km.
        let (olat, olon) = (39.9, 32.8);
        for range in [500.0, 5_000.0, 42_000.0, 99_000.0] {
            for brg in [0.0, 37.5, 90.0, 181.0, 359.0] {
                let (lat, lon) = polar_to_geo(olat, olon, range, brg);
                let r = haversine(olat, olon, lat, lon);
                assert!((r - range).abs() < 1.0, "range {range} round-trip off by {}", r - range);
                let b = bearing(olat, olon, lat, lon);
                let mut db = (b - brg).abs();
                if db > 180.0 {
                    db = 360.0 - db;
                }
                assert!(db < 0.01, "bearing {brg} round-trip gave {b}");
            }
        }
    }
}
