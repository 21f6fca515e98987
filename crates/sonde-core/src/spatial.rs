//! Spatial math for observer look angles.
//!
//! All functions take degrees for angles and meters for altitudes and distances.

use serde::Serialize;

/// Sphere radius used by the SondeHub tooling for look-angle work.
pub const EARTH_RADIUS_M: f64 = 6_364_963.0;

/// Below this straight-line distance the observer and target are treated as coincident.
const COINCIDENT_EPS_M: f64 = 1e-3;

/// Where a target appears in an observer's sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LookAngles {
    /// Degrees above the local horizontal, -90..=90
    pub elevation_deg: f64,
    /// Degrees clockwise from true north, 0..360
    pub azimuth_deg: f64,
    /// Angle subtended at the Earth's centre between the two points
    pub angle_at_centre_deg: f64,
    pub great_circle_distance_m: f64,
    pub straight_distance_m: f64,
}

/// Compute look angles from `observer` to `target`.
///
/// # Arguments
/// * `observer` - (lat, lon, altitude_m) of the observing site
/// * `target` - (lat, lon, altitude_m) of the object being looked at
///
/// # Returns
/// `None` when the two positions coincide and no direction is defined.
///
/// Bearing and angle at centre come from Vincenty's formulae with f = 0.
/// Elevation is solved from the triangle formed by the Earth's centre and the
/// two points, so Earth curvature is included but refraction is not.
pub fn look_angles(observer: (f64, f64, f64), target: (f64, f64, f64)) -> Option<LookAngles> {
    let (lat1, lon1, alt1) = observer;
    let (lat2, lon2, alt2) = target;

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let sa = phi2.cos() * d_lambda.sin();
    let sb = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
    let bearing = sa.atan2(sb);

    let aa = (sa * sa + sb * sb).sqrt();
    let ab = phi1.sin() * phi2.sin() + phi1.cos() * phi2.cos() * d_lambda.cos();
    let angle_at_centre = aa.atan2(ab);

    let ta = EARTH_RADIUS_M + alt1;
    let tb = EARTH_RADIUS_M + alt2;
    let straight_distance_m =
        (ta * ta + tb * tb - 2.0 * ta * tb * angle_at_centre.cos()).max(0.0).sqrt();

    if !straight_distance_m.is_finite() || straight_distance_m < COINCIDENT_EPS_M {
        return None;
    }

    let ea = angle_at_centre.cos() * tb - ta;
    let eb = angle_at_centre.sin() * tb;
    let elevation = ea.atan2(eb);

    Some(LookAngles {
        elevation_deg: elevation.to_degrees(),
        azimuth_deg: normalize_bearing_deg(bearing.to_degrees()),
        angle_at_centre_deg: angle_at_centre.to_degrees(),
        great_circle_distance_m: angle_at_centre * EARTH_RADIUS_M,
        straight_distance_m,
    })
}

/// Wrap a bearing into [0, 360).
pub fn normalize_bearing_deg(bearing_deg: f64) -> f64 {
    let wrapped = bearing_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Great-circle distance between two points on the look-angle sphere.
///
/// # Arguments
/// * `lat1`, `lon1` - First point in decimal degrees
/// * `lat2`, `lon2` - Second point in decimal degrees
///
/// # Returns
/// Distance in meters along the surface
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}


#[cfg(test)]
mod tests {
    use super::fixtures::destination;
    use super::*;

    const SITE: (f64, f64, f64) = (37.43, -89.6436, 161.0);

    #[test]
    fn test_overhead_is_zenith() {
        let angles = look_angles(SITE, (SITE.0, SITE.1, 10_000.0)).unwrap();
        assert!((angles.elevation_deg - 90.0).abs() < 1e-6);
        assert!((angles.straight_distance_m - 9_839.0).abs() < 1e-3);
    }

    #[test]
    fn test_coincident_has_no_direction() {
        assert!(look_angles(SITE, SITE).is_none());
    }

    #[test]
    fn test_known_look_angle() {
        let angles = look_angles(SITE, (36.37851, -90.69866, 20_000.0)).unwrap();
        assert!(
            (angles.elevation_deg - 6.86).abs() < 0.01,
            "elevation {}",
            angles.elevation_deg
        );
        assert!(
            (angles.azimuth_deg - 219.06).abs() < 0.01,
            "azimuth {}",
            angles.azimuth_deg
        );
    }

    #[test]
    fn test_cardinal_azimuths() {
        let north = look_angles((0.0, 0.0, 0.0), (1.0, 0.0, 0.0)).unwrap();
        let east = look_angles((0.0, 0.0, 0.0), (0.0, 1.0, 0.0)).unwrap();
        let south = look_angles((0.0, 0.0, 0.0), (-1.0, 0.0, 0.0)).unwrap();
        let west = look_angles((0.0, 0.0, 0.0), (0.0, -1.0, 0.0)).unwrap();

        assert!(north.azimuth_deg.abs() < 1e-9);
        assert!((east.azimuth_deg - 90.0).abs() < 1e-9);
        assert!((south.azimuth_deg - 180.0).abs() < 1e-9);
        assert!((west.azimuth_deg - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_ground_level_target_sits_below_horizon() {
        // Curvature drops a sea-level point 100 km away below the geometric horizon.
        let (lat, lon) = destination(SITE.0, SITE.1, 100_000.0, 45.0);
        let angles = look_angles((SITE.0, SITE.1, 0.0), (lat, lon, 0.0)).unwrap();
        assert!(angles.elevation_deg < 0.0);
        assert!((angles.great_circle_distance_m - 100_000.0).abs() < 1.0);
        assert!((angles.azimuth_deg - 45.0).abs() < 0.01);
    }

    #[test]
    fn test_observer_altitude_lowers_elevation() {
        let target = (SITE.0 + 0.1, SITE.1, 3_000.0);
        let low = look_angles((SITE.0, SITE.1, 0.0), target).unwrap();
        let high = look_angles((SITE.0, SITE.1, 2_000.0), target).unwrap();
        assert!(high.elevation_deg < low.elevation_deg);
    }

    #[test]
    fn test_haversine_known_distance() {
        // One degree of latitude on this sphere.
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_089.6).abs() < 1.0, "distance {dist}");
        assert_eq!(haversine_distance(37.43, -89.6436, 37.43, -89.6436), 0.0);
    }

    #[test]
    fn test_haversine_agrees_with_look_angles() {
        let target = (36.37851, -90.69866, 20_000.0);
        let angles = look_angles(SITE, target).unwrap();
        let surface = haversine_distance(SITE.0, SITE.1, target.0, target.1);
        assert!((angles.great_circle_distance_m - surface).abs() < 0.01);
    }

    #[test]
    fn test_normalize_bearing() {
        assert_eq!(normalize_bearing_deg(-90.0), 270.0);
        assert_eq!(normalize_bearing_deg(360.0), 0.0);
        assert_eq!(normalize_bearing_deg(725.0), 5.0);
    }
}
