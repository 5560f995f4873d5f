use crate::models::GeoPoint;

/// Earth's radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate the Haversine distance between two points in meters
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Great-circle distance in meters. NaN propagates from non-finite input;
/// callers validate coordinate ranges.
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Distance between two positions in meters
#[inline]
pub fn distance_between(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Longitude offset in degrees spanning `meters` along the parallel at `lat`
///
/// Inverse of the haversine formula for two points sharing a latitude.
pub fn longitude_offset_for(lat: f64, meters: f64) -> f64 {
    let lat_rad = lat.to_radians();
    let half = (meters / (2.0 * EARTH_RADIUS_M)).sin() / lat_rad.cos();
    (2.0 * half.clamp(-1.0, 1.0).asin()).to_degrees()
}
