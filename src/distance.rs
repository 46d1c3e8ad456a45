// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Radius of Earth, in miles.
/// Source: https://www.movable-type.co.uk/scripts/latlong.html
const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Calculates the great-circle distance between two lat-lon positions
/// on Earth using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in miles.
///
/// The result is symmetric in its arguments, zero for identical positions,
/// and satisfies the triangle inequality on the sphere. Route finding relies
/// on the last property: the crow-flies distance to a destination never
/// overestimates the remaining travel cost.
pub fn earth_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let sin_dphi_half = (dphi * 0.5).sin();
    let sin_dlambda_half = (dlambda * 0.5).sin();

    let a = sin_dphi_half * sin_dphi_half
        + phi1.cos() * phi2.cos() * sin_dlambda_half * sin_dlambda_half;
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Calculates the initial bearing between two lat-lon positions, in degrees
/// in the range `(-180, 180]`. The initial bearing is the angle that, if
/// followed in a straight line along a great-circle arc from the first
/// position, would lead to the second one.
/// Source: https://www.movable-type.co.uk/scripts/latlong.html
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();

    y.atan2(x).to_degrees()
}
