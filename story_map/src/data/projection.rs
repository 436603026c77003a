//! Spherical Web Mercator, the projection the base map tiles use.

use bevy::math::{DVec2, Vec2};

const EARTH_RADIUS: f64 = 6_378_137.0;
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Map units per pixel at zoom 0 for 256 px tiles.
pub const ZOOM0_RESOLUTION: f64 = 156_543.033_928_040_97;

/// `[lon, lat]` in degrees to map units (meters).
pub fn project(lon_lat: DVec2) -> Vec2 {
    let lat = lon_lat.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = EARTH_RADIUS * lon_lat.x.to_radians();
    let y = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
    Vec2::new(x as f32, y as f32)
}

/// Inverse of [`project`].
pub fn unproject(map: Vec2) -> DVec2 {
    let lon = (map.x as f64 / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (map.y as f64 / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    DVec2::new(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_origin() {
        assert!(project(DVec2::ZERO).length() < 1e-3);
    }

    #[test]
    fn continental_us_center_matches_exhibit_view() {
        // The exhibit opens on roughly [-98.8, 39.7], stored as -10997148, 4814500.
        let p = project(DVec2::new(-98.79, 39.66));
        assert!((p.x - -10_997_148.0).abs() < 2_000.0, "x was {}", p.x);
        assert!((p.y - 4_814_500.0).abs() < 5_000.0, "y was {}", p.y);
    }

    #[test]
    fn unproject_inverts_project() {
        let lon_lat = DVec2::new(-109.5, 36.1);
        let back = unproject(project(lon_lat));
        assert!((back - lon_lat).length() < 1e-3);
    }
}
