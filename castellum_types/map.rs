use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A position on the game grid, optionally anchored to a real-world location.
///
/// Game distance is planar on `(x, y)`; real-world distance is great-circle on
/// latitude/longitude. The two are never mixed.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geohash: Option<String>,
}

impl Coordinates {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn with_geo(self, latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..self
        }
    }

    pub fn with_elevation(self, elevation: f64) -> Self {
        Self {
            elevation: Some(elevation),
            ..self
        }
    }

    pub fn with_geohash(self, geohash: impl Into<String>) -> Self {
        Self {
            geohash: Some(geohash.into()),
            ..self
        }
    }

    /// Euclidean distance on the game grid.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_within_radius(&self, other: &Coordinates, radius: f64) -> bool {
        self.distance_to(other) <= radius
    }

    /// Haversine distance in kilometers, `None` when either side lacks latitude/longitude.
    pub fn real_world_distance_to(&self, other: &Coordinates) -> Option<f64> {
        let (lat1, lon1) = self.lat_lon()?;
        let (lat2, lon2) = other.lat_lon()?;

        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lon = (lon2 - lon1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.to_radians().cos() * lat2.to_radians().cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        Some(EARTH_RADIUS_KM * c)
    }

    pub fn is_within_real_world_radius(&self, other: &Coordinates, radius_km: f64) -> bool {
        self.real_world_distance_to(other)
            .is_some_and(|distance| distance <= radius_km)
    }

    /// Initial great-circle bearing in degrees, normalized to `[0, 360)`.
    pub fn bearing_to(&self, other: &Coordinates) -> Option<f64> {
        let (lat1, lon1) = self.lat_lon()?;
        let (lat2, lon2) = other.lat_lon()?;

        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();
        let delta_lon = (lon2 - lon1).to_radians();

        let y = delta_lon.sin() * phi2.cos();
        let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lon.cos();

        Some(y.atan2(x).to_degrees().rem_euclid(360.0))
    }

    /// Seconds needed to travel to `other` at `speed` fields per hour.
    pub fn travel_time_secs(&self, other: &Coordinates, speed: u8, server_speed: u8) -> u32 {
        let distance = self.distance_to(other);
        if distance == 0.0 {
            return 0;
        }

        let speed = speed.max(1) as f64;
        let server_speed = server_speed.max(1) as f64;
        let travel_time_secs = distance / speed * 3600.0 / server_speed;

        (travel_time_secs.floor() as u32).max(1)
    }

    fn lat_lon(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}
