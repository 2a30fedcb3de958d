//! Coordinates on the sphere and the 3D vector math used for distances and
//! point in polygon tests.
use std::ops::Sub;

use serde::{Deserialize, Serialize};

use crate::constants::{Distance, EARTH_RADIUS_IN_METERS};

/// Position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        LatLng { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3D { x, y, z }
    }

    /// Unit vector pointing to `position`
    pub fn from_lat_lng(position: LatLng) -> Self {
        let lat = position.lat.to_radians();
        let lng = position.lng.to_radians();
        Vector3D {
            x: lat.cos() * lng.cos(),
            y: lat.cos() * lng.sin(),
            z: lat.sin(),
        }
    }

    pub fn dot(&self, other: &Vector3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3D) -> Vector3D {
        Vector3D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn normalize(&self) -> Vector3D {
        let length = self.length();
        if length == 0.0 {
            return *self;
        }
        Vector3D::new(self.x / length, self.y / length, self.z / length)
    }

    /// Signed angle from `self` to `other`, seen from the tip of `normal`
    pub fn angle_between(&self, other: &Vector3D, normal: &Vector3D) -> f64 {
        let cross = self.cross(other);
        let angle = cross.length().atan2(self.dot(other));
        if cross.dot(normal) < 0.0 {
            -angle
        } else {
            angle
        }
    }

    /// Great circle distance in metres between two unit vectors
    pub fn distance_to(&self, other: &Vector3D) -> f64 {
        self.cross(other).length().atan2(self.dot(other)) * EARTH_RADIUS_IN_METERS
    }
}

impl Sub for Vector3D {
    type Output = Vector3D;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Great circle distance in metres
pub fn distance_between(a: LatLng, b: LatLng) -> f64 {
    Vector3D::from_lat_lng(a).distance_to(&Vector3D::from_lat_lng(b))
}

/// Great circle distance rounded to whole centimetres
pub fn distance_in_cm(a: LatLng, b: LatLng) -> Distance {
    (distance_between(a, b) * 100.0).round() as Distance
}
