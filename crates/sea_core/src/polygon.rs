use std::f64::consts::PI;

use log::info;
use serde::{Deserialize, Serialize};

use crate::geometry::{LatLng, Vector3D};

/// Closed ring on the sphere, e.g. a coastline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Vector3D>,
    top: f64,
    bottom: f64,
    left: f64,
    right: f64,
}

impl Polygon {
    pub fn new(vertices: &[LatLng]) -> Self {
        let mut top = f64::MIN;
        let mut bottom = f64::MAX;
        let mut left = f64::MAX;
        let mut right = f64::MIN;

        for vertex in vertices {
            top = top.max(vertex.lat);
            bottom = bottom.min(vertex.lat);
            left = left.min(vertex.lng);
            right = right.max(vertex.lng);
        }

        Polygon {
            points: vertices.iter().map(|v| Vector3D::from_lat_lng(*v)).collect(),
            top,
            bottom,
            left,
            right,
        }
    }

    /// Builds one polygon per ring of `(lat, lon)` pairs. Rings with less than
    /// three vertices are dropped.
    pub fn from_rings(rings: &[Vec<[f64; 2]>]) -> Vec<Polygon> {
        let polygons: Vec<Polygon> = rings
            .iter()
            .filter(|ring| ring.len() >= 3)
            .map(|ring| {
                let vertices: Vec<LatLng> = ring.iter().map(|p| LatLng::from(*p)).collect();
                Polygon::new(&vertices)
            })
            .collect();
        info!(
            "Created {} polygons from {} rings",
            polygons.len(),
            rings.len()
        );
        polygons
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn in_bounding_box(&self, position: LatLng) -> bool {
        position.lat >= self.bottom
            && position.lat <= self.top
            && position.lng >= self.left
            && position.lng <= self.right
    }

    /// Point in polygon test summing up the angles the edges span as seen
    /// from `position`. The sum is +-2pi inside and 0 outside.
    pub fn contains(&self, position: LatLng) -> bool {
        if self.points.len() < 3 || !self.in_bounding_box(position) {
            return false;
        }

        let p = Vector3D::from_lat_lng(position);
        let size = self.points.len();
        let sum: f64 = (0..size)
            .map(|i| {
                let first = p - self.points[i];
                let second = p - self.points[(i + 1) % size];
                first.angle_between(&second, &p)
            })
            .sum();

        sum.abs() > PI
    }
}
