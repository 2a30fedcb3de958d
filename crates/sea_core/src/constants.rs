/// Edge weight type, distances are stored in centimetres
pub type Distance = u64;
/// Contraction level of a node. Level 0 means not contracted yet
pub type Level = u32;

/// Distance of a node that has not been reached (yet)
pub const UNREACHABLE: Distance = Distance::MAX;

/// Mean earth radius used for all great circle distances
pub const EARTH_RADIUS_IN_METERS: f64 = 6_371_000.0;

/// Everything south of this latitude is treated as land (Antarctic ice shelf)
pub const ANTARCTIC_LATITUDE: f64 = -79.0;
