//! Millimeter / point conversion
//!
//! PDF user space is measured in points: 72 pt = 1 inch = 25.4 mm.

/// Points per millimeter
pub const MM_TO_POINTS: f64 = 72.0 / 25.4;

/// Convert millimeters to points
pub fn mm_to_points(mm: f64) -> f64 {
    mm * MM_TO_POINTS
}

/// Convert points to millimeters
pub fn points_to_mm(points: f64) -> f64 {
    points / MM_TO_POINTS
}
