//! Small 2D helpers on top of `nalgebra::Vector2<f64>`
//!
//! The simulation works in double precision; only the display buffers
//! drop down to `f32`.

use nalgebra::Vector2;

pub type NVec2 = Vector2<f64>;

/// Vector pointing from `b` to `a`
#[inline]
pub fn difference(a: &NVec2, b: &NVec2) -> NVec2 {
    a - b
}

#[inline]
pub fn length_squared(v: &NVec2) -> f64 {
    v.x * v.x + v.y * v.y
}

/// Direction of `v` in radians, measured from +x (atan2 convention)
#[inline]
pub fn angle(v: &NVec2) -> f64 {
    v.y.atan2(v.x)
}

/// Point at distance `r` from the origin in direction `angle`
#[inline]
pub fn from_polar(r: f64, angle: f64) -> NVec2 {
    NVec2::new(r * angle.cos(), r * angle.sin())
}

/// Unit vector perpendicular to the radial direction `angle`, clockwise
#[inline]
pub fn tangent(angle: f64) -> NVec2 {
    NVec2::new(angle.sin(), -angle.cos())
}

#[inline]
pub fn to_display(v: &NVec2) -> [f32; 2] {
    [v.x as f32, v.y as f32]
}
