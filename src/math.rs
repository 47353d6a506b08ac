/// WEIRD Project
/// `File` math.rs
/// `Description` Math utilities implementation module
/// `Author` TioT2
/// `Last changed` 16.10.2026

pub use glam::{Affine2, Mat2, Mat4, Vec2, Vec3, Vec4};

/// Common floating point tolerance for map geometry
pub const EPSILON: f32 = 1e-5;

/// 2D extent representation structure
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ext2<T> {
    pub width: T,
    pub height: T,
} // struct Ext2

pub type Ext2su = Ext2<usize>;

/// 2D cross product (z component of the 3D one)
/// * `a` - first vector
/// * `b` - second vector
/// * Returns a.x * b.y - a.y * b.x
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
} // fn cross

/// Signed area of the `a`, `b`, `c` triangle doubled. Positive for CCW triangles.
#[inline]
pub fn orient(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    cross(b - a, c - a)
} // fn orient

/// Horizontal (XY) part of 3D vector
#[inline]
pub fn xy(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.y)
} // fn xy

/// Affine2 applied to XY part of a point, Z passes through.
#[inline]
pub fn transform_point3(transform: &Affine2, p: Vec3) -> Vec3 {
    transform.transform_point2(xy(p)).extend(p.z)
} // fn transform_point3

/// Affine2 applied to XY part of a direction, Z passes through.
#[inline]
pub fn transform_vector3(transform: &Affine2, v: Vec3) -> Vec3 {
    transform.transform_vector2(xy(v)).extend(v.z)
} // fn transform_vector3

/// Rigid 2D transform lifted to 3D (rotation about Z + XY translation)
pub fn affine2_to_mat4(transform: &Affine2) -> Mat4 {
    let m = transform.matrix2;
    let t = transform.translation;

    Mat4::from_cols(
        Vec4::new(m.x_axis.x, m.x_axis.y, 0.0, 0.0),
        Vec4::new(m.y_axis.x, m.y_axis.y, 0.0, 0.0),
        Vec4::Z,
        Vec4::new(t.x, t.y, 0.0, 1.0),
    )
} // fn affine2_to_mat4

/// Rotation angle of rigid transform
pub fn affine2_angle(transform: &Affine2) -> f32 {
    let x = transform.matrix2.x_axis;
    x.y.atan2(x.x)
} // fn affine2_angle

/// Angle normalization into [-PI; PI] range
pub fn wrap_angle(angle: f32) -> f32 {
    let tau = std::f32::consts::TAU;
    (angle + std::f32::consts::PI).rem_euclid(tau) - std::f32::consts::PI
} // fn wrap_angle

/// Approximate rigid transform equality
pub fn affine2_approx_eq(a: &Affine2, b: &Affine2, tolerance: f32) -> bool {
    a.abs_diff_eq(*b, tolerance)
} // fn affine2_approx_eq


// file math.rs
