//! Homogeneous-matrix helpers.
//!
//! Matrices follow nalgebra's column-vector convention: a point is mapped by
//! `m * p`, and a child's world matrix is `parent_world * local`.

use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3};

/// 4x4 homogeneous transform.
pub type Mat4 = Matrix4<f64>;
/// 3D vector / point coordinates.
pub type Vec3 = Vector3<f64>;

/// Pure translation matrix.
pub fn from_translation(translation: Vec3) -> Mat4 {
    Mat4::new_translation(&translation)
}

/// Translation followed by an XYZ euler rotation given in degrees.
pub fn from_translation_euler_degrees(translation: Vec3, rotation: Vec3) -> Mat4 {
    let rotation = Rotation3::from_euler_angles(
        rotation.x.to_radians(),
        rotation.y.to_radians(),
        rotation.z.to_radians(),
    );
    from_translation(translation) * rotation.to_homogeneous()
}

/// Origin of a transform.
pub fn translation(m: &Mat4) -> Vec3 {
    Vec3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

/// Replace the origin of a transform, keeping its linear part.
pub fn set_translation(m: &mut Mat4, translation: Vec3) {
    m[(0, 3)] = translation.x;
    m[(1, 3)] = translation.y;
    m[(2, 3)] = translation.z;
}

/// Upper-left 3x3 (rotation and scale) part.
pub fn linear(m: &Mat4) -> Matrix3<f64> {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Local basis axis `column` (0 = X, 1 = Y, 2 = Z) expressed in world space.
pub fn axis(m: &Mat4, column: usize) -> Vec3 {
    Vec3::new(m[(0, column)], m[(1, column)], m[(2, column)])
}

/// Per-axis scale, i.e. the lengths of the three basis columns.
pub fn axis_scales(m: &Mat4) -> Vec3 {
    Vec3::new(axis(m, 0).norm(), axis(m, 1).norm(), axis(m, 2).norm())
}

/// Assemble a transform from a linear part and an origin.
pub fn compose(linear: &Matrix3<f64>, origin: Vec3) -> Mat4 {
    let mut m = linear.to_homogeneous();
    set_translation(&mut m, origin);
    m
}

/// Whether `m` equals the identity within `epsilon` per element.
pub fn is_identity(m: &Mat4, epsilon: f64) -> bool {
    (m - Mat4::identity()).amax() <= epsilon
}
