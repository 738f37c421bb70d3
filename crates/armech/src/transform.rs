//! Homogeneous transform helpers
//!
//! Poses are plain `Matrix4<f64>` values with a bottom row of `[0, 0, 0, 1]`.
//! These helpers build them from rotation/translation parts, split them back
//! apart, and flatten them for renderers.

use nalgebra::{Matrix3, Matrix4, Vector3};

/// Build a homogeneous transform from a rotation block and a translation
pub fn homogeneous(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Matrix4<f64> {
    let mut transform = Matrix4::identity();
    transform.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
    transform.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
    transform
}

/// Rotation block (upper-left 3x3) of a homogeneous transform
pub fn rotation_part(transform: &Matrix4<f64>) -> Matrix3<f64> {
    transform.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Translation column of a homogeneous transform
pub fn translation_part(transform: &Matrix4<f64>) -> Vector3<f64> {
    transform.fixed_view::<3, 1>(0, 3).into_owned()
}

/// Rotation about the z axis
pub fn rot_z(angle: f64) -> Matrix4<f64> {
    let (s, c) = angle.sin_cos();
    Matrix4::new(
        c, -s, 0.0, 0.0, //
        s, c, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Rotation about the x axis
pub fn rot_x(angle: f64) -> Matrix4<f64> {
    let (s, c) = angle.sin_cos();
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0, //
        0.0, c, -s, 0.0, //
        0.0, s, c, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Flatten a transform into a column-major array (Eigen and OpenGL layout)
pub fn to_column_major(transform: &Matrix4<f64>) -> [f64; 16] {
    let mut result = [0.0; 16];
    for col in 0..4 {
        for row in 0..4 {
            result[col * 4 + row] = transform[(row, col)];
        }
    }
    result
}

/// Nested row-major rows, the layout used in robot description files and reports
pub fn to_rows(transform: &Matrix4<f64>) -> [[f64; 4]; 4] {
    let mut rows = [[0.0; 4]; 4];
    for (row, out) in rows.iter_mut().enumerate() {
        for (col, value) in out.iter_mut().enumerate() {
            *value = transform[(row, col)];
        }
    }
    rows
}

/// True when `RᵀR` is within `tolerance` of identity and `det(R)` is positive
pub fn is_orthonormal(rotation: &Matrix3<f64>, tolerance: f64) -> bool {
    let residual = (rotation.transpose() * rotation - Matrix3::identity()).amax();
    residual <= tolerance && rotation.determinant() > 0.0
}
