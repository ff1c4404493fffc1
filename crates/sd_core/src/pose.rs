use bevy::prelude::*;

pub fn vec3_to_array(v: Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

pub fn vec3_from_array(a: [f32; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

/// Quaternion as `[x, y, z, w]`.
pub fn quat_to_array(q: Quat) -> [f32; 4] {
    [q.x, q.y, q.z, q.w]
}

pub fn quat_from_array(a: [f32; 4]) -> Quat {
    Quat::from_xyzw(a[0], a[1], a[2], a[3])
}

/// Compare two transforms component-wise within `epsilon`.
///
/// Rotations are compared as orientations, so `q` and `-q` are equal.
pub fn pose_approx_eq(a: &Transform, b: &Transform, epsilon: f32) -> bool {
    a.translation.abs_diff_eq(b.translation, epsilon)
        && a.scale.abs_diff_eq(b.scale, epsilon)
        && (a.rotation.abs_diff_eq(b.rotation, epsilon)
            || a.rotation.abs_diff_eq(-b.rotation, epsilon))
}
