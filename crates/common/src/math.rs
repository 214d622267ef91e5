use glam::{EulerRot, Mat3, Quat, Vec3};

/// Build an orientation quaternion from pitch/yaw/roll Euler angles (radians).
///
/// Rotation order is roll (Z), then pitch (X), then yaw (Y), matching the
/// scene graph's composition convention.
pub fn quat_from_euler(euler: Vec3) -> Quat {
    Quat::from_euler(EulerRot::YXZ, euler.y, euler.x, euler.z)
}

/// Recover pitch/yaw/roll Euler angles from a quaternion.
///
/// Goes through the equivalent rotation matrix and maps entries with
/// asin/atan2. Ambiguous near ±90° pitch (gimbal lock); that is an accepted
/// limitation of Euler storage, not something this function papers over.
pub fn quat_to_euler(quat: Quat) -> Vec3 {
    let m = Mat3::from_quat(quat.normalize());

    let pitch = (-m.z_axis.y).clamp(-1.0, 1.0).asin();
    let yaw = m.z_axis.x.atan2(m.z_axis.z);
    let roll = m.x_axis.y.atan2(m.y_axis.y);

    Vec3::new(pitch, yaw, roll)
}
