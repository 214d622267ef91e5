use glam::{Mat4, Vec3};
use marbleworks_common::NodeId;
use marbleworks_scene::TransformGraph;

use crate::renderer::RenderView;

/// Third-person orbit camera built out of two transform nodes.
///
/// A pivot node tracks the followed target; an arm node hangs off the pivot
/// at a fixed offset. Orbiting rotates the pivot, so the arm sweeps around
/// the target and the view matrix falls out of the arm's world matrix.
pub struct OrbitCamera {
    pivot: NodeId,
    arm: NodeId,
    distance: f32,
    pitch: f32,
    yaw: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl OrbitCamera {
    /// Pitch is clamped short of straight up/down to keep the view matrix
    /// invertible.
    const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.05;

    /// Create the pivot and arm nodes in the scene graph, with the arm
    /// `distance` units behind the pivot.
    pub fn new(scene: &mut TransformGraph, distance: f32) -> Self {
        let pivot = scene.insert();
        let arm = scene.insert();
        scene.add_child(pivot, arm);
        scene.set_position(arm, Vec3::new(0.0, 0.0, -distance));

        Self {
            pivot,
            arm,
            distance,
            pitch: 0.0,
            yaw: 0.0,
            fov_degrees: 60.0,
        }
    }

    pub fn pivot(&self) -> NodeId {
        self.pivot
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Rotate the view around the target by the given pitch/yaw deltas in
    /// radians.
    pub fn orbit(&mut self, scene: &mut TransformGraph, delta_pitch: f32, delta_yaw: f32) {
        self.pitch = (self.pitch + delta_pitch).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        self.yaw += delta_yaw;
        scene.set_rotation(self.pivot, Vec3::new(self.pitch, self.yaw, 0.0));
    }

    /// Move the pivot onto the followed target's position.
    pub fn follow(&self, scene: &mut TransformGraph, target: Vec3) {
        scene.set_position(self.pivot, target);
    }

    /// Camera position in world space.
    pub fn eye(&self, scene: &mut TransformGraph) -> Option<Vec3> {
        let world = scene.world_matrix(self.arm)?;
        let (_, _, translation) = world.to_scale_rotation_translation();
        Some(translation)
    }

    /// View matrix: the inverse of the arm node's world matrix.
    pub fn view_matrix(&self, scene: &mut TransformGraph) -> Option<Mat4> {
        scene.world_matrix(self.arm).map(|world| world.inverse())
    }

    /// Right-handed perspective projection for the given aspect ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, 0.1, 1000.0)
    }

    /// Snapshot the camera as a [`RenderView`] for renderer-agnostic code.
    pub fn view(&self, scene: &mut TransformGraph) -> RenderView {
        let eye = self.eye(scene).unwrap_or(Vec3::new(0.0, 10.0, 10.0));
        let target = scene
            .position(self.pivot)
            .unwrap_or(Vec3::ZERO);
        RenderView {
            eye,
            target,
            fov_degrees: self.fov_degrees,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_sits_behind_the_pivot() {
        let mut scene = TransformGraph::new();
        let camera = OrbitCamera::new(&mut scene, 8.0);
        let eye = camera.eye(&mut scene).unwrap();
        assert!((eye - Vec3::new(0.0, 0.0, -8.0)).length() < 1e-5);
    }

    #[test]
    fn orbit_preserves_distance_to_target() {
        let mut scene = TransformGraph::new();
        let mut camera = OrbitCamera::new(&mut scene, 8.0);
        camera.follow(&mut scene, Vec3::new(3.0, 1.0, -2.0));

        for _ in 0..10 {
            camera.orbit(&mut scene, 0.11, 0.37);
            let eye = camera.eye(&mut scene).unwrap();
            let dist = (eye - Vec3::new(3.0, 1.0, -2.0)).length();
            assert!((dist - 8.0).abs() < 1e-3, "distance drifted to {dist}");
        }
    }

    #[test]
    fn pitch_is_clamped_short_of_vertical() {
        let mut scene = TransformGraph::new();
        let mut camera = OrbitCamera::new(&mut scene, 5.0);
        camera.orbit(&mut scene, 10.0, 0.0);
        let eye = camera.eye(&mut scene).unwrap();
        // Never directly overhead: some horizontal offset must remain
        assert!(eye.truncate().length() > 0.1 || eye.z.abs() > 0.1);
        assert!(camera.view_matrix(&mut scene).is_some());
    }

    #[test]
    fn follow_recenters_the_view() {
        let mut scene = TransformGraph::new();
        let camera = OrbitCamera::new(&mut scene, 4.0);
        camera.follow(&mut scene, Vec3::new(10.0, 0.0, 0.0));
        let view = camera.view(&mut scene);
        assert_eq!(view.target, Vec3::new(10.0, 0.0, 0.0));
        let eye = camera.eye(&mut scene).unwrap();
        assert!((eye - Vec3::new(10.0, 0.0, -4.0)).length() < 1e-5);
    }
}
