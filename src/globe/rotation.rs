use bevy::prelude::*;

use crate::drill::{DrillConfig, DrillController, DrillLevel};

use super::{GlobePointer, GlobeRoot, HoverState};

/// Vertical tilt limit, keeps the poles from flipping over the top.
const MAX_PITCH_RAD: f32 = 1.05;
const AUTO_SPIN_RAD_PER_SEC: f32 = 0.05;

/// Target-chasing rotation state. Drags move the target; the actual angles
/// ease toward it every frame so the globe never jitters.
#[derive(Resource, Default)]
pub struct GlobeRotation {
    pub yaw: f32,
    pub pitch: f32,
    pub target_yaw: f32,
    pub target_pitch: f32,
}

impl GlobeRotation {
    pub fn clamp_pitch(&mut self) {
        self.target_pitch = self.target_pitch.clamp(-MAX_PITCH_RAD, MAX_PITCH_RAD);
    }
}

/// Critically-damped approach factor for a frame of `dt` seconds.
pub fn damp_factor(smoothing: f32, dt: f32) -> f32 {
    1.0 - (-smoothing * dt).exp()
}

pub fn apply_globe_rotation(
    time: Res<Time>,
    config: Res<DrillConfig>,
    controller: Res<DrillController>,
    pointer: Res<GlobePointer>,
    hover: Res<HoverState>,
    mut rotation: ResMut<GlobeRotation>,
    mut globes: Query<&mut Transform, With<GlobeRoot>>,
) {
    if controller.displayed_level() != DrillLevel::Globe {
        return;
    }
    let dt = time.delta_secs();

    // Ambient spin while nobody is interacting; pauses on hover so a region
    // does not drift out from under the cursor.
    if !pointer.is_dragging() && *hover == HoverState::None && !controller.is_busy() {
        rotation.target_yaw += AUTO_SPIN_RAD_PER_SEC * dt;
    }

    let factor = damp_factor(config.rotation_smoothing, dt);
    rotation.yaw += (rotation.target_yaw - rotation.yaw) * factor;
    rotation.pitch += (rotation.target_pitch - rotation.pitch) * factor;

    for mut transform in &mut globes {
        transform.rotation =
            Quat::from_rotation_x(rotation.pitch) * Quat::from_rotation_y(rotation.yaw);
    }
}

/// Shrinks the globe slightly while the cross-fade curtain is up.
pub fn scale_globe_during_fade(
    controller: Res<DrillController>,
    mut globes: Query<&mut Transform, With<GlobeRoot>>,
) {
    let scale = 1.0 - 0.2 * controller.fade_alpha();
    for mut transform in &mut globes {
        transform.scale = Vec3::splat(scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_clamped_to_the_tilt_range() {
        let mut rotation = GlobeRotation::default();
        rotation.target_pitch = 3.0;
        rotation.clamp_pitch();
        assert_eq!(rotation.target_pitch, MAX_PITCH_RAD);
        rotation.target_pitch = -3.0;
        rotation.clamp_pitch();
        assert_eq!(rotation.target_pitch, -MAX_PITCH_RAD);
    }

    #[test]
    fn damping_approaches_but_never_overshoots() {
        let factor = damp_factor(8.0, 1.0 / 60.0);
        assert!(factor > 0.0 && factor < 1.0);
        // Larger frames converge harder, still without overshoot.
        assert!(damp_factor(8.0, 0.5) > factor);
        assert!(damp_factor(8.0, 10.0) <= 1.0);
    }

    #[test]
    fn repeated_damping_converges_on_the_target() {
        let mut yaw = 0.0_f32;
        let target = 1.0_f32;
        for _ in 0..240 {
            yaw += (target - yaw) * damp_factor(8.0, 1.0 / 60.0);
        }
        assert!((yaw - target).abs() < 1e-3);
    }
}
