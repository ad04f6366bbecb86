//! Damped orbit camera around the origin: drag to rotate, scroll to zoom.

use std::f32::consts::FRAC_PI_2;

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::scene::TrackerScene;

pub const DAMPING: f32 = 0.05;
const ROTATE_SPEED: f32 = 0.005;
const ZOOM_SPEED: f32 = 0.1;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Spherical camera state. `target_*` follow input, the current values ease
/// toward them by `damping` each frame.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target_yaw: f32,
    pub target_pitch: f32,
    pub target_distance: f32,
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    /// Looking at the origin from (0, 0, 350).
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: 350.0,
            target_yaw: 0.0,
            target_pitch: 0.0,
            target_distance: 350.0,
            damping: DAMPING,
            min_distance: 130.0,
            max_distance: 1500.0,
        }
    }
}

impl OrbitCamera {
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.distance * self.pitch.cos() * self.yaw.sin(),
            self.distance * self.pitch.sin(),
            self.distance * self.pitch.cos() * self.yaw.cos(),
        )
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(Vec3::ZERO, Vec3::Y)
    }

    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.target_yaw += delta_yaw;
        self.target_pitch = (self.target_pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// `factor > 1` moves away from the origin.
    pub fn zoom(&mut self, factor: f32) {
        self.target_distance =
            (self.target_distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// One damping step toward the targets.
    pub fn step(&mut self) {
        self.yaw += (self.target_yaw - self.yaw) * self.damping;
        self.pitch += (self.target_pitch - self.pitch) * self.damping;
        self.distance += (self.target_distance - self.distance) * self.damping;
    }
}

pub fn orbit_camera_plugin(app: &mut App) {
    crate::ui::ensure_egui(app);
    app.add_systems(
        Update,
        orbit_camera_system.run_if(in_state(TrackerScene::Mounted)),
    );
}

fn orbit_camera_system(
    mouse: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    mut contexts: EguiContexts,
    mut cameras: Query<(&mut OrbitCamera, &mut Transform)>,
) {
    let over_ui = contexts.ctx_mut().wants_pointer_input();
    let drag = if mouse.pressed(MouseButton::Left) && !over_ui {
        motion.delta
    } else {
        Vec2::ZERO
    };
    let wheel = if over_ui {
        0.0
    } else {
        match scroll.unit {
            MouseScrollUnit::Line => scroll.delta.y,
            MouseScrollUnit::Pixel => scroll.delta.y / 40.0,
        }
    };

    for (mut orbit, mut transform) in &mut cameras {
        if drag != Vec2::ZERO {
            orbit.rotate(-drag.x * ROTATE_SPEED, drag.y * ROTATE_SPEED);
        }
        if wheel != 0.0 {
            orbit.zoom(1.0 - wheel * ZOOM_SPEED);
        }
        orbit.step();
        *transform = orbit.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sits_on_positive_z() {
        let orbit = OrbitCamera::default();
        assert!((orbit.position() - Vec3::new(0.0, 0.0, 350.0)).length() < 1e-3);
    }

    #[test]
    fn damping_eases_toward_target() {
        let mut orbit = OrbitCamera::default();
        orbit.rotate(1.0, 0.0);

        orbit.step();
        assert!((orbit.yaw - 0.05).abs() < 1e-6);

        for _ in 0..200 {
            orbit.step();
        }
        assert!((orbit.yaw - 1.0).abs() < 1e-3);
    }

    #[test]
    fn pitch_and_distance_are_clamped() {
        let mut orbit = OrbitCamera::default();
        orbit.rotate(0.0, 10.0);
        orbit.zoom(100.0);

        assert!(orbit.target_pitch < FRAC_PI_2);
        assert_eq!(orbit.target_distance, orbit.max_distance);

        orbit.zoom(0.0);
        assert_eq!(orbit.target_distance, orbit.min_distance);
    }
}
