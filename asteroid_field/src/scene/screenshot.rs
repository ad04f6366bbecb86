//! Auto-screenshot: once the field is on screen, wait N frames, capture, exit.

use std::path::PathBuf;

use bevy::prelude::*;
use bevy::render::view::screenshot::{save_to_disk, Screenshot};

use crate::scene::lifecycle::ScenePhase;

/// Counts down frames after the scene turns Ready, then captures and exits.
#[derive(Resource)]
pub struct ScreenshotMode {
    pub path: PathBuf,
    pub frames_remaining: u32,
    pub captured: bool,
}

impl ScreenshotMode {
    pub fn new(path: PathBuf, delay_frames: u32) -> Self {
        Self {
            path,
            frames_remaining: delay_frames,
            captured: false,
        }
    }

    /// Advance one frame. Returns true on the frame the capture should happen.
    fn tick(&mut self) -> bool {
        if self.captured {
            return false;
        }
        if self.frames_remaining > 0 {
            self.frames_remaining -= 1;
            return false;
        }
        self.captured = true;
        true
    }
}

pub fn auto_screenshot_system(
    mut commands: Commands,
    mut mode: ResMut<ScreenshotMode>,
    mut exit: EventWriter<AppExit>,
) {
    if mode.captured {
        exit.send(AppExit::Success);
        return;
    }
    if !mode.tick() {
        return;
    }

    info!(path = %mode.path.display(), "capturing screenshot");
    commands
        .spawn(Screenshot::primary_window())
        .observe(save_to_disk(mode.path.clone()));
}

pub fn screenshot_plugin(app: &mut App) {
    app.add_systems(
        Update,
        auto_screenshot_system.run_if(in_state(ScenePhase::Ready)),
    );
}
