//! Builder for composing the tracker app.

use std::path::PathBuf;

use bevy::prelude::*;
use chrono::Utc;

use crate::camera::orbit_camera_plugin;
use crate::config;
use crate::data::{DateRange, FeedQuery, FeedSource};
use crate::render::{FieldRenderer, ProceduralRockRenderer, RendererResource};
use crate::scene::{scene_plugin, screenshot_plugin, FieldRng, ScreenshotMode};
use crate::ui::{hud_plugin, inspector_plugin, loading_plugin};

const SCREENSHOT_DELAY_FRAMES: u32 = 30;

/// Builder for the near-Earth object viewer.
pub struct TrackerBuilder {
    source: Option<FeedSource>,
    range: Option<DateRange>,
    seed: Option<u64>,
    renderer: Option<Box<dyn FieldRenderer>>,
    window_title: String,
    window_resolution: (f32, f32),
    clear_color: Color,
    screenshot: Option<PathBuf>,
    enable_orbit_camera: bool,
    enable_hud: bool,
    enable_inspector: bool,
    enable_loading_overlay: bool,
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self {
            source: None,
            range: None,
            seed: None,
            renderer: None,
            window_title: "NEO Tracker".to_string(),
            window_resolution: (1280.0, 720.0),
            clear_color: Color::srgb_u8(0x00, 0x00, 0x10),
            screenshot: None,
            enable_orbit_camera: true,
            enable_hud: true,
            enable_inspector: true,
            enable_loading_overlay: true,
        }
    }
}

impl TrackerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where objects come from. Defaults to the upstream feed configured
    /// from the environment.
    pub fn source(mut self, source: FeedSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Initial date range. Defaults to today through a week from today.
    pub fn range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Fix the random source so the field layout repeats between runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn renderer(mut self, renderer: impl FieldRenderer) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn window_resolution(mut self, width: f32, height: f32) -> Self {
        self.window_resolution = (width, height);
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Save a screenshot once the field is shown, then exit.
    pub fn screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot = Some(path.into());
        self
    }

    pub fn disable_orbit_camera(mut self) -> Self {
        self.enable_orbit_camera = false;
        self
    }

    pub fn disable_hud(mut self) -> Self {
        self.enable_hud = false;
        self
    }

    pub fn disable_inspector(mut self) -> Self {
        self.enable_inspector = false;
        self
    }

    pub fn disable_loading_overlay(mut self) -> Self {
        self.enable_loading_overlay = false;
        self
    }

    /// Build the Bevy app and issue the first feed request.
    pub fn build(self) -> App {
        let source = self
            .source
            .unwrap_or_else(|| FeedSource::Upstream(config::feed_config()));
        let range = self
            .range
            .unwrap_or_else(|| DateRange::week_from(Utc::now().date_naive()));
        let rng = self.seed.map_or_else(FieldRng::default, FieldRng::seeded);
        let renderer = self
            .renderer
            .unwrap_or_else(|| Box::new(ProceduralRockRenderer::default()));

        info!(source = %source.describe(), start = %range.start, end = %range.end, "starting viewer");
        let mut query = FeedQuery::new(source);
        query.request(range);

        let mut app = App::new();
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: self.window_title,
                resolution: self.window_resolution.into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(self.clear_color))
        .insert_resource(query)
        .insert_resource(rng);

        renderer.setup(&mut app);
        app.insert_resource(RendererResource(renderer))
            .add_plugins(scene_plugin);

        if self.enable_orbit_camera {
            app.add_plugins(orbit_camera_plugin);
        }
        if self.enable_hud {
            app.add_plugins(hud_plugin);
        }
        if self.enable_inspector {
            app.add_plugins(inspector_plugin);
        }
        if self.enable_loading_overlay {
            app.add_plugins(loading_plugin);
        }
        if let Some(path) = self.screenshot {
            app.insert_resource(ScreenshotMode::new(path, SCREENSHOT_DELAY_FRAMES))
                .add_plugins(screenshot_plugin);
        }

        app
    }
}
