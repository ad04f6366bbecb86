//! HUD overlay: object counts, date range, fetch status, FPS, range picker.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use chrono::Utc;

use crate::data::{DateRange, FeedQuery, FetchError, NormalizedObject};
use crate::scene::{AsteroidField, TrackerScene};

/// Editable range inputs plus the last input error.
#[derive(Resource, Default)]
pub struct HudState {
    pub start_input: String,
    pub end_input: String,
    pub input_error: Option<String>,
    synced: bool,
}

impl HudState {
    /// Parse the two inputs. An empty end means a single day.
    pub fn parse_range(&self) -> Result<DateRange, FetchError> {
        let end = Some(self.end_input.trim()).filter(|s| !s.is_empty());
        DateRange::resolve(
            Some(self.start_input.as_str()),
            end,
            Utc::now().date_naive(),
        )
    }

    fn sync_from(&mut self, range: DateRange) {
        self.start_input = range.start.to_string();
        self.end_input = range.end.to_string();
        self.synced = true;
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub total: usize,
    pub hazardous: usize,
}

impl FeedStats {
    pub fn from_items(items: &[NormalizedObject]) -> Self {
        Self {
            total: items.len(),
            hazardous: items.iter().filter(|o| o.hazardous).count(),
        }
    }
}

pub fn status_line(query: &FeedQuery) -> String {
    if let Some(err) = query.error() {
        format!("error: {err}")
    } else if query.is_loading() {
        "loading".to_string()
    } else if query.is_validating() {
        "refreshing".to_string()
    } else {
        "ready".to_string()
    }
}

pub fn hud_plugin(app: &mut App) {
    super::ensure_egui(app);
    if !app.is_plugin_added::<FrameTimeDiagnosticsPlugin>() {
        app.add_plugins(FrameTimeDiagnosticsPlugin);
    }
    app.init_resource::<HudState>()
        .add_systems(Update, hud_overlay_system);
}

fn hud_overlay_system(
    mut contexts: EguiContexts,
    mut hud: ResMut<HudState>,
    mut query: ResMut<FeedQuery>,
    field: Res<AsteroidField>,
    scene: Res<State<TrackerScene>>,
    mut next_scene: ResMut<NextState<TrackerScene>>,
    diagnostics: Res<DiagnosticsStore>,
) {
    if !hud.synced {
        if let Some(range) = query.range() {
            hud.sync_from(range);
        }
    }

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|d| d.smoothed())
        .unwrap_or(0.0);
    let stats = FeedStats::from_items(query.items());
    let status = status_line(&query);
    let mounted = *scene.get() == TrackerScene::Mounted;

    let mut load = false;
    let mut reload = false;

    egui::Window::new("Near-Earth Objects")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .frame(
            egui::Frame::default()
                .fill(egui::Color32::from_rgba_premultiplied(10, 10, 25, 210))
                .inner_margin(egui::Margin::same(12))
                .corner_radius(egui::CornerRadius::same(6)),
        )
        .show(contexts.ctx_mut(), |ui| {
            ui.style_mut().override_text_style = Some(egui::TextStyle::Monospace);
            ui.visuals_mut().override_text_color = Some(egui::Color32::from_rgb(200, 220, 240));

            ui.label(
                egui::RichText::new(format!("{} objects", stats.total))
                    .size(16.0)
                    .color(egui::Color32::from_rgb(136, 204, 255)),
            );
            ui.label(
                egui::RichText::new(format!("{} potentially hazardous", stats.hazardous))
                    .color(egui::Color32::from_rgb(230, 120, 100)),
            );
            ui.add_space(4.0);

            if let Some(range) = query.range() {
                ui.label(format!("Range  {} .. {}", range.start, range.end));
            }
            ui.label(format!("Shown  {}", field.count));
            let status_color = if query.error().is_some() {
                egui::Color32::from_rgb(230, 120, 100)
            } else {
                egui::Color32::from_rgb(140, 160, 180)
            };
            ui.label(egui::RichText::new(status).color(status_color));
            ui.add_space(4.0);

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Start");
                ui.add(egui::TextEdit::singleline(&mut hud.start_input).desired_width(100.0));
            });
            ui.horizontal(|ui| {
                ui.label("End  ");
                ui.add(egui::TextEdit::singleline(&mut hud.end_input).desired_width(100.0));
            });
            ui.horizontal(|ui| {
                load = ui.button("Load").clicked();
                reload = ui
                    .add_enabled(mounted, egui::Button::new("Reload scene"))
                    .clicked();
            });
            if let Some(err) = &hud.input_error {
                ui.label(
                    egui::RichText::new(err)
                        .size(11.0)
                        .color(egui::Color32::from_rgb(230, 120, 100)),
                );
            }

            ui.separator();
            ui.label(format!("FPS  {fps:.0}"));
        });

    if load {
        match hud.parse_range() {
            Ok(range) => {
                hud.input_error = None;
                query.request(range);
            }
            Err(err) => hud.input_error = Some(err.to_string()),
        }
    }
    if reload {
        next_scene.set(TrackerScene::Unmounted);
    }
}
