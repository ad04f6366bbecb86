use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::scene::{LoadingTimer, ScenePhase};

pub fn loading_plugin(app: &mut App) {
    super::ensure_egui(app);
    app.add_systems(
        Update,
        loading_overlay_system.run_if(in_state(ScenePhase::Loading)),
    );
}

fn loading_overlay_system(mut contexts: EguiContexts, timer: Option<Res<LoadingTimer>>) {
    let progress = timer.map_or(0.0, |t| t.0.fraction());

    egui::Area::new(egui::Id::new("loading-overlay"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut(), |ui| {
            egui::Frame::default()
                .fill(egui::Color32::from_rgba_premultiplied(0, 0, 16, 230))
                .inner_margin(egui::Margin::same(24))
                .corner_radius(egui::CornerRadius::same(8))
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new("Loading asteroid field...")
                            .size(20.0)
                            .color(egui::Color32::from_rgb(200, 220, 240)),
                    );
                    ui.add_space(8.0);
                    ui.add(
                        egui::ProgressBar::new(progress)
                            .desired_width(240.0)
                            .fill(egui::Color32::from_rgb(136, 204, 255)),
                    );
                });
        });
}
