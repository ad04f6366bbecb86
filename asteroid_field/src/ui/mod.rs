mod hud;
mod inspector;
mod loading;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub use hud::hud_plugin;
pub use inspector::{format_metric, inspector_plugin, SelectedAsteroid};
pub use loading::loading_plugin;

/// Each UI plugin can be enabled on its own; egui goes in once.
pub(crate) fn ensure_egui(app: &mut App) {
    if !app.is_plugin_added::<EguiPlugin>() {
        app.add_plugins(EguiPlugin);
    }
}
