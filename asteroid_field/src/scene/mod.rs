pub(crate) mod field;
pub(crate) mod globe;
pub(crate) mod lifecycle;
pub(crate) mod materials;
pub(crate) mod screenshot;

use bevy::prelude::*;

pub use field::{advance_euler, euler_quat, Asteroid, AsteroidField, AsteroidGroup, FieldRng};
pub use globe::{Atmosphere, Globe, Starfield};
pub use lifecycle::{LoadingTimer, SceneLifecycle, ScenePhase, TrackerScene};
pub use materials::RockPalette;
pub use screenshot::{screenshot_plugin, ScreenshotMode};

/// States, mount/unmount, field rebuilds, and per-frame animation.
/// Expects `FeedQuery`, `FieldRng`, and `RendererResource` to be inserted.
pub fn scene_plugin(app: &mut App) {
    app.init_state::<TrackerScene>()
        .add_sub_state::<ScenePhase>()
        .enable_state_scoped_entities::<TrackerScene>()
        .init_resource::<SceneLifecycle>()
        .init_resource::<AsteroidField>()
        .add_systems(
            OnEnter(TrackerScene::Mounted),
            (
                lifecycle::mount_scene,
                globe::spawn_globe,
                globe::spawn_starfield,
            )
                .chain(),
        )
        .add_systems(OnExit(TrackerScene::Mounted), lifecycle::unmount_scene)
        .add_systems(Update, lifecycle::sync_feed)
        .add_systems(
            Update,
            (
                lifecycle::tick_loading.run_if(in_state(ScenePhase::Loading)),
                field::rebuild_field,
                field::spin_asteroids,
                field::rotate_group,
                globe::rotate_globe,
            )
                .after(lifecycle::sync_feed)
                .run_if(in_state(TrackerScene::Mounted)),
        );
}
