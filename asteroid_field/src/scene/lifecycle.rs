//! Scene mount/unmount, the fixed loading phase, and lifecycle bookkeeping.

use bevy::prelude::*;

use crate::camera::OrbitCamera;
use crate::data::FeedQuery;
use crate::scene::field::{teardown_field, AsteroidField, FieldRng};
use crate::scene::materials::RockPalette;

pub const LOADING_SECS: f32 = 2.0;

/// Whether the 3D scene currently owns a camera, lights, and a field.
#[derive(States, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackerScene {
    #[default]
    Unmounted,
    Mounted,
}

/// Observable phase while mounted. `Ready` plus a selection is the
/// "selected" phase; selection lives in the inspector.
#[derive(SubStates, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[source(TrackerScene = TrackerScene::Mounted)]
pub enum ScenePhase {
    #[default]
    Loading,
    Ready,
}

/// Fixed-length overlay timer; not tied to asset readiness.
#[derive(Resource)]
pub struct LoadingTimer(pub Timer);

impl Default for LoadingTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(LOADING_SECS, TimerMode::Once))
    }
}

/// Counts of acquire/release events, for leak checks.
#[derive(Resource, Default, Debug, Clone, PartialEq, Eq)]
pub struct SceneLifecycle {
    pub mounts: u32,
    pub teardowns: u32,
    pub fields_built: u32,
    pub fields_torn_down: u32,
}

impl SceneLifecycle {
    /// Every mount has been matched by exactly one teardown.
    pub fn is_balanced(&self) -> bool {
        self.mounts == self.teardowns && self.fields_built == self.fields_torn_down
    }
}

/// Mount on the first successful batch. Polls the query every frame.
pub fn sync_feed(
    mut query: ResMut<FeedQuery>,
    state: Res<State<TrackerScene>>,
    mut next: ResMut<NextState<TrackerScene>>,
) {
    query.poll();
    if *state.get() == TrackerScene::Unmounted && query.generation() > 0 {
        next.set(TrackerScene::Mounted);
    }
}

pub fn mount_scene(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    mut rng: ResMut<FieldRng>,
    mut lifecycle: ResMut<SceneLifecycle>,
) {
    let orbit = OrbitCamera::default();

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 60f32.to_radians(),
            near: 0.1,
            far: 3000.0,
            ..default()
        }),
        orbit.transform(),
        orbit,
        StateScoped(TrackerScene::Mounted),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.25, 0.25, 0.25),
        brightness: 300.0,
    });
    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(100.0, 100.0, 100.0).looking_at(Vec3::ZERO, Vec3::Y),
        StateScoped(TrackerScene::Mounted),
    ));
    commands.spawn((
        DirectionalLight {
            color: Color::srgb(0.4, 0.5, 0.8),
            illuminance: 2_500.0,
            ..default()
        },
        Transform::from_xyz(-100.0, -50.0, -100.0).looking_at(Vec3::ZERO, Vec3::Y),
        StateScoped(TrackerScene::Mounted),
    ));

    commands.insert_resource(RockPalette::build(&mut rng.0, &mut materials, &mut images));
    commands.insert_resource(LoadingTimer::default());

    lifecycle.mounts += 1;
    info!(mounts = lifecycle.mounts, "scene mounted");
}

/// Runs on every exit from `Mounted`. StateScoped entities go on their own.
pub fn unmount_scene(
    mut commands: Commands,
    mut field: ResMut<AsteroidField>,
    mut lifecycle: ResMut<SceneLifecycle>,
) {
    teardown_field(&mut commands, &mut field, &mut lifecycle);
    commands.remove_resource::<RockPalette>();
    commands.remove_resource::<LoadingTimer>();
    commands.remove_resource::<AmbientLight>();

    lifecycle.teardowns += 1;
    info!(teardowns = lifecycle.teardowns, "scene torn down");
}

pub fn tick_loading(
    time: Res<Time>,
    timer: Option<ResMut<LoadingTimer>>,
    mut next: ResMut<NextState<ScenePhase>>,
) {
    let Some(mut timer) = timer else {
        return;
    };
    if timer.0.tick(time.delta()).just_finished() {
        debug!("loading overlay elapsed");
        next.set(ScenePhase::Ready);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    use bevy::state::app::StatesPlugin;
    use bevy::time::TimeUpdateStrategy;
    use chrono::NaiveDate;
    use rand::SeedableRng;

    use super::*;
    use crate::data::{DateRange, FeedSource};
    use crate::render::{ProceduralRockRenderer, RendererResource};
    use crate::scene::field::Asteroid;
    use crate::scene::scene_plugin;

    const FEED: &str = r#"{
        "element_count": 3,
        "near_earth_objects": {
            "2024-01-01": [
                { "id": "1", "name": "(2024 AA)",
                  "estimated_diameter": { "meters": { "estimated_diameter_min": 100, "estimated_diameter_max": 300 } } },
                { "id": "2", "name": "(2024 AB)",
                  "estimated_diameter": { "meters": { "estimated_diameter_min": 40, "estimated_diameter_max": 60 } } }
            ],
            "2024-01-02": [
                { "id": "3", "name": "433 Eros (A898 PA)",
                  "estimated_diameter": { "meters": { "estimated_diameter_min": 900, "estimated_diameter_max": 1100 } } }
            ]
        }
    }"#;

    fn fixture(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "neo-lifecycle-{}-{name}.json",
            std::process::id()
        ));
        std::fs::write(&path, FEED).unwrap();
        path
    }

    fn test_app(name: &str) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(250)))
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<Assets<Image>>()
            .insert_resource(FieldRng(rand::rngs::StdRng::seed_from_u64(3)))
            .insert_resource(RendererResource::new(ProceduralRockRenderer::default()))
            .insert_resource(FeedQuery::new(FeedSource::Fixture(fixture(name))))
            .add_plugins(scene_plugin);

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        app.world_mut()
            .resource_mut::<FeedQuery>()
            .request(DateRange { start, end: start });
        app
    }

    fn run_until(app: &mut App, mut done: impl FnMut(&mut App) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(app) {
            assert!(Instant::now() < deadline, "condition not reached");
            app.update();
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    fn scene(app: &App) -> TrackerScene {
        *app.world().resource::<State<TrackerScene>>().get()
    }

    fn asteroid_count(app: &mut App) -> usize {
        app.world_mut()
            .query::<&Asteroid>()
            .iter(app.world())
            .count()
    }

    #[test]
    fn mounts_on_first_batch_and_builds_one_asteroid_per_object() {
        let mut app = test_app("mount");
        run_until(&mut app, |app| scene(app) == TrackerScene::Mounted);
        run_until(&mut app, |app| asteroid_count(app) == 3);

        let lifecycle = app.world().resource::<SceneLifecycle>().clone();
        assert_eq!(lifecycle.mounts, 1);
        assert_eq!(lifecycle.fields_built, 1);
        assert!(app.world().contains_resource::<RockPalette>());
    }

    #[test]
    fn loading_phase_lasts_two_seconds() {
        let mut app = test_app("loading");
        run_until(&mut app, |app| scene(app) == TrackerScene::Mounted);
        assert_eq!(
            *app.world().resource::<State<ScenePhase>>().get(),
            ScenePhase::Loading
        );

        // 250ms per frame: the timer needs eight ticks after mounting.
        for _ in 0..6 {
            app.update();
        }
        assert_eq!(
            *app.world().resource::<State<ScenePhase>>().get(),
            ScenePhase::Loading
        );
        for _ in 0..4 {
            app.update();
        }
        assert_eq!(
            *app.world().resource::<State<ScenePhase>>().get(),
            ScenePhase::Ready
        );
    }

    #[test]
    fn unmount_releases_everything_exactly_once() {
        let mut app = test_app("unmount");
        run_until(&mut app, |app| asteroid_count(app) == 3);

        app.world_mut()
            .resource_mut::<NextState<TrackerScene>>()
            .set(TrackerScene::Unmounted);
        app.update();

        let lifecycle = app.world().resource::<SceneLifecycle>().clone();
        assert_eq!(lifecycle.teardowns, 1);
        assert!(lifecycle.is_balanced());
        assert!(!app.world().contains_resource::<RockPalette>());
        assert!(!app.world().contains_resource::<State<ScenePhase>>());
        assert_eq!(asteroid_count(&mut app), 0);
        let cameras = app
            .world_mut()
            .query::<&OrbitCamera>()
            .iter(app.world())
            .count();
        assert_eq!(cameras, 0);
    }

    #[test]
    fn remount_after_unmount_does_not_duplicate_scene() {
        let mut app = test_app("remount");
        run_until(&mut app, |app| asteroid_count(app) == 3);

        app.world_mut()
            .resource_mut::<NextState<TrackerScene>>()
            .set(TrackerScene::Unmounted);
        app.update();
        run_until(&mut app, |app| asteroid_count(app) == 3);

        let lifecycle = app.world().resource::<SceneLifecycle>().clone();
        assert_eq!(lifecycle.mounts, 2);
        assert_eq!(lifecycle.teardowns, 1);
        assert_eq!(lifecycle.fields_built, 2);
        assert_eq!(lifecycle.fields_torn_down, 1);
        let cameras = app
            .world_mut()
            .query::<&OrbitCamera>()
            .iter(app.world())
            .count();
        assert_eq!(cameras, 1);
    }
}
