//! The asteroid field: one child entity per object under a slowly turning group.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::data::{FeedQuery, NormalizedObject};
use crate::render::RendererResource;
use crate::scene::lifecycle::SceneLifecycle;
use crate::scene::materials::RockPalette;

/// Group yaw in radians per second.
pub const GROUP_YAW_RATE: f32 = 0.01;

/// Randomness for palettes, rock shapes, and placements.
#[derive(Resource)]
pub struct FieldRng(pub StdRng);

impl FieldRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for FieldRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

/// A rendered asteroid and the record it stands for.
#[derive(Component, Clone, Debug)]
pub struct Asteroid {
    pub object: NormalizedObject,
    pub euler: Vec3,
    /// Radians per 60 Hz frame on each axis.
    pub angular_velocity: Vec3,
    pub bounding_radius: f32,
    pub material_index: usize,
}

/// Parent of every asteroid; carries the group rotation.
#[derive(Component)]
pub struct AsteroidGroup;

#[derive(Resource, Default, Debug)]
pub struct AsteroidField {
    pub root: Option<Entity>,
    /// Query generation the current field was built from.
    pub built_generation: Option<u64>,
    pub count: usize,
}

pub fn euler_quat(euler: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z)
}

/// Frame-rate independent spin: `angular_velocity` is per 60 Hz frame.
pub fn advance_euler(euler: Vec3, angular_velocity: Vec3, dt: f32) -> Vec3 {
    euler + angular_velocity * dt * 60.0
}

pub fn teardown_field(
    commands: &mut Commands,
    field: &mut AsteroidField,
    lifecycle: &mut SceneLifecycle,
) {
    field.built_generation = None;
    field.count = 0;
    if let Some(root) = field.root.take() {
        commands.entity(root).despawn_recursive();
        lifecycle.fields_torn_down += 1;
    }
}

/// Rebuild whenever the visible item list changed since the last build.
#[allow(clippy::too_many_arguments)]
pub fn rebuild_field(
    mut commands: Commands,
    query: Res<FeedQuery>,
    renderer: Res<RendererResource>,
    palette: Option<Res<RockPalette>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut rng: ResMut<FieldRng>,
    mut field: ResMut<AsteroidField>,
    mut lifecycle: ResMut<SceneLifecycle>,
) {
    let generation = query.generation();
    if field.built_generation == Some(generation) {
        return;
    }
    let Some(palette) = palette else {
        return;
    };

    teardown_field(&mut commands, &mut field, &mut lifecycle);

    let visuals = renderer
        .0
        .build_visuals(query.items(), palette.len(), &mut rng.0);
    let count = visuals.len();

    let root = commands
        .spawn((
            AsteroidGroup,
            Transform::default(),
            Visibility::default(),
            Name::new("asteroid-field"),
        ))
        .with_children(|parent| {
            for visual in visuals {
                renderer
                    .0
                    .spawn_visual(parent, &mut meshes, &palette, visual);
            }
        })
        .id();

    field.root = Some(root);
    field.built_generation = Some(generation);
    field.count = count;
    lifecycle.fields_built += 1;
    info!(
        count,
        objects = query.items().len(),
        generation,
        "asteroid field built"
    );
}

pub fn spin_asteroids(time: Res<Time>, mut asteroids: Query<(&mut Transform, &mut Asteroid)>) {
    let dt = time.delta_secs();
    for (mut transform, mut asteroid) in &mut asteroids {
        asteroid.euler = advance_euler(asteroid.euler, asteroid.angular_velocity, dt);
        transform.rotation = euler_quat(asteroid.euler);
    }
}

pub fn rotate_group(time: Res<Time>, mut groups: Query<&mut Transform, With<AsteroidGroup>>) {
    for mut transform in &mut groups {
        transform.rotate_y(time.delta_secs() * GROUP_YAW_RATE);
    }
}
