//! Earth globe, its atmosphere shell, and the background starfield.

use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;
use rand::Rng;

use crate::scene::field::FieldRng;
use crate::scene::lifecycle::TrackerScene;
use crate::scene::materials::{atmosphere_material, globe_material, star_material};

pub const GLOBE_RADIUS: f32 = 100.0;
/// Shell radius relative to the globe.
pub const ATMOSPHERE_SCALE: f32 = 1.2;
pub const GLOBE_YAW_RATE: f32 = 0.005;
pub const STAR_COUNT: usize = 10_000;
pub const STAR_EXTENT: f32 = 2000.0;

#[derive(Component)]
pub struct Globe;

#[derive(Component)]
pub struct Atmosphere;

#[derive(Component)]
pub struct Starfield;

pub fn spawn_globe(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let surface = meshes.add(Sphere::new(GLOBE_RADIUS).mesh().uv(64, 64));
    let shell = meshes.add(Sphere::new(GLOBE_RADIUS * ATMOSPHERE_SCALE).mesh().uv(64, 64));

    commands
        .spawn((
            Globe,
            Mesh3d(surface),
            MeshMaterial3d(globe_material(&mut materials)),
            Transform::default(),
            StateScoped(TrackerScene::Mounted),
        ))
        .with_children(|parent| {
            parent.spawn((
                Atmosphere,
                Mesh3d(shell),
                MeshMaterial3d(atmosphere_material(&mut materials)),
                Transform::default(),
            ));
        });
}

/// Point positions in a cube of half-width `extent`, with near-white,
/// slightly blue per-star colors.
pub fn star_points(count: usize, extent: f32, rng: &mut impl Rng) -> (Vec<[f32; 3]>, Vec<[f32; 4]>) {
    let mut positions = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);
    for _ in 0..count {
        positions.push([
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        ]);
        let shade = 0.8 + rng.gen::<f32>() * 0.2;
        colors.push([shade * 0.9, shade * 0.95, shade, 1.0]);
    }
    (positions, colors)
}

pub fn spawn_starfield(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut rng: ResMut<FieldRng>,
) {
    let (positions, colors) = star_points(STAR_COUNT, STAR_EXTENT, &mut rng.0);
    let mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors);

    commands.spawn((
        Starfield,
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(star_material(&mut materials)),
        Transform::default(),
        StateScoped(TrackerScene::Mounted),
    ));
}

pub fn rotate_globe(time: Res<Time>, mut globes: Query<&mut Transform, With<Globe>>) {
    for mut transform in &mut globes {
        transform.rotate_y(time.delta_secs() * GLOBE_YAW_RATE);
    }
}
