//! Asteroid inspector: click a rock to see its record, Esc or Close to dismiss.
//!
//! Picks by casting the cursor ray against each asteroid's mesh triangles, with
//! the bounding sphere as a cheap first reject. Clicks landing on egui panels
//! are filtered out first.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{egui, EguiContexts};

use crate::camera::OrbitCamera;
use crate::data::NormalizedObject;
use crate::scene::{Asteroid, ScenePhase, TrackerScene};

const NOT_AVAILABLE: &str = "N/A";
const PARALLEL_EPSILON: f32 = 1e-9;

/// The record behind the last picked asteroid. Kept by value so a field
/// rebuild does not drop it; cleared when the scene unmounts.
#[derive(Resource, Default, Debug)]
pub struct SelectedAsteroid {
    pub object: Option<NormalizedObject>,
}

impl SelectedAsteroid {
    /// A miss leaves the current selection alone.
    pub fn apply_pick(&mut self, hit: Option<&NormalizedObject>) {
        if let Some(object) = hit {
            self.object = Some(object.clone());
        }
    }

    pub fn clear(&mut self) {
        self.object = None;
    }

    pub fn is_selected(&self) -> bool {
        self.object.is_some()
    }
}

pub fn inspector_plugin(app: &mut App) {
    super::ensure_egui(app);
    app.add_plugins(selection_plugin).add_systems(
        Update,
        inspector_panel_system.run_if(in_state(ScenePhase::Ready)),
    );
}

/// Picking and dismissal only listen while the scene is mounted.
fn selection_plugin(app: &mut App) {
    app.init_resource::<SelectedAsteroid>()
        .add_systems(
            Update,
            (click_pick_system, dismiss_selection_system)
                .run_if(in_state(TrackerScene::Mounted)),
        )
        .add_systems(OnExit(TrackerScene::Mounted), clear_selection);
}

fn clear_selection(mut selected: ResMut<SelectedAsteroid>) {
    selected.clear();
}

fn click_pick_system(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<OrbitCamera>>,
    mut contexts: EguiContexts,
    asteroids: Query<(&GlobalTransform, &Asteroid, &Mesh3d)>,
    meshes: Res<Assets<Mesh>>,
    mut selected: ResMut<SelectedAsteroid>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    if contexts
        .try_ctx_mut()
        .is_some_and(|ctx| ctx.is_pointer_over_area())
    {
        return;
    }

    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.get_single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };

    let hits = asteroids.iter().filter_map(|(transform, asteroid, mesh)| {
        let mesh = meshes.get(&mesh.0)?;
        ray_rock_distance(
            ray.origin,
            *ray.direction,
            transform,
            asteroid.bounding_radius,
            mesh,
        )
        .map(|distance| (distance, &asteroid.object))
    });
    let hit = nearest_hit(hits);
    if let Some(object) = hit {
        debug!(id = %object.id, name = %object.name, "asteroid picked");
    }
    selected.apply_pick(hit);
}

/// Distance along a unit-length ray to the first intersection with a sphere.
/// Rays starting inside the sphere report 0.
pub fn ray_sphere_distance(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - origin;
    let along = to_center.dot(dir);
    let closest_sq = to_center.length_squared() - along * along;
    let radius_sq = radius * radius;
    if closest_sq > radius_sq {
        return None;
    }
    let half_chord = (radius_sq - closest_sq).sqrt();
    let t_exit = along + half_chord;
    if t_exit < 0.0 {
        return None;
    }
    Some((along - half_chord).max(0.0))
}

/// Möller–Trumbore, two-sided. Returns the ray parameter of the hit in units
/// of `dir`.
pub fn ray_triangle_distance(origin: Vec3, dir: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = dir.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inv_det = det.recip();

    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

/// Nearest triangle hit of a ray against a triangle-list mesh, in mesh space.
pub fn ray_mesh_distance(origin: Vec3, dir: Vec3, mesh: &Mesh) -> Option<f32> {
    let positions = mesh.attribute(Mesh::ATTRIBUTE_POSITION)?.as_float3()?;
    let indices: Vec<usize> = match mesh.indices() {
        Some(indices) => indices.iter().collect(),
        None => (0..positions.len()).collect(),
    };
    let vertex = |i: usize| positions.get(i).map(|p| Vec3::from_array(*p));

    indices
        .chunks_exact(3)
        .filter_map(|tri| {
            ray_triangle_distance(origin, dir, vertex(tri[0])?, vertex(tri[1])?, vertex(tri[2])?)
        })
        .min_by(f32::total_cmp)
}

/// World-space distance from `origin` to the surface of a placed rock. The
/// bounding sphere rejects clear misses; the triangles decide the rest.
pub fn ray_rock_distance(
    origin: Vec3,
    dir: Vec3,
    transform: &GlobalTransform,
    bounding_radius: f32,
    mesh: &Mesh,
) -> Option<f32> {
    ray_sphere_distance(origin, dir, transform.translation(), bounding_radius)?;

    // The parameter is preserved by an affine map, so a unit world direction
    // keeps the local hit distance in world units.
    let to_local = transform.affine().inverse();
    ray_mesh_distance(
        to_local.transform_point3(origin),
        to_local.transform_vector3(dir),
        mesh,
    )
}

/// The closest of `(distance, object)` hits.
pub fn nearest_hit<'a>(
    hits: impl IntoIterator<Item = (f32, &'a NormalizedObject)>,
) -> Option<&'a NormalizedObject> {
    hits.into_iter()
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, object)| object)
}

fn dismiss_selection_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut selected: ResMut<SelectedAsteroid>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        selected.clear();
    }
}

fn inspector_panel_system(mut contexts: EguiContexts, mut selected: ResMut<SelectedAsteroid>) {
    let Some(object) = selected.object.as_ref() else {
        return;
    };
    let mut close = false;

    egui::SidePanel::right("inspector")
        .default_width(280.0)
        .frame(
            egui::Frame::default()
                .fill(egui::Color32::from_rgba_premultiplied(10, 10, 25, 220))
                .inner_margin(egui::Margin::same(14)),
        )
        .show(contexts.ctx_mut(), |ui| {
            ui.style_mut().override_text_style = Some(egui::TextStyle::Monospace);
            ui.visuals_mut().override_text_color = Some(egui::Color32::from_rgb(200, 220, 240));

            ui.label(
                egui::RichText::new(or_not_available(&object.name))
                    .size(18.0)
                    .color(egui::Color32::from_rgb(230, 170, 110)),
            );
            ui.add_space(8.0);

            for (label, value) in detail_rows(object) {
                ui.label(format!("{label:<14}{value}"));
            }
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                close = true;
            }
            ui.label(
                egui::RichText::new("Esc to dismiss")
                    .size(11.0)
                    .color(egui::Color32::from_rgb(120, 120, 140)),
            );
        });

    if close {
        selected.clear();
    }
}

/// Label/value pairs shown under the name.
pub fn detail_rows(object: &NormalizedObject) -> Vec<(&'static str, String)> {
    vec![
        ("Diameter", format_metric(object.diameter_m, 1, "m")),
        ("Velocity", format_metric(object.velocity_km_s, 2, "km/s")),
        ("Miss dist.", format_metric(object.miss_distance_km, 0, "km")),
        ("Approach", or_not_available(&object.date)),
        (
            "Hazardous",
            if object.hazardous { "Yes" } else { "No" }.to_string(),
        ),
        ("Orbiting", or_not_available(&object.orbiting_body)),
    ]
}

/// Zero stands in for "absent" after normalization.
pub fn format_metric(value: f64, decimals: usize, unit: &str) -> String {
    if value == 0.0 || !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{value:.decimals$} {unit}")
}

fn or_not_available(text: &str) -> String {
    if text.trim().is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        text.to_string()
    }
}
