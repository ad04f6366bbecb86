use std::f32::consts::TAU;
use std::ops::Range;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::warn;

use crate::data::NormalizedObject;
use crate::geometry::{generate_rock, sample_range, GeometryError, RockGeometry, RockSettings};
use crate::render::FieldRenderer;
use crate::scene::materials::RockPalette;
use crate::scene::{euler_quat, Asteroid};

#[derive(Clone, Debug)]
pub struct RingSettings {
    /// Distance from the origin in the XZ plane.
    pub radius: Range<f32>,
    /// Heights are drawn from `-half_height..half_height`.
    pub half_height: f32,
}

#[derive(Clone, Debug)]
pub struct RockFieldSettings {
    pub rock: RockSettings,
    pub ring: RingSettings,
    /// Per-axis spin ceiling in radians per 60 Hz frame.
    pub max_spin: f32,
}

impl Default for RockFieldSettings {
    fn default() -> Self {
        Self {
            rock: RockSettings::default(),
            ring: RingSettings {
                radius: 150.0..250.0,
                half_height: 50.0,
            },
            max_spin: 0.01,
        }
    }
}

/// Where an asteroid sits and how it tumbles. Constant after creation
/// except for the Euler angles the spin system advances.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub translation: Vec3,
    pub euler: Vec3,
    pub angular_velocity: Vec3,
}

/// Everything needed to spawn one asteroid for one record.
#[derive(Clone, Debug)]
pub struct AsteroidVisual {
    pub object: NormalizedObject,
    pub geometry: RockGeometry,
    pub material_index: usize,
    pub placement: Placement,
}

pub fn place_on_ring(settings: &RockFieldSettings, rng: &mut impl Rng) -> Placement {
    let angle = rng.gen::<f32>() * TAU;
    let distance = sample_range(rng, &settings.ring.radius);
    let height = (rng.gen::<f32>() - 0.5) * 2.0 * settings.ring.half_height;

    let euler = Vec3::new(
        rng.gen::<f32>() * TAU,
        rng.gen::<f32>() * TAU,
        rng.gen::<f32>() * TAU,
    );
    let angular_velocity = Vec3::new(
        rng.gen::<f32>() * settings.max_spin,
        rng.gen::<f32>() * settings.max_spin,
        rng.gen::<f32>() * settings.max_spin,
    );

    Placement {
        translation: Vec3::new(angle.cos() * distance, height, angle.sin() * distance),
        euler,
        angular_velocity,
    }
}

pub fn build_visual(
    object: &NormalizedObject,
    settings: &RockFieldSettings,
    palette_len: usize,
    rng: &mut impl Rng,
) -> Result<AsteroidVisual, GeometryError> {
    // Proxy-sourced objects only carry the mean diameter.
    let diameter = object.diameter_m.max(object.diameter_max_m);
    let geometry = generate_rock(diameter, &settings.rock, rng)?;
    let material_index = rng.gen_range(0..palette_len.max(1));
    let placement = place_on_ring(settings, rng);

    Ok(AsteroidVisual {
        object: object.clone(),
        geometry,
        material_index,
        placement,
    })
}

pub fn build_visuals(
    objects: &[NormalizedObject],
    settings: &RockFieldSettings,
    palette_len: usize,
    rng: &mut impl Rng,
) -> Vec<AsteroidVisual> {
    objects
        .iter()
        .filter_map(|object| match build_visual(object, settings, palette_len, rng) {
            Ok(visual) => Some(visual),
            Err(err) => {
                warn!(id = %object.id, name = %object.name, %err, "skipping asteroid");
                None
            }
        })
        .collect()
}

#[derive(Default)]
pub struct ProceduralRockRenderer {
    pub settings: RockFieldSettings,
}

impl FieldRenderer for ProceduralRockRenderer {
    fn build_visuals(
        &self,
        objects: &[NormalizedObject],
        palette_len: usize,
        rng: &mut StdRng,
    ) -> Vec<AsteroidVisual> {
        build_visuals(objects, &self.settings, palette_len, rng)
    }

    fn spawn_visual(
        &self,
        parent: &mut ChildBuilder,
        meshes: &mut Assets<Mesh>,
        palette: &RockPalette,
        visual: AsteroidVisual,
    ) {
        let AsteroidVisual {
            object,
            geometry,
            material_index,
            placement,
        } = visual;

        parent.spawn((
            Mesh3d(meshes.add(geometry.to_mesh())),
            MeshMaterial3d(palette.handle(material_index)),
            Transform::from_translation(placement.translation)
                .with_rotation(euler_quat(placement.euler)),
            Asteroid {
                object,
                euler: placement.euler,
                angular_velocity: placement.angular_velocity,
                bounding_radius: geometry.bounding_radius(),
                material_index,
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn object(id: &str, diameter: f64) -> NormalizedObject {
        NormalizedObject {
            id: id.into(),
            name: format!("rock {id}"),
            date: "2024-Jan-01 00:00".into(),
            velocity_km_s: 10.0,
            miss_distance_km: 1_000_000.0,
            diameter_m: diameter,
            hazardous: false,
            orbiting_body: "Earth".into(),
            diameter_max_m: diameter * 1.5,
        }
    }

    #[test]
    fn one_visual_per_object_with_positive_bounds_and_palette_material() {
        let objects: Vec<_> = (0..25).map(|i| object(&i.to_string(), 40.0 + i as f64)).collect();
        let mut rng = StdRng::seed_from_u64(8);

        let visuals = build_visuals(&objects, &RockFieldSettings::default(), 3, &mut rng);

        assert_eq!(visuals.len(), objects.len());
        for (visual, object) in visuals.iter().zip(&objects) {
            assert_eq!(&visual.object, object);
            assert!(visual.geometry.bounding_radius() > 0.0);
            assert!(visual.material_index < 3);
        }
    }

    #[test]
    fn radius_uses_upper_diameter_when_known() {
        let mut rng = StdRng::seed_from_u64(1);
        let visual = build_visual(&object("a", 200.0), &RockFieldSettings::default(), 3, &mut rng)
            .unwrap();

        assert_eq!(visual.geometry.radius, 1.5);
    }

    #[test]
    fn zero_diameter_objects_are_skipped() {
        let objects = vec![object("ok", 100.0), object("dust", 0.0)];
        let mut rng = StdRng::seed_from_u64(2);

        let visuals = build_visuals(&objects, &RockFieldSettings::default(), 3, &mut rng);

        assert_eq!(visuals.len(), 1);
        assert_eq!(visuals[0].object.id, "ok");
    }

    #[test]
    fn placements_stay_on_ring_band() {
        let settings = RockFieldSettings::default();
        let mut rng = StdRng::seed_from_u64(21);

        for _ in 0..500 {
            let p = place_on_ring(&settings, &mut rng);
            let planar = Vec2::new(p.translation.x, p.translation.z).length();

            assert!((150.0 - 1e-3..250.0 + 1e-3).contains(&planar));
            assert!(p.translation.y.abs() <= 50.0);
            assert!(p.angular_velocity.min_element() >= 0.0);
            assert!(p.angular_velocity.max_element() < 0.01);
        }
    }
}
