//! Procedural rock geometry. Pure functions over an explicit random source so
//! seeded runs reproduce the same field.

mod polyhedron;
mod sculpt;

use std::ops::Range;

use bevy::math::Vec3;
use bevy::render::mesh::{Indices, Mesh, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use rand::Rng;

pub use polyhedron::{BaseShape, Polyhedron};
pub use sculpt::{carve_craters, displace_vertices, spherical_uvs, vertex_normals, CraterSettings};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeometryError {
    #[error("rock radius must be finite and positive, got {0}")]
    InvalidRadius(f32),
}

#[derive(Clone, Debug)]
pub struct RockSettings {
    /// Diameter in meters divided by this gives the base radius in scene units.
    pub scale_divisor: f32,
    /// Per-object noise intensity, as a fraction of the radius.
    pub noise: Range<f32>,
    pub craters: CraterSettings,
}

impl Default for RockSettings {
    fn default() -> Self {
        Self {
            scale_divisor: 200.0,
            noise: 0.3..0.5,
            craters: CraterSettings::default(),
        }
    }
}

/// One irregular rock: welded, indexed triangle mesh data.
#[derive(Clone, Debug)]
pub struct RockGeometry {
    pub shape: BaseShape,
    pub radius: f32,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl RockGeometry {
    /// Farthest vertex from the local origin.
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| p.length())
            .fold(0.0, f32::max)
    }

    pub fn to_mesh(&self) -> Mesh {
        let positions: Vec<[f32; 3]> = self.positions.iter().map(|p| p.to_array()).collect();
        let normals: Vec<[f32; 3]> = self.normals.iter().map(|n| n.to_array()).collect();
        let indices: Vec<u32> = self.triangles.iter().flatten().copied().collect();

        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
            .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, spherical_uvs(&self.positions))
            .with_inserted_indices(Indices::U32(indices))
    }
}

/// Base radius for a diameter, before any noise.
pub fn base_radius(diameter_m: f64, settings: &RockSettings) -> f32 {
    (diameter_m / settings.scale_divisor as f64) as f32
}

/// Random base shape, per-vertex jitter, crater passes, recomputed normals.
pub fn generate_rock(
    diameter_m: f64,
    settings: &RockSettings,
    rng: &mut impl Rng,
) -> Result<RockGeometry, GeometryError> {
    let radius = base_radius(diameter_m, settings);
    if !radius.is_finite() || radius <= 0.0 {
        return Err(GeometryError::InvalidRadius(radius));
    }

    let shape = BaseShape::random(rng);
    let Polyhedron {
        mut positions,
        triangles,
    } = shape.build(radius);

    let intensity = sample_range(rng, &settings.noise);
    displace_vertices(&mut positions, radius, intensity, rng);
    carve_craters(&mut positions, radius, &settings.craters, rng);
    let normals = vertex_normals(&positions, &triangles);

    Ok(RockGeometry {
        shape,
        radius,
        positions,
        normals,
        triangles,
    })
}

/// `gen_range` that tolerates an empty range by returning its start.
pub(crate) fn sample_range(rng: &mut impl Rng, range: &Range<f32>) -> f32 {
    if range.is_empty() {
        range.start
    } else {
        rng.gen_range(range.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn radius_is_diameter_over_two_hundred() {
        assert_eq!(base_radius(300.0, &RockSettings::default()), 1.5);
    }

    #[test]
    fn zero_and_non_finite_diameters_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let settings = RockSettings::default();

        assert_eq!(
            generate_rock(0.0, &settings, &mut rng).unwrap_err(),
            GeometryError::InvalidRadius(0.0)
        );
        assert!(generate_rock(f64::NAN, &settings, &mut rng).is_err());
    }

    #[test]
    fn same_seed_same_rock() {
        let settings = RockSettings::default();
        let a = generate_rock(420.0, &settings, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = generate_rock(420.0, &settings, &mut StdRng::seed_from_u64(99)).unwrap();

        assert_eq!(a.shape, b.shape);
        assert_eq!(a.positions, b.positions);
    }

    #[test]
    fn generated_rock_is_irregular_and_bounded() {
        let settings = RockSettings::default();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..20 {
            let rock = generate_rock(200.0, &settings, &mut rng).unwrap();
            let bound = rock.bounding_radius();

            assert!(bound > 0.0);
            // radius 1, jitter ≤ 0.25 per axis, craters ≤ 0.1 each
            assert!(bound < 1.0 + 3f32.sqrt() * 0.25 + 0.5 + 1e-4);
            assert_eq!(rock.normals.len(), rock.positions.len());
        }
    }

    #[test]
    fn mesh_carries_positions_normals_uvs_and_indices() {
        let rock = generate_rock(100.0, &RockSettings::default(), &mut StdRng::seed_from_u64(2))
            .unwrap();
        let mesh = rock.to_mesh();

        assert_eq!(mesh.count_vertices(), rock.positions.len());
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
        assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_0).is_some());
        assert_eq!(
            mesh.indices().map(|i| i.len()),
            Some(rock.triangles.len() * 3)
        );
    }
}
