//! Vertex noise, impact craters, normals, and UVs for rock meshes.

use std::f32::consts::{PI, TAU};

use bevy::math::Vec3;
use rand::Rng;

/// Crater pass parameters, all relative to the rock's base radius.
#[derive(Clone, Debug)]
pub struct CraterSettings {
    pub count: usize,
    /// Crater centers sit on a sphere of `depth * radius`.
    pub depth: f32,
    /// Vertices closer than `reach * radius` to a center are pushed.
    pub reach: f32,
    /// Push at zero distance, falling off linearly to zero at `reach`.
    pub push: f32,
}

impl Default for CraterSettings {
    fn default() -> Self {
        Self {
            count: 5,
            depth: 0.9,
            reach: 0.3,
            push: 0.1,
        }
    }
}

/// Independent per-axis jitter of every vertex in `[-0.5, 0.5) * radius * intensity`.
pub fn displace_vertices(positions: &mut [Vec3], radius: f32, intensity: f32, rng: &mut impl Rng) {
    let amplitude = radius * intensity;
    for p in positions.iter_mut() {
        let jitter = Vec3::new(
            rng.gen::<f32>() - 0.5,
            rng.gen::<f32>() - 0.5,
            rng.gen::<f32>() - 0.5,
        );
        *p += jitter * amplitude;
    }
}

pub fn carve_craters(
    positions: &mut [Vec3],
    radius: f32,
    settings: &CraterSettings,
    rng: &mut impl Rng,
) {
    let reach = radius * settings.reach;
    let max_push = radius * settings.push;
    if reach <= 0.0 {
        return;
    }

    for _ in 0..settings.count {
        let center = random_direction(rng) * radius * settings.depth;
        for p in positions.iter_mut() {
            let distance = p.distance(center);
            if distance < reach {
                let strength = (1.0 - distance / reach) * max_push;
                *p += (*p - center).normalize_or_zero() * strength;
            }
        }
    }
}

fn random_direction(rng: &mut impl Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if v.length_squared() > 1e-6 {
            return v.normalize();
        }
    }
}

/// Area-weighted smooth normals. Degenerate fans fall back to the radial direction.
pub fn vertex_normals(positions: &[Vec3], triangles: &[[u32; 3]]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in triangles {
        let [a, b, c] = tri.map(|i| positions[i as usize]);
        let face = (b - a).cross(c - a);
        for &i in tri {
            normals[i as usize] += face;
        }
    }

    normals
        .into_iter()
        .zip(positions)
        .map(|(n, p)| {
            let n = n.normalize_or_zero();
            if n != Vec3::ZERO {
                return n;
            }
            let radial = p.normalize_or_zero();
            if radial == Vec3::ZERO {
                Vec3::Y
            } else {
                radial
            }
        })
        .collect()
}

/// Longitude/latitude mapping of each vertex direction.
pub fn spherical_uvs(positions: &[Vec3]) -> Vec<[f32; 2]> {
    positions
        .iter()
        .map(|p| {
            let dir = p.normalize_or_zero();
            let u = 0.5 + dir.z.atan2(dir.x) / TAU;
            let v = dir.y.clamp(-1.0, 1.0).acos() / PI;
            [u, v]
        })
        .collect()
}
