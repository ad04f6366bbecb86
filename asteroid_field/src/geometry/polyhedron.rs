//! Base polyhedra projected onto a sphere, with per-face subdivision.

use bevy::math::Vec3;
use rand::Rng;

const WELD_EPSILON: f32 = 1e-4;

/// The three rock base shapes, each with its own subdivision level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BaseShape {
    Icosahedron,
    Octahedron,
    Tetrahedron,
}

impl BaseShape {
    pub const ALL: [BaseShape; 3] = [
        BaseShape::Icosahedron,
        BaseShape::Octahedron,
        BaseShape::Tetrahedron,
    ];

    /// Uniform pick among the three shapes.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn detail(self) -> u32 {
        match self {
            BaseShape::Icosahedron => 2,
            BaseShape::Octahedron => 1,
            BaseShape::Tetrahedron => 1,
        }
    }

    fn seed(self) -> (Vec<Vec3>, Vec<[u32; 3]>) {
        match self {
            BaseShape::Tetrahedron => (
                vec![
                    Vec3::new(1.0, 1.0, 1.0),
                    Vec3::new(-1.0, -1.0, 1.0),
                    Vec3::new(-1.0, 1.0, -1.0),
                    Vec3::new(1.0, -1.0, -1.0),
                ],
                vec![[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]],
            ),
            BaseShape::Octahedron => (
                vec![
                    Vec3::X,
                    Vec3::NEG_X,
                    Vec3::Y,
                    Vec3::NEG_Y,
                    Vec3::Z,
                    Vec3::NEG_Z,
                ],
                vec![
                    [0, 2, 4],
                    [0, 4, 3],
                    [0, 3, 5],
                    [0, 5, 2],
                    [1, 2, 5],
                    [1, 5, 3],
                    [1, 3, 4],
                    [1, 4, 2],
                ],
            ),
            BaseShape::Icosahedron => {
                let t = (1.0 + 5f32.sqrt()) / 2.0;
                (
                    vec![
                        Vec3::new(-1.0, t, 0.0),
                        Vec3::new(1.0, t, 0.0),
                        Vec3::new(-1.0, -t, 0.0),
                        Vec3::new(1.0, -t, 0.0),
                        Vec3::new(0.0, -1.0, t),
                        Vec3::new(0.0, 1.0, t),
                        Vec3::new(0.0, -1.0, -t),
                        Vec3::new(0.0, 1.0, -t),
                        Vec3::new(t, 0.0, -1.0),
                        Vec3::new(t, 0.0, 1.0),
                        Vec3::new(-t, 0.0, -1.0),
                        Vec3::new(-t, 0.0, 1.0),
                    ],
                    vec![
                        [0, 11, 5],
                        [0, 5, 1],
                        [0, 1, 7],
                        [0, 7, 10],
                        [0, 10, 11],
                        [1, 5, 9],
                        [5, 11, 4],
                        [11, 10, 2],
                        [10, 7, 6],
                        [7, 1, 8],
                        [3, 9, 4],
                        [3, 4, 2],
                        [3, 2, 6],
                        [3, 6, 8],
                        [3, 8, 9],
                        [4, 9, 5],
                        [2, 4, 11],
                        [6, 2, 10],
                        [8, 6, 7],
                        [9, 8, 1],
                    ],
                )
            }
        }
    }

    /// Subdivided shape on a sphere of `radius`, shared vertices welded,
    /// triangles wound counter-clockwise seen from outside.
    pub fn build(self, radius: f32) -> Polyhedron {
        let (corners, faces) = self.seed();
        let mut welder = Welder::default();
        let mut triangles = Vec::new();
        let cols = self.detail() as usize + 1;

        for face in &faces {
            let a = corners[face[0] as usize].normalize();
            let b = corners[face[1] as usize].normalize();
            let c = corners[face[2] as usize].normalize();

            let mut grid: Vec<Vec<u32>> = Vec::with_capacity(cols + 1);
            for i in 0..=cols {
                let t = i as f32 / cols as f32;
                let aj = a.lerp(c, t);
                let bj = b.lerp(c, t);
                let rows = cols - i;
                let row = (0..=rows)
                    .map(|j| {
                        let p = if rows == 0 {
                            aj
                        } else {
                            aj.lerp(bj, j as f32 / rows as f32)
                        };
                        welder.index(p.normalize())
                    })
                    .collect();
                grid.push(row);
            }

            for i in 0..cols {
                for j in 0..(2 * (cols - i) - 1) {
                    let k = j / 2;
                    let tri = if j % 2 == 0 {
                        [grid[i][k + 1], grid[i + 1][k], grid[i][k]]
                    } else {
                        [grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]
                    };
                    triangles.push(tri);
                }
            }
        }

        let positions: Vec<Vec3> = welder.points.into_iter().map(|p| p * radius).collect();
        for tri in &mut triangles {
            let [p0, p1, p2] = tri.map(|i| positions[i as usize]);
            if (p1 - p0).cross(p2 - p0).dot(p0 + p1 + p2) < 0.0 {
                tri.swap(1, 2);
            }
        }

        Polyhedron {
            positions,
            triangles,
        }
    }
}

pub struct Polyhedron {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

#[derive(Default)]
struct Welder {
    points: Vec<Vec3>,
}

impl Welder {
    fn index(&mut self, p: Vec3) -> u32 {
        if let Some(i) = self
            .points
            .iter()
            .position(|q| q.distance_squared(p) < WELD_EPSILON * WELD_EPSILON)
        {
            return i as u32;
        }
        self.points.push(p);
        (self.points.len() - 1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdivided_counts_match_geodesic_formulas() {
        // V = k·f² + 2, F = faces·f² with f = detail + 1
        let ico = BaseShape::Icosahedron.build(1.0);
        assert_eq!(ico.positions.len(), 92);
        assert_eq!(ico.triangles.len(), 180);

        let octa = BaseShape::Octahedron.build(1.0);
        assert_eq!(octa.positions.len(), 18);
        assert_eq!(octa.triangles.len(), 32);

        let tetra = BaseShape::Tetrahedron.build(1.0);
        assert_eq!(tetra.positions.len(), 10);
        assert_eq!(tetra.triangles.len(), 16);
    }

    #[test]
    fn vertices_lie_on_requested_sphere() {
        for shape in BaseShape::ALL {
            let poly = shape.build(2.5);
            for p in &poly.positions {
                assert!((p.length() - 2.5).abs() < 1e-4, "{shape:?} vertex off sphere");
            }
        }
    }

    #[test]
    fn triangles_face_outward() {
        for shape in BaseShape::ALL {
            let poly = shape.build(1.0);
            for tri in &poly.triangles {
                let [a, b, c] = tri.map(|i| poly.positions[i as usize]);
                assert!((b - a).cross(c - a).dot(a + b + c) > 0.0);
            }
        }
    }
}
