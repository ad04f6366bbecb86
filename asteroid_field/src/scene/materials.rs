//! Shared rock palette plus globe, atmosphere, and starfield materials.

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use rand::Rng;

pub const PALETTE_SIZE: usize = 3;
const GRAIN_SIZE: u32 = 64;

/// Randomized once per palette entry, never per asteroid.
#[derive(Clone, Debug, PartialEq)]
pub struct RockMaterialParams {
    /// 0.1..0.3, drives the contrast of the grain texture.
    pub bump_scale: f32,
    /// 0.7..1.0
    pub roughness: f32,
    /// 0.0..0.1
    pub metalness: f32,
    /// 0.05..0.15 of a full turn (brown-orange).
    pub hue: f32,
    /// 0.2..0.4
    pub saturation: f32,
    /// 0.3..0.5
    pub lightness: f32,
}

impl RockMaterialParams {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            bump_scale: 0.1 + rng.gen::<f32>() * 0.2,
            roughness: 0.7 + rng.gen::<f32>() * 0.3,
            metalness: rng.gen::<f32>() * 0.1,
            hue: 0.05 + rng.gen::<f32>() * 0.1,
            saturation: 0.2 + rng.gen::<f32>() * 0.2,
            lightness: 0.3 + rng.gen::<f32>() * 0.2,
        }
    }

    pub fn base_color(&self) -> Color {
        Color::hsl(self.hue * 360.0, self.saturation, self.lightness)
    }
}

/// Fixed set of rock materials shared by reference across every asteroid.
#[derive(Resource)]
pub struct RockPalette {
    pub params: Vec<RockMaterialParams>,
    handles: Vec<Handle<StandardMaterial>>,
}

impl RockPalette {
    pub fn build(
        rng: &mut impl Rng,
        materials: &mut Assets<StandardMaterial>,
        images: &mut Assets<Image>,
    ) -> Self {
        let params: Vec<RockMaterialParams> = (0..PALETTE_SIZE)
            .map(|_| RockMaterialParams::random(rng))
            .collect();
        let handles = params
            .iter()
            .map(|entry| {
                let grain = images.add(grain_image(entry, rng));
                materials.add(StandardMaterial {
                    base_color: entry.base_color(),
                    base_color_texture: Some(grain),
                    perceptual_roughness: entry.roughness,
                    metallic: entry.metalness,
                    ..default()
                })
            })
            .collect();
        Self { params, handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handle(&self, index: usize) -> Handle<StandardMaterial> {
        self.handles[index % self.handles.len().max(1)].clone()
    }

    pub fn contains(&self, handle: &Handle<StandardMaterial>) -> bool {
        self.handles.iter().any(|h| h == handle)
    }
}

/// Grayscale speckle multiplied into the base color; stronger bump, darker pits.
fn grain_image(params: &RockMaterialParams, rng: &mut impl Rng) -> Image {
    let texels = (GRAIN_SIZE * GRAIN_SIZE) as usize;
    let mut data = Vec::with_capacity(texels * 4);
    for _ in 0..texels {
        let shade = 1.0 - params.bump_scale * 2.0 * rng.gen::<f32>();
        let v = (shade.clamp(0.0, 1.0) * 255.0) as u8;
        data.extend_from_slice(&[v, v, v, 255]);
    }
    Image::new(
        Extent3d {
            width: GRAIN_SIZE,
            height: GRAIN_SIZE,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

pub fn globe_material(materials: &mut Assets<StandardMaterial>) -> Handle<StandardMaterial> {
    materials.add(StandardMaterial {
        base_color: Color::srgb(0.12, 0.28, 0.62),
        perceptual_roughness: 0.8,
        ..default()
    })
}

/// Translucent shell tinted 0x88ccff.
pub fn atmosphere_material(materials: &mut Assets<StandardMaterial>) -> Handle<StandardMaterial> {
    materials.add(StandardMaterial {
        base_color: Color::srgba(0.533, 0.8, 1.0, 0.12),
        emissive: LinearRgba::rgb(0.05, 0.12, 0.2),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        cull_mode: None,
        ..default()
    })
}

/// Unlit white so per-vertex star colors come through unchanged.
pub fn star_material(materials: &mut Assets<StandardMaterial>) -> Handle<StandardMaterial> {
    materials.add(StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        ..default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn params_stay_in_documented_ranges() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let params = RockMaterialParams::random(&mut rng);
            assert!((0.1..0.3).contains(&params.bump_scale));
            assert!((0.7..1.0).contains(&params.roughness));
            assert!((0.0..0.1).contains(&params.metalness));
            assert!((0.05..0.15).contains(&params.hue));
            assert!((0.2..0.4).contains(&params.saturation));
            assert!((0.3..0.5).contains(&params.lightness));
        }
    }

    #[test]
    fn palette_has_three_shared_materials() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut materials = Assets::<StandardMaterial>::default();
        let mut images = Assets::<Image>::default();

        let palette = RockPalette::build(&mut rng, &mut materials, &mut images);

        assert_eq!(palette.len(), PALETTE_SIZE);
        assert_eq!(materials.len(), PALETTE_SIZE);
        assert_eq!(images.len(), PALETTE_SIZE);
        assert!(palette.contains(&palette.handle(1)));
    }
}
