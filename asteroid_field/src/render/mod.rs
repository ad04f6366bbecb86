//! Field renderer trait and the default procedural rock implementation.

mod rocks;

use bevy::prelude::*;
use rand::rngs::StdRng;

use crate::data::NormalizedObject;
use crate::scene::materials::RockPalette;

pub use rocks::{
    build_visual, build_visuals, place_on_ring, AsteroidVisual, Placement,
    ProceduralRockRenderer, RingSettings, RockFieldSettings,
};

pub trait FieldRenderer: Send + Sync + 'static {
    fn setup(&self, _app: &mut App) {}

    /// Turn a record set into visuals. Objects whose geometry cannot be
    /// built are skipped.
    fn build_visuals(
        &self,
        objects: &[NormalizedObject],
        palette_len: usize,
        rng: &mut StdRng,
    ) -> Vec<AsteroidVisual>;

    fn spawn_visual(
        &self,
        parent: &mut ChildBuilder,
        meshes: &mut Assets<Mesh>,
        palette: &RockPalette,
        visual: AsteroidVisual,
    );
}

#[derive(Resource)]
pub struct RendererResource(pub Box<dyn FieldRenderer>);

impl RendererResource {
    pub fn new(renderer: impl FieldRenderer) -> Self {
        Self(Box::new(renderer))
    }
}
