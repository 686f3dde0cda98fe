//! Ground material weights and their GPU texture.
//!
//! [`SplatWeights::from_terrain`] classifies a grid of terrain samples into
//! four material layers (R = sand, G = grass, B = rock, A = road).
//! [`splat_to_image`] converts the weights to a Bevy [`Image`], and
//! [`sync_splat_texture`] keeps that texture in sync when the weights change.

use bevy::image::{ImageAddressMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::terrain::Terrain;

/// Band above sea level that reads as beach.
const SAND_BAND: f64 = 8.0;

/// Slope (radians) where grass starts giving way to rock.
const ROCK_SLOPE_START: f64 = 0.45;
const ROCK_SLOPE_FULL: f64 = 0.85;

/// Row-major RGBA8 material weights, one texel per grid sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SplatWeights {
    pub width: usize,
    pub height: usize,
    pub data: Vec<[u8; 4]>,
}

impl SplatWeights {
    /// All-zero weights.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![[0; 4]; width * height],
        }
    }

    /// Samples `terrain` over `[-extent/2, extent/2]²` at `resolution` texels per side.
    ///
    /// Each texel's layer weights sum to 255 (up to rounding). Sea texels are
    /// all sand.
    ///
    /// # Panics
    ///
    /// Panics if `resolution < 2`.
    pub fn from_terrain(terrain: &dyn Terrain, extent: f64, resolution: usize) -> Self {
        assert!(
            resolution >= 2,
            "splat resolution must be at least 2 (got {resolution})"
        );

        let mut weights = Self::new(resolution, resolution);
        let step = extent / (resolution - 1) as f64;
        let origin = -extent * 0.5;
        let sea = terrain.sea_level();

        for row in 0..resolution {
            for col in 0..resolution {
                let x = origin + col as f64 * step;
                let z = origin + row as f64 * step;

                let h = terrain.smooth_height(x, z);
                let slope = terrain.normal(x, z).y.clamp(-1.0, 1.0).acos();

                let sand = 1.0 - ((h - sea) / SAND_BAND).clamp(0.0, 1.0);
                let rock = ((slope - ROCK_SLOPE_START) / (ROCK_SLOPE_FULL - ROCK_SLOPE_START))
                    .clamp(0.0, 1.0)
                    * (1.0 - sand);
                let road = if terrain.is_path(x, z) {
                    1.0 - sand - rock
                } else {
                    0.0
                };
                let grass = (1.0 - sand - rock - road).max(0.0);

                weights.data[row * resolution + col] = [
                    to_byte(sand),
                    to_byte(grass),
                    to_byte(rock),
                    to_byte(road),
                ];
            }
        }

        weights
    }

    /// Layer weights of the texel at `(col, row)`.
    pub fn get(&self, col: usize, row: usize) -> [u8; 4] {
        self.data[row * self.width + col]
    }

    fn raw_bytes(&self) -> Vec<u8> {
        self.data
            .iter()
            .flat_map(|pixel| pixel.iter().copied())
            .collect()
    }
}

#[inline]
fn to_byte(weight: f64) -> u8 {
    (weight.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Converts [`SplatWeights`] into a Bevy [`Image`] (RGBA8Unorm).
///
/// Each pixel maps directly: R = sand, G = grass, B = rock, A = road.
/// The image clamps at its edges since it covers the island exactly once.
pub fn splat_to_image(weights: &SplatWeights) -> Image {
    let mut image = Image::new(
        Extent3d {
            width: weights.width as u32,
            height: weights.height as u32,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        weights.raw_bytes(),
        TextureFormat::Rgba8Unorm,
        default(),
    );

    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::ClampToEdge,
        address_mode_v: ImageAddressMode::ClampToEdge,
        ..default()
    });

    image
}

/// Resource holding the current [`SplatWeights`] and whether they changed.
///
/// Mutate `weights` and call [`mark_dirty`] to trigger the next
/// [`sync_splat_texture`] pass to re-upload the GPU texture.
///
/// [`mark_dirty`]: GroundMaterialSettings::mark_dirty
#[derive(Resource)]
pub struct GroundMaterialSettings {
    pub weights: SplatWeights,
    dirty: bool,
}

impl GroundMaterialSettings {
    /// The texture will be uploaded on the next [`sync_splat_texture`] run.
    pub fn new(weights: SplatWeights) -> Self {
        Self {
            weights,
            dirty: true,
        }
    }

    /// Schedules a re-upload on the next [`sync_splat_texture`] run.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether a re-upload is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Resource holding the GPU-side splat texture handle.
#[derive(Resource)]
pub struct SplatTexture {
    pub handle: Handle<Image>,
}

/// Re-uploads the splat texture when [`GroundMaterialSettings`] is dirty.
///
/// Cheap when nothing changed, so it can run every frame.
pub fn sync_splat_texture(
    mut settings: ResMut<GroundMaterialSettings>,
    splat_texture: Res<SplatTexture>,
    mut images: ResMut<Assets<Image>>,
) {
    if !settings.dirty {
        return;
    }
    settings.dirty = false;

    let Some(image) = images.get_mut(&splat_texture.handle) else {
        return;
    };

    let weights = &settings.weights;
    image.texture_descriptor.size = Extent3d {
        width: weights.width as u32,
        height: weights.height as u32,
        depth_or_array_layers: 1,
    };
    image.data = Some(weights.raw_bytes());
}
