use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{AugmentationPolicy, TransformSpec};

/// Concrete parameters drawn for one example from a `TransformSpec`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformParams {
    Resize { short_edge: u32, max_size: u32 },
    Brightness { factor: f64 },
    Crop { height_frac: f64, width_frac: f64 },
    HorizontalFlip { applied: bool },
    Rotation { degrees: f64 },
}

impl TransformParams {
    /// Crop window size for an image of `height` x `width`, if this is a crop.
    pub fn crop_size(&self, height: u32, width: u32) -> Option<(u32, u32)> {
        match *self {
            TransformParams::Crop {
                height_frac,
                width_frac,
            } => Some((
                (f64::from(height) * height_frac + 0.5) as u32,
                (f64::from(width) * width_frac + 0.5) as u32,
            )),
            _ => None,
        }
    }
}

/// Samples augmentation parameters, one example at a time, from a seeded generator.
#[derive(Debug, Clone)]
pub struct Augmenter {
    chain: Vec<TransformSpec>,
    rng: StdRng,
}

impl Augmenter {
    /// Creates a new `Augmenter`.
    ///
    /// # Arguments
    /// * `policy` - The chain to sample from.
    /// * `seed` - Seed of the generator; equal seeds yield equal parameter sequences.
    pub fn new(policy: AugmentationPolicy, seed: u64) -> Self {
        Self {
            chain: policy.transforms(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws the parameters of every transform in the chain, in chain order.
    pub fn draw(&mut self) -> Vec<TransformParams> {
        let Self { chain, rng } = self;
        chain.iter().map(|spec| sample(spec, rng)).collect()
    }

    #[inline]
    pub fn chain(&self) -> &[TransformSpec] {
        &self.chain
    }
}

fn sample<R: Rng>(spec: &TransformSpec, rng: &mut R) -> TransformParams {
    match *spec {
        TransformSpec::ResizeShortestEdge(resize) => {
            let idx = rng.random_range(0..resize.short_edge_lengths.len());
            TransformParams::Resize {
                short_edge: resize.short_edge_lengths[idx],
                max_size: resize.max_size,
            }
        }
        TransformSpec::RandomBrightness { min, max } => TransformParams::Brightness {
            factor: rng.random_range(min..=max),
        },
        TransformSpec::RandomCrop {
            min_fraction: (min_h, min_w),
        } => TransformParams::Crop {
            height_frac: rng.random_range(min_h..=1.0),
            width_frac: rng.random_range(min_w..=1.0),
        },
        TransformSpec::RandomHorizontalFlip { prob } => TransformParams::HorizontalFlip {
            applied: rng.random_bool(prob),
        },
        TransformSpec::RandomRotation { min_deg, max_deg } => TransformParams::Rotation {
            degrees: rng.random_range(min_deg..=max_deg),
        },
    }
}
