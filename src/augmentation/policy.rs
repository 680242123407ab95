/// Target lengths for the shortest image edge, chosen uniformly per example.
const SHORT_EDGE_LENGTHS: [u32; 6] = [640, 672, 704, 736, 768, 800];
/// Upper bound for the longest image edge after resizing.
const MAX_LONG_EDGE: u32 = 1333;

/// Resizes so the shortest edge matches one of `short_edge_lengths`, unless that would
/// make the longest edge exceed `max_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeShortestEdge {
    pub short_edge_lengths: [u32; 6],
    pub max_size: u32,
}

impl ResizeShortestEdge {
    /// Computes the `(height, width)` an image of `height` x `width` is resized to.
    ///
    /// # Arguments
    /// * `height` - The input height in pixels.
    /// * `width` - The input width in pixels.
    /// * `short_edge` - The sampled target length for the shortest edge.
    pub fn output_size(&self, height: u32, width: u32, short_edge: u32) -> (u32, u32) {
        let (h, w, size) = (f64::from(height), f64::from(width), f64::from(short_edge));
        let scale = size / h.min(w);

        let (mut new_h, mut new_w) = if h < w {
            (size, scale * w)
        } else {
            (scale * h, size)
        };

        let longest = new_h.max(new_w);
        let max_size = f64::from(self.max_size);
        if longest > max_size {
            let shrink = max_size / longest;
            new_h *= shrink;
            new_w *= shrink;
        }

        ((new_h + 0.5) as u32, (new_w + 0.5) as u32)
    }
}

/// One declared step of an augmentation chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformSpec {
    ResizeShortestEdge(ResizeShortestEdge),
    /// Multiplies intensities by a factor drawn uniformly from `[min, max]`.
    RandomBrightness { min: f64, max: f64 },
    /// Keeps a fraction of each axis drawn uniformly from `[min_fraction, 1]`.
    RandomCrop { min_fraction: (f64, f64) },
    RandomHorizontalFlip { prob: f64 },
    /// Rotates by an angle in degrees drawn uniformly from `[min_deg, max_deg]`.
    RandomRotation { min_deg: f64, max_deg: f64 },
}

impl TransformSpec {
    pub fn name(&self) -> &'static str {
        match self {
            TransformSpec::ResizeShortestEdge(_) => "resize_shortest_edge",
            TransformSpec::RandomBrightness { .. } => "random_brightness",
            TransformSpec::RandomCrop { .. } => "random_crop",
            TransformSpec::RandomHorizontalFlip { .. } => "random_horizontal_flip",
            TransformSpec::RandomRotation { .. } => "random_rotation",
        }
    }
}

/// Which chain of stochastic transforms training examples go through.
///
/// The order of `transforms()` is a contract: a fixed seed only reproduces the same
/// examples as long as the chain order stays the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AugmentationPolicy {
    /// Resize, brightness, crop, flip and rotation, in that order.
    Full,
    /// No stochastic transforms at all.
    Minimal,
}

impl AugmentationPolicy {
    pub fn from_toggle(enabled: bool) -> Self {
        if enabled { Self::Full } else { Self::Minimal }
    }

    /// The declared transforms, in application order.
    pub fn transforms(&self) -> Vec<TransformSpec> {
        match self {
            AugmentationPolicy::Full => vec![
                TransformSpec::ResizeShortestEdge(ResizeShortestEdge {
                    short_edge_lengths: SHORT_EDGE_LENGTHS,
                    max_size: MAX_LONG_EDGE,
                }),
                TransformSpec::RandomBrightness { min: 0.5, max: 2.0 },
                TransformSpec::RandomCrop {
                    min_fraction: (0.5, 0.5),
                },
                TransformSpec::RandomHorizontalFlip { prob: 0.5 },
                TransformSpec::RandomRotation {
                    min_deg: 0.0,
                    max_deg: 360.0,
                },
            ],
            AugmentationPolicy::Minimal => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_chain_order() {
        let names: Vec<_> = AugmentationPolicy::Full
            .transforms()
            .iter()
            .map(TransformSpec::name)
            .collect();

        assert_eq!(
            names,
            vec![
                "resize_shortest_edge",
                "random_brightness",
                "random_crop",
                "random_horizontal_flip",
                "random_rotation",
            ]
        );
    }

    #[test]
    fn minimal_chain_is_empty() {
        assert!(AugmentationPolicy::from_toggle(false).transforms().is_empty());
        assert_eq!(AugmentationPolicy::from_toggle(true), AugmentationPolicy::Full);
    }

    #[test]
    fn short_edge_lengths_step_by_32() {
        let lengths: Vec<u32> = (640..=800).step_by(32).collect();
        assert_eq!(lengths, SHORT_EDGE_LENGTHS.to_vec());
    }

    #[test]
    fn resize_matches_short_edge() {
        let resize = ResizeShortestEdge {
            short_edge_lengths: SHORT_EDGE_LENGTHS,
            max_size: MAX_LONG_EDGE,
        };
        assert_eq!(resize.output_size(480, 640, 800), (800, 1067));
        assert_eq!(resize.output_size(1000, 500, 640), (1280, 640));
    }

    #[test]
    fn resize_caps_the_long_edge() {
        let resize = ResizeShortestEdge {
            short_edge_lengths: SHORT_EDGE_LENGTHS,
            max_size: MAX_LONG_EDGE,
        };
        // 800 x 3200 would be needed; the long edge is capped at 1333.
        assert_eq!(resize.output_size(100, 400, 800), (333, 1333));
    }
}
