//! Declarative training-time augmentation chains.
//!
//! Only the composition of the chain and the sampling of each transform's parameters
//! live here; applying them to pixels is the model runner's job.

mod augmenter;
mod policy;

pub use augmenter::{Augmenter, TransformParams};
pub use policy::{AugmentationPolicy, ResizeShortestEdge, TransformSpec};
