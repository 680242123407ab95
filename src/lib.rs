//! Annotation ingestion and validation-driven best-checkpoint selection for training
//! instance segmentation models on AMF microscopy images.

pub mod annotation;
pub mod augmentation;
pub mod checkpoint;
pub mod config;
pub mod data;
pub mod error;
pub mod hooks;
pub mod metrics;
pub mod model;
pub mod sync;
pub mod training;
pub mod validation;

pub use error::{Result, SegErr};
