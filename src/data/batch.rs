use crate::{annotation::AnnotationRecord, augmentation::TransformParams};

/// One record together with the augmentation parameters drawn for this visit.
#[derive(Debug, Clone, PartialEq)]
pub struct Example<'a> {
    pub record: &'a AnnotationRecord,
    /// Parameters in chain order; empty under the minimal policy.
    pub transforms: Vec<TransformParams>,
}

/// The examples handed to a model runner for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<'a> {
    pub examples: Vec<Example<'a>>,
}

impl Batch<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Image ids of the batch, in order.
    pub fn image_ids(&self) -> Vec<usize> {
        self.examples.iter().map(|ex| ex.record.image_id).collect()
    }
}
