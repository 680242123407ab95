#![allow(dead_code)]

use std::{fs, path::Path};

use amseg::{
    annotation::{ANNOTATION_FILE, CategoryTable},
    data::Batch,
    model::{LossMap, ModelErr, ModelRunner},
};

pub const HEADER: &str = concat!(
    "filename\tfile_size\tfile_attributes\tregion_count\tregion_id\t",
    "region_shape_attributes\tregion_attributes",
);

/// Writes a blank PNG of `width` x `height` pixels.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    image::RgbImage::new(width, height)
        .save(dir.join(name))
        .unwrap();
}

/// Writes the tab-separated annotation table of `dir`.
pub fn write_table(dir: &Path, rows: &[(&str, &str, &str)]) {
    let mut contents = format!("{HEADER}\n");
    for (i, (filename, shape, label)) in rows.iter().enumerate() {
        contents.push_str(&format!(
            "{filename}\t0\t{{}}\t{}\t{i}\t{shape}\t{label}\n",
            rows.len()
        ));
    }
    fs::write(dir.join(ANNOTATION_FILE), contents).unwrap();
}

pub fn square(offset: u32) -> String {
    let (lo, hi) = (offset, offset + 10);
    format!(
        concat!(
            r#"{{"name":"polygon","all_points_x":[{lo},{hi},{hi},{lo}],"#,
            r#""all_points_y":[{lo},{lo},{hi},{hi}]}}"#,
        ),
        lo = lo,
        hi = hi
    )
}

pub fn categories() -> CategoryTable {
    CategoryTable::from_defaults()
}

pub fn losses(values: &[(&str, f64)]) -> LossMap {
    values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// A model whose losses are pure functions of the step and its rank.
pub struct ScriptedRunner {
    pub rank: usize,
    pub steps: usize,
    pub evals: usize,
    pub val_totals: Vec<f64>,
}

impl ScriptedRunner {
    pub fn new(rank: usize, val_totals: Vec<f64>) -> Self {
        Self {
            rank,
            steps: 0,
            evals: 0,
            val_totals,
        }
    }
}

impl ModelRunner for ScriptedRunner {
    fn train_step(&mut self, step: usize, batch: &Batch<'_>) -> Result<LossMap, ModelErr> {
        if batch.is_empty() {
            return Err(ModelErr::new("empty batch"));
        }
        self.steps += 1;
        Ok(losses(&[
            ("loss_cls", 1.0 / (step + 1) as f64),
            ("loss_mask", self.rank as f64),
        ]))
    }

    fn eval_losses(&mut self, _batch: &Batch<'_>) -> Result<LossMap, ModelErr> {
        let total = *self
            .val_totals
            .get(self.evals)
            .ok_or_else(|| ModelErr::new("no scripted validation loss left"))?;
        self.evals += 1;
        Ok(losses(&[("loss_cls", total * 0.75), ("loss_mask", total * 0.25)]))
    }

    fn state(&self) -> Result<Vec<u8>, ModelErr> {
        Ok(format!("rank{}-step{}", self.rank, self.steps).into_bytes())
    }
}
