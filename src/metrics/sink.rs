use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::info;
use serde_json::{Map, Value};

/// File the JSON-lines sink appends to inside the output directory.
pub const METRICS_FILE: &str = "metrics.json";

/// Destination of periodic metric flushes.
pub trait MetricSink: Send {
    /// Writes one flush worth of metrics, all tagged with `step`.
    fn write(&mut self, step: usize, metrics: &[(String, f64)]) -> io::Result<()>;
}

/// Appends one JSON object per flush: `{"iteration": step, "<metric>": value, ...}`.
pub struct JsonLinesSink {
    path: PathBuf,
    out: BufWriter<File>,
}

impl JsonLinesSink {
    /// Opens (creating if needed) `<output_dir>/metrics.json` for appending.
    pub fn create(output_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(METRICS_FILE);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            out: BufWriter::new(file),
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetricSink for JsonLinesSink {
    fn write(&mut self, step: usize, metrics: &[(String, f64)]) -> io::Result<()> {
        let mut line = Map::new();
        line.insert("iteration".to_string(), Value::from(step));
        for (name, value) in metrics {
            line.insert(name.clone(), Value::from(*value));
        }

        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

/// Logs every flush through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MetricSink for LogSink {
    fn write(&mut self, step: usize, metrics: &[(String, f64)]) -> io::Result<()> {
        let rendered = metrics
            .iter()
            .map(|(name, value)| format!("{name}: {value:.4}"))
            .collect::<Vec<_>>()
            .join("  ");

        info!("iter: {step}  {rendered}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonLinesSink::create(dir.path()).unwrap();

        sink.write(19, &[("total_loss".to_string(), 1.5)]).unwrap();
        sink.write(
            39,
            &[
                ("total_loss".to_string(), 1.25),
                ("total_val_loss".to_string(), 2.0),
            ],
        )
        .unwrap();

        let content = fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["iteration"], 19);
        assert_eq!(lines[0]["total_loss"], 1.5);
        assert_eq!(lines[1]["total_val_loss"], 2.0);
    }
}
