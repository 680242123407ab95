use serde::Deserialize;
use serde_json::{Map, Value};

use super::{BBox, IngestErr, Result};

/// Sub-pixel-center offset applied to every polygon vertex.
const PIXEL_CENTER: f64 = 0.5;

/// A polygon region with parallel x/y vertex lists in absolute pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

#[derive(Deserialize)]
struct RawPolygon {
    all_points_x: Option<Vec<f64>>,
    all_points_y: Option<Vec<f64>>,
}

/// Parses a `region_shape_attributes` cell.
///
/// # Arguments
/// * `filename` - The image the row belongs to, reported on failure.
/// * `row` - The row's position in the table, reported on failure.
/// * `text` - The raw JSON cell.
///
/// # Returns
/// `None` for an empty descriptor (`{}`), the polygon otherwise.
///
/// # Errors
/// Invalid JSON, non-numeric or missing point lists, lists of different length and
/// lists without points are all rejected.
pub fn parse_shape(filename: &str, row: usize, text: &str) -> Result<Option<PolygonShape>> {
    let malformed = |source| IngestErr::MalformedShape {
        filename: filename.to_string(),
        row,
        source,
    };

    let attrs: Map<String, Value> = serde_json::from_str(text).map_err(malformed)?;
    if attrs.is_empty() {
        return Ok(None);
    }

    let raw: RawPolygon = serde_json::from_value(Value::Object(attrs)).map_err(malformed)?;
    let missing = |axis| IngestErr::MissingPoints {
        filename: filename.to_string(),
        row,
        axis,
    };

    let xs = raw.all_points_x.ok_or_else(|| missing("all_points_x"))?;
    let ys = raw.all_points_y.ok_or_else(|| missing("all_points_y"))?;

    if xs.len() != ys.len() {
        return Err(IngestErr::PointCountMismatch {
            filename: filename.to_string(),
            row,
            xs: xs.len(),
            ys: ys.len(),
        });
    }

    if xs.is_empty() {
        return Err(IngestErr::EmptyPolygon {
            filename: filename.to_string(),
            row,
        });
    }

    Ok(Some(PolygonShape { xs, ys }))
}

impl PolygonShape {
    /// The exact extent of the raw, unshifted vertices.
    pub fn bbox(&self) -> BBox {
        let (x_min, x_max) = extent(&self.xs);
        let (y_min, y_max) = extent(&self.ys);

        BBox {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// The vertices shifted to pixel centers, flattened as `[x0, y0, x1, y1, ...]`.
    pub fn polygon(&self) -> Vec<f64> {
        self.xs
            .iter()
            .zip(&self.ys)
            .flat_map(|(x, y)| [x + PIXEL_CENTER, y + PIXEL_CENTER])
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

fn extent(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
