//! Chart suggestions for small two-column results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::render::cell_text;

/// Fewest rows worth charting.
const MIN_CHART_ROWS: usize = 2;
/// Most rows that still read well as bars.
const MAX_CHART_ROWS: usize = 15;

/// One bar of a bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// A chart the client may draw next to the result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: String,
    pub title: String,
    pub x: String,
    pub y: String,
    pub points: Vec<ChartPoint>,
}

/// Suggest a bar chart when the result is a label column followed by a
/// numeric column with 2 to 15 rows. Null values are left out of the bars.
pub fn suggest_chart(columns: &[String], rows: &[Map<String, Value>]) -> Option<ChartSpec> {
    if columns.len() != 2 || !(MIN_CHART_ROWS..=MAX_CHART_ROWS).contains(&rows.len()) {
        return None;
    }
    let (x, y) = (&columns[0], &columns[1]);

    let mut points = Vec::with_capacity(rows.len());
    for row in rows {
        match row.get(y) {
            Some(Value::Number(n)) => points.push(ChartPoint {
                label: row.get(x).map(cell_text).unwrap_or_default(),
                value: n.as_f64()?,
            }),
            Some(Value::Null) | None => {}
            Some(_) => return None,
        }
    }
    if points.is_empty() {
        return None;
    }

    Some(ChartSpec {
        kind: "bar".to_string(),
        title: format!("Results: {} rows", rows.len()),
        x: x.clone(),
        y: y.clone(),
        points,
    })
}
