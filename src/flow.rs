//! Bipartite flow-diagram layout.
//!
//! Turns a long-form count table into two stacked node columns (sources on
//! the left, targets on the right) joined by ribbons whose thickness is the
//! summed weight. Coordinates are in plot units with `y` pointing up, so the
//! renderer can hand them to `egui_plot` unchanged.

use std::collections::BTreeMap;

use crate::data::query::{FlowTable, FLOW_COLUMNS, NUMERIC_FLOW_COLUMNS};

pub const NODE_WIDTH: f64 = 18.0;
pub const NODE_PADDING: f64 = 8.0;
const RIBBON_STEPS: usize = 24;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("weight column '{0}' is not numeric")]
    NonNumericWeight(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub label: String,
    pub side: Side,
    pub value: f64,
    pub x_left: f64,
    pub x_right: f64,
    pub y_top: f64,
    pub y_bottom: f64,
}

/// A ribbon from one source node to one target node.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    /// Consecutive convex quads (top-left, top-right, bottom-right, bottom-left).
    pub segments: Vec<[[f64; 2]; 4]>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowDiagram {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

fn check_column(column: &str) -> Result<(), FlowError> {
    if FLOW_COLUMNS.contains(&column) {
        Ok(())
    } else {
        Err(FlowError::UnknownColumn(column.to_string()))
    }
}

impl FlowDiagram {
    /// Lay out `table` with `source` → `target` ribbons weighted by `weight`.
    ///
    /// Rows sharing a (source, target) pair are summed. An empty table
    /// gives an empty diagram.
    pub fn build(
        table: &FlowTable,
        source: &str,
        target: &str,
        weight: &str,
        width: f64,
        height: f64,
    ) -> Result<Self, FlowError> {
        check_column(source)?;
        check_column(target)?;
        check_column(weight)?;

        if !NUMERIC_FLOW_COLUMNS.contains(&weight) {
            return Err(FlowError::NonNumericWeight(weight.to_string()));
        }

        let mut pairs: BTreeMap<(String, String), f64> = BTreeMap::new();
        for row in &table.rows {
            let (Some(s), Some(t), Some(w)) =
                (row.text(source), row.text(target), row.number(weight))
            else {
                continue;
            };
            *pairs.entry((s, t)).or_default() += w.max(0.0);
        }

        Ok(Self::layout(&pairs, width, height))
    }

    fn layout(pairs: &BTreeMap<(String, String), f64>, width: f64, height: f64) -> Self {
        let mut source_totals: BTreeMap<&str, f64> = BTreeMap::new();
        let mut target_totals: BTreeMap<&str, f64> = BTreeMap::new();
        for ((s, t), w) in pairs {
            *source_totals.entry(s.as_str()).or_default() += w;
            *target_totals.entry(t.as_str()).or_default() += w;
        }
        let total: f64 = pairs.values().sum();

        let padding = |n: usize| {
            if n > 1 {
                NODE_PADDING.min(height * 0.5 / (n - 1) as f64)
            } else {
                0.0
            }
        };
        let scale_for = |n: usize| {
            let available = height - padding(n) * n.saturating_sub(1) as f64;
            if total > 0.0 {
                (available / total).max(0.0)
            } else {
                0.0
            }
        };
        let scale = scale_for(source_totals.len()).min(scale_for(target_totals.len()));
        let node_width = NODE_WIDTH.min(width / 4.0);

        let mut nodes = Vec::with_capacity(source_totals.len() + target_totals.len());
        let mut index: [BTreeMap<&str, usize>; 2] = Default::default();
        let columns = [
            (&source_totals, Side::Source, 0.0),
            (&target_totals, Side::Target, width - node_width),
        ];
        for (slot, (totals, side, x_left)) in columns.into_iter().enumerate() {
            let gap = padding(totals.len());
            let mut y = height;
            for (&label, &value) in totals {
                let h = value * scale;
                index[slot].insert(label, nodes.len());
                nodes.push(FlowNode {
                    label: label.to_string(),
                    side,
                    value,
                    x_left,
                    x_right: x_left + node_width,
                    y_top: y,
                    y_bottom: y - h,
                });
                y -= h + gap;
            }
        }
        let [source_index, target_index] = index;

        let mut cursor: Vec<f64> = nodes.iter().map(|n| n.y_top).collect();
        let x0 = node_width;
        let x1 = width - node_width;
        let mut links = Vec::with_capacity(pairs.len());
        for ((s, t), &value) in pairs {
            let (Some(&si), Some(&ti)) =
                (source_index.get(s.as_str()), target_index.get(t.as_str()))
            else {
                continue;
            };
            let h = value * scale;
            let (src_top, tgt_top) = (cursor[si], cursor[ti]);
            cursor[si] -= h;
            cursor[ti] -= h;

            links.push(FlowLink {
                source: si,
                target: ti,
                value,
                segments: ribbon(x0, x1, src_top, tgt_top, h),
            });
        }

        FlowDiagram {
            width,
            height,
            nodes,
            links,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.links.iter().map(|l| l.value).sum()
    }
}

/// Band of constant thickness `h` easing from `src_top` to `tgt_top`.
fn ribbon(x0: f64, x1: f64, src_top: f64, tgt_top: f64, h: f64) -> Vec<[[f64; 2]; 4]> {
    let at = |t: f64| {
        let ease = t * t * (3.0 - 2.0 * t);
        let x = x0 + (x1 - x0) * t;
        let top = src_top + (tgt_top - src_top) * ease;
        (x, top, top - h)
    };
    (0..RIBBON_STEPS)
        .map(|i| {
            let (xa, top_a, bot_a) = at(i as f64 / RIBBON_STEPS as f64);
            let (xb, top_b, bot_b) = at((i + 1) as f64 / RIBBON_STEPS as f64);
            [[xa, top_a], [xb, top_b], [xb, bot_b], [xa, bot_a]]
        })
        .collect()
}
