//! Layout configuration.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};

/// Sizes and budgets used when turning (column, row) slots into editor
/// coordinates. Every field has a default, so partial YAML documents work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of an ordinary node.
    pub node_width: f64,
    /// Height of a node's title bar.
    pub header_height: f64,
    /// Height added per socket.
    pub socket_height: f64,
    /// Height of a reroute dot. Reroutes have no width.
    pub reroute_size: f64,
    /// Horizontal gap after a column holding ordinary nodes.
    pub column_gap: f64,
    /// Horizontal gap after a column holding only reroutes.
    pub reroute_gap: f64,
    /// Vertical gap between stacked nodes.
    pub row_gap: f64,
    /// Margin between a frame and its contents.
    pub frame_padding: f64,
    /// Maximum number of forward+backward barycenter passes.
    pub crossing_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 140.0,
            header_height: 24.0,
            socket_height: 22.0,
            reroute_size: 16.0,
            column_gap: 60.0,
            reroute_gap: 20.0,
            row_gap: 30.0,
            frame_padding: 20.0,
            crossing_passes: 8,
        }
    }
}

impl LayoutConfig {
    /// Parse a (possibly partial) YAML document and validate it.
    pub fn from_yaml_str(s: &str) -> LayoutResult<Self> {
        let config: Self = serde_yaml::from_str(s).map_err(|e| LayoutError::Config {
            what: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Sizes must be finite and non-negative; at least one pass is required.
    pub fn validate(&self) -> LayoutResult<()> {
        let sizes = [
            ("node_width", self.node_width),
            ("header_height", self.header_height),
            ("socket_height", self.socket_height),
            ("reroute_size", self.reroute_size),
            ("column_gap", self.column_gap),
            ("reroute_gap", self.reroute_gap),
            ("row_gap", self.row_gap),
            ("frame_padding", self.frame_padding),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::Config {
                    what: format!("{name} must be a finite, non-negative size (got {value})"),
                });
            }
        }
        if self.crossing_passes == 0 {
            return Err(LayoutError::Config {
                what: "crossing_passes must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
