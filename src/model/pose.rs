//! Pose: where an agent is and which way it faces.

use serde::Serialize;

use crate::graph::Node;

use super::Orientation;

/// A node plus an optional heading.
///
/// Equality is structural: two poses are equal when they name the same
/// node and the same orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pose {
    pub node: Node,
    pub orientation: Orientation,
}

impl Pose {
    pub fn new(node: Node, orientation: Orientation) -> Self {
        Self { node, orientation }
    }

    /// Cell coordinates as floats, for blending.
    pub fn position(&self) -> (f64, f64) {
        (f64::from(self.node.x), f64::from(self.node.y))
    }
}
