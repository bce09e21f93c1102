// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Node;

/// Represents a road segment (`E` record) between two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: i64,
    pub to: i64,
    pub name: String,

    /// Explicit cost of the segment. If missing, the straight-line distance
    /// between the vertices is used.
    pub cost: Option<f32>,
}

/// Union over all records of a map file.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Vertex(Node),
    Segment(Segment),
}
