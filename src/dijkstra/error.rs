// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Error conditions which may occur during [find_route](crate::find_route).
///
/// Note that the absence of a route is not an error, see [find_route](crate::find_route).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DijkstraError {
    /// The start or end nodes don't exist in a graph.
    UnknownNode(i64),
}

impl std::fmt::Display for DijkstraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNode(node_id) => write!(f, "unknown node: {}", node_id),
        }
    }
}

impl std::error::Error for DijkstraError {}

impl From<crate::GraphError> for DijkstraError {
    fn from(e: crate::GraphError) -> Self {
        match e {
            crate::GraphError::UnknownNode(node_id) => Self::UnknownNode(node_id),
        }
    }
}
