// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{grid_distance, Edge, Graph, Node};

use super::{model, Error, FeatureReader, Malformed};

/// Helper object used for converting [map features](super::model::Feature)
/// into a [Graph], validating their consistency along the way.
pub(super) struct GraphBuilder<'a> {
    g: &'a mut Graph,
    nodes_added: usize,
    edges_added: usize,
}

impl<'a> GraphBuilder<'a> {
    /// Create a new graph builder, adding features to the provided graph.
    pub(super) fn new(g: &'a mut Graph) -> Self {
        Self {
            g,
            nodes_added: 0,
            edges_added: 0,
        }
    }

    /// Add all features from the provided [FeatureReader].
    ///
    /// Stops at the first inconsistent record. Features read before it are
    /// left in the graph.
    pub(super) fn add_features<F: FeatureReader>(&mut self, mut features: F) -> Result<(), Error> {
        while let Some(f) = features.next()? {
            self.add_feature(f)
                .map_err(|reason| Error::MalformedMapData {
                    line: features.line(),
                    reason,
                })?;
        }

        log::info!(
            "Loaded {} nodes and {} edges",
            self.nodes_added,
            self.edges_added
        );
        Ok(())
    }

    fn add_feature(&mut self, f: model::Feature) -> Result<(), Malformed> {
        match f {
            model::Feature::Vertex(n) => self.add_node(n),
            model::Feature::Segment(s) => self.add_segment(s),
        }
    }

    fn add_node(&mut self, n: Node) -> Result<(), Malformed> {
        if self.g.get_node(n.id).is_some() {
            return Err(Malformed::DuplicateNode(n.id));
        }

        self.g.set_node(n);
        self.nodes_added += 1;
        Ok(())
    }

    fn add_segment(&mut self, s: model::Segment) -> Result<(), Malformed> {
        let from = self
            .g
            .get_node(s.from)
            .ok_or(Malformed::UnknownNode(s.from))?;
        let to = self.g.get_node(s.to).ok_or(Malformed::UnknownNode(s.to))?;

        let cost = s
            .cost
            .unwrap_or_else(|| grid_distance(from.x, from.y, to.x, to.y));

        if self.g.get_edge(from.id, to.id).is_finite() {
            log::debug!(
                "Edge {} -> {} listed more than once, keeping the last one",
                from.id,
                to.id
            );
        } else {
            self.edges_added += 1;
        }

        // The last record wins outright: its cost and its (possibly empty) name
        self.g.set_edge(from.id, Edge { to: to.id, cost });
        self.g.set_street_name(from.id, to.id, s.name);
        Ok(())
    }
}
