// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Shortest-path route server for a small embedded map client.
//!
//! The client (a microcontroller with a display and a joystick) lets the user
//! pick a start and a destination on a fixed city map and sends the picked
//! positions over a serial link. This crate loads the road network as a weighted
//! directed [Graph], snaps the picked positions to the nearest [Nodes](Node),
//! runs [Dijkstra's algorithm](find_route) and sends the route back as a list
//! of points for the client to draw.
//!
//! # Example
//!
//! ```no_run
//! let mut g = edroute::Graph::default();
//! let options = edroute::map::Options::default();
//! edroute::map::add_features_from_file(&mut g, &options, "edmonton-roads-2.0.1.txt")
//!     .expect("failed to load the map");
//!
//! let mut session = edroute::Session::new(&g);
//! let mut link = edroute::protocol::Link::new(std::io::stdin(), std::io::stdout());
//! edroute::serve(&mut session, &mut link).expect("serial link failed");
//! ```

mod dijkstra;
mod distance;
mod graph;
mod kd;
pub mod map;
pub mod protocol;
mod session;

pub use dijkstra::{find_route, DijkstraError, Route};
pub use distance::grid_distance;
pub use graph::{Graph, GraphError};
pub use kd::KDTree;
pub use session::{serve, Session, State};

/// Represents an element of the [Graph]: a map intersection or a point along a road.
///
/// Positions are expressed in the integer grid used by the client,
/// see [map::COORDINATE_SCALE].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    pub id: i64,
    pub x: i32,
    pub y: i32,
}

/// Represents an outgoing (one-way) connection from a specific [Node].
///
/// `cost` must be finite and non-negative.
///
/// Two-way roads are represented by two edges, one in each direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: i64,
    pub cost: f32,
}
