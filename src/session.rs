// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;

use crate::protocol::{Link, Message, Point, MAX_ROUTE_POINTS};
use crate::{find_route, Graph, KDTree, Node};

/// State of a [Session].
///
/// Between messages a session always rests in [State::Idle] or
/// [State::AwaitingDestination]; [State::Computing] and [State::Responding] are passed
/// through while handling the message which completes a selection.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    /// Nothing selected; the next selected point becomes the start.
    Idle,

    /// The start was selected; the next selected point becomes the destination.
    AwaitingDestination { start: Node },

    /// Both points were selected and a route between them is being searched for.
    Computing { start: Node, destination: Node },

    /// The reply is ready to be sent to the client.
    Responding(Message),
}

/// Session holds everything related to serving a single client: the state of its
/// start/destination selection and an index for snapping selected points to graph nodes.
///
/// The [Graph] is only borrowed, and never modified.
#[derive(Debug)]
pub struct Session<'g> {
    graph: &'g Graph,
    index: Option<KDTree>,
    state: State,
}

impl<'g> Session<'g> {
    /// Creates a new [Session] in the [State::Idle] state.
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            index: KDTree::from_iter(graph.iter().cloned()),
            state: State::Idle,
        }
    }

    /// Returns the current state of the session.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Advances the session by a single message received from the client,
    /// returning the reply to send back, if there is one.
    ///
    /// Never fails: messages which don't make sense in the current state are ignored,
    /// and any failure to find a route is answered with [Message::NoRoute].
    pub fn handle(&mut self, message: Message) -> Option<Message> {
        let state = std::mem::replace(&mut self.state, State::Idle);

        self.state = match (state, message) {
            (State::Idle, Message::SelectPoint(p)) => match self.snap(p) {
                Some(start) => State::AwaitingDestination { start },
                None => State::Responding(Message::NoRoute),
            },

            (State::AwaitingDestination { start }, Message::SelectPoint(p)) => {
                match self.snap(p) {
                    Some(destination) => State::Computing { start, destination },
                    None => State::Responding(Message::NoRoute),
                }
            }

            (State::AwaitingDestination { .. }, Message::CancelSelection) => {
                log::debug!("Selection cancelled");
                State::Idle
            }

            // Never decoded by a Link, only reachable by calling handle directly
            (state, message @ (Message::RouteResponse(_) | Message::NoRoute)) => {
                log::warn!("Ignoring unexpected {:?} from the client", message);
                state
            }

            (state, message) => {
                log::debug!("Ignoring {:?} in state {:?}", message, state);
                state
            }
        };

        self.advance()
    }

    /// Runs through the transient states, until the session rests
    /// in [State::Idle] or [State::AwaitingDestination].
    fn advance(&mut self) -> Option<Message> {
        loop {
            log::debug!("Session state: {:?}", self.state);

            match std::mem::replace(&mut self.state, State::Idle) {
                State::Computing { start, destination } => {
                    self.state = State::Responding(self.compute(start, destination));
                }

                State::Responding(reply) => return Some(reply),

                resting => {
                    self.state = resting;
                    return None;
                }
            }
        }
    }

    fn snap(&self, p: Point) -> Option<Node> {
        match self.index {
            Some(ref index) => {
                let node = index.find_nearest_node(p.x, p.y);
                log::debug!("Selected ({}, {}) snapped to node {}", p.x, p.y, node.id);
                Some(node)
            }
            None => {
                log::warn!("Selected ({}, {}), but the map is empty", p.x, p.y);
                None
            }
        }
    }

    fn compute(&self, start: Node, destination: Node) -> Message {
        match find_route(self.graph, start.id, destination.id) {
            Ok(Some(route)) if route.nodes.len() > MAX_ROUTE_POINTS => {
                log::warn!(
                    "Route from {} to {} has {} nodes, which is more than the client accepts",
                    start.id,
                    destination.id,
                    route.nodes.len()
                );
                Message::NoRoute
            }

            Ok(Some(route)) => {
                log::info!(
                    "Route from {} to {}: {} nodes, cost {}",
                    start.id,
                    destination.id,
                    route.nodes.len(),
                    route.cost
                );
                Message::RouteResponse(
                    route
                        .nodes
                        .iter()
                        .filter_map(|&id| self.graph.get_node(id))
                        .map(|n| Point { x: n.x, y: n.y })
                        .collect(),
                )
            }

            Ok(None) => {
                log::info!("No route from {} to {}", start.id, destination.id);
                Message::NoRoute
            }

            Err(e) => {
                log::warn!("Route search failed: {}", e);
                Message::NoRoute
            }
        }
    }
}

/// Serves the client connected over the provided [Link] until the link is closed.
///
/// Only I/O errors on the link end the session early. The link counts as closed
/// once a read returns 0 bytes, so the underlying device must block while the client
/// is idle (see [Link::recv]).
pub fn serve<R: io::Read, W: io::Write>(
    session: &mut Session<'_>,
    link: &mut Link<R, W>,
) -> io::Result<()> {
    log::info!("Waiting for the client");

    while let Some(message) = link.recv()? {
        if let Some(reply) = session.handle(message) {
            link.send(&reply)?;
        }
    }

    log::info!("Link closed");
    Ok(())
}
