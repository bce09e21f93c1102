// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Framing of messages exchanged with the embedded client over the serial link.
//!
//! Every frame starts with a 4-byte header: [MAGIC], a message tag, and the length
//! of the payload as a little-endian u16. All integers in payloads are little-endian.
//!
//! | Message                    | Tag    | Payload                                     |
//! |----------------------------|--------|---------------------------------------------|
//! | [Message::SelectPoint]     | `0x01` | `x: i32`, `y: i32`                          |
//! | [Message::CancelSelection] | `0x02` | -                                           |
//! | [Message::RouteResponse]   | `0x81` | `x: i32`, `y: i32` for every point in order |
//! | [Message::NoRoute]         | `0x82` | -                                           |

mod decoder;
mod link;

pub use decoder::Decoder;
pub use link::Link;

/// First byte of every frame.
pub const MAGIC: u8 = 0xA5;

/// Size of the frame header, in bytes.
pub const HEADER_SIZE: usize = 4;

/// Maximum number of points in a [Message::RouteResponse].
pub const MAX_ROUTE_POINTS: usize = 4096;

const POINT_SIZE: usize = 8;

const TAG_SELECT_POINT: u8 = 0x01;
const TAG_CANCEL_SELECTION: u8 = 0x02;
const TAG_ROUTE_RESPONSE: u8 = 0x81;
const TAG_NO_ROUTE: u8 = 0x82;

/// End of the link a frame was sent from.
///
/// Each side only ever sends its own messages, so a [Decoder] reading frames from one end
/// treats tags of the other end as unknown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// The embedded map client, sending [Message::SelectPoint] and [Message::CancelSelection].
    #[default]
    Client,

    /// The route server, sending [Message::RouteResponse] and [Message::NoRoute].
    Server,
}

/// A position on the map grid, as sent over the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// A single message exchanged with the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Client confirmed a cursor position with a button press.
    SelectPoint(Point),

    /// Client aborted picking the start and destination.
    CancelSelection,

    /// Route between the selected points, one point per node, in travel order.
    RouteResponse(Vec<Point>),

    /// There is no route between the selected points.
    NoRoute,
}

/// Error which can occur when framing or unframing a [Message].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("skipped {0} bytes before the start of a frame")]
    Garbage(usize),

    #[error("unknown message tag: {0:#04x}")]
    UnknownTag(u8),

    #[error("invalid payload length for message {tag:#04x}: {len}")]
    InvalidLength { tag: u8, len: u16 },

    #[error("route too long: {0} > {MAX_ROUTE_POINTS} points")]
    RouteTooLong(usize),
}

impl Message {
    fn tag(&self) -> u8 {
        match self {
            Self::SelectPoint(_) => TAG_SELECT_POINT,
            Self::CancelSelection => TAG_CANCEL_SELECTION,
            Self::RouteResponse(_) => TAG_ROUTE_RESPONSE,
            Self::NoRoute => TAG_NO_ROUTE,
        }
    }

    /// Returns the end of the link which sends this message.
    pub fn sender(&self) -> Sender {
        match self {
            Self::SelectPoint(_) | Self::CancelSelection => Sender::Client,
            Self::RouteResponse(_) | Self::NoRoute => Sender::Server,
        }
    }

    /// Appends the frame representing this message to `out`.
    ///
    /// Fails only for a [Message::RouteResponse] with more than [MAX_ROUTE_POINTS] points,
    /// in which case `out` is left untouched.
    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), FrameError> {
        let points: &[Point] = match self {
            Self::SelectPoint(p) => std::slice::from_ref(p),
            Self::RouteResponse(points) => points,
            Self::CancelSelection | Self::NoRoute => &[],
        };

        if points.len() > MAX_ROUTE_POINTS {
            return Err(FrameError::RouteTooLong(points.len()));
        }

        let len = (points.len() * POINT_SIZE) as u16;
        out.reserve(HEADER_SIZE + len as usize);
        out.push(MAGIC);
        out.push(self.tag());
        out.extend_from_slice(&len.to_le_bytes());
        for p in points {
            out.extend_from_slice(&p.x.to_le_bytes());
            out.extend_from_slice(&p.y.to_le_bytes());
        }
        Ok(())
    }

    /// Returns the frame representing this message.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let mut out = Vec::new();
        self.encode_into(&mut out)?;
        Ok(out)
    }
}

/// Checks whether a header with the provided tag and payload length could start
/// a valid frame sent by `sender`. Tags of the other end are reported as unknown.
fn check_header(sender: Sender, tag: u8, len: u16) -> Result<(), FrameError> {
    let len_usize = len as usize;
    let valid = match (sender, tag) {
        (Sender::Client, TAG_SELECT_POINT) => len_usize == POINT_SIZE,
        (Sender::Client, TAG_CANCEL_SELECTION) | (Sender::Server, TAG_NO_ROUTE) => len == 0,
        (Sender::Server, TAG_ROUTE_RESPONSE) => {
            len_usize % POINT_SIZE == 0 && len_usize <= MAX_ROUTE_POINTS * POINT_SIZE
        }
        _ => return Err(FrameError::UnknownTag(tag)),
    };

    if valid {
        Ok(())
    } else {
        Err(FrameError::InvalidLength { tag, len })
    }
}

/// Decodes the payload of a frame whose header passed [check_header].
fn decode_payload(tag: u8, payload: &[u8]) -> Result<Message, FrameError> {
    let mut points = payload.chunks_exact(POINT_SIZE).map(|chunk| Point {
        x: i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
        y: i32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]),
    });

    match tag {
        TAG_SELECT_POINT => points
            .next()
            .map(Message::SelectPoint)
            .ok_or(FrameError::InvalidLength {
                tag,
                len: payload.len() as u16,
            }),
        TAG_CANCEL_SELECTION => Ok(Message::CancelSelection),
        TAG_ROUTE_RESPONSE => Ok(Message::RouteResponse(points.collect())),
        TAG_NO_ROUTE => Ok(Message::NoRoute),
        _ => Err(FrameError::UnknownTag(tag)),
    }
}
