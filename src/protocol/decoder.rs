// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::{check_header, decode_payload, FrameError, Message, Sender, HEADER_SIZE, MAGIC};

/// Decoder turns a stream of bytes, arriving in arbitrary chunks, into [Messages](Message).
///
/// Noise on the link is skipped: bytes before a [MAGIC] byte are discarded,
/// and a header which can't start a valid frame only causes its [MAGIC] byte to be
/// dropped, after which the search for the next frame continues. Every skip is reported
/// as a [FrameError], but never stops the decoder.
///
/// A decoder reads frames sent by one end of the link only. Headers with tags of the
/// other end are treated as noise, so a corrupted header can't stall the decoder while
/// it waits for a long payload which never comes.
#[derive(Debug, Default, Clone)]
pub struct Decoder {
    buf: Vec<u8>,
    sender: Sender,
}

impl Decoder {
    /// Creates a decoder for frames sent by the client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder for frames sent by the provided end of the link.
    pub fn reading_from(sender: Sender) -> Self {
        Self {
            buf: Vec::new(),
            sender,
        }
    }

    /// Appends bytes received from the link.
    pub fn feed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Returns the number of bytes received, but not yet decoded.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Tries to decode the next frame from the buffered bytes.
    ///
    /// Returns `None` if more bytes are needed. Framing errors are returned
    /// once, and the offending bytes are already discarded by the time they are returned.
    pub fn next_frame(&mut self) -> Option<Result<Message, FrameError>> {
        // Resynchronize on the next MAGIC byte
        match self.buf.iter().position(|&b| b == MAGIC) {
            Some(0) => {}
            Some(skip) => {
                self.buf.drain(..skip);
                return Some(Err(FrameError::Garbage(skip)));
            }
            None if self.buf.is_empty() => return None,
            None => {
                let skip = self.buf.len();
                self.buf.clear();
                return Some(Err(FrameError::Garbage(skip)));
            }
        }

        if self.buf.len() < HEADER_SIZE {
            return None;
        }

        let tag = self.buf[1];
        let len = u16::from_le_bytes([self.buf[2], self.buf[3]]);
        if let Err(e) = check_header(self.sender, tag, len) {
            self.buf.drain(..1);
            return Some(Err(e));
        }

        let frame_len = HEADER_SIZE + len as usize;
        if self.buf.len() < frame_len {
            return None;
        }

        let message = decode_payload(tag, &self.buf[HEADER_SIZE..frame_len]);
        self.buf.drain(..frame_len);
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::super::Point;
    use super::*;

    fn decode_all(d: &mut Decoder) -> (Vec<Message>, Vec<FrameError>) {
        let mut messages = vec![];
        let mut errors = vec![];
        while let Some(frame) = d.next_frame() {
            match frame {
                Ok(m) => messages.push(m),
                Err(e) => errors.push(e),
            }
        }
        (messages, errors)
    }

    fn all_messages() -> Vec<Message> {
        vec![
            Message::SelectPoint(Point {
                x: 5_350_010,
                y: -11_349_990,
            }),
            Message::CancelSelection,
            Message::RouteResponse(vec![
                Point { x: 1, y: 2 },
                Point { x: -3, y: 4 },
                Point {
                    x: i32::MAX,
                    y: i32::MIN,
                },
            ]),
            Message::RouteResponse(vec![]),
            Message::NoRoute,
        ]
    }

    fn messages_from(sender: Sender) -> Vec<Message> {
        all_messages()
            .into_iter()
            .filter(|m| m.sender() == sender)
            .collect()
    }

    #[test]
    fn round_trip() {
        for m in all_messages() {
            let mut d = Decoder::reading_from(m.sender());
            d.feed(&m.encode().unwrap());
            assert_eq!(d.next_frame(), Some(Ok(m)));
            assert_eq!(d.next_frame(), None);
            assert_eq!(d.buffered(), 0);
        }
    }

    #[test]
    fn multiple_frames_in_one_chunk() {
        for sender in [Sender::Client, Sender::Server] {
            let mut data = vec![];
            for m in messages_from(sender) {
                m.encode_into(&mut data).unwrap();
            }

            let mut d = Decoder::reading_from(sender);
            d.feed(&data);
            assert_eq!(decode_all(&mut d), (messages_from(sender), vec![]));
        }
    }

    #[test]
    fn partial_reads() {
        let m = Message::SelectPoint(Point { x: 10, y: 10 });
        let data = m.encode().unwrap();

        let mut d = Decoder::new();
        for &b in &data[..data.len() - 1] {
            d.feed(&[b]);
            assert_eq!(d.next_frame(), None);
        }

        d.feed(&data[data.len() - 1..]);
        assert_eq!(d.next_frame(), Some(Ok(m)));
        assert_eq!(d.next_frame(), None);
    }

    #[test]
    fn resync_after_unknown_tag() {
        let m = Message::SelectPoint(Point { x: 50, y: 50 });
        let mut data = vec![MAGIC, 0x55, 0x00, 0x00];
        m.encode_into(&mut data).unwrap();

        let mut d = Decoder::new();
        d.feed(&data);
        let (messages, errors) = decode_all(&mut d);
        assert_eq!(messages, vec![m]);
        assert_eq!(
            errors,
            vec![FrameError::UnknownTag(0x55), FrameError::Garbage(3)]
        );
    }

    #[test]
    fn resync_after_invalid_length() {
        let m = Message::CancelSelection;
        let mut data = vec![MAGIC, 0x01, 0xFF, 0xFF];
        m.encode_into(&mut data).unwrap();

        let mut d = Decoder::new();
        d.feed(&data);
        let (messages, errors) = decode_all(&mut d);
        assert_eq!(messages, vec![m]);
        assert_eq!(
            errors,
            vec![
                FrameError::InvalidLength {
                    tag: 0x01,
                    len: 0xFFFF
                },
                FrameError::Garbage(3)
            ]
        );
    }

    #[test]
    fn server_headers_from_client_are_skipped() {
        // Looks like the start of a 32 KiB route response
        let mut data = vec![MAGIC, 0x81, 0x00, 0x80];
        let m = Message::SelectPoint(Point { x: 10, y: 10 });
        for _ in 0..100 {
            m.encode_into(&mut data).unwrap();
        }
        data.extend_from_slice(&[MAGIC, 0x82, 0x00, 0x00]);
        Message::CancelSelection.encode_into(&mut data).unwrap();

        let mut d = Decoder::new();
        d.feed(&data);
        let (messages, errors) = decode_all(&mut d);

        let mut expected = vec![m; 100];
        expected.push(Message::CancelSelection);
        assert_eq!(messages, expected);
        assert_eq!(
            errors,
            vec![
                FrameError::UnknownTag(0x81),
                FrameError::Garbage(3),
                FrameError::UnknownTag(0x82),
                FrameError::Garbage(3),
            ]
        );
        assert_eq!(d.buffered(), 0);
    }

    #[test]
    fn client_headers_from_server_are_skipped() {
        let mut data = vec![MAGIC, 0x01, 0x08, 0x00];
        Message::NoRoute.encode_into(&mut data).unwrap();

        let mut d = Decoder::reading_from(Sender::Server);
        d.feed(&data);
        assert_eq!(
            decode_all(&mut d),
            (
                vec![Message::NoRoute],
                vec![FrameError::UnknownTag(0x01), FrameError::Garbage(3)]
            )
        );
    }

    #[test]
    fn resync_across_chunks() {
        let m = Message::CancelSelection;
        let mut data = vec![0x00, 0x13, MAGIC, 0x99, 0x01];
        m.encode_into(&mut data).unwrap();

        let mut d = Decoder::new();
        let mut messages = vec![];
        for chunk in data.chunks(2) {
            d.feed(chunk);
            messages.extend(decode_all(&mut d).0);
        }
        assert_eq!(messages, vec![m]);
        assert_eq!(d.buffered(), 0);
    }

    #[test]
    fn noise_only() {
        let mut d = Decoder::new();
        d.feed(&[0x00, 0x01, 0x02]);
        assert_eq!(d.next_frame(), Some(Err(FrameError::Garbage(3))));
        assert_eq!(d.next_frame(), None);
    }
}
