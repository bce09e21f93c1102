// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;

use super::{Decoder, Message};

const READ_CHUNK_SIZE: usize = 256;

/// Link exchanges [Messages](Message) with the client over a pair of blocking byte streams,
/// usually both ends of the same serial device.
///
/// Only messages sent by the client are accepted, see [Decoder].
#[derive(Debug)]
pub struct Link<R, W> {
    reader: R,
    writer: W,
    decoder: Decoder,
}

impl<R: io::Read, W: io::Write> Link<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            decoder: Decoder::new(),
        }
    }

    /// Blocks until the next message arrives. Returns `None` once the link is closed.
    ///
    /// Framing errors are logged and skipped over.
    ///
    /// A read of 0 bytes counts as the link being closed. The reader must therefore block
    /// until data arrives; a serial device set up with a read timeout (`VMIN=0`, `VTIME>0`)
    /// would end the link as soon as the client stays quiet for that long.
    pub fn recv(&mut self) -> io::Result<Option<Message>> {
        let mut chunk = [0_u8; READ_CHUNK_SIZE];

        loop {
            while let Some(frame) = self.decoder.next_frame() {
                match frame {
                    Ok(message) => {
                        log::debug!("Received {:?}", message);
                        return Ok(Some(message));
                    }
                    Err(e) => log::warn!("Framing error, resynchronizing: {}", e),
                }
            }

            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    if self.decoder.buffered() > 0 {
                        log::debug!(
                            "Link closed with {} undecoded bytes",
                            self.decoder.buffered()
                        );
                    }
                    return Ok(None);
                }
                Ok(n) => self.decoder.feed(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Sends a message and flushes the underlying writer.
    pub fn send(&mut self, message: &Message) -> io::Result<()> {
        let frame = message
            .encode()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        log::debug!("Sending {:?}", message);
        self.writer.write_all(&frame)?;
        self.writer.flush()
    }

    /// Unwraps this link, returning the underlying reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Decoder, Point, Sender, MAGIC};
    use super::*;

    /// Reader returning its data in small pieces, with an interruption in between.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        interrupted: bool,
    }

    impl io::Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }

            let n = 3.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn recv_until_closed() {
        let mut data = vec![MAGIC, 0x7F, 0, 0];
        Message::SelectPoint(Point { x: 1, y: 2 })
            .encode_into(&mut data)
            .unwrap();
        data.push(0x00);
        Message::CancelSelection.encode_into(&mut data).unwrap();

        let reader = Trickle {
            data,
            pos: 0,
            interrupted: false,
        };
        let mut link = Link::new(reader, Vec::new());

        assert_eq!(
            link.recv().unwrap(),
            Some(Message::SelectPoint(Point { x: 1, y: 2 }))
        );
        assert_eq!(link.recv().unwrap(), Some(Message::CancelSelection));
        assert_eq!(link.recv().unwrap(), None);
    }

    #[test]
    fn send() {
        let mut link = Link::new(io::empty(), Vec::new());
        link.send(&Message::NoRoute).unwrap();
        link.send(&Message::RouteResponse(vec![Point { x: 7, y: 8 }]))
            .unwrap();

        let (_, written) = link.into_inner();
        let mut d = Decoder::reading_from(Sender::Server);
        d.feed(&written);
        assert_eq!(d.next_frame(), Some(Ok(Message::NoRoute)));
        assert_eq!(
            d.next_frame(),
            Some(Ok(Message::RouteResponse(vec![Point { x: 7, y: 8 }])))
        );
        assert_eq!(d.next_frame(), None);
    }
}
