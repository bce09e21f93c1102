// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;

use super::model::{Feature, Segment};
use super::{Error, FeatureReader, Malformed, COORDINATE_SCALE};
use crate::Node;

/// Reader reads map [Features](Feature) from a text file with one comma-separated
/// record per line:
///
/// - `V,<id>,<lat>,<lon>` - a vertex, with its position in decimal degrees,
/// - `E,<from>,<to>,<name>[,<cost>]` - a one-way road segment, the name may be quoted.
///
/// Empty lines and lines starting with `#` are skipped.
pub(super) struct Reader<R: io::BufRead> {
    inner: R,
    buf: String,
    line: usize,
}

impl<R: io::BufRead> Reader<R> {
    pub(super) fn new(inner: R) -> Self {
        Self {
            inner,
            buf: String::new(),
            line: 0,
        }
    }

    fn malformed(&self, reason: Malformed) -> Error {
        Error::MalformedMapData {
            line: self.line,
            reason,
        }
    }
}

impl<R: io::BufRead> FeatureReader for Reader<R> {
    fn next(&mut self) -> Result<Option<Feature>, Error> {
        loop {
            self.buf.clear();
            if self.inner.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let record = self.buf.trim();
            if record.is_empty() || record.starts_with('#') {
                continue;
            }

            return parse_record(record)
                .map(Some)
                .map_err(|reason| self.malformed(reason));
        }
    }

    fn line(&self) -> usize {
        self.line
    }
}

fn parse_record(record: &str) -> Result<Feature, Malformed> {
    let (kind, rest) = record.split_once(',').unwrap_or((record, ""));
    match kind {
        "V" => parse_vertex(rest).map(Feature::Vertex),
        "E" => parse_segment(rest).map(Feature::Segment),
        _ => Err(Malformed::UnknownRecord(kind.to_string())),
    }
}

fn parse_vertex(fields: &str) -> Result<Node, Malformed> {
    let mut fields = fields.split(',');
    let id = parse_number("id", fields.next().ok_or(Malformed::MissingField("id"))?)?;
    let lat = parse_coordinate("lat", fields.next().ok_or(Malformed::MissingField("lat"))?)?;
    let lon = parse_coordinate("lon", fields.next().ok_or(Malformed::MissingField("lon"))?)?;

    if fields.next().is_some() {
        return Err(Malformed::TrailingFields);
    }

    Ok(Node { id, x: lat, y: lon })
}

fn parse_segment(fields: &str) -> Result<Segment, Malformed> {
    let mut fields = fields.splitn(3, ',');
    let from = parse_number("from", fields.next().ok_or(Malformed::MissingField("from"))?)?;
    let to = parse_number("to", fields.next().ok_or(Malformed::MissingField("to"))?)?;
    let (name, cost) = split_name(fields.next().unwrap_or_default())?;

    let cost = match cost {
        Some(cost) => {
            let cost: f32 = parse_number("cost", cost)?;
            if !cost.is_finite() || cost < 0.0 {
                return Err(Malformed::InvalidCost(cost));
            }
            Some(cost)
        }
        None => None,
    };

    Ok(Segment {
        from,
        to,
        name: name.to_string(),
        cost,
    })
}

/// Splits the `<name>[,<cost>]` tail of a segment record.
/// Quoted names may contain commas.
fn split_name(tail: &str) -> Result<(&str, Option<&str>), Malformed> {
    if let Some(quoted) = tail.strip_prefix('"') {
        let end = quoted.find('"').ok_or(Malformed::UnterminatedName)?;
        let (name, after) = (&quoted[..end], &quoted[end + 1..]);
        if after.is_empty() {
            Ok((name, None))
        } else if let Some(cost) = after.strip_prefix(',') {
            Ok((name, Some(cost)))
        } else {
            Err(Malformed::TrailingFields)
        }
    } else {
        match tail.split_once(',') {
            Some((name, cost)) => Ok((name, Some(cost))),
            None => Ok((tail, None)),
        }
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, Malformed> {
    value.trim().parse().map_err(|_| Malformed::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_coordinate(field: &'static str, value: &str) -> Result<i32, Malformed> {
    let degrees: f64 = parse_number(field, value)?;
    let scaled = (degrees * COORDINATE_SCALE).round();

    if scaled.is_finite() && scaled >= i32::MIN as f64 && scaled <= i32::MAX as f64 {
        Ok(scaled as i32)
    } else {
        Err(Malformed::InvalidNumber {
            field,
            value: value.to_string(),
        })
    }
}
