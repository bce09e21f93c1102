// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use graph_builder::GraphBuilder;

use crate::Graph;

mod graph_builder;
mod model;
mod text;

/// Factor by which latitudes and longitudes (in degrees) are multiplied
/// to get positions on the integer map grid used by the client.
pub const COORDINATE_SCALE: f64 = 100_000.0;

/// Format of the input map file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    Unknown,

    /// Force uncompressed text
    Text,

    /// Force text with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    TextGz,

    /// Force text with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    TextBz2,
}

impl FileFormat {
    /// Guesses the format from the extension of a file.
    /// Returns [FileFormat::Unknown] for anything which doesn't look compressed,
    /// leaving the decision to content detection.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("gz") => Self::TextGz,
            Some("bz2") => Self::TextBz2,
            _ => Self::Unknown,
        }
    }

    /// Guesses the format from the first few bytes of a file.
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(&[0x1F, 0x8B]) {
            Self::TextGz
        } else if head.starts_with(b"BZh") {
            Self::TextBz2
        } else {
            Self::Text
        }
    }
}

/// Additional controls for interpreting map data as a routing [Graph].
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Format of the input data.
    pub file_format: FileFormat,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            file_format: FileFormat::Unknown,
        }
    }
}

/// Error which can occur when loading a map.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {reason}")]
    MalformedMapData { line: usize, reason: Malformed },
}

/// Reason why a record of a map file was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Malformed {
    #[error("unknown record type {0:?}")]
    UnknownRecord(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("unexpected trailing fields")]
    TrailingFields,

    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unterminated street name")]
    UnterminatedName,

    #[error("invalid edge cost: {0}")]
    InvalidCost(f32),

    #[error("reference to unknown node {0}")]
    UnknownNode(i64),

    #[error("duplicate node {0}")]
    DuplicateNode(i64),
}

/// Internal trait for objects which can stream [map features](model::Feature)
/// from an underlying source.
trait FeatureReader {
    /// Returns the next feature, or `None` at the end of the input.
    fn next(&mut self) -> Result<Option<model::Feature>, Error>;

    /// Returns the 1-based number of the line of the last returned feature.
    fn line(&self) -> usize;
}

/// Parse map features from a reader into a [Graph] as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader.
pub fn add_features_from_io<R: io::Read>(
    g: &mut Graph,
    options: &Options,
    reader: R,
) -> Result<(), Error> {
    let mut b = io::BufReader::new(reader);
    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(b.fill_buf()?),
        f => f,
    };
    add_features_from_bufread(g, format, b)
}

/// Parse map features from a file at the provided path into a [Graph] as per the provided [Options].
pub fn add_features_from_file<P: AsRef<Path>>(
    g: &mut Graph,
    options: &Options,
    path: P,
) -> Result<(), Error> {
    let f = File::open(path)?;
    add_features_from_io(g, options, f)
}

/// Parse map features from a static buffer into a [Graph] as per the provided [Options].
pub fn add_features_from_buffer(
    g: &mut Graph,
    options: &Options,
    data: &[u8],
) -> Result<(), Error> {
    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(data),
        f => f,
    };
    add_features_from_bufread(g, format, data)
}

fn add_features_from_bufread<B: BufRead>(
    g: &mut Graph,
    format: FileFormat,
    b: B,
) -> Result<(), Error> {
    match format {
        FileFormat::Unknown | FileFormat::Text => {
            GraphBuilder::new(g).add_features(text::Reader::new(b))
        }

        FileFormat::TextGz => {
            let d = flate2::bufread::MultiGzDecoder::new(b);
            GraphBuilder::new(g).add_features(text::Reader::new(io::BufReader::new(d)))
        }

        FileFormat::TextBz2 => {
            let d = bzip2::bufread::MultiBzDecoder::new(b);
            GraphBuilder::new(g).add_features(text::Reader::new(io::BufReader::new(d)))
        }
    }
}
