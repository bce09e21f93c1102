// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading of the road network from map files.
//!
//! A map file is a plain (or gzip/bzip2-compressed) text file with one record
//! per line. `V,<id>,<lat>,<lon>` records describe intersections, and
//! `E,<from>,<to>,<name>[,<cost>]` records describe one-way road segments between them.
//! Positions are converted to the client's grid by multiplying degrees by
//! [COORDINATE_SCALE]. Segments without an explicit cost cost as much as the
//! straight-line distance between their ends.

mod reader;

pub use reader::{
    add_features_from_buffer, add_features_from_file, add_features_from_io, Error, FileFormat,
    Malformed, Options, COORDINATE_SCALE,
};
