// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Calculates the straight-line distance between two points of the map grid.
///
/// The map covers a single city, which is small enough for the grid to be treated
/// as flat, euclidean space.
pub fn grid_distance(x1: i32, y1: i32, x2: i32, y2: i32) -> f32 {
    let dx = (x2 as f64) - (x1 as f64);
    let dy = (y2 as f64) - (y1 as f64);
    dx.hypot(dy) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance() {
        assert_eq!(grid_distance(0, 0, 3, 4), 5.0);
        assert_eq!(grid_distance(3, 4, 0, 0), 5.0);
        assert_eq!(grid_distance(-7, 2, -7, 2), 0.0);
    }
}
