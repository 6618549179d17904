//! Flat-file mesh ingestion.
//!
//! Two headerless text files: one of whitespace-separated floats
//! (`x y z` per point) and one of whitespace-separated triangle indices.
//! There is no versioning; anything that is not a number is an error.

use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use glam::{Mat4, Vec3};
use tracing::info;
use weft_types::{WeftError, WeftResult};

use crate::description::{IndexBuffer, MeshDescription, PositionBuffer};

/// Parses whitespace-separated floats.
pub fn parse_floats(text: &str) -> WeftResult<Vec<f32>> {
    parse_tokens(text, "float")
}

/// Parses whitespace-separated unsigned indices.
pub fn parse_indices(text: &str) -> WeftResult<Vec<u32>> {
    parse_tokens(text, "index")
}

fn parse_tokens<T: FromStr>(text: &str, what: &str) -> WeftResult<Vec<T>> {
    text.split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            token.parse::<T>().map_err(|_| {
                WeftError::Parse(format!("token {i} ('{token}') is not a valid {what}"))
            })
        })
        .collect()
}

/// Reads a flat position file.
pub fn read_positions(path: &Path) -> WeftResult<Vec<f32>> {
    parse_floats(&std::fs::read_to_string(path)?)
}

/// Reads a flat index file.
pub fn read_indices(path: &Path) -> WeftResult<Vec<u32>> {
    parse_indices(&std::fs::read_to_string(path)?)
}

/// Loads a mesh description from a position file and an index file.
pub fn load_from_files(
    positions_path: &Path,
    indices_path: &Path,
    transform: Mat4,
) -> WeftResult<MeshDescription> {
    let positions = read_positions(positions_path)?;
    let indices = read_indices(indices_path)?;
    let desc = MeshDescription::build_from_raw_buffers(
        PositionBuffer::Packed(&positions),
        IndexBuffer::U32(&indices),
        transform,
    )?;
    info!(
        positions = %positions_path.display(),
        points = desc.point_count(),
        triangles = desc.triangle_count(),
        "loaded mesh from flat files"
    );
    Ok(desc)
}

/// Writes positions as one `x y z` line per point.
pub fn write_positions(path: &Path, points: &[Vec3]) -> WeftResult<()> {
    let mut out = String::with_capacity(points.len() * 24);
    for p in points {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{} {} {}", p.x, p.y, p.z);
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Writes triangle indices as one `a b c` line per triangle.
pub fn write_indices(path: &Path, triangles: &[[u32; 3]]) -> WeftResult<()> {
    let mut out = String::with_capacity(triangles.len() * 12);
    for [a, b, c] in triangles {
        let _ = writeln!(out, "{a} {b} {c}");
    }
    std::fs::write(path, out)?;
    Ok(())
}
