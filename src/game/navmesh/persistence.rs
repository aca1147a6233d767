//! Binary navmesh files.
//!
//! Little-endian, in this order:
//! node count (u32), positions (2×f32 per node), neighbor counts (u32 per
//! node), flattened neighbors (u32), row-major distance table (f32),
//! clearance (f32 per node), nearest-grid candidate counts (u32 per cell),
//! flattened candidates (u32), occupancy bitmap words (u32).
//!
//! The arena size is not stored; callers pass the bounds the mesh was baked for.

use bevy::prelude::*;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::distance::DistanceTable;
use super::mesh::NavMesh;
use super::nearest_grid::NearestGrid;
use super::types::{check_node_count, NavmeshError, NodeId, NEAREST_GRID_COLS, NEAREST_GRID_ROWS};
use super::visibility::OccupancyGrid;
use crate::game::arena::ArenaBounds;
use crate::game::collections::CompressedRows;

pub fn save_navmesh<W: Write>(mesh: &NavMesh, writer: &mut W) -> Result<(), NavmeshError> {
    writer.write_u32::<LittleEndian>(mesh.node_count() as u32)?;

    for p in &mesh.positions {
        writer.write_f32::<LittleEndian>(p.x)?;
        writer.write_f32::<LittleEndian>(p.y)?;
    }

    write_rows(writer, &mesh.neighbors)?;

    for &d in mesh.distances.as_slice() {
        writer.write_f32::<LittleEndian>(d)?;
    }
    for &c in &mesh.clearance {
        writer.write_f32::<LittleEndian>(c)?;
    }

    write_rows(writer, mesh.nearest.rows())?;

    for word in mesh.occupancy.to_words() {
        writer.write_u32::<LittleEndian>(word)?;
    }

    Ok(())
}

pub fn load_navmesh<R: Read>(reader: &mut R, bounds: ArenaBounds) -> Result<NavMesh, NavmeshError> {
    if !bounds.is_valid() {
        return Err(NavmeshError::DegenerateArena {
            width: bounds.width(),
            height: bounds.height(),
        });
    }

    let n = reader.read_u32::<LittleEndian>()? as usize;
    check_node_count(n)?;

    let mut raw = vec![0f32; n * 2];
    reader.read_f32_into::<LittleEndian>(&mut raw)?;
    let positions: Vec<Vec2> = raw.chunks_exact(2).map(|c| Vec2::new(c[0], c[1])).collect();

    let neighbors = read_rows(reader, n, n, "neighbor")?;

    let mut distances = vec![0f32; n * n];
    reader.read_f32_into::<LittleEndian>(&mut distances)?;

    let mut clearance = vec![0f32; n];
    reader.read_f32_into::<LittleEndian>(&mut clearance)?;

    let candidates = read_rows(reader, NEAREST_GRID_COLS * NEAREST_GRID_ROWS, n, "nearest candidate")?;

    let mut words = vec![0u32; OccupancyGrid::word_count()];
    reader.read_u32_into::<LittleEndian>(&mut words)?;

    Ok(NavMesh {
        bounds,
        positions,
        clearance,
        neighbors,
        distances: DistanceTable::from_raw(n, distances),
        nearest: NearestGrid::from_candidates(&bounds, candidates),
        occupancy: OccupancyGrid::from_words(&bounds, &words),
    })
}

pub fn save_navmesh_file(mesh: &NavMesh, path: &Path) -> Result<(), NavmeshError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    save_navmesh(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn load_navmesh_file(path: &Path, bounds: ArenaBounds) -> Result<NavMesh, NavmeshError> {
    let mut reader = BufReader::new(File::open(path)?);
    load_navmesh(&mut reader, bounds)
}

fn write_rows<W: Write>(writer: &mut W, rows: &CompressedRows<NodeId>) -> Result<(), NavmeshError> {
    for count in rows.counts() {
        writer.write_u32::<LittleEndian>(count)?;
    }
    for node in rows.items() {
        writer.write_u32::<LittleEndian>(node.0)?;
    }
    Ok(())
}

/// Read `row_count` counts followed by the flattened node list, rejecting any
/// count or node index that cannot belong to an `n`-node mesh.
fn read_rows<R: Read>(
    reader: &mut R,
    row_count: usize,
    n: usize,
    what: &'static str,
) -> Result<CompressedRows<NodeId>, NavmeshError> {
    let mut counts = vec![0u32; row_count];
    reader.read_u32_into::<LittleEndian>(&mut counts)?;
    for &count in &counts {
        if count as usize > n {
            return Err(NavmeshError::IndexOutOfRange { what, index: count, limit: n });
        }
    }

    let total: usize = counts.iter().map(|&c| c as usize).sum();
    let mut raw = vec![0u32; total];
    reader.read_u32_into::<LittleEndian>(&mut raw)?;

    let mut items = Vec::with_capacity(total);
    for index in raw {
        if index as usize >= n {
            return Err(NavmeshError::IndexOutOfRange { what, index, limit: n });
        }
        items.push(NodeId(index));
    }

    CompressedRows::from_counts(&counts, items).map_err(|source| NavmeshError::Layout { what, source })
}
