//! 二进制连接文件
//!
//! - 组内：每条记录 3 个 little-endian `i32`（src, dst, 颜色标签）
//! - 组间：每条记录 2 个 little-endian `i32`（src, dst）

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::ModelError;
use crate::topo::{InterEdge, IntraEdge};

fn read_i32_records<const N: usize>(path: &Path) -> Result<Vec<[i32; N]>, ModelError> {
    let raw = std::fs::read(path).map_err(|e| ModelError::io(path, e))?;
    let record = 4 * N;
    if raw.len() % record != 0 {
        return Err(ModelError::Truncated {
            path: path.to_path_buf(),
            offset: (raw.len() / record * record) as u64,
        });
    }
    Ok(raw
        .chunks_exact(record)
        .map(|chunk| {
            let mut out = [0i32; N];
            for (v, b) in out.iter_mut().zip(chunk.chunks_exact(4)) {
                *v = i32::from_le_bytes([b[0], b[1], b[2], b[3]]);
            }
            out
        })
        .collect())
}

pub fn read_intra_edges(path: &Path) -> Result<Vec<IntraEdge>, ModelError> {
    let edges: Vec<IntraEdge> = read_i32_records::<3>(path)?
        .into_iter()
        .map(|[src, dst, tag]| IntraEdge { src, dst, tag })
        .collect();
    info!(path = %path.display(), edges = edges.len(), "读取组内连接");
    Ok(edges)
}

pub fn read_inter_edges(path: &Path) -> Result<Vec<InterEdge>, ModelError> {
    let edges: Vec<InterEdge> = read_i32_records::<2>(path)?
        .into_iter()
        .map(|[src, dst]| InterEdge { src, dst })
        .collect();
    info!(path = %path.display(), edges = edges.len(), "读取组间连接");
    Ok(edges)
}

fn write_i32_records<const N: usize>(
    path: &Path,
    records: impl Iterator<Item = [i32; N]>,
) -> Result<(), ModelError> {
    let file = File::create(path).map_err(|e| ModelError::io(path, e))?;
    let mut w = BufWriter::new(file);
    for rec in records {
        for v in rec {
            w.write_all(&v.to_le_bytes())
                .map_err(|e| ModelError::io(path, e))?;
        }
    }
    w.flush().map_err(|e| ModelError::io(path, e))
}

pub fn write_intra_edges(path: &Path, edges: &[IntraEdge]) -> Result<(), ModelError> {
    write_i32_records(path, edges.iter().map(|e| [e.src, e.dst, e.tag]))
}

pub fn write_inter_edges(path: &Path, edges: &[InterEdge]) -> Result<(), ModelError> {
    write_i32_records(path, edges.iter().map(|e| [e.src, e.dst]))
}
