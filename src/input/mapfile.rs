//! 端点映射文件
//!
//! 每个端点一行 5 个整数（group row col pci core），按端点编号顺序排列。
//! 文件不存在时退回默认的维度顺序映射。

use std::path::Path;

use tracing::info;

use crate::error::ModelError;
use crate::topo::{Coords, Dims, EndpointMap, NUM_COORDS};

pub fn load_endpoint_map(path: Option<&Path>, dims: Dims) -> Result<EndpointMap, ModelError> {
    let Some(path) = path.filter(|p| p.exists()) else {
        info!("映射文件不存在，使用默认映射");
        return Ok(EndpointMap::dimension_ordered(dims));
    };
    info!(path = %path.display(), "读取映射文件");
    let text = std::fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
    parse_endpoint_map(path, &text, dims)
}

pub fn parse_endpoint_map(path: &Path, text: &str, dims: Dims) -> Result<EndpointMap, ModelError> {
    let parse_err = |line: usize, msg: String| ModelError::Parse {
        path: path.to_path_buf(),
        line,
        msg,
    };

    let mut values = Vec::with_capacity(dims.endpoints() * NUM_COORDS);
    for (i, line) in text.lines().enumerate() {
        for tok in line.split_whitespace() {
            let v = tok
                .parse::<usize>()
                .map_err(|_| parse_err(i + 1, format!("expected coordinate, got `{tok}`")))?;
            values.push((i + 1, v));
        }
    }

    let needed = dims.endpoints() * NUM_COORDS;
    if values.len() < needed {
        let line = values.last().map(|(l, _)| *l).unwrap_or(0);
        return Err(parse_err(
            line,
            format!(
                "expected {} endpoints ({} values), found {} values",
                dims.endpoints(),
                needed,
                values.len()
            ),
        ));
    }

    let coords = values[..needed]
        .chunks_exact(NUM_COORDS)
        .map(|chunk| {
            let mut c = [0; NUM_COORDS];
            for (slot, (_, v)) in c.iter_mut().zip(chunk) {
                *slot = *v;
            }
            Coords(c)
        })
        .collect();
    EndpointMap::from_coords(dims, coords)
}
