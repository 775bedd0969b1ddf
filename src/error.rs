//! 错误类型
//!
//! 配置与输入错误统一为 `ModelError`；路径构造中的内部一致性问题直接 panic。

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("non-positive value for {field}: {value}")]
    NonPositive { field: &'static str, value: i64 },

    #[error("router count {routers} does not match groups*rows*cols = {expected}")]
    RouterCountMismatch { routers: usize, expected: usize },

    #[error("{what} coordinate {coords:?} is outside dimensions {dims:?}")]
    CoordOutOfRange {
        what: &'static str,
        coords: Vec<usize>,
        dims: Vec<usize>,
    },

    #[error("{path}: truncated record at byte {offset}")]
    Truncated { path: PathBuf, offset: u64 },

    #[error("{path}:{line}: {msg}")]
    Parse {
        path: PathBuf,
        line: usize,
        msg: String,
    },

    #[error("router {router} has more {class} links than the {slots} configured slots")]
    LinkSlotsExceeded {
        router: usize,
        class: &'static str,
        slots: usize,
    },

    #[error("edge {src} -> {dst} references a router outside 0..{limit}")]
    EdgeOutOfRange { src: i64, dst: i64, limit: usize },

    #[error("message endpoint {endpoint} is outside 0..{endpoints}")]
    UnknownEndpoint { endpoint: i64, endpoints: usize },

    #[error("invalid engine parameters: {0}")]
    Params(String),

    #[error("rank {rank} panicked: {msg}")]
    RankPanicked { rank: usize, msg: String },
}

impl ModelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModelError::Io {
            path: path.into(),
            source,
        }
    }
}

/// 校验配置值为正数。
pub(crate) fn positive(field: &'static str, value: i64) -> Result<usize, ModelError> {
    if value <= 0 {
        return Err(ModelError::NonPositive { field, value });
    }
    Ok(value as usize)
}
