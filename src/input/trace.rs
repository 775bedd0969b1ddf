//! 通信 trace 文件
//!
//! 二进制格式：每条 16 字节，little-endian `i32 src, i32 dst, f64 bytes`。
//! 文本格式（扩展名 `.txt`）：每行 `src dst bytes`。
//! 每个 rank 只读取属于自己的记录区间。

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::ops::Range;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::ModelError;
use crate::flow::TraceRecord;

pub const RECORD_BYTES: u64 = 16;

fn is_text(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "txt")
}

/// 读取记录区间 `range`（按记录序号）
pub fn read_trace_range(path: &Path, range: Range<u64>) -> Result<Vec<TraceRecord>, ModelError> {
    let records = if is_text(path) {
        read_text_range(path, range.clone())?
    } else {
        read_binary_range(path, range.clone())?
    };
    let wanted = range.end - range.start;
    if (records.len() as u64) < wanted {
        warn!(
            path = %path.display(),
            wanted,
            got = records.len(),
            "trace 文件记录数少于配置的消息数"
        );
    }
    debug!(path = %path.display(), ?range, got = records.len(), "读取 trace 区间");
    Ok(records)
}

fn read_binary_range(path: &Path, range: Range<u64>) -> Result<Vec<TraceRecord>, ModelError> {
    let mut file = File::open(path).map_err(|e| ModelError::io(path, e))?;
    file.seek(SeekFrom::Start(range.start * RECORD_BYTES))
        .map_err(|e| ModelError::io(path, e))?;
    let mut raw = Vec::new();
    file.take((range.end - range.start) * RECORD_BYTES)
        .read_to_end(&mut raw)
        .map_err(|e| ModelError::io(path, e))?;
    if raw.len() as u64 % RECORD_BYTES != 0 {
        return Err(ModelError::Truncated {
            path: path.to_path_buf(),
            offset: range.start * RECORD_BYTES + raw.len() as u64 / RECORD_BYTES * RECORD_BYTES,
        });
    }
    Ok(raw
        .chunks_exact(RECORD_BYTES as usize)
        .map(|b| TraceRecord {
            src: i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64,
            dst: i32::from_le_bytes([b[4], b[5], b[6], b[7]]) as i64,
            bytes: f64::from_le_bytes([b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]]),
        })
        .collect())
}

fn parse_text_line(path: &Path, line_no: usize, line: &str) -> Result<TraceRecord, ModelError> {
    let err = |msg: String| ModelError::Parse {
        path: path.to_path_buf(),
        line: line_no,
        msg,
    };
    let mut it = line.split_whitespace();
    let mut field = |name: &str| {
        it.next()
            .ok_or_else(|| err(format!("missing {name}")))
            .map(str::to_owned)
    };
    let src = field("source")?;
    let dst = field("destination")?;
    let bytes = field("byte count")?;
    Ok(TraceRecord {
        src: src
            .parse()
            .map_err(|_| err(format!("bad source `{src}`")))?,
        dst: dst
            .parse()
            .map_err(|_| err(format!("bad destination `{dst}`")))?,
        bytes: bytes
            .parse()
            .map_err(|_| err(format!("bad byte count `{bytes}`")))?,
    })
}

fn read_text_range(path: &Path, range: Range<u64>) -> Result<Vec<TraceRecord>, ModelError> {
    let file = File::open(path).map_err(|e| ModelError::io(path, e))?;
    let mut out = Vec::new();
    let mut index = 0u64;
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| ModelError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        if index >= range.end {
            break;
        }
        if index >= range.start {
            out.push(parse_text_line(path, i + 1, &line)?);
        }
        index += 1;
    }
    Ok(out)
}

pub fn write_binary_trace(path: &Path, records: &[TraceRecord]) -> Result<(), ModelError> {
    let file = File::create(path).map_err(|e| ModelError::io(path, e))?;
    let mut w = BufWriter::new(file);
    for r in records {
        let mut buf = [0u8; RECORD_BYTES as usize];
        buf[0..4].copy_from_slice(&(r.src as i32).to_le_bytes());
        buf[4..8].copy_from_slice(&(r.dst as i32).to_le_bytes());
        buf[8..16].copy_from_slice(&r.bytes.to_le_bytes());
        w.write_all(&buf).map_err(|e| ModelError::io(path, e))?;
    }
    w.flush().map_err(|e| ModelError::io(path, e))
}

/// 文本 trace 转二进制，返回记录数
pub fn convert_text_trace(input: &Path, output: &Path) -> Result<usize, ModelError> {
    let records = read_text_range(input, 0..u64::MAX)?;
    write_binary_trace(output, &records)?;
    Ok(records.len())
}
