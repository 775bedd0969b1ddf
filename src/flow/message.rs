//! 消息集合
//!
//! 每个 rank 只持有全局消息列表中属于自己的连续切片。
//! 源、目的落在同一路由器上的消息（以及零字节消息）在进入求解器之前被丢弃。

use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::ModelError;
use crate::route::{Hop, Path};
use crate::topo::EndpointMap;

/// 字节到 MB 的换算
pub const MB: f64 = 1024.0 * 1024.0;

/// 通信 trace 中的一条记录（端点编号，字节数）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceRecord {
    pub src: i64,
    pub dst: i64,
    pub bytes: f64,
}

/// 一条候选路径及其分配状态
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub path: Path,
    /// 本次迭代请求的带宽
    pub load: f64,
    /// 是否仍可继续扩张
    pub expand: bool,
}

impl Candidate {
    pub fn new(path: Path) -> Self {
        Self {
            path,
            load: 0.0,
            expand: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// 源路由器
    pub src: usize,
    /// 目的路由器
    pub dst: usize,
    pub src_pci: usize,
    pub dst_pci: usize,
    /// 数据量（MB）
    pub bytes: f64,
    /// 已分配的累计带宽
    pub bw: f64,
    pub candidates: Vec<Candidate>,
    /// 逐跳累计带宽（仅 retained 模式使用）
    pub(crate) retained: BTreeMap<Hop, f64>,
}

impl Message {
    pub fn new(src: usize, dst: usize, src_pci: usize, dst_pci: usize, bytes: f64) -> Self {
        Self {
            src,
            dst,
            src_pci,
            dst_pci,
            bytes,
            bw: 0.0,
            candidates: Vec::new(),
            retained: BTreeMap::new(),
        }
    }

    /// 替换候选路径；数量不变时保留每条路径的负载与扩张状态
    pub fn set_paths(&mut self, paths: Vec<Path>) {
        if paths.len() == self.candidates.len() {
            for (c, p) in self.candidates.iter_mut().zip(paths) {
                c.path = p;
            }
        } else {
            self.candidates = paths.into_iter().map(Candidate::new).collect();
        }
    }

    /// 所有候选路径平分全部数据量，全部可扩张
    pub fn reset_loads(&mut self) {
        let n = self.candidates.len().max(1) as f64;
        for c in &mut self.candidates {
            c.load = self.bytes / n;
            c.expand = true;
        }
    }

    pub fn is_expanding(&self) -> bool {
        self.candidates.iter().any(|c| c.expand)
    }
}

/// `[0, total)` 均匀切分后 `rank` 的区间
pub fn partition(total: u64, rank: usize, size: usize) -> Range<u64> {
    let total = total as u128;
    let begin = total * rank as u128 / size as u128;
    let end = total * (rank as u128 + 1) / size as u128;
    begin as u64..end as u64
}

/// 本 rank 的消息
#[derive(Debug, Clone, Default)]
pub struct MessageSet {
    messages: Vec<Message>,
    dropped: usize,
    total_mb: f64,
}

impl MessageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一条 trace 记录；`base` 为该 trace 文件的端点编号偏移。
    /// 返回是否真正加入（自发自收与零字节消息被丢弃）。
    pub fn push_record(
        &mut self,
        rec: TraceRecord,
        base: i64,
        map: &EndpointMap,
    ) -> Result<bool, ModelError> {
        let src = *map.get(rec.src + base)?;
        let dst = *map.get(rec.dst + base)?;
        if src.router() == dst.router() || !(rec.bytes > 0.0) {
            self.dropped += 1;
            return Ok(false);
        }
        let msg = Message::new(
            map.router_of(&src),
            map.router_of(&dst),
            src.pci(),
            dst.pci(),
            rec.bytes / MB,
        );
        self.total_mb += msg.bytes;
        self.messages.push(msg);
        Ok(true)
    }

    pub fn push(&mut self, msg: Message) {
        assert_ne!(msg.src, msg.dst, "self-message must not enter the solver");
        self.total_mb += msg.bytes;
        self.messages.push(msg);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// 被过滤掉的记录数
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// 保留消息的总数据量（MB）
    pub fn total_mb(&self) -> f64 {
        self.total_mb
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}
