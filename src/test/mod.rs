mod engine_config;
mod input_files;
mod messages;
mod path_generator;

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::flow::{EngineConfig, Message, MessageSet};
use crate::route::RoutingPolicy;
use crate::topo::{
    Dims, DragonflyTopology, InterEdge, LinkLayout, regular_inter_edges, regular_intra_edges,
};

pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "aries-flow-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub(crate) fn dims(groups: i64, rows: i64, cols: i64, pcis: i64, cores: i64) -> Dims {
    Dims::new([groups, rows, cols, pcis, cores]).expect("valid dims")
}

/// 规则连接的小拓扑
pub(crate) fn regular_topology(
    groups: usize,
    rows: usize,
    cols: usize,
    pcis: usize,
) -> DragonflyTopology {
    let d = dims(groups as i64, rows as i64, cols as i64, pcis as i64, 1);
    DragonflyTopology::build(
        d.routers() as i64,
        d,
        LinkLayout::default(),
        &regular_intra_edges(rows, cols),
        &regular_inter_edges(groups, rows, cols),
    )
    .expect("regular topology")
}

/// 2x2x2，组间只有 1 <-> 6 一条 blue 链路
pub(crate) fn two_group_topology() -> DragonflyTopology {
    let d = dims(2, 2, 2, 1, 1);
    DragonflyTopology::build(
        8,
        d,
        LinkLayout::default(),
        &regular_intra_edges(2, 2),
        &[InterEdge { src: 1, dst: 6 }, InterEdge { src: 6, dst: 1 }],
    )
    .expect("two-group topology")
}

pub(crate) fn direct_config() -> EngineConfig {
    EngineConfig {
        routing: RoutingPolicy::Direct,
        ..EngineConfig::default()
    }
}

pub(crate) fn message_set(msgs: &[(usize, usize, f64)]) -> MessageSet {
    let mut set = MessageSet::new();
    for &(src, dst, mb) in msgs {
        set.push(Message::new(src, dst, 0, 0, mb));
    }
    set
}
