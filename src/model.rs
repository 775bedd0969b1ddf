//! 建模流程
//!
//! 读取拓扑、映射与 trace，按 rank 切分消息，运行分配引擎并返回
//! rank 0 上的全局结果。多 rank 时每个 rank 是一个线程，
//! 所有输入在启动 rank 之前读完，集合通信阶段不会出现输入错误。

use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use tracing::{info, warn};

use crate::cluster::{ClusterSync, SoloSync, run_ranks};
use crate::error::ModelError;
use crate::flow::{EngineConfig, FlowEngine, MessageSet, Solution, partition};
use crate::input::{
    ModelConf, TraceEntry, load_endpoint_map, read_inter_edges, read_intra_edges, read_trace_range,
};
use crate::route::rank_seed;
use crate::topo::{DragonflyTopology, EndpointMap, LinkLayout};

const ABORTED: &str = "aborted by a peer rank";

/// 随机种子来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    /// 第 `rank` 个素数
    RankTable,
    /// 所有 rank 使用同一个种子
    Fixed(u64),
}

impl SeedSource {
    pub fn seed(self, rank: usize) -> u64 {
        match self {
            SeedSource::RankTable => rank_seed(rank),
            SeedSource::Fixed(s) => s,
        }
    }
}

pub struct ModelInputs {
    pub topo: DragonflyTopology,
    pub endpoints: EndpointMap,
    pub traces: Vec<TraceEntry>,
}

impl ModelInputs {
    pub fn load(
        conf: &ModelConf,
        mapfile: Option<&Path>,
        layout: LinkLayout,
    ) -> Result<Self, ModelError> {
        let intra = read_intra_edges(&conf.intra_file)?;
        let inter = read_inter_edges(&conf.inter_file)?;
        let topo = DragonflyTopology::build(conf.num_routers, conf.dims, layout, &intra, &inter)?;
        let endpoints = load_endpoint_map(mapfile, conf.dims)?;
        Ok(Self {
            topo,
            endpoints,
            traces: conf.traces.clone(),
        })
    }

    /// 读取 `rank` 在每个 trace 文件中的消息区间
    pub fn load_messages(&self, rank: usize, size: usize) -> Result<MessageSet, ModelError> {
        let mut set = MessageSet::new();
        let mut base = 0i64;
        for entry in &self.traces {
            let range = partition(entry.messages, rank, size);
            for rec in read_trace_range(&entry.path, range)? {
                set.push_record(rec, base, &self.endpoints)?;
            }
            base += entry.ranks as i64;
        }
        Ok(set)
    }
}

/// 在给定同步句柄上求解本 rank 的消息
pub fn solve_rank<S: ClusterSync>(
    topo: &DragonflyTopology,
    cfg: &EngineConfig,
    sync: S,
    messages: MessageSet,
    seed: u64,
) -> Solution {
    FlowEngine::new(topo, cfg.clone(), sync, messages, seed).solve()
}

/// 以 `ranks` 个 SPMD rank 运行完整模型，返回全局结果
pub fn run_model(
    inputs: &ModelInputs,
    cfg: &EngineConfig,
    ranks: usize,
    seeds: SeedSource,
) -> Result<Solution, ModelError> {
    cfg.validate()?;
    positive_ranks(ranks)?;

    let read_start = Instant::now();
    let sets = (0..ranks)
        .map(|r| inputs.load_messages(r, ranks))
        .collect::<Result<Vec<_>, _>>()?;
    let msgs: usize = sets.iter().map(MessageSet::len).sum();
    let dropped: usize = sets.iter().map(MessageSet::dropped).sum();
    let volume: f64 = sets.iter().map(MessageSet::total_mb).sum();
    info!(
        elapsed_ms = read_start.elapsed().as_secs_f64() * 1e3,
        "time to read communication pattern"
    );

    let dims = inputs.topo.dims();
    info!(
        dims = ?dims.0,
        routers = inputs.topo.routers(),
        endpoints = dims.endpoints(),
        msgs,
        dropped,
        volume_mb = volume,
        ranks,
        "开始建模"
    );

    let model_start = Instant::now();
    let solution = if ranks == 1 {
        let set = sets.into_iter().next().unwrap_or_default();
        solve_rank(&inputs.topo, cfg, SoloSync, set, seeds.seed(0))
    } else {
        let slots: Vec<Mutex<Option<MessageSet>>> =
            sets.into_iter().map(|s| Mutex::new(Some(s))).collect();
        let results = run_ranks(ranks, |sync| {
            let rank = sync.rank();
            let set = slots[rank]
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
                .unwrap_or_default();
            solve_rank(&inputs.topo, cfg, sync, set, seeds.seed(rank))
        });
        let mut root = None;
        let mut failures = Vec::new();
        for (rank, res) in results.into_iter().enumerate() {
            match res {
                Ok(sol) if rank == 0 => root = Some(sol),
                Ok(_) => {}
                Err(payload) => failures.push((rank, panic_message(payload.as_ref()))),
            }
        }
        // 被动中止的 rank 只报告 peer 中止，优先返回最初出错的 rank
        if let Some((rank, msg)) = failures
            .iter()
            .find(|(_, m)| !m.contains(ABORTED))
            .or(failures.first())
            .cloned()
        {
            warn!(rank, %msg, failed = failures.len(), "rank 失败");
            return Err(ModelError::RankPanicked { rank, msg });
        }
        root.unwrap_or_default()
    };
    info!(
        elapsed_ms = model_start.elapsed().as_secs_f64() * 1e3,
        "time to model"
    );
    Ok(solution)
}

fn positive_ranks(ranks: usize) -> Result<(), ModelError> {
    if ranks == 0 {
        return Err(ModelError::NonPositive {
            field: "number of ranks",
            value: 0,
        });
    }
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
