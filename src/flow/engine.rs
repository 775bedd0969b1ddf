//! 迭代式多路径带宽分配引擎
//!
//! 每轮的流程：
//! 1. 清空账本，放出第一份容量，生成候选路径，每条路径请求 `bytes / K`；
//! 2. 标记请求 -> 全局归约请求 -> 按瓶颈比例分配；
//! 3. 迭代：全局归约并扣除上次分配量，前 `ramp_iters` 次继续放出容量，
//!    刷新路径，按剩余余量重新分配请求并决定哪些路径继续扩张，
//!    再次标记、归约、分配；扩张标志全局“或”后决定是否继续。
//!
//! 分配规则：路径得到 `load * min(available / demand)`，最小值取遍路径上的
//! 每条链路以及源端 PCI 发送、目的端 PCI 接收。任何资源上的分配总和都
//! 不会超过其当前剩余容量。

use tracing::{debug, info, warn};

use super::config::{Accounting, EngineConfig, ExpansionRule, PathRefresh};
use super::ledger::ClusterState;
use super::message::{Message, MessageSet};
use crate::cluster::ClusterSync;
use crate::route::PathGenerator;
use crate::topo::DragonflyTopology;

/// 一轮求解中分配结果的用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 求每条消息的可达带宽 `bw`
    Discover,
    /// 用已知的 `bw` 把字节归属到资源
    Attribute,
    /// 单轮模式：累计 `bw` 并保存逐跳分配
    Retain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundStats {
    pub phase: Phase,
    pub iterations: usize,
    pub converged: bool,
}

/// 求解结果（已全局归约）
#[derive(Debug, Clone, Default)]
pub struct Solution {
    /// 每个链路槽位的累计流量（MB），按 路由器 * 槽位 排列
    pub links: Vec<f64>,
    /// 每个 PCI 的发送流量（MB），按 路由器 * pci 排列
    pub pci_send: Vec<f64>,
    pub pci_recv: Vec<f64>,
    pub rounds: Vec<RoundStats>,
}

pub struct FlowEngine<'t, S: ClusterSync> {
    cfg: EngineConfig,
    sync: S,
    seed: u64,
    generator: PathGenerator<'t>,
    state: ClusterState,
    messages: Vec<Message>,
}

impl<'t, S: ClusterSync> FlowEngine<'t, S> {
    pub fn new(
        topo: &'t DragonflyTopology,
        cfg: EngineConfig,
        sync: S,
        messages: MessageSet,
        seed: u64,
    ) -> Self {
        assert_eq!(
            cfg.layout,
            *topo.layout(),
            "engine layout must match the topology layout"
        );
        let state = ClusterState::new(topo.routers(), topo.dims().pcis(), &cfg);
        Self {
            cfg,
            sync,
            seed,
            generator: PathGenerator::new(topo, seed),
            state,
            messages: messages.into_messages(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> &ClusterState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut ClusterState {
        &mut self.state
    }

    fn is_root(&self) -> bool {
        self.sync.rank() == 0
    }

    /// 运行全部轮次并返回全局归约后的流量
    #[tracing::instrument(skip(self), fields(rank = self.sync.rank(), msgs = self.messages.len()))]
    pub fn solve(mut self) -> Solution {
        let phases: &[Phase] = match self.cfg.accounting {
            Accounting::TwoRound => &[Phase::Discover, Phase::Attribute],
            Accounting::Retained => &[Phase::Retain],
        };
        let mut rounds = Vec::with_capacity(phases.len());
        for &phase in phases {
            rounds.push(self.run_round(phase));
        }
        if self.cfg.accounting == Accounting::Retained {
            self.attribute_retained();
        }

        self.state.reduce_traffic(&self.sync);
        Solution {
            links: std::mem::take(&mut self.state.links.traffic),
            pci_send: std::mem::take(&mut self.state.pci_send.traffic),
            pci_recv: std::mem::take(&mut self.state.pci_recv.traffic),
            rounds,
        }
    }

    /// 执行一轮，直到没有路径可扩张或达到迭代上限
    #[tracing::instrument(skip(self), fields(rank = self.sync.rank()))]
    pub(crate) fn run_round(&mut self, phase: Phase) -> RoundStats {
        self.begin_round(phase);

        let mut expand = true;
        let mut iter = 0;
        while iter < self.cfg.max_iters && expand {
            if self.is_root() && iter % self.cfg.progress_every == 0 {
                info!(?phase, iter, "迭代进度");
            }
            self.step(iter);
            let local = self.select_expansion();
            self.mark_demand();
            self.allocate(phase);
            expand = self.sync.all_reduce_or(local);
            iter += 1;
        }

        if self.is_root() {
            info!(?phase, iterations = iter, "本轮迭代结束");
            if expand {
                warn!(
                    ?phase,
                    max_iters = self.cfg.max_iters,
                    "⚠️  达到迭代上限仍有路径可扩张，使用当前近似结果"
                );
            }
        }
        RoundStats {
            phase,
            iterations: iter,
            converged: !expand,
        }
    }

    /// 一轮开始时的初始化与首次分配
    pub(crate) fn begin_round(&mut self, phase: Phase) {
        self.state.prime();
        self.generator.reseed(self.seed);
        self.refresh_paths();
        for m in &mut self.messages {
            m.reset_loads();
            if phase != Phase::Attribute {
                m.bw = 0.0;
                m.retained.clear();
            }
        }
        self.mark_demand();
        self.allocate(phase);
    }

    /// 迭代开头：结算上次分配、放出容量、刷新路径
    pub(crate) fn step(&mut self, iter: usize) {
        self.state.settle(&self.sync);
        if iter < self.cfg.ramp_iters {
            self.state.release();
        }
        if self.cfg.refresh == PathRefresh::EveryIteration {
            self.refresh_paths();
        }
    }

    fn refresh_paths(&mut self) {
        let cfg = &self.cfg;
        for m in &mut self.messages {
            let paths = self.generator.candidates(
                m.src,
                m.dst,
                cfg.routing,
                cfg.paths_per_message,
                cfg.dedup_direct,
            );
            m.set_paths(paths);
        }
    }

    /// 把每条活跃路径的请求负载加到其经过的资源上
    pub(crate) fn mark_demand(&mut self) {
        let Self {
            messages, state, ..
        } = self;
        for m in messages.iter() {
            let s = state.pci_index(m.src, m.src_pci);
            let r = state.pci_index(m.dst, m.dst_pci);
            for c in m.candidates.iter().filter(|c| c.expand) {
                state.pci_send.demand[s] += c.load;
                state.pci_recv.demand[r] += c.load;
                for hop in &c.path {
                    let i = state.link_index(hop);
                    state.links.demand[i] += c.load;
                }
            }
        }
    }

    /// 全局归约请求后，按瓶颈比例为每条活跃路径分配带宽
    pub(crate) fn allocate(&mut self, phase: Phase) {
        self.state.reduce_demand(&self.sync);

        let Self {
            messages, state, ..
        } = self;
        for m in messages.iter_mut() {
            let s = state.pci_index(m.src, m.src_pci);
            let r = state.pci_index(m.dst, m.dst_pci);
            for c in m.candidates.iter().filter(|c| c.expand) {
                let share = |avail: f64, demand: f64| c.load / demand * avail;

                let mut min = f64::MAX;
                for hop in &c.path {
                    let i = state.link_index(hop);
                    min = min.min(share(state.links.available[i], state.links.demand[i]));
                }
                min = min.min(share(state.pci_send.available[s], state.pci_send.demand[s]));
                min = min.min(share(state.pci_recv.available[r], state.pci_recv.demand[r]));
                let min = min.max(0.0);

                for hop in &c.path {
                    let i = state.link_index(hop);
                    state.links.granted[i] += min;
                }
                state.pci_send.granted[s] += min;
                state.pci_recv.granted[r] += min;

                match phase {
                    Phase::Discover => m.bw += min,
                    Phase::Attribute => {
                        if m.bw > 0.0 {
                            let bytes = m.bytes * (min / m.bw);
                            for hop in &c.path {
                                let i = state.link_index(hop);
                                state.links.traffic[i] += bytes;
                            }
                            state.pci_send.traffic[s] += bytes;
                            state.pci_recv.traffic[r] += bytes;
                        }
                    }
                    Phase::Retain => {
                        m.bw += min;
                        for hop in &c.path {
                            *m.retained.entry(*hop).or_insert(0.0) += min;
                        }
                    }
                }
            }
        }
    }

    /// 根据剩余容量重新分配请求，决定哪些路径继续扩张；返回本地是否仍有扩张
    ///
    /// `Sticky` 下已停止的路径不再参与本轮的余量归一化，全部路径停止的消息视为已完成。
    pub(crate) fn select_expansion(&mut self) -> bool {
        let cutoff = self.cfg.cutoff;
        let sticky = self.cfg.expansion == ExpansionRule::Sticky;
        let Self {
            messages, state, ..
        } = self;
        let mut any = false;
        for m in messages.iter_mut() {
            if sticky && !m.is_expanding() {
                continue;
            }
            let s = state.pci_index(m.src, m.src_pci);
            let r = state.pci_index(m.dst, m.dst_pci);
            if state.pci_send.available[s] <= cutoff || state.pci_recv.available[r] <= cutoff {
                for c in &mut m.candidates {
                    c.expand = false;
                }
                continue;
            }

            let mut sum = 0.0;
            for c in m.candidates.iter_mut().filter(|c| !sticky || c.expand) {
                c.load = c
                    .path
                    .iter()
                    .map(|hop| state.links.available[state.link_index(hop)])
                    .fold(f64::MAX, f64::min);
                sum += c.load;
            }
            for c in m.candidates.iter_mut().filter(|c| !sticky || c.expand) {
                if c.load <= cutoff {
                    c.expand = false;
                } else {
                    c.expand = true;
                    c.load = m.bytes * c.load / sum;
                    any = true;
                }
            }
        }
        debug!(any, "扩张选择完成");
        any
    }

    /// retained 模式：按逐跳累计带宽把字节归属到链路
    fn attribute_retained(&mut self) {
        let Self {
            messages, state, ..
        } = self;
        for m in messages.iter_mut() {
            if m.bw <= 0.0 {
                continue;
            }
            for (hop, granted) in std::mem::take(&mut m.retained) {
                let i = state.link_index(&hop);
                state.links.traffic[i] += m.bytes * (granted / m.bw);
            }
            let s = state.pci_index(m.src, m.src_pci);
            let r = state.pci_index(m.dst, m.dst_pci);
            state.pci_send.traffic[s] += m.bytes;
            state.pci_recv.traffic[r] += m.bytes;
        }
    }
}
