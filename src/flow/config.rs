//! 分配引擎参数
//!
//! 带宽与负载统一以 MB 为单位。默认值对应 Aries 系统的经验参数。

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::route::RoutingPolicy;
use crate::topo::{LinkClass, LinkLayout};

/// 候选路径的刷新时机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRefresh {
    /// 每次迭代重新生成
    #[default]
    EveryIteration,
    /// 每轮开始时生成一次
    OncePerRound,
}

/// 流量归属方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accounting {
    /// 第 0 轮求出每条消息的可达带宽 `bw`，第 1 轮用同一种子重放并按
    /// `bytes * 增量 / bw` 把字节记到链路上；不保存逐跳历史。
    #[default]
    TwoRound,
    /// 单轮求解，每条消息保存逐跳累计带宽，收敛后一次性归属字节。
    Retained,
}

/// 路径停止扩张后的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionRule {
    /// 余量触及阈值的路径在本轮剩余迭代中保持停止，下一轮开始时恢复
    #[default]
    Sticky,
    /// 每次迭代按当前余量重新判断，已停止的路径可在容量释放后恢复
    Reconsider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LinkLayout,
    pub green_bw: f64,
    pub black_bw: f64,
    pub blue_bw: f64,
    pub pci_bw: f64,
    /// 余量不超过该值的路径/PCI 不再扩张
    pub cutoff: f64,
    /// 容量分多少次迭代逐步释放
    pub ramp_iters: usize,
    pub paths_per_message: usize,
    pub max_iters: usize,
    pub routing: RoutingPolicy,
    pub dedup_direct: bool,
    pub refresh: PathRefresh,
    pub accounting: Accounting,
    pub expansion: ExpansionRule,
    /// 进度日志间隔（迭代数）
    pub progress_every: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LinkLayout::default(),
            green_bw: 5120.0,
            black_bw: 5120.0,
            blue_bw: 5120.0,
            pci_bw: 16384.0,
            cutoff: 0.01,
            ramp_iters: 50,
            paths_per_message: 4,
            max_iters: 200,
            routing: RoutingPolicy::default(),
            dedup_direct: false,
            refresh: PathRefresh::default(),
            accounting: Accounting::default(),
            expansion: ExpansionRule::default(),
            progress_every: 50,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        let bws = [
            ("green_bw", self.green_bw),
            ("black_bw", self.black_bw),
            ("blue_bw", self.blue_bw),
            ("pci_bw", self.pci_bw),
        ];
        for (name, bw) in bws {
            if !(bw > 0.0) {
                return Err(ModelError::Params(format!("{name} must be positive, got {bw}")));
            }
        }
        if !(self.cutoff >= 0.0) {
            return Err(ModelError::Params(format!(
                "cutoff must be non-negative, got {}",
                self.cutoff
            )));
        }
        let counts = [
            ("ramp_iters", self.ramp_iters),
            ("paths_per_message", self.paths_per_message),
            ("max_iters", self.max_iters),
            ("progress_every", self.progress_every),
        ];
        for (name, n) in counts {
            if n == 0 {
                return Err(ModelError::Params(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    pub fn link_bw(&self, class: LinkClass) -> f64 {
        match class {
            LinkClass::Green => self.green_bw,
            LinkClass::Black => self.black_bw,
            LinkClass::Blue => self.blue_bw,
        }
    }

    /// 每次迭代释放的链路容量
    pub fn link_increment(&self, class: LinkClass) -> f64 {
        self.link_bw(class) / self.ramp_iters as f64
    }

    pub fn pci_increment(&self) -> f64 {
        self.pci_bw / self.ramp_iters as f64
    }
}
