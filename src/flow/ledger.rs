//! 资源账本
//!
//! 所有路由器的链路与 PCI 资源被展平成连续数组（路由器为高位），
//! 便于一次性全局归约。每类资源维护四个量：
//! - `demand`：本次迭代所有活跃路径请求的负载；
//! - `available`：剩余可分配容量；
//! - `granted`：本次迭代已分配、尚未从 `available` 扣除的量（本地部分和）；
//! - `traffic`：整个求解过程中归属到该资源的字节数。

use crate::cluster::ClusterSync;
use crate::route::Hop;
use crate::topo::LinkLayout;

use super::config::EngineConfig;

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub demand: Vec<f64>,
    pub available: Vec<f64>,
    pub granted: Vec<f64>,
    pub traffic: Vec<f64>,
}

impl Ledger {
    fn new(len: usize) -> Self {
        Self {
            demand: vec![0.0; len],
            available: vec![0.0; len],
            granted: vec![0.0; len],
            traffic: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    fn clear(&mut self) {
        self.demand.fill(0.0);
        self.available.fill(0.0);
        self.granted.fill(0.0);
        self.traffic.fill(0.0);
    }

    /// 扣除上次迭代的全局分配量，清空请求
    fn settle(&mut self, sync: &impl ClusterSync) {
        sync.all_reduce_sum(&mut self.granted);
        for (a, g) in self.available.iter_mut().zip(self.granted.iter_mut()) {
            *a -= *g;
            *g = 0.0;
        }
        self.demand.fill(0.0);
    }
}

/// 集群内全部路由器的资源状态
#[derive(Debug, Clone)]
pub struct ClusterState {
    layout: LinkLayout,
    pcis: usize,
    /// 单个路由器各链路槽位每次迭代的容量增量
    link_increment: Vec<f64>,
    pci_increment: f64,
    pub links: Ledger,
    pub pci_send: Ledger,
    pub pci_recv: Ledger,
}

impl ClusterState {
    pub fn new(routers: usize, pcis: usize, cfg: &EngineConfig) -> Self {
        let layout = cfg.layout;
        let link_increment = (0..layout.per_router())
            .map(|slot| cfg.link_increment(layout.class_of(slot)))
            .collect();
        Self {
            layout,
            pcis,
            link_increment,
            pci_increment: cfg.pci_increment(),
            links: Ledger::new(routers * layout.per_router()),
            pci_send: Ledger::new(routers * pcis),
            pci_recv: Ledger::new(routers * pcis),
        }
    }

    pub fn layout(&self) -> &LinkLayout {
        &self.layout
    }

    pub fn pcis(&self) -> usize {
        self.pcis
    }

    pub fn link_index(&self, hop: &Hop) -> usize {
        hop.router * self.layout.per_router() + self.layout.slot(hop.link)
    }

    pub fn pci_index(&self, router: usize, pci: usize) -> usize {
        router * self.pcis + pci
    }

    /// 一轮开始：清零所有量并放出第一份容量
    pub(crate) fn prime(&mut self) {
        self.links.clear();
        self.pci_send.clear();
        self.pci_recv.clear();
        self.release();
    }

    /// 放出一份容量增量
    pub(crate) fn release(&mut self) {
        let per_router = self.link_increment.len();
        for (i, a) in self.links.available.iter_mut().enumerate() {
            *a += self.link_increment[i % per_router];
        }
        for a in self
            .pci_send
            .available
            .iter_mut()
            .chain(self.pci_recv.available.iter_mut())
        {
            *a += self.pci_increment;
        }
    }

    pub(crate) fn settle(&mut self, sync: &impl ClusterSync) {
        self.pci_send.settle(sync);
        self.pci_recv.settle(sync);
        self.links.settle(sync);
    }

    /// 全局归约本次迭代的请求负载
    pub(crate) fn reduce_demand(&mut self, sync: &impl ClusterSync) {
        sync.all_reduce_sum(&mut self.pci_send.demand);
        sync.all_reduce_sum(&mut self.pci_recv.demand);
        sync.all_reduce_sum(&mut self.links.demand);
    }

    /// 全局归约累计流量
    pub(crate) fn reduce_traffic(&mut self, sync: &impl ClusterSync) {
        sync.all_reduce_sum(&mut self.links.traffic);
        sync.all_reduce_sum(&mut self.pci_send.traffic);
        sync.all_reduce_sum(&mut self.pci_recv.traffic);
    }
}
