//! 候选路径生成
//!
//! - 直连（最小）路由：组内最多 2 跳（先 green 后 black 或反之），
//!   组间为 源->网关 + 一条 blue + 落地路由器->目的；
//! - Valiant 路由：经由随机中间路由器（组内）或随机中间组（组间）绕行；
//! - 偏置路由：前若干条为直连路径，其余为 Valiant 路径。
//!
//! 所有随机选择都来自生成器自带的 `StdRng`，同一种子下调用序列确定。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::path::{Hop, Path};
use crate::topo::{DragonflyTopology, LinkId, RouterCoord};

/// 路由策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutingPolicy {
    /// 所有候选路径都是直连路径
    Direct,
    /// 所有候选路径都是 Valiant 路径
    Valiant,
    /// 前 `direct` 条为直连路径，其余为 Valiant 路径
    Biased { direct: usize },
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        RoutingPolicy::Biased { direct: 2 }
    }
}

pub struct PathGenerator<'t> {
    topo: &'t DragonflyTopology,
    rng: StdRng,
}

impl<'t> PathGenerator<'t> {
    pub fn new(topo: &'t DragonflyTopology, seed: u64) -> Self {
        Self {
            topo,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 重置随机序列（每轮开始时调用）
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// 为一条消息生成 `count` 条候选路径。
    ///
    /// `dedup_direct` 为真时，若前两条直连路径完全相同，只保留一条，
    /// 空出的位置由 Valiant 路径补齐。
    pub fn candidates(
        &mut self,
        src: usize,
        dst: usize,
        policy: RoutingPolicy,
        count: usize,
        dedup_direct: bool,
    ) -> Vec<Path> {
        let mut paths = Vec::with_capacity(count);
        match policy {
            RoutingPolicy::Direct => {
                for _ in 0..count {
                    paths.push(self.direct_path(src, dst));
                }
            }
            RoutingPolicy::Valiant => {
                for _ in 0..count {
                    paths.push(self.valiant_path(src, dst));
                }
            }
            RoutingPolicy::Biased { direct } => {
                for _ in 0..direct.min(count) {
                    paths.push(self.direct_path(src, dst));
                }
                if dedup_direct && paths.len() >= 2 && paths[0] == paths[1] {
                    paths.truncate(1);
                }
                while paths.len() < count {
                    paths.push(self.valiant_path(src, dst));
                }
            }
        }
        trace!(src, dst, n = paths.len(), "生成候选路径");
        paths
    }

    /// 最小路径
    pub fn direct_path(&mut self, src: usize, dst: usize) -> Path {
        let mut p = Path::new();
        if self.topo.coord(src).group == self.topo.coord(dst).group {
            self.add_intra(src, dst, &mut p);
        } else {
            self.add_inter(src, dst, &mut p);
        }
        p
    }

    /// 经由随机中间节点的路径
    pub fn valiant_path(&mut self, src: usize, dst: usize) -> Path {
        let dims = *self.topo.dims();
        let per_group = dims.routers_per_group();
        let s = self.topo.coord(src);
        let d = self.topo.coord(dst);
        let mut p = Path::new();

        if s.group == d.group {
            let mid = self.random_router_in(s.group, per_group);
            if mid != src {
                self.add_intra(src, mid, &mut p);
            }
            if mid != dst {
                self.add_intra(mid, dst, &mut p);
            }
            return p;
        }

        let mid_group = self.rng.gen_range(0..dims.groups());
        if mid_group == s.group || mid_group == d.group {
            // 中间组与两端之一重合：退化为一次组间直连
            self.add_inter(src, dst, &mut p);
        } else {
            let mid = self.random_router_in(mid_group, per_group);
            self.add_inter(src, mid, &mut p);
            self.add_inter(mid, dst, &mut p);
        }
        p
    }

    fn random_router_in(&mut self, group: usize, per_group: usize) -> usize {
        let local = self.rng.gen_range(0..per_group);
        let cols = self.topo.dims().cols();
        self.topo.dims().router_index(RouterCoord {
            group,
            row: local / cols,
            col: local % cols,
        })
    }

    fn pick_link(&mut self, links: &[LinkId], from: usize, to: usize) -> LinkId {
        match links.len() {
            0 => panic!("no intra-group link from router {from} to router {to}"),
            1 => links[0],
            n => links[self.rng.gen_range(0..n)],
        }
    }

    /// 组内路径：同行或同列一跳，否则两跳（随机决定先走 green 还是 black）
    fn add_intra(&mut self, src: usize, dst: usize, p: &mut Path) {
        let topo = self.topo;
        let s = topo.coord(src);
        let d = topo.coord(dst);
        debug_assert_eq!(s.group, d.group);
        let src_local = topo.local_rank(src);
        let dst_local = topo.local_rank(dst);

        if s.row == d.row || s.col == d.col {
            let link = self.pick_link(topo.intra_links(src_local, dst_local), src, dst);
            p.push(Hop::new(src, link));
            return;
        }

        let dims = topo.dims();
        let g_nbr = dims.router_index(RouterCoord { col: d.col, ..s });
        let b_nbr = dims.router_index(RouterCoord { row: d.row, ..s });
        let g_links = topo.intra_links(src_local, topo.local_rank(g_nbr));
        let b_links = topo.intra_links(src_local, topo.local_rank(b_nbr));
        let total = g_links.len() + b_links.len();
        if total == 0 {
            panic!("no intra-group route from router {src} to router {dst}");
        }

        let (mid, first) = if self.rng.gen_range(0..total) < g_links.len() {
            (g_nbr, g_links)
        } else {
            (b_nbr, b_links)
        };
        let link = self.pick_link(first, src, mid);
        p.push(Hop::new(src, link));
        let link = self.pick_link(topo.intra_links(topo.local_rank(mid), dst_local), mid, dst);
        p.push(Hop::new(mid, link));
    }

    /// 组间路径：源 -> 网关（组内）-> blue -> 落地路由器 -> 目的（组内）
    fn add_inter(&mut self, src: usize, dst: usize, p: &mut Path) {
        let topo = self.topo;
        let src_group = topo.coord(src).group;
        let dst_group = topo.coord(dst).group;

        let gateways = topo.gateways(src_group, dst_group);
        let gateway = match gateways.len() {
            0 => panic!("no global link from group {src_group} to group {dst_group}"),
            1 => gateways[0],
            n => gateways[self.rng.gen_range(0..n)],
        };
        if gateway != src {
            assert_eq!(
                topo.coord(gateway).group,
                src_group,
                "gateway {gateway} is not in source group {src_group}"
            );
            self.add_intra(src, gateway, p);
        }

        let globals = topo.global_links(gateway, dst_group);
        assert!(
            !globals.is_empty(),
            "gateway {gateway} has no global link to group {dst_group}"
        );
        let global = globals[self.rng.gen_range(0..globals.len())];
        p.push(Hop::new(gateway, global.link));

        if global.dest != dst {
            assert_eq!(
                topo.coord(global.dest).group,
                dst_group,
                "global link from {gateway} lands outside destination group {dst_group}"
            );
            self.add_intra(global.dest, dst, p);
        }
    }
}
