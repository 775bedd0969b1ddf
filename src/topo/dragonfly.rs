//! Dragonfly 拓扑（Aries 风格）
//!
//! 路由器按 group/row/col 三层组织：
//! - 组内同一行的路由器之间是 green 链路，同一列之间是 black 链路；
//! - 组间通过 blue（global）链路相连。
//!
//! 组内连接只描述一次（按组内编号），所有组共享；组间连接按全局路由器编号描述。
//! 构建完成后拓扑只读。

use std::collections::HashMap;

use tracing::{debug, info};

use super::coords::{Dims, RouterCoord};
use super::link::{LinkClass, LinkId, LinkLayout};
use crate::error::ModelError;

/// 组内边：组内编号 `src` -> `dst`，带颜色标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntraEdge {
    pub src: i32,
    pub dst: i32,
    pub tag: i32,
}

/// 组间边：全局路由器编号 `src` -> `dst`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterEdge {
    pub src: i32,
    pub dst: i32,
}

/// 一条 blue 链路及其对端路由器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalLink {
    pub link: LinkId,
    pub dest: usize,
}

#[derive(Debug, Clone)]
pub struct DragonflyTopology {
    dims: Dims,
    layout: LinkLayout,
    coords: Vec<RouterCoord>,
    /// 组内编号 -> (目的组内编号 -> 并行链路)
    intra: Vec<HashMap<usize, Vec<LinkId>>>,
    /// 路由器 -> (目的组 -> 并行 blue 链路)
    inter: Vec<HashMap<usize, Vec<GlobalLink>>>,
    /// [源组][目的组] -> 拥有到目的组 blue 链路的路由器（去重）
    gateways: Vec<Vec<Vec<usize>>>,
    green_count: Vec<usize>,
    black_count: Vec<usize>,
    blue_count: Vec<usize>,
}

impl DragonflyTopology {
    pub fn build(
        num_routers: i64,
        dims: Dims,
        layout: LinkLayout,
        intra_edges: &[IntraEdge],
        inter_edges: &[InterEdge],
    ) -> Result<Self, ModelError> {
        let routers = crate::error::positive("number of Aries routers", num_routers)?;
        if routers != dims.routers() {
            return Err(ModelError::RouterCountMismatch {
                routers,
                expected: dims.routers(),
            });
        }

        let per_group = dims.routers_per_group();
        let groups = dims.groups();
        let coords = (0..routers).map(|r| dims.router_coord(r)).collect();

        let mut intra: Vec<HashMap<usize, Vec<LinkId>>> = vec![HashMap::new(); per_group];
        let mut green_count = vec![0usize; per_group];
        let mut black_count = vec![0usize; per_group];
        for e in intra_edges {
            let (src, dst) = in_range(e.src, e.dst, per_group)?;
            let class = LinkClass::from_tag(e.tag);
            let counter = match class {
                LinkClass::Green => &mut green_count[src],
                _ => &mut black_count[src],
            };
            let offset = *counter;
            if offset >= layout.slots(class) {
                return Err(ModelError::LinkSlotsExceeded {
                    router: src,
                    class: class.name(),
                    slots: layout.slots(class),
                });
            }
            *counter += 1;
            intra[src]
                .entry(dst)
                .or_default()
                .push(LinkId::new(class, offset));
        }

        let mut inter: Vec<HashMap<usize, Vec<GlobalLink>>> = vec![HashMap::new(); routers];
        let mut gateways = vec![vec![Vec::new(); groups]; groups];
        let mut blue_count = vec![0usize; routers];
        for e in inter_edges {
            let (src, dst) = in_range(e.src, e.dst, routers)?;
            let offset = blue_count[src];
            if offset >= layout.blue {
                return Err(ModelError::LinkSlotsExceeded {
                    router: src,
                    class: LinkClass::Blue.name(),
                    slots: layout.blue,
                });
            }
            blue_count[src] += 1;
            let src_g = src / per_group;
            let dst_g = dst / per_group;
            inter[src].entry(dst_g).or_default().push(GlobalLink {
                link: LinkId::new(LinkClass::Blue, offset),
                dest: dst,
            });
            let list: &mut Vec<usize> = &mut gateways[src_g][dst_g];
            if !list.contains(&src) {
                list.push(src);
            }
        }

        info!(
            routers,
            groups,
            per_group,
            intra_edges = intra_edges.len(),
            inter_edges = inter_edges.len(),
            "🗺️  拓扑构建完成"
        );
        debug!(?layout, "链路槽位布局");

        Ok(Self {
            dims,
            layout,
            coords,
            intra,
            inter,
            gateways,
            green_count,
            black_count,
            blue_count,
        })
    }

    pub fn dims(&self) -> &Dims {
        &self.dims
    }

    pub fn layout(&self) -> &LinkLayout {
        &self.layout
    }

    pub fn routers(&self) -> usize {
        self.coords.len()
    }

    pub fn coord(&self, router: usize) -> RouterCoord {
        self.coords[router]
    }

    pub fn local_rank(&self, router: usize) -> usize {
        self.dims.local_rank(self.coords[router])
    }

    /// 组内两个路由器之间的并行链路（按组内编号查询）
    pub fn intra_links(&self, src_local: usize, dst_local: usize) -> &[LinkId] {
        self.intra[src_local]
            .get(&dst_local)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// 路由器到目的组的 blue 链路
    pub fn global_links(&self, router: usize, dst_group: usize) -> &[GlobalLink] {
        self.inter[router]
            .get(&dst_group)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// 源组内连接目的组的网关路由器
    pub fn gateways(&self, src_group: usize, dst_group: usize) -> &[usize] {
        &self.gateways[src_group][dst_group]
    }

    /// 路由器上实际存在的某色链路数
    pub fn link_count(&self, router: usize, class: LinkClass) -> usize {
        match class {
            LinkClass::Green => self.green_count[self.local_rank(router)],
            LinkClass::Black => self.black_count[self.local_rank(router)],
            LinkClass::Blue => self.blue_count[router],
        }
    }

    /// 槽位是否对应一条真实链路
    pub fn slot_exists(&self, router: usize, slot: usize) -> bool {
        let class = self.layout.class_of(slot);
        let offset = slot - self.layout.start(class);
        offset < self.link_count(router, class)
    }
}

fn in_range(src: i32, dst: i32, limit: usize) -> Result<(usize, usize), ModelError> {
    let ok = |v: i32| v >= 0 && (v as usize) < limit;
    if ok(src) && ok(dst) {
        Ok((src as usize, dst as usize))
    } else {
        Err(ModelError::EdgeOutOfRange {
            src: src as i64,
            dst: dst as i64,
            limit,
        })
    }
}
