//! 规则 dragonfly 连接生成
//!
//! 组内：同一行全互连（green），同一列全互连（black），边按组内编号给出，
//! 同一源路由器的 green 边按目的列递增、black 边按目的行递增排列。
//! 组间：每个路由器按组内偏移轮流承担到各组的 blue 链路，两端对称。

use super::dragonfly::{InterEdge, IntraEdge};

pub fn regular_intra_edges(rows: usize, cols: usize) -> Vec<IntraEdge> {
    let mut edges = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let src = (row * cols + col) as i32;
            for col1 in (0..cols).filter(|&c| c != col) {
                edges.push(IntraEdge {
                    src,
                    dst: (row * cols + col1) as i32,
                    tag: 0,
                });
            }
            for row1 in (0..rows).filter(|&r| r != row) {
                edges.push(IntraEdge {
                    src,
                    dst: (row1 * cols + col) as i32,
                    tag: 1,
                });
            }
        }
    }
    edges
}

/// 路由器 `g*a + off` 负责到组 `k*a + off` 的链路（`a` 为每组路由器数），
/// 对端落在目的组内偏移 `g % a` 的路由器上。
pub fn regular_inter_edges(groups: usize, rows: usize, cols: usize) -> Vec<InterEdge> {
    let per_group = rows * cols;
    let mut edges = Vec::new();
    for router in 0..groups * per_group {
        let my_off = router % per_group;
        let my_group = router / per_group;
        let mut links = groups / per_group;
        if my_off < groups % per_group {
            links += 1;
        }
        for k in 0..links {
            let dst_group = k * per_group + my_off;
            if dst_group != my_group {
                edges.push(InterEdge {
                    src: router as i32,
                    dst: (dst_group * per_group + my_group % per_group) as i32,
                });
            }
        }
    }
    edges
}
