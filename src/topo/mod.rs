//! 拓扑模块
//!
//! 包含坐标映射、端点映射、链路槽位布局与 dragonfly 连接表。

// 子模块声明
mod coords;
mod dragonfly;
mod endpoints;
mod link;
mod regular;

// 重新导出公共接口
pub use coords::{
    COL, CORE, Coords, Dims, GROUP, NUM_COORDS, NUM_LEVELS, PCI, ROW, RouterCoord, coords_to_rank,
    rank_to_coords,
};
pub use dragonfly::{DragonflyTopology, GlobalLink, InterEdge, IntraEdge};
pub use endpoints::EndpointMap;
pub use link::{LinkClass, LinkId, LinkLayout};
pub use regular::{regular_inter_edges, regular_intra_edges};
