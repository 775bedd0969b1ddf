//! 路由模块
//!
//! 在 dragonfly 拓扑上为消息生成候选路径（直连 / Valiant / 偏置）。

// 子模块声明
mod generator;
mod path;
mod seed;

// 重新导出公共接口
pub use generator::{PathGenerator, RoutingPolicy};
pub use path::{Hop, Path};
pub use seed::{clock_seed, rank_seed};
