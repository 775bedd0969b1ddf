//! 流量分配模块
//!
//! 消息集合、资源账本与迭代式带宽分配引擎。

// 子模块声明
mod config;
mod engine;
mod ledger;
mod message;

// 重新导出公共接口
pub use config::{Accounting, EngineConfig, ExpansionRule, PathRefresh};
pub use engine::{FlowEngine, Phase, RoundStats, Solution};
pub use ledger::{ClusterState, Ledger};
pub use message::{Candidate, MB, Message, MessageSet, TraceRecord, partition};
