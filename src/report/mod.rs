//! 结果汇总模块

mod summary;

pub use summary::{LoadStats, LoadSummary, write_link_loads, write_pci_loads};
