//! 输入文件
//!
//! 配置文件、端点映射、二进制连接表与通信 trace 的读写。

// 子模块声明
mod conf;
mod edges;
mod mapfile;
mod trace;

// 重新导出公共接口
pub use conf::{ModelConf, TraceEntry};
pub use edges::{read_inter_edges, read_intra_edges, write_inter_edges, write_intra_edges};
pub use mapfile::{load_endpoint_map, parse_endpoint_map};
pub use trace::{RECORD_BYTES, convert_text_trace, read_trace_range, write_binary_trace};
