//! 配置文件（conffile）
//!
//! 空白分隔的纯文本：
//!
//! ```text
//! <路由器数>
//! <group> <row> <col> <pci> <core>
//! <组内连接文件>
//! <组间连接文件>
//! <trace 文件> <rank 数> <消息数>   # 可重复多次
//! ```

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ModelError, positive};
use crate::topo::{Dims, NUM_COORDS};

/// 一个 trace 文件条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub path: PathBuf,
    /// 该 trace 覆盖的 rank 数，用于后续文件的端点编号偏移
    pub ranks: usize,
    /// 文件中的消息数，用于按 rank 切分
    pub messages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConf {
    pub num_routers: i64,
    pub dims: Dims,
    pub intra_file: PathBuf,
    pub inter_file: PathBuf,
    pub traces: Vec<TraceEntry>,
}

struct Tokens<'a> {
    path: &'a Path,
    items: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(path: &'a Path, text: &'a str) -> Self {
        let items = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| {
                let line = line.split('#').next().unwrap_or("");
                line.split_whitespace().map(move |t| (i + 1, t))
            })
            .collect();
        Self {
            path,
            items,
            pos: 0,
        }
    }

    fn is_done(&self) -> bool {
        self.pos >= self.items.len()
    }

    fn err(&self, line: usize, msg: String) -> ModelError {
        ModelError::Parse {
            path: self.path.to_path_buf(),
            line,
            msg,
        }
    }

    fn next(&mut self, what: &str) -> Result<(usize, &'a str), ModelError> {
        match self.items.get(self.pos) {
            Some(&item) => {
                self.pos += 1;
                Ok(item)
            }
            None => {
                let line = self.items.last().map(|(l, _)| *l).unwrap_or(0);
                Err(self.err(line, format!("missing {what}")))
            }
        }
    }

    fn int(&mut self, what: &str) -> Result<i64, ModelError> {
        let (line, tok) = self.next(what)?;
        tok.parse::<i64>()
            .map_err(|_| self.err(line, format!("expected integer for {what}, got `{tok}`")))
    }
}

impl ModelConf {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
        Self::parse(path, &text)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, ModelError> {
        let mut toks = Tokens::new(path, text);

        let num_routers = toks.int("number of Aries routers")?;
        positive("number of Aries routers", num_routers)?;

        let mut sizes = [0i64; NUM_COORDS];
        for s in &mut sizes {
            *s = toks.int("a dimension")?;
        }
        let dims = Dims::new(sizes)?;

        let intra_file = PathBuf::from(toks.next("intra-group connection file")?.1);
        let inter_file = PathBuf::from(toks.next("inter-group connection file")?.1);

        let mut traces = Vec::new();
        while !toks.is_done() {
            let trace = PathBuf::from(toks.next("communication file")?.1);
            let ranks = positive("number of ranks", toks.int("number of ranks")?)?;
            let messages = positive("number of messages", toks.int("number of messages")?)?;
            traces.push(TraceEntry {
                path: trace,
                ranks,
                messages: messages as u64,
            });
        }

        info!(
            num_routers,
            dims = ?dims.0,
            traces = traces.len(),
            "📄 读取配置文件"
        );
        Ok(Self {
            num_routers,
            dims,
            intra_file,
            inter_file,
            traces,
        })
    }
}
