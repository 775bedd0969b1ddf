//! 路径类型

use crate::topo::LinkId;

/// 一跳：从 `router` 出发，经过其链路 `link`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hop {
    pub router: usize,
    pub link: LinkId,
}

impl Hop {
    pub fn new(router: usize, link: LinkId) -> Self {
        Self { router, link }
    }
}

/// 有序的跳序列
pub type Path = Vec<Hop>;
