//! 链路颜色与链路槽位
//!
//! 每个路由器的链路按颜色划分为三段连续槽位：green（行内）、black（列内）、
//! blue（组间）。`LinkId` 以 (颜色, 段内偏移) 表示一条链路，
//! `LinkLayout` 负责把它映射到路由器内的平坦槽位。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkClass {
    Green,
    Black,
    Blue,
}

impl LinkClass {
    pub const ALL: [LinkClass; 3] = [LinkClass::Green, LinkClass::Black, LinkClass::Blue];

    /// 边文件中的颜色标签：0 = green，其余 = black
    pub fn from_tag(tag: i32) -> LinkClass {
        if tag == 0 {
            LinkClass::Green
        } else {
            LinkClass::Black
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LinkClass::Green => "green",
            LinkClass::Black => "black",
            LinkClass::Blue => "blue",
        }
    }
}

/// 路由器上的一条链路
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId {
    pub class: LinkClass,
    pub offset: usize,
}

impl LinkId {
    pub fn new(class: LinkClass, offset: usize) -> Self {
        Self { class, offset }
    }
}

/// 每种颜色的槽位数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkLayout {
    pub green: usize,
    pub black: usize,
    pub blue: usize,
}

impl Default for LinkLayout {
    fn default() -> Self {
        Self {
            green: 16,
            black: 16,
            blue: 10,
        }
    }
}

impl LinkLayout {
    pub fn slots(&self, class: LinkClass) -> usize {
        match class {
            LinkClass::Green => self.green,
            LinkClass::Black => self.black,
            LinkClass::Blue => self.blue,
        }
    }

    pub fn start(&self, class: LinkClass) -> usize {
        match class {
            LinkClass::Green => 0,
            LinkClass::Black => self.green,
            LinkClass::Blue => self.green + self.black,
        }
    }

    pub fn per_router(&self) -> usize {
        self.green + self.black + self.blue
    }

    /// 路由器内的平坦槽位
    pub fn slot(&self, link: LinkId) -> usize {
        debug_assert!(link.offset < self.slots(link.class), "{link:?} outside layout");
        self.start(link.class) + link.offset
    }

    pub fn class_of(&self, slot: usize) -> LinkClass {
        if slot < self.green {
            LinkClass::Green
        } else if slot < self.green + self.black {
            LinkClass::Black
        } else {
            LinkClass::Blue
        }
    }
}
