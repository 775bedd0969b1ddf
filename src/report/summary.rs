//! 负载汇总与输出
//!
//! 链路负载按 `路由器 * 槽位` 的顺序逐行写出 `<序号> <负载>`；
//! 统计信息只覆盖拓扑中真实存在的链路。

use std::fmt;
use std::io::{self, Write};

use crate::flow::Solution;
use crate::topo::{DragonflyTopology, LinkClass};

/// 一组链路负载的统计量（MB）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoadStats {
    pub count: usize,
    pub max: f64,
    pub min: f64,
    pub total: f64,
}

impl LoadStats {
    fn add(&mut self, load: f64) {
        if self.count == 0 {
            self.max = load;
            self.min = load;
        } else {
            self.max = self.max.max(load);
            self.min = self.min.min(load);
        }
        self.count += 1;
        self.total += load;
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadSummary {
    pub all: LoadStats,
    pub green: LoadStats,
    pub black: LoadStats,
    pub blue: LoadStats,
    pub pci_send: LoadStats,
    pub pci_recv: LoadStats,
}

impl LoadSummary {
    pub fn from_solution(topo: &DragonflyTopology, solution: &Solution) -> Self {
        let layout = topo.layout();
        let per_router = layout.per_router();
        let mut out = LoadSummary::default();
        for (i, &load) in solution.links.iter().enumerate() {
            let (router, slot) = (i / per_router, i % per_router);
            if !topo.slot_exists(router, slot) {
                continue;
            }
            out.all.add(load);
            match layout.class_of(slot) {
                LinkClass::Green => out.green.add(load),
                LinkClass::Black => out.black.add(load),
                LinkClass::Blue => out.blue.add(load),
            }
        }
        for &load in &solution.pci_send {
            out.pci_send.add(load);
        }
        for &load in &solution.pci_recv {
            out.pci_recv.add(load);
        }
        out
    }

    pub fn class(&self, class: LinkClass) -> &LoadStats {
        match class {
            LinkClass::Green => &self.green,
            LinkClass::Black => &self.black,
            LinkClass::Blue => &self.blue,
        }
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "******************Summary*****************")?;
        writeln!(
            f,
            "maxLoad {:.2} MB -- minLoad {:.2} MB",
            self.all.max, self.all.min
        )?;
        writeln!(f, "averageLinkLoad {:.2} MB", self.all.average())?;
        for class in LinkClass::ALL {
            let s = self.class(class);
            writeln!(
                f,
                "{:<5} links {:>8}  avg {:.3} MB  max {:.3} MB",
                class.name(),
                s.count,
                s.average(),
                s.max
            )?;
        }
        write!(
            f,
            "pci   send max {:.3} MB  recv max {:.3} MB",
            self.pci_send.max, self.pci_recv.max
        )
    }
}

/// 每个链路槽位一行：`<序号> <累计负载>`
pub fn write_link_loads<W: Write>(w: &mut W, links: &[f64]) -> io::Result<()> {
    for (i, load) in links.iter().enumerate() {
        writeln!(w, "{i} {load:.6}")?;
    }
    w.flush()
}

/// 每个 PCI 一行：`<路由器> <pci> <发送> <接收>`
pub fn write_pci_loads<W: Write>(
    w: &mut W,
    pcis: usize,
    send: &[f64],
    recv: &[f64],
) -> io::Result<()> {
    for (i, (s, r)) in send.iter().zip(recv).enumerate() {
        writeln!(w, "{} {} {s:.6} {r:.6}", i / pcis, i % pcis)?;
    }
    w.flush()
}
