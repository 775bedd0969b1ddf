//! 坐标与平坦编号的互相转换
//!
//! 维度顺序固定为 (group, row, col, pci, core)，最外层的 group 是最高位。
//! 端点空间使用全部 5 个维度，路由器空间只使用前 3 个。

use crate::error::ModelError;

pub const GROUP: usize = 0;
pub const ROW: usize = 1;
pub const COL: usize = 2;
pub const PCI: usize = 3;
pub const CORE: usize = 4;

/// 路由器层级数（group/row/col）
pub const NUM_LEVELS: usize = 3;
/// 端点坐标维度数
pub const NUM_COORDS: usize = NUM_LEVELS + 2;

/// 混合进制编码：`coords[0]` 为最高位。
pub fn coords_to_rank(coords: &[usize], dims: &[usize]) -> usize {
    debug_assert_eq!(coords.len(), dims.len());
    let mut rank = 0;
    let mut prod = 1;
    for i in (0..dims.len()).rev() {
        rank += coords[i] * prod;
        prod *= dims[i];
    }
    rank
}

/// `coords_to_rank` 的逆运算，结果写入 `out`。
pub fn rank_to_coords(mut rank: usize, dims: &[usize], out: &mut [usize]) {
    debug_assert_eq!(out.len(), dims.len());
    for i in (0..dims.len()).rev() {
        out[i] = rank % dims[i];
        rank /= dims[i];
    }
}

/// 物理端点坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coords(pub [usize; NUM_COORDS]);

impl Coords {
    pub fn group(&self) -> usize {
        self.0[GROUP]
    }
    pub fn row(&self) -> usize {
        self.0[ROW]
    }
    pub fn col(&self) -> usize {
        self.0[COL]
    }
    pub fn pci(&self) -> usize {
        self.0[PCI]
    }
    pub fn core(&self) -> usize {
        self.0[CORE]
    }

    /// 端点所在路由器的坐标
    pub fn router(&self) -> RouterCoord {
        RouterCoord {
            group: self.group(),
            row: self.row(),
            col: self.col(),
        }
    }
}

/// 路由器坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RouterCoord {
    pub group: usize,
    pub row: usize,
    pub col: usize,
}

/// 各维度大小
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims(pub [usize; NUM_COORDS]);

impl Dims {
    /// 校验每个维度都为正。
    pub fn new(sizes: [i64; NUM_COORDS]) -> Result<Self, ModelError> {
        let mut out = [0; NUM_COORDS];
        for (slot, v) in out.iter_mut().zip(sizes) {
            *slot = crate::error::positive("a dimension", v)?;
        }
        Ok(Self(out))
    }

    pub fn groups(&self) -> usize {
        self.0[GROUP]
    }
    pub fn rows(&self) -> usize {
        self.0[ROW]
    }
    pub fn cols(&self) -> usize {
        self.0[COL]
    }
    pub fn pcis(&self) -> usize {
        self.0[PCI]
    }
    pub fn cores(&self) -> usize {
        self.0[CORE]
    }

    pub fn routers_per_group(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn routers(&self) -> usize {
        self.groups() * self.routers_per_group()
    }

    /// 端点总数 = 路由器数 * pci * core
    pub fn endpoints(&self) -> usize {
        self.routers() * self.pcis() * self.cores()
    }

    fn router_dims(&self) -> &[usize] {
        &self.0[..NUM_LEVELS]
    }

    pub fn router_index(&self, c: RouterCoord) -> usize {
        coords_to_rank(&[c.group, c.row, c.col], self.router_dims())
    }

    pub fn router_coord(&self, index: usize) -> RouterCoord {
        let mut out = [0; NUM_LEVELS];
        rank_to_coords(index, self.router_dims(), &mut out);
        RouterCoord {
            group: out[GROUP],
            row: out[ROW],
            col: out[COL],
        }
    }

    /// 组内编号：row * cols + col
    pub fn local_rank(&self, c: RouterCoord) -> usize {
        c.row * self.cols() + c.col
    }

    pub fn endpoint_index(&self, c: &Coords) -> usize {
        coords_to_rank(&c.0, &self.0)
    }

    /// 默认映射：按维度顺序解码端点编号。
    pub fn endpoint_coords(&self, rank: usize) -> Coords {
        let mut out = [0; NUM_COORDS];
        rank_to_coords(rank, &self.0, &mut out);
        Coords(out)
    }

    pub fn check(&self, c: &Coords) -> Result<(), ModelError> {
        if c.0.iter().zip(self.0.iter()).all(|(v, d)| v < d) {
            Ok(())
        } else {
            Err(ModelError::CoordOutOfRange {
                what: "endpoint",
                coords: c.0.to_vec(),
                dims: self.0.to_vec(),
            })
        }
    }
}
