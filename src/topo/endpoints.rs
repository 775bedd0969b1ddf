//! 端点（rank）到物理坐标的映射

use tracing::debug;

use super::coords::{Coords, Dims};
use crate::error::ModelError;

#[derive(Debug, Clone)]
pub struct EndpointMap {
    dims: Dims,
    coords: Vec<Coords>,
}

impl EndpointMap {
    /// 默认映射：端点 `i` 按维度顺序解码
    pub fn dimension_ordered(dims: Dims) -> Self {
        let coords = (0..dims.endpoints()).map(|i| dims.endpoint_coords(i)).collect();
        debug!(endpoints = dims.endpoints(), "使用默认维度顺序映射");
        Self { dims, coords }
    }

    /// 显式映射：每个坐标都必须落在维度范围内
    pub fn from_coords(dims: Dims, coords: Vec<Coords>) -> Result<Self, ModelError> {
        for c in &coords {
            dims.check(c)?;
        }
        Ok(Self { dims, coords })
    }

    pub fn dims(&self) -> &Dims {
        &self.dims
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn get(&self, endpoint: i64) -> Result<&Coords, ModelError> {
        usize::try_from(endpoint)
            .ok()
            .and_then(|i| self.coords.get(i))
            .ok_or(ModelError::UnknownEndpoint {
                endpoint,
                endpoints: self.coords.len(),
            })
    }

    /// 端点所在路由器的平坦编号
    pub fn router_of(&self, c: &Coords) -> usize {
        self.dims.router_index(c.router())
    }
}
