//! 单进程同步：集合操作都是恒等变换

use super::ClusterSync;

#[derive(Debug, Default, Clone, Copy)]
pub struct SoloSync;

impl ClusterSync for SoloSync {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_sum(&self, _buf: &mut [f64]) {}

    fn all_reduce_or(&self, flag: bool) -> bool {
        flag
    }
}
