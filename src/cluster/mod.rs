//! 集群同步
//!
//! 分配引擎只通过 `ClusterSync` 与其他 rank 交互：全局求和与全局“或”。
//! 引擎本身不关心底层是单进程还是多个线程。

// 子模块声明
mod solo;
mod threads;

// 重新导出公共接口
pub use solo::SoloSync;
pub use threads::{ThreadCluster, ThreadRank, run_ranks};

/// SPMD 集合通信接口
///
/// 所有 rank 必须以相同顺序调用相同的集合操作；每次调用都会阻塞直到
/// 所有 rank 都贡献了本地数据。
pub trait ClusterSync {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    /// 原地全局求和：返回时 `buf` 为所有 rank 对应元素之和。
    fn all_reduce_sum(&self, buf: &mut [f64]);

    /// 全局“或”：按求和后是否大于 0 判断。
    fn all_reduce_or(&self, flag: bool) -> bool {
        let mut v = [if flag { 1.0 } else { 0.0 }];
        self.all_reduce_sum(&mut v);
        v[0] > 0.0
    }
}

impl<S: ClusterSync + ?Sized> ClusterSync for &S {
    fn rank(&self) -> usize {
        (**self).rank()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn all_reduce_sum(&self, buf: &mut [f64]) {
        (**self).all_reduce_sum(buf)
    }

    fn all_reduce_or(&self, flag: bool) -> bool {
        (**self).all_reduce_or(flag)
    }
}
