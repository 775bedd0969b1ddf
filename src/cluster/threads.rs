//! 线程版 SPMD 集群
//!
//! 每个 rank 是一个线程，持有完整的私有状态；集合操作通过共享槽位实现：
//! 各 rank 先写入自己的槽位，全体到齐后按 rank 顺序求和，
//! 因此结果与线程到达顺序无关，逐位确定。
//!
//! 任一 rank 线程 panic 时会中止屏障，其余 rank 在下一次集合操作时一并退出，
//! 不会卡在屏障上。

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error};

use super::ClusterSync;

#[derive(Debug, Default)]
struct GateState {
    arrived: usize,
    generation: u64,
    aborted: bool,
}

/// 可中止的屏障
#[derive(Debug)]
struct Gate {
    size: usize,
    state: Mutex<GateState>,
    cv: Condvar,
}

impl Gate {
    fn new(size: usize) -> Self {
        Self {
            size,
            state: Mutex::new(GateState::default()),
            cv: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait(&self) {
        let mut st = self.lock();
        if st.aborted {
            panic!("cluster aborted by a peer rank");
        }
        let generation = st.generation;
        st.arrived += 1;
        if st.arrived == self.size {
            st.arrived = 0;
            st.generation = st.generation.wrapping_add(1);
            self.cv.notify_all();
            return;
        }
        while st.generation == generation && !st.aborted {
            st = self.cv.wait(st).unwrap_or_else(PoisonError::into_inner);
        }
        if st.generation == generation {
            panic!("cluster aborted by a peer rank");
        }
    }

    fn abort(&self) {
        let mut st = self.lock();
        st.aborted = true;
        self.cv.notify_all();
    }
}

#[derive(Debug)]
struct Shared {
    gate: Gate,
    slots: Vec<Mutex<Vec<f64>>>,
}

/// 线程集群的构造器
pub struct ThreadCluster;

impl ThreadCluster {
    /// 创建 `size` 个 rank 句柄，句柄 `i` 的 rank 为 `i`。
    pub fn new(size: usize) -> Vec<ThreadRank> {
        assert!(size > 0, "cluster needs at least one rank");
        let shared = Arc::new(Shared {
            gate: Gate::new(size),
            slots: (0..size).map(|_| Mutex::new(Vec::new())).collect(),
        });
        (0..size)
            .map(|rank| ThreadRank {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }
}

/// 单个 rank 的同步句柄
#[derive(Debug)]
pub struct ThreadRank {
    rank: usize,
    shared: Arc<Shared>,
}

impl ClusterSync for ThreadRank {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.slots.len()
    }

    fn all_reduce_sum(&self, buf: &mut [f64]) {
        {
            let mut slot = self.shared.slots[self.rank]
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            slot.clear();
            slot.extend_from_slice(buf);
        }
        self.shared.gate.wait();

        buf.fill(0.0);
        for (peer, slot) in self.shared.slots.iter().enumerate() {
            let slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            assert_eq!(
                slot.len(),
                buf.len(),
                "rank {peer} contributed {} values, rank {} expected {}",
                slot.len(),
                self.rank,
                buf.len()
            );
            for (b, v) in buf.iter_mut().zip(slot.iter()) {
                *b += v;
            }
        }
        // 所有 rank 读完之后槽位才能被下一次调用覆盖
        self.shared.gate.wait();
    }
}

impl Drop for ThreadRank {
    fn drop(&mut self) {
        if std::thread::panicking() {
            error!(rank = self.rank, "rank 异常退出，中止集群");
            self.shared.gate.abort();
        }
    }
}

/// 以 `size` 个线程运行同一个 SPMD 函数，按 rank 顺序返回各自的结果。
pub fn run_ranks<R, F>(size: usize, f: F) -> Vec<std::thread::Result<R>>
where
    F: Fn(ThreadRank) -> R + Sync,
    R: Send,
{
    let ranks = ThreadCluster::new(size);
    debug!(size, "启动 rank 线程");
    let f = &f;
    std::thread::scope(|s| {
        let handles: Vec<_> = ranks
            .into_iter()
            .map(|rank| s.spawn(move || f(rank)))
            .collect();
        handles.into_iter().map(|h| h.join()).collect()
    })
}
