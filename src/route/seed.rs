//! 随机种子
//!
//! 每个 rank 使用第 `rank` 个素数作为种子，保证固定 rank 数时结果可复现。

use std::time::{SystemTime, UNIX_EPOCH};

const PRIMES: [u64; 32] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131,
];

/// 第 `rank` 个素数（从 0 开始计数）
pub fn rank_seed(rank: usize) -> u64 {
    if let Some(&p) = PRIMES.get(rank) {
        return p;
    }
    let mut found = PRIMES.len() - 1;
    let mut candidate = PRIMES[PRIMES.len() - 1];
    while found < rank {
        candidate += 2;
        if is_prime(candidate) {
            found += 1;
        }
    }
    candidate
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// 单进程临时运行时使用墙钟作为种子
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() ^ u64::from(d.subsec_micros()))
        .unwrap_or(0)
}
