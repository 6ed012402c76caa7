//! Worker pool sizing.

/// Share of the host's logical CPUs given to concurrent encoders.
const CPU_SHARE: f64 = 0.75;

/// Pool capacity derived from the host CPU count: 75% of the logical CPUs,
/// rounded down, never below 1.
pub fn default_max_concurrent() -> usize {
    let threads = num_cpus::get();
    let capacity = max_concurrent_for(threads);
    tracing::debug!("{} logical CPU(s), {} encoder slot(s)", threads, capacity);
    capacity
}

/// Pool capacity for a given number of available threads.
pub fn max_concurrent_for(available_threads: usize) -> usize {
    let scaled = (available_threads as f64 * CPU_SHARE).floor() as usize;
    scaled.max(1)
}

/// Resolve the pool capacity from an optional override.
///
/// An override of 0 is treated as 1.
pub fn effective_max_concurrent(requested: Option<usize>) -> usize {
    match requested {
        Some(0) => {
            tracing::warn!("max_concurrent = 0 is not usable; running one job at a time");
            1
        }
        Some(n) => n,
        None => default_max_concurrent(),
    }
}
