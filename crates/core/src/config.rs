use chrono::Duration;

/// Runtime configuration for the ticket lifecycle engine.
///
/// No global state: built once at startup (usually via [`Self::from_env`])
/// and passed to the use cases explicitly.
#[derive(Debug, Clone)]
pub struct TicketingConfig {
    /// How long an unpaid reservation holds its tickets.
    pub reservation_timeout_minutes: i64,

    /// Sweeper cadence.
    pub reservation_check_interval_ms: u64,

    /// Full restarts of the seat-assignment protocol after a cancelled
    /// claim transaction.
    pub seat_max_assignment_attempts: u32,

    /// Candidate-scan ceiling. Hitting it means the seat pool is exhausted,
    /// not that the caller should scan wider.
    pub seat_max_candidate_iterations: u32,

    /// Re-reads of a counter row after an optimistic-lock conflict.
    pub inventory_lock_attempts: u32,

    /// Messages pulled from the processing queue per poll.
    pub worker_poll_batch_size: usize,

    pub worker_visibility_timeout_seconds: u64,

    /// Concurrent message handlers in the worker pool.
    pub worker_parallelism: usize,
}

impl Default for TicketingConfig {
    fn default() -> Self {
        Self {
            reservation_timeout_minutes: 10,
            reservation_check_interval_ms: 60_000,
            seat_max_assignment_attempts: 3,
            seat_max_candidate_iterations: 10_000,
            inventory_lock_attempts: 3,
            worker_poll_batch_size: 10,
            worker_visibility_timeout_seconds: 30,
            worker_parallelism: 4,
        }
    }
}

impl TicketingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            reservation_timeout_minutes: env_or(
                "RESERVATION_TIMEOUT_MINUTES",
                defaults.reservation_timeout_minutes,
            ),
            reservation_check_interval_ms: env_or(
                "RESERVATION_CHECK_INTERVAL_MS",
                defaults.reservation_check_interval_ms,
            ),
            seat_max_assignment_attempts: env_or(
                "SEAT_MAX_ASSIGNMENT_ATTEMPTS",
                defaults.seat_max_assignment_attempts,
            ),
            seat_max_candidate_iterations: env_or(
                "SEAT_MAX_CANDIDATE_ITERATIONS",
                defaults.seat_max_candidate_iterations,
            ),
            inventory_lock_attempts: env_or(
                "INVENTORY_OPTIMISTIC_LOCK_ATTEMPTS",
                defaults.inventory_lock_attempts,
            ),
            worker_poll_batch_size: env_or("WORKER_POLL_BATCH_SIZE", defaults.worker_poll_batch_size),
            worker_visibility_timeout_seconds: env_or(
                "WORKER_VISIBILITY_TIMEOUT_SECONDS",
                defaults.worker_visibility_timeout_seconds,
            ),
            worker_parallelism: env_or("WORKER_PARALLELISM", defaults.worker_parallelism),
        }
    }

    pub fn reservation_lifetime(&self) -> Duration {
        Duration::minutes(self.reservation_timeout_minutes)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
