//! Database metrics collection.
//!
//! Query latency goes to the `database_query_duration_seconds` histogram,
//! labelled by query name. Pool occupancy goes to two gauges.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Records the duration of one query.
///
/// # Arguments
/// * `query_name` - Label value for the `query` label
/// * `duration_secs` - Wall-clock duration in seconds
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Publishes pool occupancy gauges.
///
/// Sets `database_connections_active` and `database_connections_idle`.
/// The `/metrics` handler calls it before every scrape.
///
/// # Arguments
/// * `pool` - The pool to sample
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
}

/// Times one named query.
///
/// The clock starts at [`QueryTimer::new`]. Consuming the timer with
/// [`QueryTimer::record`] emits the elapsed time, whatever the query's
/// outcome.
///
/// # Example
/// ```ignore
/// let timer = QueryTimer::new("find_pet_by_id");
/// let result = sqlx::query_as::<_, PetEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    /// Starts timing.
    ///
    /// # Arguments
    /// * `query_name` - Stable name used as the metric label
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Stops the clock and records the elapsed seconds.
    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}
