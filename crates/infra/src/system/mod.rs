use chrono::Utc;

// Mocking out time so that it is possible to run tests that depend on time.
pub trait ISys: Send + Sync {
    /// The current timestamp in millis
    fn get_timestamp_millis(&self) -> i64;
}

/// System that gets the real time and is used when not testing
pub struct RealSys {}
impl ISys for RealSys {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// System whose clock starts at a fixed timestamp and then advances with
/// Tokio's clock. Pausing or advancing Tokio time in a test moves it as well.
pub struct TokioTimeSys {
    start_ts: i64,
    started_at: tokio::time::Instant,
}

impl TokioTimeSys {
    pub fn new(start_ts: i64) -> Self {
        Self {
            start_ts,
            started_at: tokio::time::Instant::now(),
        }
    }
}

impl ISys for TokioTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.start_ts + self.started_at.elapsed().as_millis() as i64
    }
}
