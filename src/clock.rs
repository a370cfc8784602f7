use std::cell::Cell;

use chrono::{DateTime, TimeZone, Utc};

/// Wall-clock source. Todo ids, timestamps and animation time all derive from it.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn now_ms(&self) -> f64 {
        self.now().timestamp_millis() as f64
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    ms: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self { ms: Cell::new(start_ms) }
    }

    pub fn advance(&self, ms: i64) {
        self.ms.set(self.ms.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.ms.get())
            .single()
            .unwrap_or_default()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
