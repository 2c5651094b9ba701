//! # Expvar-style metric registry.
//!
//! [`ExpvarRegistry`] stores named variables and renders them as one flat JSON
//! object, the shape scrapers of `/debug/vars` endpoints expect:
//!
//! ```text
//! {
//!   "version": "0.1.0",
//!   "total_tasks": 7,
//!   "process_uptime_seconds": 12.5,
//!   "orders.success": 41,
//!   "orders.fail": 2,
//!   "orders.time": { "count": 43, "sum_ms": 812.0, "min_ms": 3.1, "max_ms": 95.0, "last_ms": 11.2 }
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::metrics::MetricsSink;

/// Aggregated duration samples, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TimerStats {
    /// Number of samples.
    pub count: u64,
    /// Sum of all samples.
    pub sum_ms: f64,
    /// Smallest sample.
    pub min_ms: f64,
    /// Largest sample.
    pub max_ms: f64,
    /// Most recent sample.
    pub last_ms: f64,
}

impl TimerStats {
    fn record(&mut self, ms: f64) {
        if self.count == 0 || ms < self.min_ms {
            self.min_ms = ms;
        }
        if ms > self.max_ms {
            self.max_ms = ms;
        }
        self.count += 1;
        self.sum_ms += ms;
        self.last_ms = ms;
    }
}

#[derive(Clone, Debug)]
enum Var {
    Str(String),
    Gauge(f64),
    Counter(u64),
    Timer(TimerStats),
}

/// Thread-safe registry of named metric variables.
///
/// A name keeps the kind it was first written with; writes of a different kind
/// replace it.
#[derive(Default)]
pub struct ExpvarRegistry {
    vars: RwLock<BTreeMap<String, Var>>,
}

impl ExpvarRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a static string variable (e.g. build revision).
    pub fn set_string(&self, name: &str, value: impl Into<String>) {
        self.write(name, |slot| *slot = Var::Str(value.into()));
    }

    /// Returns the current value of a gauge.
    pub fn gauge(&self, name: &str) -> Option<f64> {
        match self.read(name)? {
            Var::Gauge(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the current value of a counter (`0` if never incremented).
    pub fn counter(&self, name: &str) -> u64 {
        match self.read(name) {
            Some(Var::Counter(v)) => v,
            _ => 0,
        }
    }

    /// Returns the aggregated samples of a timer.
    pub fn timer(&self, name: &str) -> Option<TimerStats> {
        match self.read(name)? {
            Var::Timer(t) => Some(t),
            _ => None,
        }
    }

    /// Renders every variable as one JSON object.
    pub fn snapshot(&self) -> Value {
        let vars = self.vars.read().unwrap_or_else(PoisonError::into_inner);
        let mut out = Map::with_capacity(vars.len());
        for (name, var) in vars.iter() {
            let value = match var {
                Var::Str(s) => Value::from(s.as_str()),
                Var::Gauge(v) => Value::from(*v),
                Var::Counter(v) => Value::from(*v),
                Var::Timer(t) => serde_json::to_value(t).unwrap_or(Value::Null),
            };
            out.insert(name.clone(), value);
        }
        Value::Object(out)
    }

    fn read(&self, name: &str) -> Option<Var> {
        self.vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn write(&self, name: &str, f: impl FnOnce(&mut Var)) {
        let mut vars = self.vars.write().unwrap_or_else(PoisonError::into_inner);
        match vars.get_mut(name) {
            Some(slot) => f(slot),
            None => {
                let mut slot = Var::Counter(0);
                f(&mut slot);
                vars.insert(name.to_string(), slot);
            }
        }
    }
}

impl MetricsSink for ExpvarRegistry {
    fn set_gauge(&self, name: &str, value: f64) {
        self.write(name, |slot| *slot = Var::Gauge(value));
    }

    fn incr_counter(&self, name: &str, delta: u64) {
        self.write(name, |slot| match slot {
            Var::Counter(v) => *v = v.saturating_add(delta),
            other => *other = Var::Counter(delta),
        });
    }

    fn observe_duration(&self, name: &str, elapsed: Duration) {
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.write(name, |slot| match slot {
            Var::Timer(t) => t.record(ms),
            other => {
                let mut t = TimerStats::default();
                t.record(ms);
                *other = Var::Timer(t);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauges_overwrite() {
        let reg = ExpvarRegistry::new();
        reg.set_gauge("total_tasks", 3.0);
        reg.set_gauge("total_tasks", 5.0);
        assert_eq!(reg.gauge("total_tasks"), Some(5.0));
    }

    #[test]
    fn counters_accumulate() {
        let reg = ExpvarRegistry::new();
        assert_eq!(reg.counter("q.success"), 0);
        reg.incr_counter("q.success", 1);
        reg.incr_counter("q.success", 2);
        assert_eq!(reg.counter("q.success"), 3);
    }

    #[test]
    fn timers_aggregate_samples() {
        let reg = ExpvarRegistry::new();
        reg.observe_duration("q.time", Duration::from_millis(30));
        reg.observe_duration("q.time", Duration::from_millis(10));
        reg.observe_duration("q.time", Duration::from_millis(20));

        let t = reg.timer("q.time").unwrap();
        assert_eq!(t.count, 3);
        assert_eq!(t.min_ms, 10.0);
        assert_eq!(t.max_ms, 30.0);
        assert_eq!(t.last_ms, 20.0);
        assert!((t.sum_ms - 60.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_renders_flat_object() {
        let reg = ExpvarRegistry::new();
        reg.set_string("version", "abc123");
        reg.set_gauge("process_uptime_seconds", 1.5);
        reg.incr_counter("q.fail", 4);
        reg.observe_duration("q.time", Duration::from_millis(2));

        let snap = reg.snapshot();
        assert_eq!(snap["version"], "abc123");
        assert_eq!(snap["process_uptime_seconds"], 1.5);
        assert_eq!(snap["q.fail"], 4);
        assert_eq!(snap["q.time"]["count"], 1);
    }
}
