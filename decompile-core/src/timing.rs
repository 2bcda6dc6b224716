//! Pass timing, modeled on the token/drop pattern in cranelift-codegen's
//! `dbg.rs`/`default_profiler.rs`: a token is created when a pass starts and
//! folds its elapsed time into a running total when dropped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Accumulated wall-clock time per named pass, keyed by the action/rule
/// name that requested the token. Cheap to keep on every `Funcdata`; read
/// with [`PassTimes::report`] after a pipeline run.
#[derive(Default)]
pub struct PassTimes {
    totals: RefCell<HashMap<&'static str, Duration>>,
    counts: RefCell<HashMap<&'static str, u32>>,
}

impl PassTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, name: &'static str) -> PassToken<'_> {
        PassToken {
            owner: self,
            name,
            start: Instant::now(),
        }
    }

    fn record(&self, name: &'static str, elapsed: Duration) {
        *self.totals.borrow_mut().entry(name).or_default() += elapsed;
        *self.counts.borrow_mut().entry(name).or_default() += 1;
    }

    /// Total time spent across all recorded passes.
    pub fn total(&self) -> Duration {
        self.totals.borrow().values().copied().sum()
    }

    /// `(name, total_time, invocation_count)` for every pass that has run,
    /// sorted by descending total time (slowest first).
    pub fn report(&self) -> Vec<(&'static str, Duration, u32)> {
        let totals = self.totals.borrow();
        let counts = self.counts.borrow();
        let mut rows: Vec<_> = totals
            .iter()
            .map(|(name, dur)| (*name, *dur, *counts.get(name).unwrap_or(&0)))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }

    pub fn clear(&self) {
        self.totals.borrow_mut().clear();
        self.counts.borrow_mut().clear();
    }
}

/// RAII timing token. Dropping it folds the elapsed time into the owning
/// [`PassTimes`] table. Tokens may nest (an action inside a group inside the
/// main loop); each is independent and double-counts parent time, tracking
/// "total including children" rather than exclusive self time.
pub struct PassToken<'a> {
    owner: &'a PassTimes,
    name: &'static str,
    start: Instant,
}

impl Drop for PassToken<'_> {
    fn drop(&mut self) {
        self.owner.record(self.name, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_reports() {
        let times = PassTimes::new();
        {
            let _t = times.start("heritage");
        }
        {
            let _t = times.start("heritage");
        }
        let report = times.report();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].0, "heritage");
        assert_eq!(report[0].2, 2);
    }
}
