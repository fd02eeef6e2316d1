//! Lightweight performance timing utilities.
//!
//! Timing is opt-in: enable it with the `CF_TIMING` environment variable or
//! programmatically. When disabled, timers cost one relaxed atomic load.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Disable performance timing globally.
pub fn disable_timing() {
    ENABLED.store(false, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("CF_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
    enabled: bool,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        if self.enabled {
            Some(self.start.elapsed().as_secs_f64())
        } else {
            None
        }
    }

    /// Stop the timer and add the elapsed time to `acc` (no-op when disabled).
    pub fn stop_into(self, acc: &AccumulatingTimer) {
        if let Some(elapsed) = self.stop() {
            acc.record(elapsed);
        }
    }
}

/// Accumulating timer for tracking total time across multiple calls.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    /// Create a new accumulating timer.
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Record a timing measurement.
    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total time spent (in seconds).
    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    /// Get number of calls.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Get average time per call (in seconds).
    pub fn average_seconds(&self) -> f64 {
        let count = self.count();
        if count > 0 {
            self.total_seconds() / count as f64
        } else {
            0.0
        }
    }

    /// Reset the timer.
    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Per-kernel timers for the pseudo-time iteration.
pub mod kernel_timing {
    use super::AccumulatingTimer;

    /// Local time-step evaluation
    pub static TIME_STEP: AccumulatingTimer = AccumulatingTimer::new();
    /// Fourth-order damping evaluation (including edge extrapolation)
    pub static ARTIFICIAL_VISCOSITY: AccumulatingTimer = AccumulatingTimer::new();
    /// Relaxation sweeps (each Gauss-Seidel pass or Jacobi pass counts once)
    pub static SWEEP: AccumulatingTimer = AccumulatingTimer::new();
    /// Boundary condition application
    pub static BOUNDARY: AccumulatingTimer = AccumulatingTimer::new();
    /// Iterative residual norms
    pub static CONVERGENCE: AccumulatingTimer = AccumulatingTimer::new();

    fn all() -> [(&'static str, &'static AccumulatingTimer); 5] {
        [
            ("time step", &TIME_STEP),
            ("artificial viscosity", &ARTIFICIAL_VISCOSITY),
            ("sweeps", &SWEEP),
            ("boundary conditions", &BOUNDARY),
            ("convergence check", &CONVERGENCE),
        ]
    }

    /// Reset all kernel timers.
    pub fn reset_all() {
        for (_, timer) in all() {
            timer.reset();
        }
    }

    /// Print kernel timing summary.
    pub fn print_summary() {
        use super::is_enabled;
        if !is_enabled() {
            return;
        }

        println!("\n=== Kernel Breakdown ===");
        let mut total = 0.0;
        for (label, timer) in all() {
            let count = timer.count();
            if count > 0 {
                println!(
                    "{:<22}{} calls, {:.3}s total, {:.4}ms avg",
                    label,
                    count,
                    timer.total_seconds(),
                    timer.average_seconds() * 1000.0
                );
                total += timer.total_seconds();
            }
        }
        println!("{:<22}{:.3}s", "TOTAL kernels", total);
        println!("========================\n");
    }
}
