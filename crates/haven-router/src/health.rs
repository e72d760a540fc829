//! [`StoreHealth`]: the remote availability flag.

use std::{
  sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
  },
  time::{Duration, Instant},
};

/// Upper bound for the re-probe backoff.
pub const MAX_REPROBE_DELAY: Duration = Duration::from_secs(60 * 60);

/// Tracks whether the remote store should still be tried.
///
/// Starts available. The first remote failure demotes it. Without a
/// re-probe policy the demotion lasts for the life of the value. With one,
/// a single statement is let through once the delay has passed; the delay
/// doubles after every failed probe up to [`MAX_REPROBE_DELAY`].
#[derive(Debug)]
pub struct StoreHealth {
  available: AtomicBool,
  reprobe:   Option<Mutex<Reprobe>>,
}

#[derive(Debug)]
struct Reprobe {
  base:  Duration,
  delay: Duration,
  next:  Instant,
}

impl Default for StoreHealth {
  fn default() -> Self { Self::new() }
}

impl StoreHealth {
  /// Sticky: once demoted, never retried.
  pub fn new() -> Self { Self { available: AtomicBool::new(true), reprobe: None } }

  /// Retry a demoted remote after `after`, backing off exponentially.
  pub fn with_reprobe(after: Duration) -> Self {
    Self {
      available: AtomicBool::new(true),
      reprobe:   Some(Mutex::new(Reprobe { base: after, delay: after, next: Instant::now() })),
    }
  }

  pub fn is_available(&self) -> bool { self.available.load(Ordering::SeqCst) }

  /// Whether the next statement should go to the remote.
  ///
  /// While demoted this claims the probe slot, so only one caller per
  /// backoff window reaches the remote.
  pub fn should_try_remote(&self) -> bool {
    if self.is_available() {
      return true;
    }
    let Some(reprobe) = &self.reprobe else { return false };
    let mut r = reprobe.lock().unwrap_or_else(PoisonError::into_inner);
    let now = Instant::now();
    if now < r.next {
      return false;
    }
    r.next = now + r.delay;
    true
  }

  /// Record a remote failure. Returns `true` if this call demoted a
  /// previously available remote.
  pub fn mark_unavailable(&self) -> bool {
    let was_available = self.available.swap(false, Ordering::SeqCst);
    if let Some(reprobe) = &self.reprobe {
      let mut r = reprobe.lock().unwrap_or_else(PoisonError::into_inner);
      r.delay = if was_available { r.base } else { (r.delay * 2).min(MAX_REPROBE_DELAY) };
      r.next = Instant::now() + r.delay;
    }
    was_available
  }

  /// Record a remote success. Returns `true` if this call restored a
  /// demoted remote.
  pub fn mark_available(&self) -> bool {
    let was_available = self.available.swap(true, Ordering::SeqCst);
    if !was_available && let Some(reprobe) = &self.reprobe {
      let mut r = reprobe.lock().unwrap_or_else(PoisonError::into_inner);
      r.delay = r.base;
    }
    !was_available
  }

  /// Current backoff delay, if a re-probe policy is set.
  pub fn reprobe_delay(&self) -> Option<Duration> {
    self.reprobe.as_ref().map(|r| r.lock().unwrap_or_else(PoisonError::into_inner).delay)
  }
}
