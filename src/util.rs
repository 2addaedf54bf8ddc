use std::io;
use std::sync::LockResult;

fn do_abort() -> ! {
  #[cfg(feature = "backtrace")]
  {
    let bt = backtrace::Backtrace::new();
    crate::error_log!("An impossible state was reached. This is a bug, please file a report. bt={:?}", bt);
    eprintln!("An impossible state was reached. This is a bug, please file a report. bt={:?}", bt);
    std::process::abort();
  }
  #[cfg(not(feature = "backtrace"))]
  unreachable!("A condition that should be unreachable was reached. Enable the 'backtrace' feature for more information and then file a bug report.");
}

pub fn unwrap_some<T>(some: Option<T>) -> T {
  if let Some(t) = some {
    return t;
  }

  do_abort();
}

pub fn unwrap_ok<T, E>(some: Result<T, E>) -> T {
  if let Ok(t) = some {
    return t;
  }

  do_abort();
}

pub fn unwrap_poison<T>(result: LockResult<T>) -> io::Result<T> {
  result.map_err(|_| io::Error::new(io::ErrorKind::Other, "poisoned mutex"))
}

pub const fn three_digit_to_utf(num: u16) -> [u8; 3] {
  let n1 = num % 10;
  let n2 = ((num - n1) / 10) % 10;
  let n3 = (((num - n1) - n2) / 100) % 10;
  [b'0' + n3 as u8, b'0' + n2 as u8, b'0' + n1 as u8]
}

mod counter {
  use std::sync::atomic::AtomicU64;
  use std::sync::atomic::Ordering;
  use std::time::{SystemTime, UNIX_EPOCH};

  static TIME: AtomicU64 = AtomicU64::new(0);
  static COUNTER: AtomicU64 = AtomicU64::new(0);

  pub fn next() -> u128 {
    let mut time = TIME.load(Ordering::Relaxed);
    if time == 0 {
      time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|a| a.as_millis() as u64)
        .unwrap_or_default();

      if let Err(t) = TIME.compare_exchange(0, time, Ordering::Relaxed, Ordering::Relaxed) {
        time = t;
      }
    }

    let time = u128::from(time).overflowing_shl(64).0;
    let counter = u128::from(COUNTER.fetch_add(1, Ordering::SeqCst));
    time | counter
  }
}

/// Generates an identifier unique to this process, used to tag connections and requests
/// for logging correlation. Not a security token.
pub fn next_id() -> u128 {
  counter::next()
}

#[cfg(feature = "log")]
#[macro_export]
/// Calls trace! on the `log` crate if the `log` feature is enabled, otherwise discards its arguments.
macro_rules! trace_log {
    (target: $target:expr, $($arg:tt)+) => (log::log!(target: $target, log::Level::Trace, $($arg)+));
    ($($arg:tt)+) => (log::log!(log::Level::Trace, $($arg)+))
}

#[cfg(not(feature = "log"))]
#[macro_export]
/// Calls trace! on the `log` crate if the `log` feature is enabled, otherwise discards its arguments.
macro_rules! trace_log {
  (target: $target:expr, $($arg:tt)+) => {
      let _ = &($($arg)+);
  };
  ($($arg:tt)+) => {
      let _ = &($($arg)+);
  }
}

#[cfg(feature = "log")]
#[macro_export]
/// Calls debug! on the `log` crate if the `log` feature is enabled, otherwise discards its arguments.
macro_rules! debug_log {
    (target: $target:expr, $($arg:tt)+) => (log::log!(target: $target, log::Level::Debug, $($arg)+));
    ($($arg:tt)+) => (log::log!(log::Level::Debug, $($arg)+))
}

#[cfg(not(feature = "log"))]
#[macro_export]
/// Calls debug! on the `log` crate if the `log` feature is enabled, otherwise discards its arguments.
macro_rules! debug_log {
  (target: $target:expr, $($arg:tt)+) => {
      let _ = &($($arg)+);
  };
  ($($arg:tt)+) => {
      let _ = &($($arg)+);
  }
}

#[cfg(feature = "log")]
#[macro_export]
/// Calls info! on the `log` crate if the `log` feature is enabled, otherwise discards its arguments.
macro_rules! info_log {
    (target: $target:expr, $($arg:tt)+) => (log::log!(target: $target, log::Level::Info, $($arg)+));
    ($($arg:tt)+) => (log::log!(log::Level::Info, $($arg)+))
}

#[cfg(not(feature = "log"))]
#[macro_export]
/// Calls info! on the `log` crate if the `log` feature is enabled, otherwise discards its arguments.
macro_rules! info_log {
  (target: $target:expr, $($arg:tt)+) => {
      let _ = &($($arg)+);
  };
  ($($arg:tt)+) => {
      let _ = &($($arg)+);
  }
}

#[cfg(feature = "log")]
#[macro_export]
/// Calls warn! on the `log` crate if the `log` feature is enabled, otherwise discards its arguments.
macro_rules! warn_log {
    (target: $target:expr, $($arg:tt)+) => (log::log!(target: $target, log::Level::Warn, $($arg)+));
    ($($arg:tt)+) => (log::log!(log::Level::Warn, $($arg)+))
}

#[cfg(not(feature = "log"))]
#[macro_export]
/// Calls warn! on the `log` crate if the `log` feature is enabled, otherwise discards its arguments.
macro_rules! warn_log {
  (target: $target:expr, $($arg:tt)+) => {
      let _ = &($($arg)+);
  };
  ($($arg:tt)+) => {
      let _ = &($($arg)+);
  }
}

#[cfg(feature = "log")]
#[macro_export]
/// Calls error! on the `log` crate if the `log` feature is enabled, otherwise discards its arguments.
macro_rules! error_log {
    (target: $target:expr, $($arg:tt)+) => (log::log!(target: $target, log::Level::Error, $($arg)+));
    ($($arg:tt)+) => (log::log!(log::Level::Error, $($arg)+))
}

#[cfg(not(feature = "log"))]
#[macro_export]
/// Calls error! on the `log` crate if the `log` feature is enabled, otherwise discards its arguments.
macro_rules! error_log {
  (target: $target:expr, $($arg:tt)+) => {
      let _ = &($($arg)+);
  };
  ($($arg:tt)+) => {
      let _ = &($($arg)+);
  }
}
