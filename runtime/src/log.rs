// Runtime Logging Subsystem
//
// Structured, leveled logging for driver bring-up and diagnostics.
//
// Key responsibilities:
// - Provide standardized log levels (Debug, Info, Warn, Error)
// - Attach a subsystem origin tag to every entry
// - Include source location only for DEBUG entries (file:line)
// - Route output to a sink supplied once by the board application
//
// Design notes:
// - Messages below the current level are dropped before any formatting
// - Early-boot friendly: logging before a sink is installed is a no-op,
//   so drivers may log unconditionally during initialization
// - An optional time source (typically derived from a count-up interval
//   timer) prefixes entries with a coarse millisecond timestamp
// - Never called from interrupt context by this crate; the hot servicing
//   path does not log
//
// The sink and time source are installed through `spin::Once`, so they are
// set exactly once and read without locking afterwards.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};
use spin::Once;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO ",
            LogLevel::Warn => "WARN ",
            LogLevel::Error => "ERROR",
        }
    }

    const fn from_u8(raw: u8) -> LogLevel {
        match raw {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// Destination for formatted log output, usually a UART behind a lock.
///
/// Implementations must tolerate being called from any non-interrupt
/// context; this crate never logs from interrupt context.
pub trait LogSink: Sync {
    fn write(&self, args: fmt::Arguments);
}

static SINK: Once<&'static dyn LogSink> = Once::new();
static TIME_SOURCE: Once<fn() -> u64> = Once::new();
static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Debug as u8);

/// Installs the output sink. Only the first call takes effect.
pub fn init(sink: &'static dyn LogSink) {
    SINK.call_once(|| sink);
}

/// Installs a monotonic milliseconds source used for entry timestamps.
/// Only the first call takes effect; without one, entries carry t=0.
pub fn set_time_source(source: fn() -> u64) {
    TIME_SOURCE.call_once(|| source);
}

pub fn set_level(level: LogLevel) {
    CURRENT_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn get_level() -> LogLevel {
    LogLevel::from_u8(CURRENT_LEVEL.load(Ordering::Relaxed))
}

fn timestamp_ms() -> u64 {
    match TIME_SOURCE.get() {
        Some(source) => source(),
        None => 0,
    }
}

#[doc(hidden)]
pub fn _log(level: LogLevel, origin: &str, args: fmt::Arguments, file: &str, line: u32) {
    if level < get_level() {
        return;
    }

    let sink = match SINK.get() {
        Some(sink) => sink,
        None => return,
    };

    let ms = timestamp_ms();
    let (seconds, milliseconds) = (ms / 1000, ms % 1000);

    if level == LogLevel::Debug {
        sink.write(format_args!(
            "[t={}.{:03}s] [{}] [{}] {} ({}:{})\n",
            seconds,
            milliseconds,
            level.as_str(),
            origin,
            args,
            file,
            line
        ));
    } else {
        sink.write(format_args!(
            "[t={}.{:03}s] [{}] [{}] {}\n",
            seconds,
            milliseconds,
            level.as_str(),
            origin,
            args
        ));
    }
}

#[macro_export]
macro_rules! log_debug {
    ($origin:expr, $($arg:tt)*) => {
        $crate::log::_log(
            $crate::log::LogLevel::Debug,
            $origin,
            format_args!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($origin:expr, $($arg:tt)*) => {
        $crate::log::_log(
            $crate::log::LogLevel::Info,
            $origin,
            format_args!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[macro_export]
macro_rules! log_warn {
    ($origin:expr, $($arg:tt)*) => {
        $crate::log::_log(
            $crate::log::LogLevel::Warn,
            $origin,
            format_args!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[macro_export]
macro_rules! log_error {
    ($origin:expr, $($arg:tt)*) => {
        $crate::log::_log(
            $crate::log::LogLevel::Error,
            $origin,
            format_args!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn level_filtering_orders_levels() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn level_round_trips_through_raw() {
        for level in [
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            assert_eq!(LogLevel::from_u8(level as u8), level);
        }
    }

    #[test]
    fn logging_without_sink_is_a_no_op() {
        // Must not panic or block before `init` has run.
        _log(
            LogLevel::Info,
            "test",
            format_args!("dropped"),
            file!(),
            line!(),
        );
    }
}
