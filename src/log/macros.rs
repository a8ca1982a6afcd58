//! Emission macros.
//!
//! Each macro takes the logger first, then `format!`-style arguments:
//!
//! ```ignore
//! log_info1!(logger, "ppp: {} started\n", ifname);
//! log_ppp_warn!(logger, "lcp: no reply\n");
//! ```
//!
//! The `log_ppp_*` forms tag the line with the calling thread's current
//! session.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($method:ident, $level:ident, $logger:expr, $($arg:tt)+) => {
        $logger.$method($crate::log::Level::$level, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_msg {
    ($logger:expr, $($arg:tt)+) => { $crate::__log_at!(emit, Msg, $logger, $($arg)+) };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => { $crate::__log_at!(emit, Error, $logger, $($arg)+) };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => { $crate::__log_at!(emit, Warn, $logger, $($arg)+) };
}

#[macro_export]
macro_rules! log_info1 {
    ($logger:expr, $($arg:tt)+) => { $crate::__log_at!(emit, Info1, $logger, $($arg)+) };
}

#[macro_export]
macro_rules! log_info2 {
    ($logger:expr, $($arg:tt)+) => { $crate::__log_at!(emit, Info2, $logger, $($arg)+) };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => { $crate::__log_at!(emit, Debug, $logger, $($arg)+) };
}

#[macro_export]
macro_rules! log_ppp_msg {
    ($logger:expr, $($arg:tt)+) => { $crate::__log_at!(emit_session, Msg, $logger, $($arg)+) };
}

#[macro_export]
macro_rules! log_ppp_error {
    ($logger:expr, $($arg:tt)+) => { $crate::__log_at!(emit_session, Error, $logger, $($arg)+) };
}

#[macro_export]
macro_rules! log_ppp_warn {
    ($logger:expr, $($arg:tt)+) => { $crate::__log_at!(emit_session, Warn, $logger, $($arg)+) };
}

#[macro_export]
macro_rules! log_ppp_info1 {
    ($logger:expr, $($arg:tt)+) => { $crate::__log_at!(emit_session, Info1, $logger, $($arg)+) };
}

#[macro_export]
macro_rules! log_ppp_info2 {
    ($logger:expr, $($arg:tt)+) => { $crate::__log_at!(emit_session, Info2, $logger, $($arg)+) };
}

#[macro_export]
macro_rules! log_ppp_debug {
    ($logger:expr, $($arg:tt)+) => { $crate::__log_at!(emit_session, Debug, $logger, $($arg)+) };
}

/// Write straight to the emergency file.
#[macro_export]
macro_rules! log_emerg {
    ($logger:expr, $($arg:tt)+) => { $logger.emerg(format_args!($($arg)+)) };
}

/// Write straight to the debug file, ignoring the threshold.
#[macro_export]
macro_rules! log_debug_raw {
    ($logger:expr, $($arg:tt)+) => { $logger.debug_raw(format_args!($($arg)+)) };
}
