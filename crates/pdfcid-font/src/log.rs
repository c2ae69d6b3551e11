//! Logging shims over the optional `tracing` dependency.

macro_rules! font_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::warn!($($arg)*);
    };
}

macro_rules! font_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    };
}

pub(crate) use font_debug;
pub(crate) use font_warn;
