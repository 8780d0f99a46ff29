use alloc::string::String;

/// Trait for structs that provide metadata for logging
pub trait LogMetadata {
    fn meta(&self) -> String;
}

/// Identifies the server resource a log line is about.
pub struct LogContext {
    pub system: &'static str,
    pub resource: &'static str,
    pub id: u64,
}

impl LogContext {
    pub fn edev(id: u64) -> Self {
        Self {
            system: "sep2",
            resource: "edev",
            id,
        }
    }

    pub fn mup(id: u64) -> Self {
        Self {
            system: "sep2",
            resource: "mup",
            id,
        }
    }
}

impl LogMetadata for LogContext {
    fn meta(&self) -> String {
        alloc::format!(
            "system={}, resource={}, id={}",
            self.system, self.resource, self.id
        )
    }
}

// =============================================
// Logging Macros (namespaced under crate::log)
// =============================================
//
// Format strings go through `concat!`, so arguments must be passed
// positionally; inline captures like `{edev_id}` do not compile here.

// ===== client_info! =====
macro_rules! client_info {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        ::log::info!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
    ($fmt:literal $(, $($arg:tt)+)?) => {{
        ::log::info!($fmt $(, $($arg)+)?);
    }};
}

// ===== client_warn! =====
macro_rules! client_warn {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        ::log::warn!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
    ($fmt:literal $(, $($arg:tt)+)?) => {{
        ::log::warn!($fmt $(, $($arg)+)?);
    }};
}

// ===== client_debug! =====
macro_rules! client_debug {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        ::log::debug!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
    ($fmt:literal $(, $($arg:tt)+)?) => {{
        ::log::debug!($fmt $(, $($arg)+)?);
    }};
}

// Re-export macros for use in other files
pub(crate) use client_debug;
pub(crate) use client_info;
pub(crate) use client_warn;

#[cfg(test)]
mod tests {
    use super::{LogContext, LogMetadata};

    #[test]
    fn test_context_meta() {
        assert_eq!(
            LogContext::edev(3).meta(),
            "system=sep2, resource=edev, id=3"
        );
        assert_eq!(LogContext::mup(7).resource, "mup");
    }
}
