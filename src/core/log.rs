/// Diagnostic sink handed explicitly to every interpreter entry point.
///
/// The rule engine degrades instead of failing (unknown tags, dangling ids,
/// unbound placeholders), so the only way authors learn about those paths
/// is through whatever `RuleLog` the caller passes in.
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Warn,
    Error,
}

pub trait RuleLog {
    fn log(&self, level: LogLevel, message: &str);

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Forwards to `tracing` under the `choicecraft` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl RuleLog for TracingLog {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "choicecraft", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "choicecraft", "{}", message),
            LogLevel::Error => tracing::error!(target: "choicecraft", "{}", message),
        }
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentLog;

impl RuleLog for SilentLog {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

/// Keeps entries in memory so callers can show them to the author.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: RefCell<Vec<(LogLevel, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.borrow().clone()
    }

    /// Entries at `level` or above.
    pub fn at_least(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l >= level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.borrow().iter().any(|(_, m)| m.contains(needle))
    }

    pub fn take(&self) -> Vec<(LogLevel, String)> {
        self.entries.borrow_mut().drain(..).collect()
    }
}

impl RuleLog for MemoryLog {
    fn log(&self, level: LogLevel, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

impl<L: RuleLog + ?Sized> RuleLog for std::rc::Rc<L> {
    fn log(&self, level: LogLevel, message: &str) {
        (**self).log(level, message);
    }
}

impl<L: RuleLog + ?Sized> RuleLog for Box<L> {
    fn log(&self, level: LogLevel, message: &str) {
        (**self).log(level, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn memory_log_records_levels() {
        let log = MemoryLog::new();
        log.debug("looked up e1");
        log.warn("unknown condition tag");
        log.error("cycle at colonist");

        assert_eq!(log.entries().len(), 3);
        assert_eq!(log.at_least(LogLevel::Warn).len(), 2);
        assert!(log.contains("cycle"));
        assert_eq!(log.take().len(), 3);
        assert!(log.entries().is_empty());
    }

    #[test]
    fn shared_log_through_rc() {
        let log = Rc::new(MemoryLog::new());
        let shared: Rc<MemoryLog> = Rc::clone(&log);
        shared.warn("through rc");
        assert!(log.contains("through rc"));
    }

    #[test]
    fn silent_and_tracing_do_not_panic() {
        SilentLog.error("ignored");
        TracingLog.warn("no subscriber installed");
    }
}
