//! Process-wide serialization of engine calls.

use parking_lot::{Mutex, MutexGuard};

/// Held for the duration of every writer call when the scope is global.
static ENGINE_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// How writer calls are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockScope {
    /// Every call on every writer in the process takes one shared lock.
    #[default]
    Global,
    /// Calls are serialized per writer only; writers on different files
    /// run in parallel.
    PerWriter,
}

/// Take the process-wide lock if `scope` asks for it.
pub(crate) fn acquire(scope: LockScope) -> Option<MutexGuard<'static, ()>> {
    match scope {
        LockScope::Global => Some(ENGINE_LOCK.lock()),
        LockScope::PerWriter => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_scope_holds_the_lock() {
        let guard = acquire(LockScope::Global);
        assert!(guard.is_some());
        assert!(ENGINE_LOCK.try_lock().is_none());
        drop(guard);
    }

    #[test]
    fn per_writer_scope_takes_nothing() {
        assert!(acquire(LockScope::PerWriter).is_none());
    }
}
