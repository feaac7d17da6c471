//! Guards for mutating environment variables in tests.
//!
//! Every mutation takes a global re-entrant lock for the duration of the
//! change and returns an [`EnvVarGuard`] that puts the previous value back
//! when dropped. Guards for the same key restore in LIFO order. Use
//! [`scope_with`] when a test sets several related variables and reads them
//! through a binder: the scope keeps the lock until it is dropped, so no
//! other test can observe a half-configured environment.
//!
//! # Examples
//!
//! ```
//! use propbind_test_helpers::env;
//!
//! let _scope = env::scope_with(|lock| {
//!     vec![
//!         lock.set_var("DEMO_SERVER_PORT", "8080"),
//!         lock.remove_var("DEMO_SERVER_HOST"),
//!     ]
//! });
//! assert_eq!(std::env::var("DEMO_SERVER_PORT").ok().as_deref(), Some("8080"));
//! ```

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

static ENV_MUTEX: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// Set or clear `key`, returning its previous value.
///
/// Callers must hold `ENV_MUTEX`.
fn swap(key: &str, value: Option<&OsStr>) -> Option<OsString> {
    let original = env::var_os(key);
    match value {
        // SAFETY: callers hold ENV_MUTEX, which serialises environment writes.
        Some(text) => unsafe { env::set_var(key, text) },
        // SAFETY: as above.
        None => unsafe { env::remove_var(key) },
    }
    original
}

/// Restores an environment variable to its prior value on drop.
#[must_use = "dropping restores the prior value"]
pub struct EnvVarGuard {
    key: String,
    original: Option<OsString>,
}

impl fmt::Debug for EnvVarGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarGuard")
            .field("key", &self.key)
            .field("had_original", &self.original.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let _guard = ENV_MUTEX.lock();
        swap(&self.key, self.original.as_deref());
    }
}

/// Holds the environment lock; mutations made through it reuse the lock.
#[must_use = "dropping releases the environment lock"]
pub struct EnvVarLock {
    _guard: ReentrantMutexGuard<'static, ()>,
}

impl EnvVarLock {
    /// Set `key` while holding the lock.
    pub fn set_var(&self, key: impl Into<String>, value: impl AsRef<OsStr>) -> EnvVarGuard {
        let name: String = key.into();
        let original = swap(&name, Some(value.as_ref()));
        EnvVarGuard {
            key: name,
            original,
        }
    }

    /// Remove `key` while holding the lock.
    pub fn remove_var(&self, key: impl Into<String>) -> EnvVarGuard {
        let name: String = key.into();
        let original = swap(&name, None);
        EnvVarGuard {
            key: name,
            original,
        }
    }
}

/// Keeps the lock and a set of guards alive together.
///
/// Guards restore before the lock is released.
#[must_use = "dropping releases the environment lock and restores guards"]
pub struct EnvScope {
    guards: Vec<EnvVarGuard>,
    _lock: EnvVarLock,
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        drop(std::mem::take(&mut self.guards));
    }
}

/// Acquire the environment lock until the returned value drops.
pub fn lock() -> EnvVarLock {
    EnvVarLock {
        _guard: ENV_MUTEX.lock(),
    }
}

/// Set `key` and return a guard restoring its prior value.
///
/// # Examples
///
/// ```
/// use propbind_test_helpers::env;
///
/// let _g = env::set_var("DEMO_FLAG", "on");
/// assert_eq!(std::env::var("DEMO_FLAG").ok().as_deref(), Some("on"));
/// ```
pub fn set_var(key: impl Into<String>, value: impl AsRef<OsStr>) -> EnvVarGuard {
    lock().set_var(key, value)
}

/// Remove `key` and return a guard restoring its prior value.
pub fn remove_var(key: impl Into<String>) -> EnvVarGuard {
    lock().remove_var(key)
}

/// Build a scope while holding the lock.
pub fn scope_with<F>(builder: F) -> EnvScope
where
    F: FnOnce(&EnvVarLock) -> Vec<EnvVarGuard>,
{
    let held = lock();
    let guards = builder(&held);
    EnvScope {
        guards,
        _lock: held,
    }
}

/// Set every `(key, value)` pair inside one scope.
pub fn scope_vars<I, K, V>(vars: I) -> EnvScope
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<OsStr>,
{
    scope_with(|held| {
        vars.into_iter()
            .map(|(key, value)| held.set_var(key, value))
            .collect()
    })
}

#[cfg(test)]
mod tests;
