//! Process-global environment mutation helpers for tests.

use std::sync::{Mutex, OnceLock};

/// Lock serializing environment mutation across test threads.
///
/// # Returns
/// A process-wide mutex; hold it for as long as any [`EnvGuard`] lives.
pub(crate) fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Set or remove `key`; env mutation is `unsafe` on newer toolchains.
#[allow(unused_unsafe)]
fn write_env_var(key: &str, value: Option<&str>) {
    // SAFETY: callers serialize mutation through `env_lock`.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Overrides one environment variable until dropped.
pub(crate) struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    /// Set `key=value` for the guard's lifetime.
    pub(crate) fn set(key: &str, value: &str) -> Self {
        Self::replace(key, Some(value))
    }

    /// Unset `key` for the guard's lifetime.
    pub(crate) fn remove(key: &str) -> Self {
        Self::replace(key, None)
    }

    fn replace(key: &str, value: Option<&str>) -> Self {
        let previous = std::env::var(key).ok();
        write_env_var(key, value);
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        write_env_var(&self.key, self.previous.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::{env_lock, EnvGuard};

    #[test]
    fn nested_guards_restore_in_reverse_order() {
        let _lock = env_lock().lock().expect("env lock");
        let key = "ROWPAINT_TEST_ENV_GUARD_NESTED";
        let _baseline = EnvGuard::set(key, "outer");
        {
            let _inner = EnvGuard::set(key, "inner");
            assert_eq!(std::env::var(key).ok().as_deref(), Some("inner"));
            {
                let _removed = EnvGuard::remove(key);
                assert!(std::env::var(key).is_err());
            }
            assert_eq!(std::env::var(key).ok().as_deref(), Some("inner"));
        }
        assert_eq!(std::env::var(key).ok().as_deref(), Some("outer"));
    }

    #[test]
    fn removing_an_unset_key_leaves_it_unset() {
        let _lock = env_lock().lock().expect("env lock");
        let key = "ROWPAINT_TEST_ENV_GUARD_UNSET";
        {
            let _removed = EnvGuard::remove(key);
        }
        assert!(std::env::var(key).is_err());
    }
}
