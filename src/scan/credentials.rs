use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Ordered, immutable set of API keys plus the cursor naming the next key to
/// try. The cursor survives across scans on the same pool.
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl CredentialPool {
    /// Build a pool, dropping empty or whitespace-only keys.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(Into::into)
            .map(|key: String| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();

        Self {
            keys,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// The key under the cursor, with its index.
    pub fn current(&self) -> Option<(usize, &str)> {
        if self.keys.is_empty() {
            return None;
        }
        let index = self.cursor() % self.keys.len();
        Some((index, self.keys[index].as_str()))
    }

    /// Move the cursor past `index` after that key hit its quota.
    ///
    /// Only advances if the cursor still points at `index`, so concurrent
    /// scans that tripped over the same key skip it once, not twice.
    /// Returns the cursor after the call.
    pub fn advance_from(&self, index: usize) -> usize {
        if self.keys.is_empty() {
            return 0;
        }
        let next = (index + 1) % self.keys.len();
        match self
            .cursor
            .compare_exchange(index, next, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => next,
            Err(actual) => actual,
        }
    }
}

impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("len", &self.keys.len())
            .field("cursor", &self.cursor())
            .finish()
    }
}
