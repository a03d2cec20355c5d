use std::fmt;

use crate::CreatorFactory;

/// The type returned by [`inject_impl`](crate::inject_impl) if an implementation was already
/// injected.
#[derive(thiserror::Error)]
#[error("attempted to inject a metrics implementation after one was already installed")]
pub struct InjectError(pub CreatorFactory);

impl InjectError {
    /// Returns the factory that was attempted to be injected.
    pub fn into_inner(self) -> CreatorFactory {
        self.0
    }
}

impl fmt::Debug for InjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectError").finish_non_exhaustive()
    }
}
