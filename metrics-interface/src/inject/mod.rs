use std::sync::OnceLock;

mod errors;
pub use self::errors::InjectError;

use crate::{Creator, CreatorFactory, Noop};

static GLOBAL_FACTORY: OnceLock<CreatorFactory> = OnceLock::new();

/// Installs the process-wide metrics implementation.
///
/// This function may only be called once in the lifetime of a program. Creators obtained with
/// [`new`] before this is called are no-ops and stay that way.
///
/// Implementations usually provide their own injection helper that calls this internally.
///
/// # Errors
///
/// An error carrying the rejected factory is returned if an implementation was already injected.
pub fn inject_impl(factory: CreatorFactory) -> Result<(), InjectError> {
    GLOBAL_FACTORY.set(factory).map_err(InjectError)
}

/// Returns `true` if an implementation has been injected.
pub fn is_injected() -> bool {
    GLOBAL_FACTORY.get().is_some()
}

/// Creates the [`Creator`] for the given metric using the injected implementation.
///
/// If no implementation was injected, a [`Noop`] creator is returned.
pub fn new(name: &str, help: &str) -> Box<dyn Creator> {
    match GLOBAL_FACTORY.get() {
        Some(factory) => factory(name, help),
        None => Box::new(Noop),
    }
}
