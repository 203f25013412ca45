use crate::di::Container;
use crate::error::Result;

/// Trait for types that can be built from the DI container
///
/// Implemented by `#[derive(Injectable)]` and by `#[controller]`, both of which
/// resolve every `Arc<T>` field from the container.
///
/// # Example
/// ```
/// use simplemvc::prelude::*;
///
/// trait Catalog: Send + Sync {}
///
/// #[derive(Injectable)]
/// pub struct ProductService {
///     catalog: Arc<dyn Catalog>,
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Create an instance by resolving dependencies from the container
    ///
    /// # Errors
    /// Returns an error if any required dependency is not found in the container.
    fn inject(container: &Container) -> Result<Self>;
}
