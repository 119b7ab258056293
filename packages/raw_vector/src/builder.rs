use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{DropPolicy, RawStorage, Result, Vector};

/// Builder for creating an instance of [`Vector`].
///
/// You only need to use this builder if you want to customize the vector configuration.
/// The default configuration used by [`Vector::new()`][1] is sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use raw_vector::{DropPolicy, Vector};
///
/// let vector = Vector::<u32>::builder()
///     .capacity(64)
///     .drop_policy(DropPolicy::MayDropItems)
///     .build();
///
/// assert!(vector.is_empty());
/// assert_eq!(vector.capacity(), 64);
/// ```
///
/// [1]: Vector::new
#[must_use]
pub struct VectorBuilder<T> {
    capacity: usize,

    drop_policy: DropPolicy,

    _item: PhantomData<T>,
}

impl<T> fmt::Debug for VectorBuilder<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("capacity", &self.capacity)
            .field("drop_policy", &self.drop_policy)
            .finish()
    }
}

impl<T> VectorBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            capacity: 0,
            drop_policy: DropPolicy::default(),
            _item: PhantomData,
        }
    }

    /// Sets the initial capacity of the vector. The vector allocates room for exactly this many
    /// elements when built. Defaults to zero, which does not allocate.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the vector. This governs how
    /// to treat remaining elements in the vector when the vector is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use raw_vector::{DropPolicy, Vector};
    ///
    /// let mut vector = Vector::<u32>::builder()
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    ///
    /// vector.push_back(42);
    ///
    /// // The vector must be emptied before it is dropped.
    /// vector.clear();
    /// ```
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds the vector with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if the initial capacity overflows the address space. Allocator failure is
    /// reported via [`std::alloc::handle_alloc_error()`].
    #[must_use]
    pub fn build(self) -> Vector<T> {
        Vector::from_parts(RawStorage::allocate(self.capacity), self.drop_policy)
    }

    /// Builds the vector with the specified configuration, returning an error if the initial
    /// storage cannot be allocated.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial capacity overflows the address space or the allocator
    /// cannot provide the storage.
    pub fn try_build(self) -> Result<Vector<T>> {
        Ok(Vector::from_parts(
            RawStorage::try_allocate(self.capacity)?,
            self.drop_policy,
        ))
    }
}
