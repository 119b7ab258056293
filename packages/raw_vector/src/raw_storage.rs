use std::alloc::{Layout, alloc, dealloc, handle_alloc_error};
use std::any::type_name;
use std::marker::PhantomData;
use std::ops::Range;
use std::ptr::{self, NonNull};
use std::{fmt, mem};

use tracing::debug;

use crate::{Error, Result};

/// An owned block of uninitialized memory with room for `capacity` values of `T`.
///
/// This is the backing storage of a [`Vector`][crate::Vector] but may also be used on its own
/// by code that wants to manage element lifecycles by hand.
///
/// The storage knows nothing about which of its slots hold live values. It never runs element
/// constructors or destructors. When the storage is dropped, the memory block is released
/// unconditionally, so whoever placed values into it must have dropped or moved them out first.
/// Any value still in a slot at that point is leaked.
///
/// The storage is move-only: two owners never refer to the same block. Taking the storage out
/// of a place via [`std::mem::take()`] leaves behind an empty storage without a block.
///
/// # Zero-sized types
///
/// Values of zero-sized types need no memory, so no block is ever allocated for them. The
/// storage still reports the capacity it was created with.
///
/// # Examples
///
/// ```
/// use raw_vector::RawStorage;
///
/// let mut storage = RawStorage::<String>::allocate(2);
/// assert_eq!(storage.capacity(), 2);
///
/// // SAFETY: Slot 0 is within capacity and uninitialized.
/// unsafe { storage.write(0, "hello".to_string()) };
///
/// // SAFETY: Slot 0 holds a live value, which we move out of the storage here.
/// let value = unsafe { storage.read(0) };
/// assert_eq!(value, "hello");
/// ```
pub struct RawStorage<T> {
    /// Start of the block. Dangling (but aligned) if there is no block.
    ptr: NonNull<T>,

    capacity: usize,

    _slots: PhantomData<T>,
}

impl<T> RawStorage<T> {
    /// Creates a storage without a memory block.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            _slots: PhantomData,
        }
    }

    /// Allocates a block with room for `capacity` values of `T`.
    ///
    /// A capacity of zero does not allocate.
    ///
    /// # Panics
    ///
    /// Panics if the block size overflows the address space. Allocator failure is reported via
    /// [`handle_alloc_error()`], which by default aborts the process.
    #[must_use]
    pub fn allocate(capacity: usize) -> Self {
        match Self::try_allocate(capacity) {
            Ok(storage) => storage,
            Err(Error::OutOfMemory { layout }) => handle_alloc_error(layout),
            Err(error) => panic!("{error}"),
        }
    }

    /// Allocates a block with room for `capacity` values of `T`, returning an error instead of
    /// failing the process if the memory cannot be obtained.
    ///
    /// A capacity of zero does not allocate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the block size overflows the address space and
    /// [`Error::OutOfMemory`] if the allocator cannot provide the block.
    pub fn try_allocate(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Ok(Self::new());
        }

        let layout = Self::layout(capacity)?;

        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                capacity,
                _slots: PhantomData,
            });
        }

        // SAFETY: The layout is valid for `capacity` values of `T` and is not zero-sized
        // (guarded by the check above).
        let raw = unsafe { alloc(layout) };

        let Some(ptr) = NonNull::new(raw.cast::<T>()) else {
            debug!(
                capacity,
                size = layout.size(),
                element_type = type_name::<T>(),
                "allocation of raw storage failed"
            );

            return Err(Error::OutOfMemory { layout });
        };

        Ok(Self {
            ptr,
            capacity,
            _slots: PhantomData,
        })
    }

    fn layout(capacity: usize) -> Result<Layout> {
        Layout::array::<T>(capacity).map_err(|_layout_error| Error::CapacityOverflow {
            requested: capacity,
            element_type: type_name::<T>(),
        })
    }

    /// The number of values the block has room for.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pointer to the first slot. Dangling if there is no block.
    #[must_use]
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Mutable pointer to the first slot. Dangling if there is no block.
    #[must_use]
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Pointer to the slot at `offset`.
    ///
    /// An offset equal to the capacity is permitted and yields the one-past-the-end pointer,
    /// which may be used for address arithmetic but not for reads or writes.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is greater than the capacity.
    #[must_use]
    #[inline]
    pub fn slot(&self, offset: usize) -> NonNull<T> {
        assert!(
            offset <= self.capacity,
            "slot offset {offset} out of bounds for capacity {} in storage of {}",
            self.capacity,
            type_name::<T>()
        );

        // SAFETY: Guarded by the bounds check above. The block covers `capacity` slots and
        // the one-past-the-end address is always valid to compute.
        unsafe { self.ptr.add(offset) }
    }

    /// Places `value` into the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than the capacity.
    ///
    /// # Safety
    ///
    /// The slot must not hold a live value. Any value present is overwritten without being
    /// dropped.
    #[inline]
    pub unsafe fn write(&mut self, index: usize, value: T) {
        let slot = self.checked_slot(index);

        // SAFETY: The slot is within the block and suitably aligned for `T`. The caller
        // guarantees we are not overwriting a live value.
        unsafe {
            slot.write(value);
        }
    }

    /// Moves the value out of the slot at `index`, leaving the slot logically uninitialized.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than the capacity.
    ///
    /// # Safety
    ///
    /// The slot must hold a live value. After the call, the caller must treat the slot as
    /// uninitialized.
    ///
    /// Moving a value out requires exclusive access to the storage, the same as placing one in:
    ///
    /// ```compile_fail
    /// use raw_vector::RawStorage;
    ///
    /// let mut storage = RawStorage::<String>::allocate(1);
    ///
    /// // SAFETY: Slot 0 is within capacity and uninitialized.
    /// unsafe { storage.write(0, "shared".to_string()) };
    ///
    /// let shared = &storage;
    ///
    /// // SAFETY: Slot 0 holds a live value.
    /// let value = unsafe { shared.read(0) };
    /// ```
    #[inline]
    #[must_use]
    pub unsafe fn read(&mut self, index: usize) -> T {
        let slot = self.checked_slot(index);

        // SAFETY: The slot is within the block and the caller guarantees it holds a live value.
        unsafe { slot.read() }
    }

    /// Drops the values in the slots covered by `range`, leaving them uninitialized.
    ///
    /// # Panics
    ///
    /// Panics if the range is inverted or extends beyond the capacity.
    ///
    /// # Safety
    ///
    /// Every slot in the range must hold a live value.
    pub unsafe fn drop_in_place(&mut self, range: Range<usize>) {
        assert!(
            range.start <= range.end && range.end <= self.capacity,
            "slot range {range:?} out of bounds for capacity {} in storage of {}",
            self.capacity,
            type_name::<T>()
        );

        let count = range
            .end
            .checked_sub(range.start)
            .expect("guarded by range assertion above");

        let first = self.slot(range.start);

        // SAFETY: The range is within the block and the caller guarantees every slot in it
        // holds a live value.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first.as_ptr(), count));
        }
    }

    /// Exchanges the blocks of two storages. Does not allocate and does not touch any values.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.capacity, &mut other.capacity);
    }

    fn checked_slot(&self, index: usize) -> NonNull<T> {
        assert!(
            index < self.capacity,
            "slot index {index} out of bounds for capacity {} in storage of {}",
            self.capacity,
            type_name::<T>()
        );

        self.slot(index)
    }
}

impl<T> Default for RawStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RawStorage<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawStorage")
            .field("element_type", &format_args!("{}", type_name::<T>()))
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> Drop for RawStorage<T> {
    fn drop(&mut self) {
        if self.capacity == 0 {
            return;
        }

        let layout = Self::layout(self.capacity)
            .expect("layout was already calculated successfully when the block was allocated");

        if layout.size() == 0 {
            return;
        }

        // SAFETY: The block was allocated with this exact layout in `try_allocate()` and has
        // not been released since - ownership of a block is never shared.
        unsafe {
            dealloc(self.ptr.as_ptr().cast(), layout);
        }
    }
}

// SAFETY: The storage exclusively owns its block, so moving it to another thread is as safe as
// moving the `T` values it may hold.
unsafe impl<T: Send> Send for RawStorage<T> {}

// SAFETY: Shared access only exposes raw pointers and the capacity. Any access to values goes
// through unsafe methods whose callers must uphold `T`'s own thread-safety rules.
unsafe impl<T: Sync> Sync for RawStorage<T> {}
