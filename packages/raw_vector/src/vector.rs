use std::any::type_name;
use std::cmp::Ordering;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::{fmt, iter, mem, ptr, slice, thread};

use tracing::trace;

use crate::{DropPolicy, RawStorage, Result, VectorBuilder, construct_in_place, relocate};

/// A contiguous growable sequence of `T` built directly on a [`RawStorage`] block.
///
/// The vector owns exactly one storage block plus a count of live elements. Slots `0..len()` of
/// the block hold live elements and the remaining slots up to `capacity()` are uninitialized.
/// The vector alone decides when elements are constructed and dropped and when the block is
/// replaced by a larger one.
///
/// # Growth
///
/// When an insertion finds the block full, a new block of twice the current length (or one slot
/// if empty) is allocated, the new element is constructed directly in its final slot of the new
/// block, the existing elements are relocated around it and only then is the old block
/// released. Appending is therefore amortized O(1) and the capacity of a vector grown purely by
/// appending follows the sequence 1, 2, 4, 8, ...
///
/// Explicit [`reserve()`][Self::reserve] and [`resize()`][Self::resize] allocate exactly the
/// requested capacity.
///
/// # Panic safety
///
/// Element constructors supplied by the caller (closures, `Clone`, `Default`) may panic. Every
/// operation that replaces the storage block leaves the vector exactly as it was before the call
/// if that happens: the new element is constructed before any existing element is relocated and
/// relocation itself cannot fail. Inserting into the middle without reallocating builds the new
/// value before any slot is touched. No element is ever leaked or dropped twice.
///
/// # Indexing
///
/// Indexing out of bounds and calling [`back()`][Self::back] or [`pop_back()`][Self::pop_back]
/// on an empty vector are contract violations and panic.
///
/// # Examples
///
/// ```
/// use raw_vector::Vector;
///
/// let mut numbers = Vector::new();
/// numbers.push_back(1);
/// numbers.push_back(2);
/// numbers.push_back(4);
///
/// numbers.insert(2, 3);
/// assert_eq!(numbers.as_slice(), [1, 2, 3, 4]);
///
/// let next = numbers.erase(1);
/// assert_eq!(numbers[next], 3);
/// assert_eq!(numbers.as_slice(), [1, 3, 4]);
/// ```
pub struct Vector<T> {
    storage: RawStorage<T>,

    /// Number of live elements at the start of `storage`.
    len: usize,

    drop_policy: DropPolicy,
}

impl<T> Vector<T> {
    /// Creates an empty vector without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            storage: RawStorage::new(),
            len: 0,
            drop_policy: DropPolicy::MayDropItems,
        }
    }

    /// Creates a builder that can be used to customize the vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use raw_vector::{DropPolicy, Vector};
    ///
    /// let vector = Vector::<String>::builder()
    ///     .capacity(16)
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    ///
    /// assert_eq!(vector.capacity(), 16);
    /// ```
    pub fn builder() -> VectorBuilder<T> {
        VectorBuilder::new()
    }

    /// Creates an empty vector with room for exactly `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_parts(RawStorage::allocate(capacity), DropPolicy::default())
    }

    pub(crate) fn from_parts(storage: RawStorage<T>, drop_policy: DropPolicy) -> Self {
        Self {
            storage,
            len: 0,
            drop_policy,
        }
    }

    /// Creates a vector of `len` default-constructed elements, with capacity for exactly that
    /// many.
    ///
    /// # Examples
    ///
    /// ```
    /// use raw_vector::Vector;
    ///
    /// let zeroes = Vector::<u32>::with_len(3);
    /// assert_eq!(zeroes.as_slice(), [0, 0, 0]);
    /// assert_eq!(zeroes.capacity(), 3);
    /// ```
    #[must_use]
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut vector = Self::with_capacity(len);
        vector.construct_tail(iter::repeat_with(T::default).take(len));
        vector
    }

    /// The number of live elements.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector contains no elements.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of elements the vector can hold before it needs to reallocate.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// The live elements as a slice.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: The first `len` slots are live and the pointer is non-null and aligned even
        // if there is no block.
        unsafe { slice::from_raw_parts(self.storage.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    #[must_use]
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;

        // SAFETY: The first `len` slots are live and we hold an exclusive reference to them.
        unsafe { slice::from_raw_parts_mut(self.storage.as_mut_ptr(), len) }
    }

    /// Ensures the vector can hold at least `new_capacity` elements without reallocating.
    ///
    /// If the current capacity is already sufficient, nothing happens: no allocation takes place
    /// and no element moves. Otherwise a block of exactly `new_capacity` slots is allocated and
    /// every element is relocated into it.
    ///
    /// # Panics
    ///
    /// Panics if the new block size overflows the address space. Allocator failure is reported
    /// via [`std::alloc::handle_alloc_error()`].
    pub fn reserve(&mut self, new_capacity: usize) {
        if self.capacity() >= new_capacity {
            return;
        }

        self.adopt(RawStorage::allocate(new_capacity));
    }

    /// Fallible version of [`reserve()`][Self::reserve].
    ///
    /// # Errors
    ///
    /// Returns an error if the new block cannot be allocated. The vector is left untouched.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<()> {
        if self.capacity() >= new_capacity {
            return Ok(());
        }

        self.adopt(RawStorage::try_allocate(new_capacity)?);
        Ok(())
    }

    /// Changes the number of elements to `new_len`.
    ///
    /// Shrinking drops the elements at `new_len..len()`. Growing first reserves exactly
    /// `new_len` slots and then appends default-constructed elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use raw_vector::Vector;
    ///
    /// let mut vector: Vector<u32> = [1, 2, 3, 4].into_iter().collect();
    ///
    /// vector.resize(2);
    /// assert_eq!(vector.as_slice(), [1, 2]);
    ///
    /// vector.resize(4);
    /// assert_eq!(vector.as_slice(), [1, 2, 0, 0]);
    /// ```
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        let Some(missing) = new_len.checked_sub(self.len) else {
            self.drop_tail(new_len);
            return;
        };

        self.reserve(new_len);
        self.construct_tail(iter::repeat_with(T::default).take(missing));
    }

    /// Appends `value` to the end of the vector.
    pub fn push_back(&mut self, value: T) {
        self.emplace_back(|| value);
    }

    /// Appends the value returned by `make` to the end of the vector and returns a reference
    /// to it.
    ///
    /// The value returned by `make` is written into the slot after the last element. If the
    /// vector is full, the larger block is allocated before `make` is called. If `make` panics,
    /// the vector is unchanged.
    pub fn emplace_back(&mut self, make: impl FnOnce() -> T) -> &mut T {
        let index = self.len;
        self.emplace(index, make)
    }

    /// Inserts the value returned by `make` at `index`, shifting all later elements one slot
    /// towards the end, and returns a reference to the inserted element.
    ///
    /// If `make` panics, the vector is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn emplace(&mut self, index: usize, make: impl FnOnce() -> T) -> &mut T {
        assert!(
            index <= self.len,
            "insertion index {index} out of bounds for length {} in vector of {}",
            self.len,
            type_name::<T>()
        );

        if self.len < self.capacity() {
            self.emplace_within_capacity(index, make);
        } else {
            self.emplace_reallocating(index, make);
        }

        self.as_mut_slice()
            .get_mut(index)
            .expect("we just inserted an element at this index")
    }

    /// Inserts `value` at `index`, shifting all later elements one slot towards the end.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.emplace(index, || value)
    }

    /// Inserts a clone of `value` at `index`, shifting all later elements one slot towards the
    /// end.
    ///
    /// The clone is made by [`emplace()`][Self::emplace], so if cloning panics the vector is
    /// unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert_cloned(&mut self, index: usize, value: &T) -> &mut T
    where
        T: Clone,
    {
        self.emplace(index, || value.clone())
    }

    /// Drops the element at `index` and shifts all later elements one slot towards the start.
    ///
    /// Returns the position of the element that followed the erased one, which is `index`
    /// itself (equal to `len()` if the last element was erased). The capacity is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn erase(&mut self, index: usize) -> usize {
        assert!(
            index < self.len,
            "erase index {index} out of bounds for length {} in vector of {}",
            self.len,
            type_name::<T>()
        );

        // SAFETY: The slot is live (guarded by the bounds check). We take ownership of the value
        // so its slot can be overwritten by the shift below.
        let erased = unsafe { self.storage.read(index) };

        let next = index.checked_add(1).expect("guarded by index < len");
        let following = self.len.checked_sub(next).expect("guarded by index < len");

        let source = self.storage.slot(next);
        let destination = self.storage.slot(index);

        // SAFETY: Both ranges are within the live prefix of the block. `ptr::copy` permits the
        // overlap between them.
        unsafe {
            ptr::copy(source.as_ptr(), destination.as_ptr(), following);
        }

        self.len = self.len.checked_sub(1).expect("guarded by index < len");

        // Only dropped once the vector is consistent again, so a panicking destructor cannot
        // leave a hole in the live prefix.
        drop(erased);

        index
    }

    /// Drops the last element.
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty.
    pub fn pop_back(&mut self) {
        let Some(new_len) = self.len.checked_sub(1) else {
            panic!("pop_back() on an empty vector of {}", type_name::<T>());
        };

        self.drop_tail(new_len);
    }

    /// The last element.
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty.
    #[must_use]
    pub fn back(&self) -> &T {
        let Some(last) = self.as_slice().last() else {
            panic!("back() on an empty vector of {}", type_name::<T>());
        };

        last
    }

    /// The last element, mutably.
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty.
    #[must_use]
    pub fn back_mut(&mut self) -> &mut T {
        let Some(last) = self.as_mut_slice().last_mut() else {
            panic!("back_mut() on an empty vector of {}", type_name::<T>());
        };

        last
    }

    /// Exchanges the elements and storage of two vectors in O(1), without allocating.
    ///
    /// Each vector keeps its own drop policy.
    pub fn swap_with(&mut self, other: &mut Self) {
        self.storage.swap(&mut other.storage);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Drops every element. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.drop_tail(0);
    }

    fn emplace_within_capacity(&mut self, index: usize, make: impl FnOnce() -> T) {
        // The value is complete before any existing element moves.
        let value = make();

        if index == self.len {
            // SAFETY: `len < capacity` so the slot after the last element exists and is free.
            unsafe {
                self.storage.write(index, value);
            }
        } else {
            let following = self.len.checked_sub(index).expect("guarded by index < len");
            let destination_index = index
                .checked_add(1)
                .expect("guarded by index < len < capacity");

            let source = self.storage.slot(index);
            let destination = self.storage.slot(destination_index);

            // SAFETY: `len < capacity` so the shifted range ends within the block. `ptr::copy`
            // permits the overlap between source and destination.
            unsafe {
                ptr::copy(source.as_ptr(), destination.as_ptr(), following);
            }

            // SAFETY: The slot's previous value was relocated one slot further by the shift
            // above, so it is logically uninitialized.
            unsafe {
                self.storage.write(index, value);
            }
        }

        self.len = self
            .len
            .checked_add(1)
            .expect("guarded by len < capacity");
    }

    fn emplace_reallocating(&mut self, index: usize, make: impl FnOnce() -> T) {
        let new_capacity = if self.len == 0 {
            1
        } else {
            self.len.checked_mul(2).unwrap_or_else(|| {
                panic!(
                    "capacity overflow: cannot double length {} in vector of {}",
                    self.len,
                    type_name::<T>()
                )
            })
        };

        let mut new_storage = RawStorage::allocate(new_capacity);

        // If `make` panics, only the new (still empty) block is released and the current one
        // has not been touched.
        let value = make();

        // SAFETY: The new block is entirely uninitialized and `index <= len < new_capacity`.
        unsafe {
            new_storage.write(index, value);
        }

        trace!(
            old_capacity = self.capacity(),
            new_capacity,
            len = self.len,
            index,
            element_type = type_name::<T>(),
            "growing vector storage for insertion"
        );

        let after_index = index.checked_add(1).expect("guarded by index <= len");
        let suffix_len = self.len.checked_sub(index).expect("guarded by index <= len");

        // SAFETY: Slots `0..index` of the old block are live and the same slots of the new block
        // are free.
        unsafe {
            relocate(&self.storage, 0, &mut new_storage, 0, index);
        }

        // SAFETY: Slots `index..len` of the old block are live and slots `index + 1..len + 1` of
        // the new block are free.
        unsafe {
            relocate(&self.storage, index, &mut new_storage, after_index, suffix_len);
        }

        // The old block is left in `new_storage` and only holds relocated (logically
        // uninitialized) slots, so dropping it merely releases the memory.
        self.storage.swap(&mut new_storage);

        self.len = self
            .len
            .checked_add(1)
            .expect("guarded by successful allocation of len + 1 slots");
    }

    /// Relocates every element into `new_storage` and adopts it, releasing the old block.
    fn adopt(&mut self, mut new_storage: RawStorage<T>) {
        debug_assert!(new_storage.capacity() >= self.len);

        trace!(
            old_capacity = self.capacity(),
            new_capacity = new_storage.capacity(),
            len = self.len,
            element_type = type_name::<T>(),
            "relocating vector storage"
        );

        // SAFETY: The first `len` slots of the current block are live and the new block is
        // entirely uninitialized, with room for at least `len` elements.
        unsafe {
            relocate(&self.storage, 0, &mut new_storage, 0, self.len);
        }

        self.storage.swap(&mut new_storage);
    }

    /// Constructs elements after the current last element, extending the live prefix.
    ///
    /// If constructing any value panics, the elements constructed by this call are dropped and
    /// the length is unchanged.
    fn construct_tail(&mut self, values: impl IntoIterator<Item = T>) {
        let first = self.storage.slot(self.len);

        // SAFETY: Slots from `len` onwards are uninitialized. Callers only pass as many values
        // as there are spare slots.
        let constructed = unsafe { construct_in_place(first, values) };

        self.len = self
            .len
            .checked_add(constructed)
            .expect("constructed elements fit in the block so the sum fits in usize");

        debug_assert!(self.len <= self.capacity());
    }

    /// Drops the elements at `new_len..len`. Does nothing if `new_len >= len`.
    fn drop_tail(&mut self, new_len: usize) {
        let old_len = self.len;

        if new_len >= old_len {
            return;
        }

        // Length first so that a panicking destructor cannot cause a second drop of the tail.
        self.len = new_len;

        // SAFETY: Slots `new_len..old_len` were live and are no longer part of the live prefix.
        unsafe {
            self.storage.drop_in_place(new_len..old_len);
        }
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Vector<T> {
    fn drop(&mut self) {
        let was_empty = self.is_empty();

        self.drop_tail(0);

        // The storage releases its block after this, as a regular field drop.

        // If we are already panicking, we do not want to panic again because that will
        // simply obscure whatever the original panic was, leading to debug difficulties.
        if self.drop_policy == DropPolicy::MustNotDropItems && !thread::panicking() {
            assert!(
                was_empty,
                "dropped a non-empty vector of {} with a policy that says it must be empty when dropped",
                type_name::<T>()
            );
        }
    }
}

impl<T: Clone> Clone for Vector<T> {
    /// Clones every element into a new block sized exactly to the current length.
    ///
    /// If cloning any element panics, the clones made so far are dropped, the new block is
    /// released and `self` is unaffected.
    fn clone(&self) -> Self {
        let mut copy = Self::from_parts(RawStorage::allocate(self.len), self.drop_policy);
        copy.construct_tail(self.iter().cloned());
        copy
    }

    /// Makes `self` equal to `source`, reusing the existing block when it is large enough.
    ///
    /// If `source` does not fit, a full clone is made first and then swapped in, so a panicking
    /// `clone()` leaves `self` untouched. Otherwise the common prefix is assigned element-wise
    /// via [`Clone::clone_from()`], surplus elements are dropped and missing ones are cloned in.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            let mut copy = source.clone();
            self.swap_with(&mut copy);

            // `copy` now holds our previous elements. It carries the source's drop policy, which
            // must not apply to elements it never owned.
            copy.clear();
            return;
        }

        for (target, item) in self.iter_mut().zip(source.iter()) {
            target.clone_from(item);
        }

        match source.len.cmp(&self.len) {
            Ordering::Less => self.drop_tail(source.len),
            Ordering::Greater => {
                let missing = source
                    .as_slice()
                    .get(self.len..)
                    .expect("guarded by source.len > self.len");

                self.construct_tail(missing.iter().cloned());
            }
            Ordering::Equal => {}
        }
    }
}

impl<T> Deref for Vector<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Vector<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        let len = self.len;

        self.as_slice().get(index).unwrap_or_else(|| {
            panic!(
                "index {index} out of bounds for length {len} in vector of {}",
                type_name::<T>()
            )
        })
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;

        self.as_mut_slice().get_mut(index).unwrap_or_else(|| {
            panic!(
                "index {index} out of bounds for length {len} in vector of {}",
                type_name::<T>()
            )
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Vector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for Vector<T> {}

impl<T> Extend<T> for Vector<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vector = Self::new();
        vector.extend(iter);
        vector
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Vector<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
