#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A contiguous growable vector built directly on manually managed raw memory.
//!
//! The crate is split into two layers:
//!
//! * [`RawStorage<T>`] owns a fixed-capacity block of uninitialized memory with room for some
//!   number of `T`. It never constructs or drops values and exposes only low-level, `unsafe`
//!   primitives for placing values into slots and taking them out again.
//! * [`Vector<T>`] owns exactly one storage block plus a count of live elements. It decides when
//!   elements are constructed and dropped and when the block must be replaced by a larger one.
//!
//! # Key Features
//!
//! - **Value semantics**: [`Clone`] produces an independent vector sized exactly to its length,
//!   moving a vector is O(1) and [`std::mem::take()`] leaves an empty vector behind
//! - **Amortized O(1) append**: capacity doubles whenever an insertion finds the block full
//! - **Panic safety**: reallocating operations leave the vector exactly as it was if an element
//!   constructor panics; no element is ever leaked or dropped twice
//! - **Explicit construction**: [`Vector::emplace()`] and [`Vector::emplace_back()`] construct
//!   elements from a closure, directly in their final slot where possible
//! - **Fallible allocation**: [`Vector::try_reserve()`] and [`RawStorage::try_allocate()`] report
//!   allocation failure as an [`Error`] instead of terminating the process
//!
//! # Examples
//!
//! ```
//! use raw_vector::Vector;
//!
//! let mut words = Vector::new();
//! words.push_back("raw".to_string());
//! words.push_back("vector".to_string());
//! assert_eq!(words.capacity(), 2);
//!
//! words.emplace(1, || "growable".to_string());
//! assert_eq!(words.as_slice(), ["raw", "growable", "vector"]);
//! assert_eq!(words.capacity(), 4);
//!
//! let copy = words.clone();
//! words.erase(0);
//!
//! assert_eq!(words.as_slice(), ["growable", "vector"]);
//! assert_eq!(copy.as_slice(), ["raw", "growable", "vector"]);
//! ```
//!
//! Working with the raw storage directly:
//!
//! ```
//! use raw_vector::RawStorage;
//!
//! let mut storage = RawStorage::<u64>::allocate(4);
//!
//! for index in 0..4 {
//!     // SAFETY: Every slot is within capacity and uninitialized.
//!     unsafe { storage.write(index, 10 * index as u64) };
//! }
//!
//! // SAFETY: Slot 3 holds a live value.
//! assert_eq!(unsafe { storage.read(3) }, 30);
//! ```

mod builder;
mod drop_policy;
mod error;
mod raw_storage;
mod relocation;
mod vector;

pub use builder::*;
pub use drop_policy::*;
pub use error::Error;
pub(crate) use error::Result;
pub use raw_storage::*;
pub(crate) use relocation::*;
pub use vector::*;
