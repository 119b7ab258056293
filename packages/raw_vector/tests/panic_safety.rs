//! Panic safety tests for the `raw_vector` package.
//!
//! Element types in these tests panic from `Clone` or `Default` after a configurable number of
//! successful calls. Every test verifies that the vector is left in the documented state and
//! that the number of live instances matches what the vector holds (no leaks, no double drops).

use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use raw_vector::Vector;

/// Shared bookkeeping for a family of `Fragile` instances.
#[derive(Debug, Default)]
struct Budget {
    /// How many more clones/defaults may succeed before the next one panics.
    remaining: Cell<usize>,

    /// Number of instances currently alive.
    live: Cell<i64>,
}

impl Budget {
    fn new(remaining: usize) -> Rc<Self> {
        Rc::new(Self {
            remaining: Cell::new(remaining),
            live: Cell::new(0),
        })
    }

    fn spend(&self) {
        let Some(remaining) = self.remaining.get().checked_sub(1) else {
            panic!("budget exhausted");
        };

        self.remaining.set(remaining);
    }
}

#[derive(Debug)]
struct Fragile {
    value: u32,
    budget: Rc<Budget>,
}

impl Fragile {
    fn new(value: u32, budget: &Rc<Budget>) -> Self {
        budget.live.set(budget.live.get().checked_add(1).unwrap());

        Self {
            value,
            budget: Rc::clone(budget),
        }
    }
}

impl Clone for Fragile {
    fn clone(&self) -> Self {
        self.budget.spend();
        Self::new(self.value, &self.budget)
    }
}

impl Drop for Fragile {
    fn drop(&mut self) {
        self.budget
            .live
            .set(self.budget.live.get().checked_sub(1).unwrap());
    }
}

fn filled(budget: &Rc<Budget>, values: impl IntoIterator<Item = u32>) -> Vector<Fragile> {
    let mut vector = Vector::new();
    for value in values {
        vector.push_back(Fragile::new(value, budget));
    }
    vector
}

fn values(vector: &Vector<Fragile>) -> Vec<u32> {
    vector.iter().map(|item| item.value).collect()
}

#[test]
fn clone_panic_leaves_original_and_leaks_nothing() {
    let budget = Budget::new(3);
    let original = filled(&budget, 1..=5);

    let result = catch_unwind(AssertUnwindSafe(|| original.clone()));

    assert!(result.is_err());
    assert_eq!(values(&original), [1, 2, 3, 4, 5]);
    assert_eq!(budget.live.get(), 5);
}

#[test]
fn reallocating_insert_with_panicking_clone_is_strong() {
    let budget = Budget::new(0);
    let mut vector = filled(&budget, 1..=4);
    assert_eq!(vector.len(), vector.capacity());

    let capacity = vector.capacity();
    let ptr = vector.as_ptr();
    let probe = Fragile::new(99, &budget);

    let result = catch_unwind(AssertUnwindSafe(|| {
        vector.insert_cloned(1, &probe);
    }));

    assert!(result.is_err());
    assert_eq!(values(&vector), [1, 2, 3, 4]);
    assert_eq!(vector.capacity(), capacity);
    assert_eq!(vector.as_ptr(), ptr);
    assert_eq!(budget.live.get(), 5);

    // The vector remains fully usable afterwards.
    budget.remaining.set(1);
    vector.insert_cloned(1, &probe);
    assert_eq!(values(&vector), [1, 99, 2, 3, 4]);
    assert_eq!(budget.live.get(), 6);
}

#[test]
fn reallocating_push_with_panicking_constructor_is_strong() {
    let budget = Budget::new(0);
    let mut vector = filled(&budget, 1..=2);
    let ptr = vector.as_ptr();

    let result = catch_unwind(AssertUnwindSafe(|| {
        vector.emplace_back(|| panic!("constructor failed"));
    }));

    assert!(result.is_err());
    assert_eq!(values(&vector), [1, 2]);
    assert_eq!(vector.capacity(), 2);
    assert_eq!(vector.as_ptr(), ptr);
    assert_eq!(budget.live.get(), 2);
}

#[test]
fn middle_insert_within_capacity_with_panicking_clone_is_untouched() {
    let budget = Budget::new(0);
    let mut vector = filled(&budget, 1..=3);
    assert!(vector.len() < vector.capacity());

    let probe = Fragile::new(99, &budget);

    let result = catch_unwind(AssertUnwindSafe(|| {
        vector.insert_cloned(1, &probe);
    }));

    // The value is built before any element is shifted, so nothing has moved.
    assert!(result.is_err());
    assert_eq!(values(&vector), [1, 2, 3]);
    assert_eq!(budget.live.get(), 4);
}

#[test]
fn clone_from_panic_in_tail_keeps_length() {
    let budget = Budget::new(usize::MAX);
    let source = filled(&budget, 1..=5);

    let mut target = Vector::with_capacity(8);
    target.push_back(Fragile::new(100, &budget));

    // One clone for the common prefix, one for the first tail element, then the panic.
    budget.remaining.set(2);

    let result = catch_unwind(AssertUnwindSafe(|| {
        target.clone_from(&source);
    }));

    assert!(result.is_err());
    assert_eq!(values(&target), [1]);
    assert_eq!(target.capacity(), 8);
    assert_eq!(budget.live.get(), 6);
}

#[test]
fn clone_from_panic_when_reallocating_leaves_target() {
    let budget = Budget::new(usize::MAX);
    let source = filled(&budget, 1..=5);
    let mut target = filled(&budget, 7..=8);
    let ptr = target.as_ptr();

    budget.remaining.set(2);

    let result = catch_unwind(AssertUnwindSafe(|| {
        target.clone_from(&source);
    }));

    assert!(result.is_err());
    assert_eq!(values(&target), [7, 8]);
    assert_eq!(target.as_ptr(), ptr);
    assert_eq!(budget.live.get(), 7);
}

/// Panics from `Default` once a thread-local budget runs out.
#[derive(Debug)]
struct FragileDefault;

thread_local! {
    static DEFAULTS_REMAINING: Cell<usize> = const { Cell::new(0) };
    static DEFAULTS_LIVE: Cell<i64> = const { Cell::new(0) };
}

impl Default for FragileDefault {
    fn default() -> Self {
        let remaining = DEFAULTS_REMAINING.get();
        assert!(remaining > 0, "default budget exhausted");
        DEFAULTS_REMAINING.set(remaining.checked_sub(1).unwrap());
        DEFAULTS_LIVE.set(DEFAULTS_LIVE.get().checked_add(1).unwrap());
        Self
    }
}

impl Drop for FragileDefault {
    fn drop(&mut self) {
        DEFAULTS_LIVE.set(DEFAULTS_LIVE.get().checked_sub(1).unwrap());
    }
}

#[test]
fn resize_panic_keeps_length_and_leaks_nothing() {
    DEFAULTS_REMAINING.set(2);
    let mut vector = Vector::<FragileDefault>::with_len(2);
    assert_eq!(DEFAULTS_LIVE.get(), 2);

    DEFAULTS_REMAINING.set(3);

    let result = catch_unwind(AssertUnwindSafe(|| {
        vector.resize(10);
    }));

    assert!(result.is_err());
    assert_eq!(vector.len(), 2);
    assert_eq!(DEFAULTS_LIVE.get(), 2);

    drop(vector);
    assert_eq!(DEFAULTS_LIVE.get(), 0);
}

#[test]
fn with_len_panic_leaks_nothing() {
    DEFAULTS_REMAINING.set(4);

    let result = catch_unwind(|| Vector::<FragileDefault>::with_len(6));

    assert!(result.is_err());
    assert_eq!(DEFAULTS_LIVE.get(), 0);
}

#[test]
fn panicking_destructor_on_erase_keeps_vector_consistent() {
    struct Explosive {
        value: u32,
        armed: bool,
    }

    impl Drop for Explosive {
        fn drop(&mut self) {
            assert!(!self.armed, "explosive element dropped");
        }
    }

    let mut vector = Vector::new();
    for (value, armed) in [(1, false), (2, true), (3, false)] {
        vector.push_back(Explosive { value, armed });
    }

    let result = catch_unwind(AssertUnwindSafe(|| {
        vector.erase(1);
    }));

    assert!(result.is_err());
    assert_eq!(vector.len(), 2);
    assert_eq!(
        vector.iter().map(|item| item.value).collect::<Vec<_>>(),
        [1, 3]
    );
}
