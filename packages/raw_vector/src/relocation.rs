use std::ptr::{self, NonNull};

use scopeguard::ScopeGuard;

use crate::RawStorage;

/// Moves `count` live values from `source` (starting at slot `from`) into the uninitialized
/// slots of `destination` (starting at slot `to`).
///
/// Every relocation between blocks goes through here. Whether a relocation may move values or
/// must copy them depends on whether moving can fail midway: a failed move would leave both the
/// old and the new block partially populated. Moving a value in Rust is a bitwise copy that can
/// neither fail nor unwind, so the move strategy is always available and always chosen. The old
/// block is never observed in a partially relocated state and there is no copy fallback.
///
/// After the call, the source slots are logically uninitialized and must not be dropped.
///
/// # Panics
///
/// Panics if either slot range extends beyond its block's capacity.
///
/// # Safety
///
/// The source slots must hold live values and the destination slots must be uninitialized.
pub(crate) unsafe fn relocate<T>(
    source: &RawStorage<T>,
    from: usize,
    destination: &mut RawStorage<T>,
    to: usize,
    count: usize,
) {
    let source_end = from
        .checked_add(count)
        .expect("relocated range cannot exceed the address space");
    let destination_end = to
        .checked_add(count)
        .expect("relocated range cannot exceed the address space");

    // The slot lookups assert that both ranges are within capacity.
    _ = source.slot(source_end);
    _ = destination.slot(destination_end);

    let source_first = source.slot(from);
    let destination_first = destination.slot(to);

    // SAFETY: Both ranges are within their blocks (checked above) and the blocks are distinct
    // because two storages never share a block. The caller guarantees the source slots are
    // live and the destination slots are free.
    unsafe {
        ptr::copy_nonoverlapping(
            source_first.as_ptr(),
            destination_first.as_ptr(),
            count,
        );
    }
}

/// Writes every value produced by `values` into consecutive slots starting at `first` and
/// returns how many values were written.
///
/// Producing a value may panic (e.g. a panicking `Clone` or `Default`). In that case the values
/// already written by this call are dropped before the panic continues, so the slots are left
/// exactly as uninitialized as they were before the call.
///
/// # Safety
///
/// The slots must be uninitialized and there must be room for every produced value.
pub(crate) unsafe fn construct_in_place<T, I>(first: NonNull<T>, values: I) -> usize
where
    I: IntoIterator<Item = T>,
{
    let mut written = scopeguard::guard(0_usize, |written| {
        // SAFETY: Exactly `written` consecutive slots starting at `first` were initialized by
        // the loop below and nothing else refers to them yet.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first.as_ptr(), written));
        }
    });

    for value in values {
        // SAFETY: The caller guarantees there is room for every produced value.
        let slot = unsafe { first.add(*written) };

        // SAFETY: The slot is uninitialized (caller guarantee) and within the block.
        unsafe {
            slot.write(value);
        }

        *written = written
            .checked_add(1)
            .expect("cannot write more values than fit in the address space");
    }

    ScopeGuard::into_inner(written)
}
