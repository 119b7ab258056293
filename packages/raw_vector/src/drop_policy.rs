/// Determines element dropping behavior when a [`Vector`][crate::Vector] is dropped.
///
/// By default, the vector will drop its elements when it is dropped.
///
/// # Examples
///
/// ```
/// use raw_vector::{DropPolicy, Vector};
///
/// // The drop policy is set at vector creation time.
/// let vector = Vector::<u32>::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The vector will drop its elements when the vector is dropped. This is the default.
    #[default]
    MayDropItems,

    /// The vector will panic if it still contains elements when it is dropped.
    ///
    /// This may be valuable if unsafe code holds pointers into the vector's storage and the
    /// elements must be removed explicitly once those pointers are no longer in use.
    MustNotDropItems,
}
