use std::fmt::Debug;

/// A type which can be stored under a `Key`.
///
/// Values are handed out by clone; the store never lends
/// references into its storage.
pub trait Value: Clone + Debug + Send + Sync + 'static {}
impl<T> Value for T where T: Clone + Debug + Send + Sync + 'static {}
