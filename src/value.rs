//! External values: everything that crosses the bridge into an implementation.

use core::fmt;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Size of an encoded field element or 256-bit integer.
pub const FIELD_BYTES: usize = 32;

/// Little-endian encoding of a field element or 256-bit integer.
pub type FieldBytes = [u8; FIELD_BYTES];

/// Affine curve point as laid out on the bridge.
///
/// When `infinity` is set, `x` and `y` carry no meaning.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AffineRepr {
    /// Encoded `x` coordinate.
    pub x: FieldBytes,
    /// Encoded `y` coordinate.
    pub y: FieldBytes,
    /// Whether this is the point at infinity.
    pub infinity: bool,
}

/// Jacobian curve point as laid out on the bridge.
///
/// Opaque to callers: the only way to create or inspect one from outside an
/// implementation is through that implementation's `of_affine`/`to_affine`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProjectiveRepr {
    x: FieldBytes,
    y: FieldBytes,
    z: FieldBytes,
}

impl ProjectiveRepr {
    pub(crate) const fn from_coordinates(x: FieldBytes, y: FieldBytes, z: FieldBytes) -> Self {
        Self { x, y, z }
    }

    pub(crate) const fn coordinates(&self) -> (&FieldBytes, &FieldBytes, &FieldBytes) {
        (&self.x, &self.y, &self.z)
    }
}

/// Handle counts of one [`ResourceTracker`] at a point in time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ResourceCounts {
    /// Handles created.
    pub acquired: usize,
    /// Handles explicitly released.
    pub released: usize,
    /// Handles dropped without being released.
    pub leaked: usize,
}

impl ResourceCounts {
    /// Handles neither released nor leaked yet.
    pub const fn live(&self) -> usize {
        self.acquired
            .saturating_sub(self.released)
            .saturating_sub(self.leaked)
    }

    /// Counts accumulated since `earlier`.
    pub const fn since(&self, earlier: &Self) -> Self {
        Self {
            acquired: self.acquired.saturating_sub(earlier.acquired),
            released: self.released.saturating_sub(earlier.released),
            leaked: self.leaked.saturating_sub(earlier.leaked),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    acquired: AtomicUsize,
    released: AtomicUsize,
    leaked: AtomicUsize,
}

/// Shared bookkeeping of the [`Foreign`] handles one implementation hands out.
#[derive(Clone, Debug, Default)]
pub struct ResourceTracker {
    counters: Arc<Counters>,
}

impl ResourceTracker {
    /// Create a tracker with all counts at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counts.
    pub fn counts(&self) -> ResourceCounts {
        ResourceCounts {
            acquired: self.counters.acquired.load(Ordering::Relaxed),
            released: self.counters.released.load(Ordering::Relaxed),
            leaked: self.counters.leaked.load(Ordering::Relaxed),
        }
    }

    /// Number of handles currently alive.
    pub fn live(&self) -> usize {
        self.counts().live()
    }
}

/// An owned handle to an implementation-side structure.
///
/// Must be given back with [`Foreign::release`] exactly once. Releasing
/// consumes the handle, so a second release does not typecheck; a handle that
/// is dropped instead is counted as leaked by its tracker.
pub struct Foreign<T> {
    value: T,
    tracker: ResourceTracker,
    released: bool,
}

impl<T> Foreign<T> {
    /// Acquire a handle wrapping `value`, accounted to `tracker`.
    pub fn new(value: T, tracker: &ResourceTracker) -> Self {
        tracker.counters.acquired.fetch_add(1, Ordering::Relaxed);
        Self {
            value,
            tracker: tracker.clone(),
            released: false,
        }
    }

    /// Borrow the structure behind the handle.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutably borrow the structure behind the handle.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Release the handle.
    pub fn release(mut self) {
        self.released = true;
        self.tracker
            .counters
            .released
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Read the structure, then release the handle.
    pub fn release_after<R>(self, f: impl FnOnce(&T) -> R) -> R {
        let out = f(&self.value);
        self.release();
        out
    }
}

impl<T> Drop for Foreign<T> {
    fn drop(&mut self) {
        if !self.released {
            self.tracker.counters.leaked.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                handle = core::any::type_name::<T>(),
                "foreign handle dropped without release"
            );
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Foreign<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Foreign").field(&self.value).finish()
    }
}

/// A value in the representation both implementations accept.
#[derive(Debug)]
pub enum Value {
    /// No value.
    Unit,
    /// Native integer.
    Int(i64),
    /// Boolean.
    Bool(bool),
    /// Byte buffer: raw bytes, or a little-endian field element/integer.
    Bytes(Vec<u8>),
    /// UTF-8 string.
    Str(String),
    /// Optional value.
    Option(Option<Box<Value>>),
    /// Owned handle to an affine point.
    Affine(Foreign<AffineRepr>),
    /// Owned handle to a projective point.
    Projective(Foreign<ProjectiveRepr>),
}

impl Value {
    /// Present optional value.
    pub fn some(value: Value) -> Self {
        Self::Option(Some(Box::new(value)))
    }

    /// Absent optional value.
    pub const fn none() -> Self {
        Self::Option(None)
    }

    /// Name of this value's variant, for messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Bytes(_) => "bytes",
            Self::Str(_) => "string",
            Self::Option(_) => "option",
            Self::Affine(_) => "affine point",
            Self::Projective(_) => "projective point",
        }
    }

    /// Does this value (or a value nested in it) own a foreign handle?
    pub fn owns_foreign(&self) -> bool {
        match self {
            Self::Affine(_) | Self::Projective(_) => true,
            Self::Option(Some(inner)) => inner.owns_foreign(),
            _ => false,
        }
    }

    /// Release every handle owned by this value.
    pub fn release(self) {
        match self {
            Self::Affine(handle) => handle.release(),
            Self::Projective(handle) => handle.release(),
            Self::Option(Some(inner)) => inner.release(),
            Self::Unit
            | Self::Int(_)
            | Self::Bool(_)
            | Self::Bytes(_)
            | Self::Str(_)
            | Self::Option(None) => {}
        }
    }
}

/// Release every value in `values`.
pub fn release_all(values: impl IntoIterator<Item = Value>) {
    for value in values {
        value.release();
    }
}

#[cfg(test)]
mod tests {
    use super::{AffineRepr, Foreign, ResourceTracker, Value};

    #[test]
    fn release_is_counted_once() {
        let tracker = ResourceTracker::new();
        let handle = Foreign::new(AffineRepr::default(), &tracker);
        assert_eq!(tracker.live(), 1);
        handle.release();

        let counts = tracker.counts();
        assert_eq!(counts.acquired, 1);
        assert_eq!(counts.released, 1);
        assert_eq!(counts.leaked, 0);
        assert_eq!(counts.live(), 0);
    }

    #[test]
    fn dropped_handle_is_leaked() {
        let tracker = ResourceTracker::new();
        drop(Foreign::new(AffineRepr::default(), &tracker));
        assert_eq!(tracker.counts().leaked, 1);
        assert_eq!(tracker.live(), 0);
    }

    #[test]
    fn option_releases_innermost_handle() {
        let tracker = ResourceTracker::new();
        let value = Value::some(Value::some(Value::Affine(Foreign::new(
            AffineRepr::default(),
            &tracker,
        ))));
        assert!(value.owns_foreign());
        value.release();

        let counts = tracker.counts();
        assert_eq!(counts.released, 1);
        assert_eq!(counts.leaked, 0);
    }
}
