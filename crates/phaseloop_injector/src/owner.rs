//! Weak owner handles.
//!
//! The registry never keeps an owner alive. It holds an [`OwnerHandle`]: a
//! weak reference plus a liveness probe. The probe is chosen by whoever
//! creates the handle:
//!
//! - [`OwnerHandle::new`]: live while any strong reference exists.
//! - [`OwnerHandle::tracked`]: additionally asks the owner through
//!   [`Lifecycle::is_alive`]. Use this for wrappers around host objects
//!   that can be destroyed while still referenced.
//! - [`OwnerHandle::from_handle`]: any host-supplied [`WeakHandle`].

use core::fmt;
use std::sync::{Arc, Weak};

use serde::Serialize;

/// Identity of an owner, used as the registry key.
///
/// Derived from the address of the owner's allocation. Stable while the
/// owner is alive; an address may be reused after the owner is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OwnerId(usize);

impl OwnerId {
    /// Returns the identity of the value behind `owner`.
    #[must_use]
    pub fn of<T: ?Sized>(owner: &Arc<T>) -> Self {
        Self(Arc::as_ptr(owner).cast::<()>().addr())
    }

    /// Creates an identity from a raw value, for host-supplied handles.
    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl<T: ?Sized> From<&Arc<T>> for OwnerId {
    fn from(owner: &Arc<T>) -> Self {
        OwnerId::of(owner)
    }
}

impl From<&OwnerHandle> for OwnerId {
    fn from(handle: &OwnerHandle) -> Self {
        handle.id()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A non-owning reference to an owner with a liveness probe.
pub trait WeakHandle: Send + Sync + 'static {
    /// Returns true while the owner may still receive callbacks.
    fn is_alive(&self) -> bool;

    /// Returns the owner's identity.
    ///
    /// Called while the registry is locked; must not call back into the
    /// injector.
    fn owner_id(&self) -> OwnerId;

    /// Returns the owner's type name, for introspection.
    fn type_name(&self) -> &'static str;
}

/// Owners with their own notion of being alive.
///
/// An object can be destroyed by its host while Rust references to it remain;
/// such owners report `false` here and are treated as gone.
pub trait Lifecycle: Send + Sync + 'static {
    /// Returns false once the owner has been destroyed.
    fn is_alive(&self) -> bool;
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle implementations
// ─────────────────────────────────────────────────────────────────────────────

struct ArcHandle<T: ?Sized> {
    weak: Weak<T>,
    id: OwnerId,
}

impl<T: ?Sized + Send + Sync + 'static> WeakHandle for ArcHandle<T> {
    fn is_alive(&self) -> bool {
        self.weak.strong_count() > 0
    }

    fn owner_id(&self) -> OwnerId {
        self.id
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }
}

struct ProbedHandle<T: ?Sized> {
    weak: Weak<T>,
    probe: fn(&T) -> bool,
    id: OwnerId,
}

impl<T: ?Sized + Send + Sync + 'static> WeakHandle for ProbedHandle<T> {
    fn is_alive(&self) -> bool {
        self.weak.upgrade().is_some_and(|owner| (self.probe)(&owner))
    }

    fn owner_id(&self) -> OwnerId {
        self.id
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OwnerHandle
// ─────────────────────────────────────────────────────────────────────────────

/// Shared, type-erased [`WeakHandle`].
#[derive(Clone)]
pub struct OwnerHandle(Arc<dyn WeakHandle>);

impl OwnerHandle {
    /// Handle that is live while `owner` has strong references.
    #[must_use]
    pub fn new<T: ?Sized + Send + Sync + 'static>(owner: &Arc<T>) -> Self {
        Self(Arc::new(ArcHandle {
            weak: Arc::downgrade(owner),
            id: OwnerId::of(owner),
        }))
    }

    /// Handle that also consults [`Lifecycle::is_alive`].
    #[must_use]
    pub fn tracked<T: Lifecycle>(owner: &Arc<T>) -> Self {
        Self::probed(owner, T::is_alive)
    }

    /// Handle that is live while `owner` has strong references and `probe`
    /// returns true.
    #[must_use]
    pub fn probed<T: ?Sized + Send + Sync + 'static>(
        owner: &Arc<T>,
        probe: fn(&T) -> bool,
    ) -> Self {
        Self(Arc::new(ProbedHandle {
            weak: Arc::downgrade(owner),
            probe,
            id: OwnerId::of(owner),
        }))
    }

    /// Wraps a host-supplied handle.
    #[must_use]
    pub fn from_handle(handle: impl WeakHandle) -> Self {
        Self(Arc::new(handle))
    }

    /// Returns the owner's identity.
    #[must_use]
    pub fn id(&self) -> OwnerId {
        self.0.owner_id()
    }

    /// Returns true while the owner is live.
    ///
    /// May run host code. The injector only calls this with no lock held.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.is_alive()
    }

    /// Returns true if both handles are clones of one another.
    #[must_use]
    pub fn same_as(&self, other: &OwnerHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the owner's type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

impl<T: ?Sized + Send + Sync + 'static> From<&Arc<T>> for OwnerHandle {
    fn from(owner: &Arc<T>) -> Self {
        OwnerHandle::new(owner)
    }
}

impl fmt::Debug for OwnerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerHandle")
            .field("id", &self.id())
            .field("type_name", &self.type_name())
            .field("alive", &self.is_alive())
            .finish()
    }
}
