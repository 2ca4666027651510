//! Identity registry: stable names for primitives across remove/recreate cycles.
//!
//! A surface may hand out a fresh reference every time a primitive is
//! recreated, so history records cannot hold surface references. Instead every
//! primitive gets an [`Identity`] when it is first created. Undo of a removal
//! and redo of a creation rebind the same identity to the new reference with
//! [`IdentityRegistry::restore`]; identities are never reallocated or reused.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::consts::{IDENTITY_PREFIX, SESSION_TAG_LEN};
use crate::surface::Surface;

/// Stable, never-reused key of a primitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Mints identities of the form `obj_<millis>_<counter>_<session>`.
///
/// The counter keeps identities unique under rapid creation within one
/// millisecond; the random session tag keeps peers from colliding.
#[derive(Debug, Clone)]
pub struct IdentityAllocator {
    session: String,
    counter: u64,
}

impl IdentityAllocator {
    /// Allocator with a random session tag.
    #[must_use]
    pub fn new() -> Self {
        let session: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(SESSION_TAG_LEN)
            .collect();
        Self::with_session(session)
    }

    /// Allocator with a fixed session tag.
    pub fn with_session(session: impl Into<String>) -> Self {
        Self { session: session.into(), counter: 0 }
    }

    /// Session tag appended to every identity.
    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Allocate the next identity.
    pub fn next_identity(&mut self) -> Identity {
        self.counter += 1;
        Identity(format!("{IDENTITY_PREFIX}_{}_{}_{}", now_ms(), self.counter, self.session))
    }
}

impl Default for IdentityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
#[allow(clippy::cast_possible_truncation)]
fn now_ms() -> i64 {
    js_sys::Date::now() as i64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

/// Two-way map between identities and surface references.
#[derive(Debug)]
pub struct IdentityRegistry<R> {
    by_identity: HashMap<Identity, R>,
    by_ref: HashMap<R, Identity>,
    allocator: IdentityAllocator,
}

impl<R: Clone + Eq + Hash + fmt::Debug> IdentityRegistry<R> {
    /// Registry with a randomly tagged allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(IdentityAllocator::new())
    }

    #[must_use]
    pub fn with_allocator(allocator: IdentityAllocator) -> Self {
        Self { by_identity: HashMap::new(), by_ref: HashMap::new(), allocator }
    }

    /// Give a newly created primitive its identity.
    ///
    /// Assigning twice to the same reference is a caller bug: it asserts in
    /// debug builds and returns the existing identity otherwise.
    pub fn assign(&mut self, primitive: R) -> Identity {
        debug_assert!(
            !self.by_ref.contains_key(&primitive),
            "identity assigned twice to {primitive:?}"
        );
        if let Some(existing) = self.by_ref.get(&primitive) {
            warn!(identity = %existing, ?primitive, "identity: duplicate assign ignored");
            return existing.clone();
        }
        let identity = self.allocator.next_identity();
        self.bind(identity.clone(), primitive);
        identity
    }

    /// Bind an existing identity to a (recreated) primitive.
    pub fn restore(&mut self, identity: Identity, primitive: R) {
        if let Some(old) = self.by_identity.remove(&identity) {
            self.by_ref.remove(&old);
        }
        if let Some(old_identity) = self.by_ref.remove(&primitive) {
            self.by_identity.remove(&old_identity);
        }
        self.bind(identity, primitive);
    }

    /// Resolve an identity to a live primitive on `surface`.
    ///
    /// Entries whose primitive the surface no longer lists are pruned.
    pub fn resolve<S>(&mut self, identity: &Identity, surface: &S) -> Option<R>
    where
        S: Surface<Ref = R>,
    {
        let primitive = self.by_identity.get(identity)?.clone();
        if surface.contains(&primitive) {
            return Some(primitive);
        }
        self.release(identity);
        None
    }

    /// Reference bound to an identity, without checking liveness.
    #[must_use]
    pub fn lookup(&self, identity: &Identity) -> Option<&R> {
        self.by_identity.get(identity)
    }

    /// Identity bound to a surface reference, if any.
    #[must_use]
    pub fn identity_of(&self, primitive: &R) -> Option<&Identity> {
        self.by_ref.get(primitive)
    }

    /// Drop an identity's binding, returning the reference it pointed at.
    pub fn release(&mut self, identity: &Identity) -> Option<R> {
        let primitive = self.by_identity.remove(identity)?;
        self.by_ref.remove(&primitive);
        Some(primitive)
    }

    /// Identities of every primitive still live on `surface`.
    #[must_use]
    pub fn all_identities<S>(&self, surface: &S) -> Vec<Identity>
    where
        S: Surface<Ref = R>,
    {
        self.by_identity
            .iter()
            .filter(|(_, r)| surface.contains(r))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Forget every binding. The allocator keeps counting.
    pub fn clear(&mut self) {
        self.by_identity.clear();
        self.by_ref.clear();
    }

    /// Number of bound identities, live or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }

    fn bind(&mut self, identity: Identity, primitive: R) {
        self.by_ref.insert(primitive.clone(), identity.clone());
        self.by_identity.insert(identity, primitive);
    }
}

impl<R: Clone + Eq + Hash + fmt::Debug> Default for IdentityRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}
