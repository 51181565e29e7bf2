// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element identity: scope-mixed 64-bit ids and the scope stack.
//!
//! An [`Id`] is the pair (parent scope, local key) collapsed into one integer.
//! Building the same pair twice yields the same id, which is what lets
//! per-element state survive while UI code rebuilds its call graph every frame.
//!
//! Keys are hashed with FNV-1a and mixed into the parent with a SplitMix64
//! finaliser. For `n` simultaneously live ids the probability of any
//! accidental alias is roughly `n² / 2⁶⁵`, so a UI with a million elements
//! still sits around one in ten million.

use smallvec::SmallVec;

/// Identity of a UI element, stable across frames for the same scope and key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(u64);

impl Id {
    /// The scope every id stack starts from.
    pub const ROOT: Self = Self(0x9e37_79b9_7f4a_7c15);

    /// Derive the id of `key` inside the scope `self`.
    #[must_use]
    pub fn with(self, key: impl IdKey) -> Self {
        Self(mix(self.0, key.key_hash()))
    }

    /// Raw integer value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Reconstruct an id from a value previously returned by [`Id::value`].
    pub const fn from_value(value: u64) -> Self {
        Self(value)
    }
}

/// Anything usable as a local key: strings, integers, enum constants, ids.
///
/// Using a loop index as the only key ties element state to list position.
/// When list membership changes, combine the index with a content-derived key,
/// for example `(item.name.as_str(), index)`.
pub trait IdKey {
    /// 64-bit hash of the key, independent of any scope.
    fn key_hash(&self) -> u64;
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8], seed: u64) -> u64 {
    let mut hash = seed;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// SplitMix64 finaliser over the parent hash and the rotated key hash.
fn mix(parent: u64, key: u64) -> u64 {
    let mut z = parent ^ key.rotate_left(29) ^ 0x94d0_49bb_1331_11eb;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl IdKey for str {
    fn key_hash(&self) -> u64 {
        fnv1a(self.as_bytes(), FNV_OFFSET)
    }
}

impl IdKey for String {
    fn key_hash(&self) -> u64 {
        self.as_str().key_hash()
    }
}

impl<T: IdKey + ?Sized> IdKey for &T {
    fn key_hash(&self) -> u64 {
        (**self).key_hash()
    }
}

impl IdKey for Id {
    fn key_hash(&self) -> u64 {
        self.0
    }
}

macro_rules! int_key {
    ($($t:ty),*) => {
        $(
            impl IdKey for $t {
                fn key_hash(&self) -> u64 {
                    // Integers get a distinct seed so `1_u32` and `"1"` never agree.
                    fnv1a(&self.to_le_bytes(), FNV_OFFSET ^ 0x5555_5555_5555_5555)
                }
            }
        )*
    };
}

int_key!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl<A: IdKey, B: IdKey> IdKey for (A, B) {
    fn key_hash(&self) -> u64 {
        mix(self.0.key_hash(), self.1.key_hash())
    }
}

impl<A: IdKey, B: IdKey, C: IdKey> IdKey for (A, B, C) {
    fn key_hash(&self) -> u64 {
        mix(mix(self.0.key_hash(), self.1.key_hash()), self.2.key_hash())
    }
}

/// Stack of enclosing scopes used to derive element ids.
#[derive(Clone, Debug)]
pub struct IdStack {
    scopes: SmallVec<[Id; 16]>,
}

impl Default for IdStack {
    fn default() -> Self {
        Self::new()
    }
}

impl IdStack {
    /// A stack holding only [`Id::ROOT`].
    pub fn new() -> Self {
        let mut scopes = SmallVec::new();
        scopes.push(Id::ROOT);
        Self { scopes }
    }

    /// Innermost scope.
    pub fn current(&self) -> Id {
        self.scopes.last().copied().unwrap_or(Id::ROOT)
    }

    /// Id of `key` in the current scope, without pushing it.
    pub fn id(&self, key: impl IdKey) -> Id {
        self.current().with(key)
    }

    /// Enter the scope of `key`, returning its id.
    pub fn push_scope(&mut self, key: impl IdKey) -> Id {
        let id = self.id(key);
        self.scopes.push(id);
        id
    }

    /// Enter a scope whose id was computed elsewhere.
    ///
    /// Used when an element must keep its id while moving between parents,
    /// such as a dock node that is reparented by a merge.
    pub fn push_id(&mut self, id: Id) {
        self.scopes.push(id);
    }

    /// Leave the innermost scope.
    ///
    /// Popping the root scope is a caller bug: it panics in debug builds and
    /// is ignored in release builds.
    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "pop_scope without matching push_scope");
        if self.scopes.len() > 1 {
            self.scopes.pop();
        } else {
            tracing::error!("pop_scope without matching push_scope; ignored");
        }
    }

    /// Number of pushed scopes, excluding the root.
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Drop every pushed scope.
    pub fn reset(&mut self) {
        self.scopes.truncate(1);
    }
}
