/*
 * Created on Sat Feb 10 2024
 *
 * This file is a part of Skytable
 * Skytable (formerly known as TerrabaseDB or Skybase) is a free and open-source
 * NoSQL database written by Sayan Nandan ("the Author") with the
 * vision to provide flexibility in data modelling without compromising
 * on performance, queryability or scalability.
 *
 * Copyright (c) 2024, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! # sky-ctrie
//!
//! A concurrent, lock-free hash array mapped trie (a "Ctrie"). All mutation
//! happens through single-word CAS on indirection nodes; removals leave
//! tombstones that every observing thread helps contract, so the trie keeps
//! itself in canonical shape without any background maintenance.
//!
//! Memory reclamation is epoch-based (crossbeam), which is why every
//! operation takes a [`Guard`] — pin once with [`cpin`] and batch as many
//! operations on the pin as you like.

#![deny(unreachable_patterns)]

#[macro_use]
mod macros;
mod ctrie;
mod mem;
mod sync;
#[cfg(test)]
mod util;

use core::{borrow::Borrow, hash::Hash};

// re-exports
pub use self::{
    ctrie::{
        imp::{CtrieArc, CtrieCopy},
        iter::{IterKV, IterKey, IterVal},
        meta::{AsHasher, DefHState, Key, TreeElement, Value, WIDTH_DEF, WIDTH_MN, WIDTH_MX},
        CHTRuntimeLog, Tree,
    },
    sync::atm::{cpin, Guard},
};

/// The default copy-out Ctrie with the standard random state
pub type Ctrie<K, V> = CtrieCopy<K, V, DefHState>;

/// Any type implementing this trait can be used as a key inside the trie
pub trait AsKey: Hash + Eq {
    /// Read the key
    fn read_key(&self) -> &Self;
}

impl<T: Hash + Eq + ?Sized> AsKey for T {
    fn read_key(&self) -> &Self {
        self
    }
}

/// If your T can be cloned/copied and implements [`AsKey`], then this trait will automatically be implemented
pub trait AsKeyClone: AsKey + Clone {
    /// Read the key and return a clone
    fn read_key_clone(&self) -> Self;
}

impl<T: AsKey + Clone + ?Sized> AsKeyClone for T {
    #[inline(always)]
    fn read_key_clone(&self) -> Self {
        Clone::clone(self)
    }
}

pub trait AsValue {
    fn read_value(&self) -> &Self;
}
impl<T: ?Sized> AsValue for T {
    fn read_value(&self) -> &Self {
        self
    }
}

/// Any type implementing this trait can be used as a value inside the trie
pub trait AsValueClone: AsValue + Clone {
    /// Read the value and return a clone
    fn read_value_clone(&self) -> Self;
}

impl<T: AsValue + Clone + ?Sized> AsValueClone for T {
    #[inline(always)]
    fn read_value_clone(&self) -> Self {
        Clone::clone(self)
    }
}

/// The [`Comparable`] trait is like [`PartialEq`], but lets a borrowed form
/// stand in for the owned key at lookup sites (it must hash identically)
pub trait Comparable<K: ?Sized>: Hash {
    fn cmp_eq(&self, key: &K) -> bool;
}

/// A [`Comparable`] that can also produce the owned key, for insert sites
pub trait ComparableUpgradeable<K>: Comparable<K> {
    fn upgrade(&self) -> K;
}

impl<K: Borrow<T>, T: Eq + Hash + ?Sized> Comparable<K> for T {
    fn cmp_eq(&self, key: &K) -> bool {
        self == key.borrow()
    }
}

impl<K: Hash, T: ToOwned<Owned = K> + Hash + Comparable<K> + ?Sized> ComparableUpgradeable<K>
    for T
{
    fn upgrade(&self) -> K {
        self.to_owned()
    }
}

/// The base spec for any index. Iterator order is meaningless unless a more
/// specialized trait says otherwise
pub trait IndexBaseSpec: Sized {
    /// Index supports prealloc?
    const PREALLOC: bool;
    #[cfg(debug_assertions)]
    /// A type representing debug metrics
    type Metrics;
    /// Initialize an empty instance of the index
    fn idx_init() -> Self;
    /// Initialize a pre-loaded instance of the index
    fn idx_init_with(s: Self) -> Self;
    #[cfg(debug_assertions)]
    /// Returns a reference to the index metrics
    fn idx_metrics(&self) -> &Self::Metrics;
}

/// An unordered multi-threaded index. All operations are lock-free; reads
/// hand out references that live as long as the pin
pub trait MTIndex<K, V>: IndexBaseSpec {
    type IterKV<'t, 'g, 'v>: Iterator<Item = (&'v K, &'v V)>
    where
        'g: 't + 'v,
        't: 'v,
        K: 'v,
        V: 'v,
        Self: 't;
    type IterKey<'t, 'g, 'v>: Iterator<Item = &'v K>
    where
        'g: 't + 'v,
        't: 'v,
        K: 'v,
        Self: 't;
    type IterVal<'t, 'g, 'v>: Iterator<Item = &'v V>
    where
        'g: 't + 'v,
        't: 'v,
        V: 'v,
        Self: 't;
    /// Clears all the entries in the index
    fn mt_clear(&self, g: &Guard);
    // write
    /// Returns true if the entry was inserted successfully; returns false if the uniqueness constraint is
    /// violated
    fn mt_insert<U>(&self, key: U, val: V, g: &Guard) -> bool
    where
        U: ComparableUpgradeable<K>;
    /// put-if-absent; on a uniqueness violation hands back the blocking entry's value
    fn mt_insert_return<'t, 'g, 'v, U>(&'t self, key: U, val: V, g: &'g Guard) -> Option<&'v V>
    where
        U: ComparableUpgradeable<K>,
        't: 'v,
        'g: 't + 'v;
    /// Updates or inserts the given value
    fn mt_upsert<U>(&self, key: U, val: V, g: &Guard)
    where
        U: ComparableUpgradeable<K>;
    /// Updates or inserts, returning the previous value if one was mapped
    fn mt_upsert_return<'t, 'g, 'v, U>(&'t self, key: U, val: V, g: &'g Guard) -> Option<&'v V>
    where
        U: ComparableUpgradeable<K>,
        't: 'v,
        'g: 't + 'v;
    // read
    fn mt_contains<Q>(&self, key: &Q, g: &Guard) -> bool
    where
        Q: ?Sized + Comparable<K>;
    /// Returns a reference to the value corresponding to the key, if it exists
    fn mt_get<'t, 'g, 'v, Q>(&'t self, key: &Q, g: &'g Guard) -> Option<&'v V>
    where
        Q: ?Sized + Comparable<K>,
        't: 'v,
        'g: 't + 'v;
    /// Returns a clone of the value corresponding to the key, if it exists
    fn mt_get_cloned<Q>(&self, key: &Q, g: &Guard) -> Option<V>
    where
        Q: ?Sized + Comparable<K>;
    // update
    /// Returns true if the entry is updated
    fn mt_update<Q>(&self, key: &Q, val: V, g: &Guard) -> bool
    where
        Q: ?Sized + Comparable<K>;
    /// Updates the entry and returns the old value, if it exists
    fn mt_update_return<'t, 'g, 'v, Q>(&'t self, key: &Q, val: V, g: &'g Guard) -> Option<&'v V>
    where
        Q: ?Sized + Comparable<K>,
        't: 'v,
        'g: 't + 'v;
    /// Updates the entry only if it is currently mapped to `expected`
    fn mt_update_cond<Q>(&self, key: &Q, expected: &V, new: V, g: &Guard) -> bool
    where
        Q: ?Sized + Comparable<K>,
        V: PartialEq;
    // delete
    /// Returns true if the entry was deleted
    fn mt_delete<Q>(&self, key: &Q, g: &Guard) -> bool
    where
        Q: ?Sized + Comparable<K>;
    /// Removes the entry and returns it, if it exists
    fn mt_delete_return<'t, 'g, 'v, Q>(&'t self, key: &Q, g: &'g Guard) -> Option<&'v V>
    where
        Q: ?Sized + Comparable<K>,
        't: 'v,
        'g: 't + 'v;
    /// Removes the entry only if it is currently mapped to `expected`
    fn mt_delete_cond<Q>(&self, key: &Q, expected: &V, g: &Guard) -> bool
    where
        Q: ?Sized + Comparable<K>,
        V: PartialEq;
    // misc
    /// Best-effort count of live entries (exact when quiescent)
    fn mt_len(&self) -> usize;
    /// Structural emptiness check on the root
    fn mt_is_empty(&self, g: &Guard) -> bool;
    // iter
    /// Returns an iterator over a tuple of keys and values
    fn mt_iter_kv<'t, 'g, 'v>(&'t self, g: &'g Guard) -> Self::IterKV<'t, 'g, 'v>
    where
        'g: 't + 'v,
        't: 'v;
    /// Returns an iterator over the keys
    fn mt_iter_key<'t, 'g, 'v>(&'t self, g: &'g Guard) -> Self::IterKey<'t, 'g, 'v>
    where
        'g: 't + 'v,
        't: 'v;
    /// Returns an iterator over the values
    fn mt_iter_val<'t, 'g, 'v>(&'t self, g: &'g Guard) -> Self::IterVal<'t, 'g, 'v>
    where
        'g: 't + 'v,
        't: 'v;
}
