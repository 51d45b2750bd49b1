/*
 * Created on Fri Feb 16 2024
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

use {
    super::{
        iter::{IterKV, IterKey, IterVal},
        meta::{AsHasher, DefHState, Key, TreeElement, Value},
        patch, Tree,
    },
    crate::{
        sync::atm::{cpin, Guard},
        Comparable, ComparableUpgradeable, IndexBaseSpec, MTIndex,
    },
    std::sync::Arc,
};

#[cfg(debug_assertions)]
use super::CHTRuntimeLog;

/// Shared-element map: lookups hand out the same `Arc`'d pair that the writer
/// published
pub type CtrieArc<K, V, S = DefHState> = Tree<Arc<(K, V)>, S>;
/// Copy-out map: entries are plain pairs rebuilt on every write
pub type CtrieCopy<K, V, S = DefHState> = Tree<(K, V), S>;

impl<T, S> IndexBaseSpec for Tree<T, S>
where
    T: TreeElement,
    S: AsHasher,
{
    const PREALLOC: bool = false;

    #[cfg(debug_assertions)]
    type Metrics = CHTRuntimeLog;

    fn idx_init() -> Self {
        Tree::new()
    }

    fn idx_init_with(s: Self) -> Self {
        s
    }

    #[cfg(debug_assertions)]
    fn idx_metrics(&self) -> &Self::Metrics {
        &self.m
    }
}

impl<K, V, T, S> MTIndex<K, V> for Tree<T, S>
where
    K: Key,
    V: Value,
    T: TreeElement<Key = K, Value = V>,
    S: AsHasher,
{
    type IterKV<'t, 'g, 'v> = IterKV<'t, 'g, 'v, T, S>
    where
        'g: 't + 'v,
        't: 'v,
        K: 'v,
        V: 'v,
        Self: 't;

    type IterKey<'t, 'g, 'v> = IterKey<'t, 'g, 'v, T, S>
    where
        'g: 't + 'v,
        't: 'v,
        K: 'v,
        Self: 't;

    type IterVal<'t, 'g, 'v> = IterVal<'t, 'g, 'v, T, S>
    where
        'g: 't + 'v,
        't: 'v,
        V: 'v,
        Self: 't;

    fn mt_clear(&self, g: &Guard) {
        self.clear(g)
    }

    fn mt_insert<U>(&self, key: U, val: V, g: &Guard) -> bool
    where
        U: ComparableUpgradeable<K>,
    {
        self.patch(patch::Insert::new(key, val), g)
    }

    fn mt_insert_return<'t, 'g, 'v, U>(&'t self, key: U, val: V, g: &'g Guard) -> Option<&'v V>
    where
        U: ComparableUpgradeable<K>,
        't: 'v,
        'g: 't + 'v,
    {
        self.patch(patch::InsertRet::new(key, val), g)
    }

    fn mt_upsert<U>(&self, key: U, val: V, g: &Guard)
    where
        U: ComparableUpgradeable<K>,
    {
        self.patch(patch::Upsert::new(key, val), g)
    }

    fn mt_upsert_return<'t, 'g, 'v, U>(&'t self, key: U, val: V, g: &'g Guard) -> Option<&'v V>
    where
        U: ComparableUpgradeable<K>,
        't: 'v,
        'g: 't + 'v,
    {
        self.patch(patch::UpsertRet::new(key, val), g)
    }

    fn mt_contains<Q>(&self, key: &Q, g: &Guard) -> bool
    where
        Q: ?Sized + Comparable<K>,
    {
        self.contains_key(key, g)
    }

    fn mt_get<'t, 'g, 'v, Q>(&'t self, key: &Q, g: &'g Guard) -> Option<&'v V>
    where
        Q: ?Sized + Comparable<K>,
        't: 'v,
        'g: 't + 'v,
    {
        self.get(key, g)
    }

    fn mt_get_cloned<Q>(&self, key: &Q, g: &Guard) -> Option<V>
    where
        Q: ?Sized + Comparable<K>,
    {
        self.get_cloned(key, g)
    }

    fn mt_update<Q>(&self, key: &Q, val: V, g: &Guard) -> bool
    where
        Q: ?Sized + Comparable<K>,
    {
        self.patch(patch::Update::new(key, val), g)
    }

    fn mt_update_return<'t, 'g, 'v, Q>(&'t self, key: &Q, val: V, g: &'g Guard) -> Option<&'v V>
    where
        Q: ?Sized + Comparable<K>,
        't: 'v,
        'g: 't + 'v,
    {
        self.patch(patch::UpdateRet::new(key, val), g)
    }

    fn mt_update_cond<Q>(&self, key: &Q, expected: &V, new: V, g: &Guard) -> bool
    where
        Q: ?Sized + Comparable<K>,
        V: PartialEq,
    {
        self.patch(patch::UpdateCond::new(key, expected, new), g)
    }

    fn mt_delete<Q>(&self, key: &Q, g: &Guard) -> bool
    where
        Q: ?Sized + Comparable<K>,
    {
        self._remove(patch::Delete::new(key), g)
    }

    fn mt_delete_return<'t, 'g, 'v, Q>(&'t self, key: &Q, g: &'g Guard) -> Option<&'v V>
    where
        Q: ?Sized + Comparable<K>,
        't: 'v,
        'g: 't + 'v,
    {
        self._remove(patch::DeleteRet::new(key), g)
    }

    fn mt_delete_cond<Q>(&self, key: &Q, expected: &V, g: &Guard) -> bool
    where
        Q: ?Sized + Comparable<K>,
        V: PartialEq,
    {
        self._remove(patch::DeleteCond::new(key, expected), g)
    }

    fn mt_len(&self) -> usize {
        self.len()
    }

    fn mt_is_empty(&self, g: &Guard) -> bool {
        self.is_empty(g)
    }

    fn mt_iter_kv<'t, 'g, 'v>(&'t self, g: &'g Guard) -> Self::IterKV<'t, 'g, 'v>
    where
        'g: 't + 'v,
        't: 'v,
    {
        self.iter_kv(g)
    }

    fn mt_iter_key<'t, 'g, 'v>(&'t self, g: &'g Guard) -> Self::IterKey<'t, 'g, 'v>
    where
        'g: 't + 'v,
        't: 'v,
    {
        self.iter_key(g)
    }

    fn mt_iter_val<'t, 'g, 'v>(&'t self, g: &'g Guard) -> Self::IterVal<'t, 'g, 'v>
    where
        'g: 't + 'v,
        't: 'v,
    {
        self.iter_val(g)
    }
}

impl<T: TreeElement, S: AsHasher> FromIterator<T> for Tree<T, S> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let g = cpin();
        let t = Tree::new();
        iter.into_iter().for_each(|te| {
            t.patch(
                patch::Upsert::new(te.key().clone(), te.val().clone()),
                &g,
            )
        });
        t
    }
}
