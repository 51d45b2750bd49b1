/*
 * Created on Mon Feb 12 2024
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
    crate::{mem::VInline, AsKeyClone},
    std::{cmp, collections::hash_map::RandomState, hash::BuildHasher, sync::Arc},
};

const LNODE_STACK: usize = 2;
pub(super) type LNode<T> = VInline<LNODE_STACK, T>;

/// hash bits the trie can consume before terminal collision buckets take over
pub(super) const HASH_BITS: usize = u32::BITS as usize;
/// minimum branch width exponent (fan-out = 2)
pub const WIDTH_MN: usize = 1;
/// maximum branch width exponent (fan-out = 64, so the bitmap fits one word)
pub const WIDTH_MX: usize = 6;
/// default branch width exponent
pub const WIDTH_DEF: usize = 6;

pub type DefHState = RandomState;

pub trait Key: AsKeyClone + 'static {}
impl<T> Key for T where T: AsKeyClone + 'static {}
pub trait Value: Clone + 'static {}
impl<T> Value for T where T: Clone + 'static {}
pub trait AsHasher: BuildHasher + Default {}
impl<T> AsHasher for T where T: BuildHasher + Default {}

/// An element of the tree: owns one key and one value, and can be rebuilt
/// from the pair (the tree never mutates an element in place)
pub trait TreeElement: Clone + 'static {
    type Key: Key;
    type Value: Value;
    fn new(k: Self::Key, v: Self::Value) -> Self;
    fn key(&self) -> &Self::Key;
    fn val(&self) -> &Self::Value;
}

impl<K: Key, V: Value> TreeElement for (K, V) {
    type Key = K;
    type Value = V;
    #[inline(always)]
    fn new(k: K, v: V) -> Self {
        (k, v)
    }
    #[inline(always)]
    fn key(&self) -> &K {
        &self.0
    }
    #[inline(always)]
    fn val(&self) -> &V {
        &self.1
    }
}

impl<K: Key, V: Value> TreeElement for Arc<(K, V)> {
    type Key = K;
    type Value = V;
    #[inline(always)]
    fn new(k: K, v: V) -> Self {
        Arc::new((k, v))
    }
    #[inline(always)]
    fn key(&self) -> &K {
        &self.0
    }
    #[inline(always)]
    fn val(&self) -> &V {
        &self.1
    }
}

/// Disperse the caller's hash so that values differing only by constant
/// multiples at higher bit positions still spread across the low slots
#[inline(always)]
pub(super) const fn mix(mut h: u32) -> u32 {
    h ^= (h >> 20) ^ (h >> 12);
    h ^ (h >> 7) ^ (h >> 4)
}

/// The one-bit branch mask for `h` at bit offset `lev`, consuming at most `w`
/// bits (fewer at the terminal window)
#[inline(always)]
pub(super) fn flag(h: u32, lev: usize, w: usize) -> u64 {
    debug_assert!(lev < HASH_BITS, "logic,level past hash width");
    let bits = cmp::min(w, HASH_BITS - lev);
    let sub = (h as u64 >> lev) & ((1 << bits) - 1);
    1u64 << sub
}

/// The branch mask plus the compact array position it maps to under `bmp`
#[inline(always)]
pub(super) fn flag_pos(h: u32, lev: usize, bmp: u64, w: usize) -> (u64, usize) {
    let f = flag(h, lev, w);
    (f, (bmp & (f - 1)).count_ones() as usize)
}
