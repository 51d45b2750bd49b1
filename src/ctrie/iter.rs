/*
 * Created on Thu Feb 15 2024
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

/*
    The iterators here are weakly consistent, and that is a feature, not an
    apology: an entry present for the whole scan is returned, an entry that
    comes or goes mid-scan may or may not be, and no key identity is handed
    out twice in one pass. Instead of dragging a pointer stack along (which
    would pin stale subtrees and could double-report under contraction), the
    iterator remembers the hash of the bucket it last drained and re-descends
    for the next one, helping with tomb cleanup on the way like any other
    traversal.
*/

use {
    super::{meta::TreeElement, node::SNode, Tree},
    crate::sync::atm::Guard,
    std::marker::PhantomData,
};

pub struct IterKV<'t, 'g, 'v, T, S>
where
    't: 'v,
    'g: 'v + 't,
    T: TreeElement,
{
    i: RawIter<'t, 'g, 'v, T, S, CfgIterKV>,
}

impl<'t, 'g, 'v, T, S> IterKV<'t, 'g, 'v, T, S>
where
    't: 'v,
    'g: 'v + 't,
    T: TreeElement,
{
    pub fn new(t: &'t Tree<T, S>, g: &'g Guard) -> Self {
        Self {
            i: RawIter::new(t, g),
        }
    }
}

impl<'t, 'g, 'v, T, S> Iterator for IterKV<'t, 'g, 'v, T, S>
where
    't: 'v,
    'g: 'v + 't,
    T: TreeElement,
{
    type Item = (&'v T::Key, &'v T::Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.i.next()
    }
}

pub struct IterKey<'t, 'g, 'v, T, S>
where
    't: 'v,
    'g: 'v + 't,
    T: TreeElement,
{
    i: RawIter<'t, 'g, 'v, T, S, CfgIterKey>,
}

impl<'t, 'g, 'v, T, S> IterKey<'t, 'g, 'v, T, S>
where
    't: 'v,
    'g: 'v + 't,
    T: TreeElement,
{
    pub fn new(t: &'t Tree<T, S>, g: &'g Guard) -> Self {
        Self {
            i: RawIter::new(t, g),
        }
    }
}

impl<'t, 'g, 'v, T, S> Iterator for IterKey<'t, 'g, 'v, T, S>
where
    't: 'v,
    'g: 'v + 't,
    T: TreeElement,
{
    type Item = &'v T::Key;

    fn next(&mut self) -> Option<Self::Item> {
        self.i.next()
    }
}

pub struct IterVal<'t, 'g, 'v, T, S>
where
    't: 'v,
    'g: 'v + 't,
    T: TreeElement,
{
    i: RawIter<'t, 'g, 'v, T, S, CfgIterVal>,
}

impl<'t, 'g, 'v, T, S> IterVal<'t, 'g, 'v, T, S>
where
    't: 'v,
    'g: 'v + 't,
    T: TreeElement,
{
    pub fn new(t: &'t Tree<T, S>, g: &'g Guard) -> Self {
        Self {
            i: RawIter::new(t, g),
        }
    }
}

impl<'t, 'g, 'v, T, S> Iterator for IterVal<'t, 'g, 'v, T, S>
where
    't: 'v,
    'g: 'v + 't,
    T: TreeElement,
{
    type Item = &'v T::Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.i.next()
    }
}

trait IterConfig<T> {
    type Ret<'a>
    where
        T: 'a;
    fn some<'a>(v: &'a T) -> Option<Self::Ret<'a>>;
}

struct CfgIterKV;
impl<T: TreeElement> IterConfig<T> for CfgIterKV {
    type Ret<'a> = (&'a T::Key, &'a T::Value) where T: 'a;
    fn some<'a>(v: &'a T) -> Option<Self::Ret<'a>> {
        Some((v.key(), v.val()))
    }
}

struct CfgIterKey;
impl<T: TreeElement> IterConfig<T> for CfgIterKey {
    type Ret<'a> = &'a T::Key where T: 'a;
    fn some<'a>(v: &'a T) -> Option<Self::Ret<'a>> {
        Some(v.key())
    }
}

struct CfgIterVal;
impl<T: TreeElement> IterConfig<T> for CfgIterVal {
    type Ret<'a> = &'a T::Value where T: 'a;
    fn some<'a>(v: &'a T) -> Option<Self::Ret<'a>> {
        Some(v.val())
    }
}

struct RawIter<'t, 'g, 'v, T, S, I>
where
    't: 'v,
    'g: 'v + 't,
    I: IterConfig<T>,
{
    t: &'t Tree<T, S>,
    g: &'g Guard,
    started: bool,
    /// the bucket currently being drained
    sn: Option<&'v SNode<T>>,
    /// the entry the next call hands out
    en: Option<&'v T>,
    _m: PhantomData<I>,
}

impl<'t, 'g, 'v, T, S, I> RawIter<'t, 'g, 'v, T, S, I>
where
    't: 'v,
    'g: 'v + 't,
    I: IterConfig<T>,
{
    pub(super) fn new(t: &'t Tree<T, S>, g: &'g Guard) -> Self {
        Self {
            t,
            g,
            started: false,
            sn: None,
            en: None,
            _m: PhantomData,
        }
    }
}

impl<'t, 'g, 'v, T, S, I> RawIter<'t, 'g, 'v, T, S, I>
where
    't: 'v,
    'g: 'v + 't,
    T: TreeElement,
    I: IterConfig<T>,
{
    fn _next(&mut self) -> Option<I::Ret<'v>> {
        if !self.started {
            self.started = true;
            self.sn = self.t.iter_first(self.g);
            self.en = self.sn.map(SNode::first);
        }
        let ret = self.en?;
        let sn = self.sn?;
        // line up what the next call returns: the rest of this bucket first,
        // then the next bucket up in hash order
        match sn.successor(ret) {
            Some(e) => self.en = Some(e),
            None => {
                self.sn = self.t.iter_next(sn.hash(), self.g);
                self.en = self.sn.map(SNode::first);
            }
        }
        I::some(ret)
    }
}

impl<'t, 'g, 'v, T, S, I> Iterator for RawIter<'t, 'g, 'v, T, S, I>
where
    't: 'v,
    'g: 'v + 't,
    T: TreeElement,
    I: IterConfig<T>,
{
    type Item = I::Ret<'v>;

    fn next(&mut self) -> Option<Self::Item> {
        self._next()
    }
}
