/*
 * Created on Wed Feb 14 2024
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
    super::meta::TreeElement,
    crate::{Comparable, ComparableUpgradeable},
    core::marker::PhantomData,
};

/// write mode flag
pub type WriteFlag = u8;
/// fresh: only go in if the key is not mapped
pub const WRITEMODE_FRESH: WriteFlag = 0b01;
/// refresh: only apply over an existing mapping
pub const WRITEMODE_REFRESH: WriteFlag = 0b10;
/// any: insert or replace, no questions asked
pub const WRITEMODE_ANY: WriteFlag = 0b11;

/// A [`PatchWrite`] is a single atomic delta against the tree. The engine
/// drives it; the patch decides what goes in (`nx_new`/`ex_apply`), whether
/// an existing entry blocks it (`ex_filter`), and how each verdict maps to
/// the caller's return type
pub trait PatchWrite<E: TreeElement> {
    const WMODE: WriteFlag;
    type Ret<'a>;
    type Target: Comparable<E::Key> + ?Sized;
    fn target(&self) -> &Self::Target;
    fn nx_new(&mut self) -> E;
    fn nx_ret<'a>() -> Self::Ret<'a>;
    fn ex_apply(&mut self, current: &E) -> E;
    /// Extra admission check against the current entry; rejecting maps
    /// through `rj_ret`
    fn ex_filter(&self, _current: &E) -> bool {
        true
    }
    fn ex_ret<'a>(current: &'a E) -> Self::Ret<'a>;
    fn rj_ret<'a>(current: &'a E) -> Self::Ret<'a>;
}

/// insert
pub struct Insert<E: TreeElement, U> {
    target: U,
    new_data: E::Value,
    _m: PhantomData<E>,
}

impl<E: TreeElement, U> Insert<E, U> {
    pub fn new(target: U, new_data: E::Value) -> Self {
        Self {
            target,
            new_data,
            _m: PhantomData,
        }
    }
}

impl<E: TreeElement, U: ComparableUpgradeable<E::Key>> PatchWrite<E> for Insert<E, U> {
    const WMODE: WriteFlag = WRITEMODE_FRESH;
    type Ret<'a> = bool;
    type Target = U;
    fn target(&self) -> &Self::Target {
        &self.target
    }
    fn nx_new(&mut self) -> E {
        E::new(self.target.upgrade(), self.new_data.clone())
    }
    fn nx_ret<'a>() -> Self::Ret<'a> {
        true
    }
    fn ex_apply(&mut self, _: &E) -> E {
        unreachable!()
    }
    fn ex_ret<'a>(_: &'a E) -> Self::Ret<'a> {
        unreachable!()
    }
    fn rj_ret<'a>(_: &'a E) -> Self::Ret<'a> {
        false
    }
}

/// insert, returning the blocking entry's value on a uniqueness violation
pub struct InsertRet<E: TreeElement, U> {
    target: U,
    new_data: E::Value,
    _m: PhantomData<E>,
}

impl<E: TreeElement, U> InsertRet<E, U> {
    pub fn new(target: U, new_data: E::Value) -> Self {
        Self {
            target,
            new_data,
            _m: PhantomData,
        }
    }
}

impl<E: TreeElement, U: ComparableUpgradeable<E::Key>> PatchWrite<E> for InsertRet<E, U> {
    const WMODE: WriteFlag = WRITEMODE_FRESH;
    type Ret<'a> = Option<&'a E::Value>;
    type Target = U;
    fn target(&self) -> &Self::Target {
        &self.target
    }
    fn nx_new(&mut self) -> E {
        E::new(self.target.upgrade(), self.new_data.clone())
    }
    fn nx_ret<'a>() -> Self::Ret<'a> {
        None
    }
    fn ex_apply(&mut self, _: &E) -> E {
        unreachable!()
    }
    fn ex_ret<'a>(_: &'a E) -> Self::Ret<'a> {
        unreachable!()
    }
    fn rj_ret<'a>(c: &'a E) -> Self::Ret<'a> {
        Some(c.val())
    }
}

/// upsert
pub struct Upsert<E: TreeElement, U> {
    target: U,
    new_data: E::Value,
    _m: PhantomData<E>,
}

impl<E: TreeElement, U> Upsert<E, U> {
    pub fn new(target: U, new_data: E::Value) -> Self {
        Self {
            target,
            new_data,
            _m: PhantomData,
        }
    }
}

impl<E: TreeElement, U: ComparableUpgradeable<E::Key>> PatchWrite<E> for Upsert<E, U> {
    const WMODE: WriteFlag = WRITEMODE_ANY;
    type Ret<'a> = ();
    type Target = U;
    fn target(&self) -> &Self::Target {
        &self.target
    }
    fn nx_new(&mut self) -> E {
        E::new(self.target.upgrade(), self.new_data.clone())
    }
    fn nx_ret<'a>() -> Self::Ret<'a> {}
    fn ex_apply(&mut self, _: &E) -> E {
        self.nx_new()
    }
    fn ex_ret<'a>(_: &'a E) -> Self::Ret<'a> {}
    fn rj_ret<'a>(_: &'a E) -> Self::Ret<'a> {
        unreachable!()
    }
}

/// upsert, returning the previous value if one was mapped
pub struct UpsertRet<E: TreeElement, U> {
    target: U,
    new_data: E::Value,
    _m: PhantomData<E>,
}

impl<E: TreeElement, U> UpsertRet<E, U> {
    pub fn new(target: U, new_data: E::Value) -> Self {
        Self {
            target,
            new_data,
            _m: PhantomData,
        }
    }
}

impl<E: TreeElement, U: ComparableUpgradeable<E::Key>> PatchWrite<E> for UpsertRet<E, U> {
    const WMODE: WriteFlag = WRITEMODE_ANY;
    type Ret<'a> = Option<&'a E::Value>;
    type Target = U;
    fn target(&self) -> &Self::Target {
        &self.target
    }
    fn nx_new(&mut self) -> E {
        E::new(self.target.upgrade(), self.new_data.clone())
    }
    fn nx_ret<'a>() -> Self::Ret<'a> {
        None
    }
    fn ex_apply(&mut self, _: &E) -> E {
        self.nx_new()
    }
    fn ex_ret<'a>(c: &'a E) -> Self::Ret<'a> {
        Some(c.val())
    }
    fn rj_ret<'a>(_: &'a E) -> Self::Ret<'a> {
        unreachable!()
    }
}

/// update. Never inserts, so the key is only ever borrowed
pub struct Update<'u, E: TreeElement, Q: ?Sized> {
    target: &'u Q,
    new_data: E::Value,
    _m: PhantomData<E>,
}

impl<'u, E: TreeElement, Q: ?Sized> Update<'u, E, Q> {
    pub fn new(target: &'u Q, new_data: E::Value) -> Self {
        Self {
            target,
            new_data,
            _m: PhantomData,
        }
    }
}

impl<'u, E: TreeElement, Q: ?Sized + Comparable<E::Key>> PatchWrite<E> for Update<'u, E, Q> {
    const WMODE: WriteFlag = WRITEMODE_REFRESH;
    type Ret<'a> = bool;
    type Target = Q;
    fn target(&self) -> &Self::Target {
        self.target
    }
    fn nx_new(&mut self) -> E {
        unreachable!()
    }
    fn nx_ret<'a>() -> Self::Ret<'a> {
        false
    }
    fn ex_apply(&mut self, c: &E) -> E {
        E::new(c.key().clone(), self.new_data.clone())
    }
    fn ex_ret<'a>(_: &'a E) -> Self::Ret<'a> {
        true
    }
    fn rj_ret<'a>(_: &'a E) -> Self::Ret<'a> {
        unreachable!()
    }
}

/// update, returning the previous value
pub struct UpdateRet<'u, E: TreeElement, Q: ?Sized> {
    target: &'u Q,
    new_data: E::Value,
    _m: PhantomData<E>,
}

impl<'u, E: TreeElement, Q: ?Sized> UpdateRet<'u, E, Q> {
    pub fn new(target: &'u Q, new_data: E::Value) -> Self {
        Self {
            target,
            new_data,
            _m: PhantomData,
        }
    }
}

impl<'u, E: TreeElement, Q: ?Sized + Comparable<E::Key>> PatchWrite<E> for UpdateRet<'u, E, Q> {
    const WMODE: WriteFlag = WRITEMODE_REFRESH;
    type Ret<'a> = Option<&'a E::Value>;
    type Target = Q;
    fn target(&self) -> &Self::Target {
        self.target
    }
    fn nx_new(&mut self) -> E {
        unreachable!()
    }
    fn nx_ret<'a>() -> Self::Ret<'a> {
        None
    }
    fn ex_apply(&mut self, c: &E) -> E {
        E::new(c.key().clone(), self.new_data.clone())
    }
    fn ex_ret<'a>(c: &'a E) -> Self::Ret<'a> {
        Some(c.val())
    }
    fn rj_ret<'a>(_: &'a E) -> Self::Ret<'a> {
        unreachable!()
    }
}

/// update only if the current value matches an expected one
pub struct UpdateCond<'u, E: TreeElement, Q: ?Sized> {
    target: &'u Q,
    expected: &'u E::Value,
    new_data: E::Value,
    _m: PhantomData<E>,
}

impl<'u, E: TreeElement, Q: ?Sized> UpdateCond<'u, E, Q> {
    pub fn new(target: &'u Q, expected: &'u E::Value, new_data: E::Value) -> Self {
        Self {
            target,
            expected,
            new_data,
            _m: PhantomData,
        }
    }
}

impl<'u, E: TreeElement, Q: ?Sized + Comparable<E::Key>> PatchWrite<E> for UpdateCond<'u, E, Q>
where
    E::Value: PartialEq,
{
    const WMODE: WriteFlag = WRITEMODE_REFRESH;
    type Ret<'a> = bool;
    type Target = Q;
    fn target(&self) -> &Self::Target {
        self.target
    }
    fn nx_new(&mut self) -> E {
        unreachable!()
    }
    fn nx_ret<'a>() -> Self::Ret<'a> {
        false
    }
    fn ex_apply(&mut self, c: &E) -> E {
        E::new(c.key().clone(), self.new_data.clone())
    }
    fn ex_filter(&self, current: &E) -> bool {
        current.val() == self.expected
    }
    fn ex_ret<'a>(_: &'a E) -> Self::Ret<'a> {
        true
    }
    fn rj_ret<'a>(_: &'a E) -> Self::Ret<'a> {
        false
    }
}

/// A delete delta: the patch decides whether the found entry may go
/// (`filter`) and how each verdict maps back
pub trait PatchDelete<E: TreeElement> {
    type Ret<'a>;
    type Target: Comparable<E::Key> + ?Sized;
    fn target(&self) -> &Self::Target;
    /// Admission check; rejecting maps through `rj`
    fn filter(&self, _current: &E) -> bool {
        true
    }
    fn ex<'a>(current: &'a E) -> Self::Ret<'a>;
    fn nx<'a>() -> Self::Ret<'a>;
    fn rj<'a>(current: &'a E) -> Self::Ret<'a>;
}

/// delete
pub struct Delete<'d, E, Q: ?Sized> {
    target: &'d Q,
    _m: PhantomData<E>,
}

impl<'d, E, Q: ?Sized> Delete<'d, E, Q> {
    pub fn new(target: &'d Q) -> Self {
        Self {
            target,
            _m: PhantomData,
        }
    }
}

impl<'d, E: TreeElement, Q: ?Sized + Comparable<E::Key>> PatchDelete<E> for Delete<'d, E, Q> {
    type Ret<'a> = bool;
    type Target = Q;
    fn target(&self) -> &Self::Target {
        self.target
    }
    #[inline(always)]
    fn ex<'a>(_: &'a E) -> Self::Ret<'a> {
        true
    }
    #[inline(always)]
    fn nx<'a>() -> Self::Ret<'a> {
        false
    }
    fn rj<'a>(_: &'a E) -> Self::Ret<'a> {
        unreachable!()
    }
}

/// delete, returning the removed value
pub struct DeleteRet<'d, E, Q: ?Sized> {
    target: &'d Q,
    _m: PhantomData<E>,
}

impl<'d, E, Q: ?Sized> DeleteRet<'d, E, Q> {
    pub fn new(target: &'d Q) -> Self {
        Self {
            target,
            _m: PhantomData,
        }
    }
}

impl<'d, E: TreeElement, Q: ?Sized + Comparable<E::Key>> PatchDelete<E> for DeleteRet<'d, E, Q> {
    type Ret<'a> = Option<&'a E::Value>;
    type Target = Q;
    fn target(&self) -> &Self::Target {
        self.target
    }
    #[inline(always)]
    fn ex<'a>(v: &'a E) -> Self::Ret<'a> {
        Some(v.val())
    }
    #[inline(always)]
    fn nx<'a>() -> Self::Ret<'a> {
        None
    }
    fn rj<'a>(_: &'a E) -> Self::Ret<'a> {
        unreachable!()
    }
}

/// delete only if the current value matches an expected one
pub struct DeleteCond<'d, E: TreeElement, Q: ?Sized> {
    target: &'d Q,
    expected: &'d E::Value,
    _m: PhantomData<E>,
}

impl<'d, E: TreeElement, Q: ?Sized> DeleteCond<'d, E, Q> {
    pub fn new(target: &'d Q, expected: &'d E::Value) -> Self {
        Self {
            target,
            expected,
            _m: PhantomData,
        }
    }
}

impl<'d, E: TreeElement, Q: ?Sized + Comparable<E::Key>> PatchDelete<E> for DeleteCond<'d, E, Q>
where
    E::Value: PartialEq,
{
    type Ret<'a> = bool;
    type Target = Q;
    fn target(&self) -> &Self::Target {
        self.target
    }
    fn filter(&self, current: &E) -> bool {
        current.val() == self.expected
    }
    #[inline(always)]
    fn ex<'a>(_: &'a E) -> Self::Ret<'a> {
        true
    }
    #[inline(always)]
    fn nx<'a>() -> Self::Ret<'a> {
        false
    }
    fn rj<'a>(_: &'a E) -> Self::Ret<'a> {
        false
    }
}
