/*
 * Created on Tue Feb 13 2024
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

mod access;
pub mod imp;
pub mod iter;
pub mod meta;
mod node;
mod patch;
#[cfg(test)]
mod tests;

#[cfg(debug_assertions)]
use crate::sync::atm::ORD_ACR;
use {
    self::{
        access::ReadMode,
        iter::{IterKV, IterKey, IterVal},
        meta::{AsHasher, TreeElement},
        node::{Branch, CNode, INode, Main, SNode, TNode},
        patch::{PatchDelete, PatchWrite, WRITEMODE_FRESH, WRITEMODE_REFRESH},
    },
    crate::{
        sync::atm::{cpin, Guard, ORD_RLX},
        Comparable,
    },
    std::{
        fmt,
        hash::{BuildHasher, Hash, Hasher},
        sync::{atomic::AtomicUsize, Arc},
    },
};

/*
    concurrent map impl
    ---
    This is a hash array mapped trie in the lineage of Bagwell's hash trees[1] with the lock-free
    concurrent protocol worked out by Prokopec et al.[2] (no snapshots here; we only carry the
    tombstone/contraction half of that design). The general "prepare aside, CAS in, help the loser"
    discipline also shows up in contrie[3], which is a good second reference for the condemned-node
    handshake.

    The shape rules are simple and total: an indirection node (INode) is the only thing that ever
    mutates, and it only ever points to a branch array (CNode) or a tombed leaf (TNode). Branch
    arrays are bitmap-compressed and ordered by subhash; leaves hold one entry or a terminal
    collision bucket. Removals that strand a lone leaf under a non-root INode tomb it, and every
    thread that trips over the tomb helps splice it into the parent before retrying. That keeps the
    trie canonical without a single lock anywhere.

    ---
    References:
    [1]: https://lampwww.epfl.ch/papers/idealhashtrees.pdf
    [2]: Aleksandar Prokopec, Nathan Grasso Bronson, Phil Bagwell, and Martin Odersky. 2012.
    Concurrent tries with efficient non-blocking snapshots. SIGPLAN Not. 47, 8 (August 2012),
    151-160. https://doi.org/10.1145/2370036.2145836
    [3]: https://github.com/vorner/contrie (distributed under the MIT or Apache-2.0 license)
    -- Sayan (@ohsayan)
*/

#[cfg(debug_assertions)]
struct CHTMetricsData {
    split: AtomicUsize,
    hln: AtomicUsize,
    tomb: AtomicUsize,
}

pub struct CHTRuntimeLog {
    #[cfg(debug_assertions)]
    data: CHTMetricsData,
    #[cfg(not(debug_assertions))]
    data: (),
}

impl CHTRuntimeLog {
    #[cfg(debug_assertions)]
    const ZERO: AtomicUsize = AtomicUsize::new(0);
    #[cfg(not(debug_assertions))]
    const NEW: Self = Self { data: () };
    #[cfg(debug_assertions)]
    const NEW: Self = Self {
        data: CHTMetricsData {
            split: Self::ZERO,
            hln: Self::ZERO,
            tomb: Self::ZERO,
        },
    };
    const fn new() -> Self {
        Self::NEW
    }
    dbgfn! {
        fn hsplit(self: &Self) {
            self.data.split.fetch_add(1, ORD_ACR);
        } else {
            ()
        }
        fn hlnode(self: &Self) {
            self.data.hln.fetch_add(1, ORD_ACR);
        } else {
            ()
        }
        fn htomb(self: &Self) {
            self.data.tomb.fetch_add(1, ORD_ACR);
        } else {
            ()
        }
        #[cfg(test)]
        fn repsplit(self: &Self) -> usize {
            self.data.split.load(ORD_RLX)
        } else {
            0
        }
        #[cfg(test)]
        fn replnode(self: &Self) -> usize {
            self.data.hln.load(ORD_RLX)
        } else {
            0
        }
        #[cfg(test)]
        fn reptomb(self: &Self) -> usize {
            self.data.tomb.load(ORD_RLX)
        } else {
            0
        }
    }
}

impl Drop for CHTRuntimeLog {
    fn drop(&mut self) {
        let _ = self.data;
    }
}

#[inline(always)]
fn gc(g: &Guard) {
    g.flush();
}

/// lookup descent verdict
enum Lookup<'g, T> {
    Found(&'g T),
    NotFound,
    Restart,
}

/// write descent verdict
enum Write<'g, T> {
    /// went in fresh; there was no previous entry
    Fresh,
    /// applied over an existing entry (the displaced one rides along)
    Exist(&'g T),
    /// the write mode's constraint stopped us; carries whatever was observed
    Reject(Option<&'g T>),
    Restart,
}

/// delete descent verdict
enum Remove<'g, T> {
    Removed(&'g T),
    NotFound,
    Reject(&'g T),
    Restart,
}

pub struct Tree<T, S = meta::DefHState> {
    root: INode<T>,
    h: S,
    l: AtomicUsize,
    m: CHTRuntimeLog,
    w: usize,
}

impl<T, S> Tree<T, S> {
    /// Best-effort entry count: O(1), exact when nobody is writing
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.l.load(ORD_RLX)
    }
    /// The branch width exponent this tree was built with (fan-out = 2^width)
    #[inline(always)]
    pub const fn width(&self) -> usize {
        self.w
    }
    #[inline(always)]
    fn incr_len(&self) {
        self.l.fetch_add(1, ORD_RLX);
    }
    #[inline(always)]
    fn decr_len(&self) {
        self.l.fetch_sub(1, ORD_RLX);
    }
}

impl<T: TreeElement, S: AsHasher> Tree<T, S> {
    fn _new(h: S, w: usize) -> Self {
        Self {
            root: INode::new(Main::Cn(CNode::empty())),
            h,
            l: AtomicUsize::new(0),
            m: CHTRuntimeLog::new(),
            // out-of-range widths are clamped, not rejected
            w: w.clamp(meta::WIDTH_MN, meta::WIDTH_MX),
        }
    }
    pub fn new() -> Self {
        Self::_new(S::default(), meta::WIDTH_DEF)
    }
    pub fn with_width(w: usize) -> Self {
        Self::_new(S::default(), w)
    }
    pub fn with_hasher(h: S) -> Self {
        Self::_new(h, meta::WIDTH_DEF)
    }
    pub fn with_width_and_hasher(w: usize, h: S) -> Self {
        Self::_new(h, w)
    }
    fn hash<Q>(&self, k: &Q) -> u32
    where
        Q: ?Sized + Hash,
    {
        let mut state = self.h.build_hasher();
        k.hash(&mut state);
        let h = state.finish();
        meta::mix((h ^ (h >> 32)) as u32)
    }
}

impl<T: TreeElement, S: AsHasher> Default for Tree<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

// reads
impl<T: TreeElement, S: AsHasher> Tree<T, S> {
    pub fn contains_key<'g, Q>(&'g self, k: &Q, g: &'g Guard) -> bool
    where
        Q: ?Sized + Comparable<T::Key>,
    {
        self._lookup::<access::RModeExists, _>(k, g)
    }
    pub fn get<'g, Q>(&'g self, k: &Q, g: &'g Guard) -> Option<&'g T::Value>
    where
        Q: ?Sized + Comparable<T::Key>,
    {
        self._lookup::<access::RModeRef, _>(k, g)
    }
    pub fn get_cloned<Q>(&self, k: &Q, g: &Guard) -> Option<T::Value>
    where
        Q: ?Sized + Comparable<T::Key>,
    {
        self._lookup::<access::RModeClone, _>(k, g)
    }
    pub fn get_full<'g, Q>(&'g self, k: &Q, g: &'g Guard) -> Option<&'g T>
    where
        Q: ?Sized + Comparable<T::Key>,
    {
        self._lookup::<access::RModeElementRef, _>(k, g)
    }
    fn _lookup<'g, R, Q>(&'g self, k: &Q, g: &'g Guard) -> R::Ret<'g>
    where
        R: ReadMode<T>,
        Q: ?Sized + Comparable<T::Key>,
    {
        let hash = self.hash(k);
        loop {
            match self.rd_descend(&self.root, k, hash, 0, None, g) {
                Lookup::Restart => {}
                Lookup::Found(e) => break R::ex(e),
                Lookup::NotFound => break R::nx(),
            }
        }
    }
}

// writes
impl<T: TreeElement, S: AsHasher> Tree<T, S> {
    fn patch<'g, P: PatchWrite<T>>(&'g self, mut patch: P, g: &'g Guard) -> P::Ret<'g> {
        let hash = self.hash(patch.target());
        loop {
            match self.wr_descend(&self.root, &mut patch, hash, 0, None, g) {
                Write::Restart => {}
                Write::Fresh => break P::nx_ret(),
                Write::Exist(e) => break P::ex_ret(e),
                Write::Reject(Some(e)) => break P::rj_ret(e),
                Write::Reject(None) => break P::nx_ret(),
            }
        }
    }
    fn _remove<'g, P: PatchDelete<T>>(&'g self, patch: P, g: &'g Guard) -> P::Ret<'g> {
        let hash = self.hash(patch.target());
        loop {
            match self.rm_descend(&self.root, &patch, hash, 0, None, g) {
                Remove::Restart => {}
                Remove::Removed(e) => {
                    gc(g);
                    break P::ex(e);
                }
                Remove::NotFound => break P::nx(),
                Remove::Reject(e) => break P::rj(e),
            }
        }
    }
}

// the engine
impl<T: TreeElement, S> Tree<T, S> {
    /// Structural emptiness: does the root branch array have any slots at all
    pub fn is_empty(&self, g: &Guard) -> bool {
        match unsafe {
            // UNSAFE(@ohsayan): acquire load under an active guard
            self.root.ld(g).deref()
        } {
            Main::Cn(cn) => cn.branches().is_empty(),
            Main::Tn(_) => unreachable!("logic,tombed root"),
        }
    }
    /// Throw away everything, in one root CAS. Linearizes at the swap
    pub fn clear(&self, g: &Guard) {
        loop {
            let m = self.root.ld(g);
            if self.root.cas(m, Main::Cn(CNode::empty()), g) {
                // best-effort, same as any concurrent len read
                self.l.store(0, ORD_RLX);
                gc(g);
                break;
            }
        }
    }
    /// A tomb below us: help contract it at the parent, then the caller restarts
    fn tomb_help(&self, parent: Option<&INode<T>>, lev: usize, g: &Guard) {
        match parent {
            Some(p) => self.clean(p, lev - self.w, g),
            // the root is never tombed
            None => unreachable!("logic,tombed root"),
        }
    }
    fn rd_descend<'g, Q>(
        &self,
        i: &'g INode<T>,
        k: &Q,
        hash: u32,
        lev: usize,
        parent: Option<&'g INode<T>>,
        g: &'g Guard,
    ) -> Lookup<'g, T>
    where
        Q: ?Sized + Comparable<T::Key>,
    {
        let m = i.ld(g);
        match unsafe {
            // UNSAFE(@ohsayan): acquire load under an active guard
            m.deref()
        } {
            Main::Cn(cn) => {
                let (flag, pos) = meta::flag_pos(hash, lev, cn.bmp(), self.w);
                if cn.bmp() & flag == 0 {
                    return Lookup::NotFound;
                }
                match &cn.branches()[pos] {
                    Branch::In(child) => self.rd_descend(child, k, hash, lev + self.w, Some(i), g),
                    Branch::Sn(sn) => {
                        if sn.hash() == hash {
                            match sn.get(k) {
                                Some(e) => Lookup::Found(e),
                                None => Lookup::NotFound,
                            }
                        } else {
                            Lookup::NotFound
                        }
                    }
                }
            }
            Main::Tn(_) => {
                self.tomb_help(parent, lev, g);
                Lookup::Restart
            }
        }
    }
    fn wr_descend<'g, P: PatchWrite<T>>(
        &self,
        i: &'g INode<T>,
        patch: &mut P,
        hash: u32,
        lev: usize,
        parent: Option<&'g INode<T>>,
        g: &'g Guard,
    ) -> Write<'g, T> {
        let m = i.ld(g);
        match unsafe {
            // UNSAFE(@ohsayan): acquire load under an active guard
            m.deref()
        } {
            Main::Cn(cn) => {
                let (flag, pos) = meta::flag_pos(hash, lev, cn.bmp(), self.w);
                if cn.bmp() & flag == 0 {
                    // no slot for this hash yet
                    if P::WMODE == WRITEMODE_REFRESH {
                        return Write::Reject(None);
                    }
                    let sn = Arc::new(SNode::single(hash, patch.nx_new()));
                    let ncn = cn.inserted(flag, pos, Branch::Sn(sn));
                    if i.cas(m, Main::Cn(ncn), g) {
                        self.incr_len();
                        Write::Fresh
                    } else {
                        Write::Restart
                    }
                } else {
                    match &cn.branches()[pos] {
                        Branch::In(child) => {
                            self.wr_descend(child, patch, hash, lev + self.w, Some(i), g)
                        }
                        Branch::Sn(sn) if sn.hash() == hash => match sn.get(patch.target()) {
                            Some(e) => {
                                if P::WMODE == WRITEMODE_FRESH {
                                    return Write::Reject(Some(e));
                                }
                                if !patch.ex_filter(e) {
                                    return Write::Reject(Some(e));
                                }
                                let nsn = Arc::new(sn.put(patch.ex_apply(e)));
                                let ncn = cn.updated(pos, Branch::Sn(nsn));
                                if i.cas(m, Main::Cn(ncn), g) {
                                    Write::Exist(e)
                                } else {
                                    Write::Restart
                                }
                            }
                            None => {
                                // same full hash, different key: a true collision
                                if P::WMODE == WRITEMODE_REFRESH {
                                    return Write::Reject(None);
                                }
                                let nsn = Arc::new(sn.put(patch.nx_new()));
                                let ncn = cn.updated(pos, Branch::Sn(nsn));
                                if i.cas(m, Main::Cn(ncn), g) {
                                    self.m.hlnode();
                                    self.incr_len();
                                    Write::Fresh
                                } else {
                                    Write::Restart
                                }
                            }
                        },
                        Branch::Sn(sn) => {
                            // shared slot prefix only; push both buckets down a level
                            if P::WMODE == WRITEMODE_REFRESH {
                                return Write::Reject(None);
                            }
                            let nsn = Arc::new(SNode::single(hash, patch.nx_new()));
                            let scn = CNode::dual(Arc::clone(sn), nsn, lev + self.w, self.w);
                            let nin = Branch::In(Arc::new(INode::new(Main::Cn(scn))));
                            let ncn = cn.updated(pos, nin);
                            if i.cas(m, Main::Cn(ncn), g) {
                                self.m.hsplit();
                                self.incr_len();
                                Write::Fresh
                            } else {
                                Write::Restart
                            }
                        }
                    }
                }
            }
            Main::Tn(_) => {
                self.tomb_help(parent, lev, g);
                Write::Restart
            }
        }
    }
    fn rm_descend<'g, P: PatchDelete<T>>(
        &self,
        i: &'g INode<T>,
        patch: &P,
        hash: u32,
        lev: usize,
        parent: Option<&'g INode<T>>,
        g: &'g Guard,
    ) -> Remove<'g, T> {
        let m = i.ld(g);
        match unsafe {
            // UNSAFE(@ohsayan): acquire load under an active guard
            m.deref()
        } {
            Main::Cn(cn) => {
                let (flag, pos) = meta::flag_pos(hash, lev, cn.bmp(), self.w);
                if cn.bmp() & flag == 0 {
                    return Remove::NotFound;
                }
                match &cn.branches()[pos] {
                    Branch::In(child) => {
                        let r = self.rm_descend(child, patch, hash, lev + self.w, Some(i), g);
                        if let Remove::Removed(_) = r {
                            // our removal may have left the child contracted into a tomb
                            if let Main::Tn(_) = unsafe {
                                // UNSAFE(@ohsayan): acquire load under an active guard
                                child.ld(g).deref()
                            } {
                                self.clean_parent(i, child, hash, lev, g);
                            }
                        }
                        r
                    }
                    Branch::Sn(sn) => {
                        if sn.hash() != hash {
                            return Remove::NotFound;
                        }
                        let e = match sn.get(patch.target()) {
                            Some(e) => e,
                            None => return Remove::NotFound,
                        };
                        if !patch.filter(e) {
                            return Remove::Reject(e);
                        }
                        let nmain = match sn.removed(patch.target()) {
                            Some(nsn) => Main::Cn(cn.updated(pos, Branch::Sn(Arc::new(nsn)))),
                            // last entry in the slot: drop the slot and maybe tomb
                            None => self.to_contracted(cn.removed(flag, pos), lev),
                        };
                        if i.cas(m, nmain, g) {
                            self.decr_len();
                            Remove::Removed(e)
                        } else {
                            Remove::Restart
                        }
                    }
                }
            }
            Main::Tn(_) => {
                self.tomb_help(parent, lev, g);
                Remove::Restart
            }
        }
    }
    /// A branch array down to one leaf below the root contracts into the
    /// leaf's tombed form, ready for the parent to swallow
    fn to_contracted(&self, cn: CNode<T>, lev: usize) -> Main<T> {
        if lev > 0 && cn.branches().len() == 1 {
            if let Branch::Sn(sn) = &cn.branches()[0] {
                self.m.htomb();
                return Main::Tn(TNode::new(Arc::clone(sn)));
            }
        }
        Main::Cn(cn)
    }
    /// A copy of `cn` with every tombed child resurrected in place, passed
    /// through contraction. The copy is local until the caller's CAS
    fn to_compressed<'g>(&self, cn: &CNode<T>, lev: usize, g: &'g Guard) -> Main<T> {
        let mut ncn = cn.copied();
        for slot in ncn.branches_mut() {
            if let Branch::In(child) = slot {
                if let Main::Tn(t) = unsafe {
                    // UNSAFE(@ohsayan): acquire load under an active guard
                    child.ld(g).deref()
                } {
                    *slot = t.resurrect();
                }
            }
        }
        self.to_contracted(ncn, lev)
    }
    /// Compress the branch array under `i`. CAS failure is fine here: it
    /// means somebody else already helped
    fn clean(&self, i: &INode<T>, lev: usize, g: &Guard) {
        let m = i.ld(g);
        if let Main::Cn(cn) = unsafe {
            // UNSAFE(@ohsayan): acquire load under an active guard
            m.deref()
        } {
            let _ = i.cas(m, self.to_compressed(cn, lev, g), g);
        }
    }
    /// Splice a tombed child out of its parent slot, retrying while the
    /// parent still points at the tomb and the CAS keeps losing
    fn clean_parent(
        &self,
        parent: &INode<T>,
        child: &Arc<INode<T>>,
        hash: u32,
        lev: usize,
        g: &Guard,
    ) {
        loop {
            let pm = parent.ld(g);
            match unsafe {
                // UNSAFE(@ohsayan): acquire load under an active guard
                pm.deref()
            } {
                Main::Cn(cn) => {
                    let (flag, pos) = meta::flag_pos(hash, lev, cn.bmp(), self.w);
                    if cn.bmp() & flag == 0 {
                        return;
                    }
                    match &cn.branches()[pos] {
                        Branch::In(cur) if Arc::ptr_eq(cur, child) => {
                            match unsafe {
                                // UNSAFE(@ohsayan): acquire load under an active guard
                                child.ld(g).deref()
                            } {
                                Main::Tn(t) => {
                                    let nmain =
                                        self.to_contracted(cn.updated(pos, t.resurrect()), lev);
                                    if parent.cas(pm, nmain, g) {
                                        return;
                                    }
                                    // raced on the parent slot; reread and go again
                                }
                                _ => return,
                            }
                        }
                        _ => return,
                    }
                }
                Main::Tn(_) => return,
            }
        }
    }
}

// iter support
impl<T: TreeElement, S> Tree<T, S> {
    pub fn iter_kv<'t, 'g, 'v>(&'t self, g: &'g Guard) -> IterKV<'t, 'g, 'v, T, S>
    where
        't: 'v,
        'g: 'v + 't,
    {
        IterKV::new(self, g)
    }
    pub fn iter_key<'t, 'g, 'v>(&'t self, g: &'g Guard) -> IterKey<'t, 'g, 'v, T, S>
    where
        't: 'v,
        'g: 'v + 't,
    {
        IterKey::new(self, g)
    }
    pub fn iter_val<'t, 'g, 'v>(&'t self, g: &'g Guard) -> IterVal<'t, 'g, 'v, T, S>
    where
        't: 'v,
        'g: 'v + 't,
    {
        IterVal::new(self, g)
    }
    /// The very first leaf in subhash order, or nothing if the trie is empty
    pub(super) fn iter_first<'g>(&'g self, g: &'g Guard) -> Option<&'g SNode<T>> {
        loop {
            if let Ok(r) = self.fdescend(&self.root, 0, None, g) {
                break r;
            }
        }
    }
    /// The first leaf strictly after `hash` in unsigned order, or nothing if
    /// the trie is exhausted past that point
    pub(super) fn iter_next<'g>(&'g self, hash: u32, g: &'g Guard) -> Option<&'g SNode<T>> {
        loop {
            if let Ok(r) = self.ndescend(&self.root, hash, 0, None, g) {
                break r;
            }
        }
    }
    /// Leftmost leaf of the subtree under `i`. Err means we tripped over a
    /// tomb, helped, and the whole scan has to restart from the root
    fn fdescend<'g>(
        &self,
        i: &'g INode<T>,
        lev: usize,
        parent: Option<&'g INode<T>>,
        g: &'g Guard,
    ) -> Result<Option<&'g SNode<T>>, ()> {
        match unsafe {
            // UNSAFE(@ohsayan): acquire load under an active guard
            i.ld(g).deref()
        } {
            Main::Cn(cn) => {
                for b in cn.branches() {
                    match b {
                        Branch::Sn(sn) => return Ok(Some(&**sn)),
                        Branch::In(child) => {
                            if let Some(l) = self.fdescend(child, lev + self.w, Some(i), g)? {
                                return Ok(Some(l));
                            }
                        }
                    }
                }
                Ok(None)
            }
            Main::Tn(_) => {
                self.tomb_help(parent, lev, g);
                Err(())
            }
        }
    }
    /// Walk `hash`'s own path as deep as it goes, then pick up siblings on
    /// the way back out
    fn ndescend<'g>(
        &self,
        i: &'g INode<T>,
        hash: u32,
        lev: usize,
        parent: Option<&'g INode<T>>,
        g: &'g Guard,
    ) -> Result<Option<&'g SNode<T>>, ()> {
        match unsafe {
            // UNSAFE(@ohsayan): acquire load under an active guard
            i.ld(g).deref()
        } {
            Main::Cn(cn) => {
                let (flag, pos) = meta::flag_pos(hash, lev, cn.bmp(), self.w);
                let mut from = pos;
                if cn.bmp() & flag != 0 {
                    match &cn.branches()[pos] {
                        Branch::In(child) => {
                            if let Some(l) = self.ndescend(child, hash, lev + self.w, Some(i), g)? {
                                return Ok(Some(l));
                            }
                        }
                        Branch::Sn(sn) => {
                            if sn.hash() > hash {
                                return Ok(Some(&**sn));
                            }
                        }
                    }
                    from = pos + 1;
                }
                for b in &cn.branches()[from..] {
                    match b {
                        Branch::Sn(sn) => return Ok(Some(&**sn)),
                        Branch::In(child) => {
                            if let Some(l) = self.fdescend(child, lev + self.w, Some(i), g)? {
                                return Ok(Some(l));
                            }
                        }
                    }
                }
                Ok(None)
            }
            Main::Tn(_) => {
                self.tomb_help(parent, lev, g);
                Err(())
            }
        }
    }
}

impl<T: TreeElement, S> fmt::Debug for Tree<T, S>
where
    T::Key: fmt::Debug,
    T::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = cpin();
        f.debug_map().entries(self.iter_kv(&g)).finish()
    }
}
