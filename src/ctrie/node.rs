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

/*
    node taxonomy
    ---
    Everything in here is immutable once published, with exactly one exception:
    the indirection node's main pointer. That single mutation point is what
    makes the whole structure lock-free: writers prepare a fresh main off to
    the side and swing it in with one CAS.

    Branch slots are Arc-shared on purpose. A copy-on-write CNode and the
    displaced original alias the untouched children, and whichever of the two
    gets retired last must not take the children down with it.
*/

use {
    super::meta::{self, LNode, TreeElement},
    crate::{
        sync::atm::{upin, Atomic, Guard, Owned, Shared},
        Comparable,
    },
    std::sync::Arc,
};

/// What an indirection slot points to
pub(super) enum Main<T> {
    /// a branch array
    Cn(CNode<T>),
    /// a tombed leaf: logically removed, waiting for a helper to contract it
    Tn(TNode<T>),
}

/// A slot inside a CNode's compact array
pub(super) enum Branch<T> {
    In(Arc<INode<T>>),
    Sn(Arc<SNode<T>>),
}

impl<T> Clone for Branch<T> {
    fn clone(&self) -> Self {
        match self {
            Self::In(i) => Self::In(Arc::clone(i)),
            Self::Sn(s) => Self::Sn(Arc::clone(s)),
        }
    }
}

/// The indirection node. The only mutable node in the trie; its identity is
/// its address
pub(super) struct INode<T> {
    main: Atomic<Main<T>>,
}

impl<T: 'static> INode<T> {
    pub fn new(m: Main<T>) -> Self {
        Self {
            main: Atomic::new_alloc(m),
        }
    }
    #[inline(always)]
    pub fn ld<'g>(&self, g: &'g Guard) -> Shared<'g, Main<T>> {
        self.main.ld_acq(g)
    }
    /// Attempt to swing the main pointer from `o` to `n`. On success the
    /// displaced main is retired to the epoch collector; on failure the
    /// never-published `n` is destroyed right here
    pub fn cas<'g>(&self, o: Shared<'g, Main<T>>, n: Main<T>, g: &'g Guard) -> bool {
        debug_assert!(!o.is_null(), "logic,null main");
        match self.main.cx_rel(o, Owned::new(n), g) {
            Ok(_) => {
                unsafe {
                    // UNSAFE(@ohsayan): we displaced it, so we retire it; readers
                    // from earlier epochs keep it alive until they unpin
                    g.defer_destroy(o);
                }
                true
            }
            Err(e) => {
                // our loss is somebody else's progress
                drop(e.new);
                false
            }
        }
    }
}

impl<T> Drop for INode<T> {
    fn drop(&mut self) {
        unsafe {
            // UNSAFE(@ohsayan): strong count is zero and every epoch that could
            // have observed us has passed, so we're the sole owner
            let g = upin();
            let m = self.main.ld_rlx(g);
            debug_assert!(!m.is_null(), "logic,null main");
            drop(m.into_owned());
        }
    }
}

/// The branch node: a bitmap plus the compact array of present slots, kept in
/// subhash-ascending order. All edits are pure
pub(super) struct CNode<T> {
    bmp: u64,
    br: Box<[Branch<T>]>,
}

impl<T> CNode<T> {
    pub fn empty() -> Self {
        Self {
            bmp: 0,
            br: Vec::new().into_boxed_slice(),
        }
    }
    #[inline(always)]
    pub const fn bmp(&self) -> u64 {
        self.bmp
    }
    #[inline(always)]
    pub fn branches(&self) -> &[Branch<T>] {
        &self.br
    }
    #[inline(always)]
    pub fn branches_mut(&mut self) -> &mut [Branch<T>] {
        &mut self.br
    }
    /// Shallow clone. The clone may be edited in place as long as it has not
    /// been published
    pub fn copied(&self) -> Self {
        Self {
            bmp: self.bmp,
            br: self.br.clone(),
        }
    }
    pub fn inserted(&self, flag: u64, pos: usize, b: Branch<T>) -> Self {
        debug_assert_eq!(self.bmp & flag, 0, "logic,flag already set");
        let mut nbr = Vec::with_capacity(self.br.len() + 1);
        nbr.extend(self.br[..pos].iter().cloned());
        nbr.push(b);
        nbr.extend(self.br[pos..].iter().cloned());
        Self {
            bmp: self.bmp | flag,
            br: nbr.into_boxed_slice(),
        }
    }
    pub fn updated(&self, pos: usize, b: Branch<T>) -> Self {
        debug_assert!(pos < self.br.len(), "logic,position out of bounds");
        let mut nbr: Vec<Branch<T>> = self.br.to_vec();
        nbr[pos] = b;
        Self {
            bmp: self.bmp,
            br: nbr.into_boxed_slice(),
        }
    }
    pub fn removed(&self, flag: u64, pos: usize) -> Self {
        debug_assert_ne!(self.bmp & flag, 0, "logic,flag not set");
        let mut nbr = Vec::with_capacity(self.br.len() - 1);
        nbr.extend(self.br[..pos].iter().cloned());
        nbr.extend(self.br[pos + 1..].iter().cloned());
        Self {
            bmp: self.bmp & !flag,
            br: nbr.into_boxed_slice(),
        }
    }
}

impl<T: 'static> CNode<T> {
    /// Grow a subtree that separates two buckets whose hashes differ but whose
    /// chunks collided at the previous level. Recurses until a level tells
    /// them apart (one always exists, since the full hashes differ)
    pub fn dual(a: Arc<SNode<T>>, b: Arc<SNode<T>>, lev: usize, w: usize) -> Self {
        debug_assert_ne!(a.hash(), b.hash(), "logic,dual buckets collide");
        let fa = meta::flag(a.hash(), lev, w);
        let fb = meta::flag(b.hash(), lev, w);
        if fa == fb {
            let deep = Self::dual(a, b, lev + w, w);
            Self {
                bmp: fa,
                br: vec![Branch::In(Arc::new(INode::new(Main::Cn(deep))))].into_boxed_slice(),
            }
        } else {
            let (l, r) = if fa < fb { (a, b) } else { (b, a) };
            Self {
                bmp: fa | fb,
                br: vec![Branch::Sn(l), Branch::Sn(r)].into_boxed_slice(),
            }
        }
    }
}

/// The storage (leaf) node: one entry, or a terminal collision bucket of
/// entries sharing the full mixed hash
pub(super) struct SNode<T> {
    h: u32,
    d: SNodeData<T>,
}

enum SNodeData<T> {
    One(T),
    Many(LNode<T>),
}

impl<T> SNode<T> {
    pub fn single(h: u32, e: T) -> Self {
        Self {
            h,
            d: SNodeData::One(e),
        }
    }
    #[inline(always)]
    pub const fn hash(&self) -> u32 {
        self.h
    }
    pub fn len(&self) -> usize {
        match &self.d {
            SNodeData::One(_) => 1,
            SNodeData::Many(es) => es.len(),
        }
    }
    pub fn first(&self) -> &T {
        match &self.d {
            SNodeData::One(e) => e,
            SNodeData::Many(es) => {
                debug_assert!(!es.is_empty(), "logic,empty bucket");
                &es[0]
            }
        }
    }
}

impl<T: TreeElement> SNode<T> {
    pub fn get<Q: ?Sized + Comparable<T::Key>>(&self, k: &Q) -> Option<&T> {
        match &self.d {
            SNodeData::One(e) => k.cmp_eq(e.key()).then_some(e),
            SNodeData::Many(es) => es.iter().find(|e| k.cmp_eq(e.key())),
        }
    }
    /// A new leaf with `e` joining (or replacing its key's entry in) this one.
    /// Caller guarantees the hashes match
    pub fn put(&self, e: T) -> Self {
        match &self.d {
            SNodeData::One(cur) if cur.key() == e.key() => Self::single(self.h, e),
            SNodeData::One(cur) => {
                let mut es = LNode::new();
                es.push(cur.clone());
                es.push(e);
                Self {
                    h: self.h,
                    d: SNodeData::Many(es),
                }
            }
            SNodeData::Many(es) => {
                let mut nes: LNode<T> = es.iter().filter(|x| x.key() != e.key()).cloned().collect();
                nes.push(e);
                Self {
                    h: self.h,
                    d: SNodeData::Many(nes),
                }
            }
        }
    }
    /// A new leaf with `k` gone; the slot itself vanishes (None) when the last
    /// entry goes, and a two-entry bucket collapses back into a singleton.
    /// Caller guarantees `k` is present
    pub fn removed<Q: ?Sized + Comparable<T::Key>>(&self, k: &Q) -> Option<Self> {
        debug_assert!(self.get(k).is_some(), "logic,removing absent key");
        match &self.d {
            SNodeData::One(_) => None,
            SNodeData::Many(es) => {
                debug_assert!(es.len() > 1, "logic,undersized bucket");
                if es.len() == 2 {
                    es.iter()
                        .find(|e| !k.cmp_eq(e.key()))
                        .map(|e| Self::single(self.h, e.clone()))
                } else {
                    let nes: LNode<T> = es.iter().filter(|e| !k.cmp_eq(e.key())).cloned().collect();
                    Some(Self {
                        h: self.h,
                        d: SNodeData::Many(nes),
                    })
                }
            }
        }
    }
    /// The entry following `cur` (located by key equality) in bucket order;
    /// nothing if `cur` is last or missing
    pub fn successor(&self, cur: &T) -> Option<&T> {
        match &self.d {
            SNodeData::One(_) => None,
            SNodeData::Many(es) => {
                let at = es.iter().position(|e| e.key() == cur.key())?;
                es.get(at + 1)
            }
        }
    }
}

/// The tombed form of a leaf: same payload, different obligation. Observing
/// one of these means you help splice it out before you retry
pub(super) struct TNode<T> {
    sn: Arc<SNode<T>>,
}

impl<T> TNode<T> {
    pub const fn new(sn: Arc<SNode<T>>) -> Self {
        Self { sn }
    }
    /// Bring the payload back as a live branch for the parent's slot
    pub fn resurrect(&self) -> Branch<T> {
        Branch::Sn(Arc::clone(&self.sn))
    }
}
