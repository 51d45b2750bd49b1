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

/// Emit a pair of method definitions: the first body for debug builds, the
/// `else` body for release builds. Signatures must use the `self: &Self` form.
macro_rules! dbgfn {
    ($($(#[$attr:meta])* fn $fname:ident($self:ident: &Self $(, $arg:ident: $argty:ty)*) $(-> $ret:ty)? $body:block else $fallback:block)*) => {
        $(
            $(#[$attr])*
            #[cfg(debug_assertions)]
            fn $fname($self: &Self $(, $arg: $argty)*) $(-> $ret)? $body
            $(#[$attr])*
            #[cfg(not(debug_assertions))]
            fn $fname($self: &Self $(, $arg: $argty)*) $(-> $ret)? $fallback
        )*
    };
}

#[cfg(test)]
macro_rules! multi_assert_eq {
    ($($lhs:expr),* => $rhs:expr) => {
        $(assert_eq!($lhs, $rhs);)*
    };
}
