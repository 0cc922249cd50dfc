//! # Key search (`search`)
//!
//! Regular-expression search over the key names of a [`KeyStore`].
//!
//! [`find_keys`] compiles an untrusted pattern, asks the store for every key
//! below a root, and returns the names the pattern matches in the order the
//! store produced them. Failures are typed ([`SearchError`]) so a transport
//! can tell a bad pattern (client fault) from a broken store (server fault).
//!
//! Patterns follow the [`regex`] crate syntax: RE2-style, linear-time, no
//! backreferences or look-around. A pattern matches anywhere in a name unless
//! it anchors itself with `^` / `$`.

mod error;
mod filter;
mod pattern;

pub use crate::error::{SearchError, SearchResult, StoreError};
pub use crate::filter::{filter_key_names, find_keys, KeySearch};
pub use crate::pattern::KeyPattern;

pub use keydb::{KeyNames, KeyStore};
