// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Casper SDK: Client Core
//!
//! Everything a client needs to get a transaction accepted by a Casper node,
//! short of actually talking to one: the typed value model, the canonical
//! byte encoding, both transaction formats, and the keys that sign them.
//! Transport is somebody else's problem (and a much less interesting one).
//!
//! ## Architecture
//!
//! The modules are layered leaf-first. Deploys borrow the approval machinery
//! from `transaction`; everything else only reaches downward:
//!
//! - **config**: Network constants, defaults, and argument names.
//! - **bytesrepr**: The canonical binary encoding. One wrong byte, one wrong hash.
//! - **crypto**: Ed25519 and Secp256k1 keys, signatures, blake2b digests.
//! - **time**: Millisecond timestamps and TTLs with their text forms.
//! - **cl**: CLType, CLValue, keys and runtime arguments.
//! - **deploy**: The legacy Deploy format and its builder.
//! - **transaction**: TransactionV1, its builder, and the approval machinery.
//!
//! ## Design Philosophy
//!
//! 1. Wire-format fidelity first. Anything a node would reject fails here,
//!    at construction, with a typed error.
//! 2. Entities are immutable once hashed; only approvals are appended.
//! 3. No I/O, no globals, no panics on untrusted input.
//! 4. If it touches a hash, it has tests. Plural.

pub mod bytesrepr;
pub mod cl;
pub mod config;
pub mod crypto;
pub mod deploy;
pub mod time;
pub mod transaction;

pub use primitive_types::{U128, U256, U512};
