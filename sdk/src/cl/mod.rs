//! # The CL Value Model
//!
//! Everything the execution engine knows about a value is in here: its shape
//! ([`CLType`]), its canonical bytes ([`CLValue`]), the global-state
//! addresses values refer to ([`Key`], [`URef`], [`AccountHash`]), and the
//! named argument lists deploys and transactions carry ([`RuntimeArgs`]).
//!
//! [`CLTyped`] is the compile-time bridge: a Rust type that implements it
//! knows its own `CLType`, so `CLValue::from_t(42u64)` and
//! `value.to_t::<Option<String>>()` need no runtime type hints.

mod cl_type;
mod cl_value;
mod key;
mod named_arg;

use std::collections::BTreeMap;

use primitive_types::{U128, U256, U512};

use crate::bytesrepr::Bytes;
use crate::crypto::PublicKey;

pub use cl_type::{tags, CLType, CLTypeParseError};
pub use cl_value::{CLValue, CLValueError};
pub use key::{AccessRights, AccountHash, Key, KeyParseError, URef};
pub use named_arg::{NamedArg, RuntimeArgs};

/// Rust types with a fixed, statically known [`CLType`].
pub trait CLTyped {
    /// The descriptor of every value of this type.
    fn cl_type() -> CLType;
}

macro_rules! impl_cl_typed {
    ($($ty:ty => $cl_type:expr),* $(,)?) => {$(
        impl CLTyped for $ty {
            fn cl_type() -> CLType {
                $cl_type
            }
        }
    )*};
}

impl_cl_typed!(
    bool => CLType::Bool,
    i32 => CLType::I32,
    i64 => CLType::I64,
    u8 => CLType::U8,
    u32 => CLType::U32,
    u64 => CLType::U64,
    U128 => CLType::U128,
    U256 => CLType::U256,
    U512 => CLType::U512,
    () => CLType::Unit,
    str => CLType::String,
    String => CLType::String,
    Key => CLType::Key,
    URef => CLType::URef,
    PublicKey => CLType::PublicKey,
    Bytes => CLType::list(CLType::U8),
);

impl<T: CLTyped + ?Sized> CLTyped for &T {
    fn cl_type() -> CLType {
        T::cl_type()
    }
}

impl<T: CLTyped> CLTyped for Option<T> {
    fn cl_type() -> CLType {
        CLType::option(T::cl_type())
    }
}

impl<T: CLTyped> CLTyped for Vec<T> {
    fn cl_type() -> CLType {
        CLType::list(T::cl_type())
    }
}

impl<const N: usize> CLTyped for [u8; N] {
    fn cl_type() -> CLType {
        CLType::ByteArray(N as u32)
    }
}

impl<T: CLTyped, E: CLTyped> CLTyped for Result<T, E> {
    fn cl_type() -> CLType {
        CLType::result(T::cl_type(), E::cl_type())
    }
}

impl<K: CLTyped, V: CLTyped> CLTyped for BTreeMap<K, V> {
    fn cl_type() -> CLType {
        CLType::map(K::cl_type(), V::cl_type())
    }
}

impl<T1: CLTyped> CLTyped for (T1,) {
    fn cl_type() -> CLType {
        CLType::tuple1(T1::cl_type())
    }
}

impl<T1: CLTyped, T2: CLTyped> CLTyped for (T1, T2) {
    fn cl_type() -> CLType {
        CLType::tuple2(T1::cl_type(), T2::cl_type())
    }
}

impl<T1: CLTyped, T2: CLTyped, T3: CLTyped> CLTyped for (T1, T2, T3) {
    fn cl_type() -> CLType {
        CLType::tuple3(T1::cl_type(), T2::cl_type(), T3::cl_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_generic_types() {
        assert_eq!(
            <Option<Vec<U512>>>::cl_type(),
            CLType::option(CLType::list(CLType::U512))
        );
        assert_eq!(<[u8; 32]>::cl_type(), CLType::ByteArray(32));
        assert_eq!(
            <BTreeMap<String, Result<(), u8>>>::cl_type(),
            CLType::map(CLType::String, CLType::result(CLType::Unit, CLType::U8))
        );
        assert_eq!(<&str>::cl_type(), CLType::String);
        assert_eq!(Bytes::cl_type(), Vec::<u8>::cl_type());
    }
}
