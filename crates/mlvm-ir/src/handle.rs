//! Newtype index handles into an [`crate::Implementation`]'s per-entity-kind
//! arenas. Modeled on the `ExprId`/`ParamRange` index-handle convention:
//! handles are `Copy`, compared by value, and carry no lifetime, so a
//! `Builder` can hand them back to callers without borrowing the arena.

/// Converts an arena length to a handle index, panicking only if an arena
/// somehow grows past `u32::MAX` entries.
pub(crate) fn to_u32(len: usize, what: &str) -> u32 {
    match u32::try_from(len) {
        Ok(v) => v,
        Err(_) => panic_capacity_exceeded(what, len),
    }
}

#[cold]
#[inline(never)]
fn panic_capacity_exceeded(what: &str, len: usize) -> ! {
    panic!("{what} arena exceeded u32 capacity at {len} entries");
}

macro_rules! define_handle {
    ($name:ident, $what:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn from_len(len: usize) -> Self {
                Self(crate::handle::to_u32(len, $what))
            }

            #[must_use]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_handle!(ArgumentId, "argument");
define_handle!(ConstantId, "constant");
define_handle!(VariableId, "variable");
define_handle!(BlockId, "block");
define_handle!(OperationId, "operation");
