//! Words and routine identifiers exchanged across the native boundary
//!
//! Every value crossing the boundary is a single 64-bit word. The native side
//! carries no type information, so [`EncodedArgument`] is nothing more than
//! the raw bits; meaning is assigned by the caller on either side.

use std::fmt;

use crate::error::{HostcallError, Result};

/// Opaque identifier of a native routine.
///
/// Equality is bitwise. Identifiers are usually hash constants supplied by a
/// [`RoutineCatalog`](crate::RoutineCatalog) or written inline by the caller.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RoutineId(u64);

impl RoutineId {
    /// Create from the raw 64-bit identifier
    #[inline(always)]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw 64-bit identifier
    #[inline(always)]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Parse an identifier written as `0x`-prefixed hex or as decimal.
    ///
    /// Underscores are accepted as digit separators.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let digits: String = trimmed.chars().filter(|c| *c != '_').collect();
        let parsed = match digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => digits.parse::<u64>(),
        };
        parsed
            .map(Self)
            .map_err(|_| HostcallError::InvalidRoutineId(text.to_string()))
    }
}

impl From<u64> for RoutineId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<RoutineId> for u64 {
    fn from(id: RoutineId) -> Self {
        id.0
    }
}

impl fmt::Display for RoutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl fmt::Debug for RoutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoutineId(0x{:016X})", self.0)
    }
}

/// Canonical wire form of exactly one argument.
///
/// Produced once by [`Argument::encode`](crate::Argument::encode) and consumed
/// once by the call-frame sequencer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EncodedArgument(u64);

impl EncodedArgument {
    /// Create from raw u64 bits
    #[inline(always)]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Get raw u64 bits
    #[inline(always)]
    pub const fn to_bits(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EncodedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedArgument({:#x})", self.0)
    }
}
