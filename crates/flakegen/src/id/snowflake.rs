use core::fmt;

use crate::ReservedBitError;

/// A 64-bit Snowflake ID.
///
/// The value is opaque: its fields only mean something relative to the
/// [`BitLayout`] and epoch of the generator that produced it (see
/// [`Generator::parse`]). IDs from one generator sort in creation order.
///
/// The reserved top bit is never set, so every ID also fits an `i64`.
/// Conversions from raw integers, including deserialization, reject values
/// that set it.
///
/// [`BitLayout`]: crate::BitLayout
/// [`Generator::parse`]: crate::Generator::parse
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u64", into = "u64")
)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SnowflakeId(u64);

impl SnowflakeId {
    /// Largest raw value an ID can hold.
    pub const MAX_RAW: u64 = i64::MAX as u64;

    /// Callers guarantee the top bit is clear.
    pub(crate) const fn from_raw(raw: u64) -> Self {
        debug_assert!(raw <= Self::MAX_RAW, "reserved bit set");
        Self(raw)
    }

    pub const fn to_raw(&self) -> u64 {
        self.0
    }

    /// The ID as a signed integer, for storage that lacks unsigned 64-bit
    /// columns.
    pub const fn to_i64(&self) -> i64 {
        self.0 as i64
    }

    /// Returns the ID as a zero-padded 20-digit string, which sorts the same
    /// way the IDs do.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.0)
    }
}

impl TryFrom<u64> for SnowflakeId {
    type Error = ReservedBitError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        if raw > Self::MAX_RAW {
            return Err(ReservedBitError { value: raw });
        }
        Ok(Self(raw))
    }
}

impl TryFrom<i64> for SnowflakeId {
    type Error = ReservedBitError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::try_from(raw as u64)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.0
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnowflakeId({} = {:#018x})", self.0, self.0)
    }
}

/// A decoded ID, with the epoch added back to the timestamp.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParsedId {
    /// Unix time in milliseconds.
    pub timestamp: u64,
    pub datacenter_id: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_string_sorts_like_the_id() {
        let small = SnowflakeId::from_raw(42);
        let large = SnowflakeId::from_raw(1 << 40);
        assert_eq!(small.to_padded_string(), "00000000000000000042");
        assert!(small < large);
        assert!(small.to_padded_string() < large.to_padded_string());
    }

    #[test]
    fn converts_to_signed_without_loss() {
        let id = SnowflakeId::try_from((1u64 << 63) - 1).unwrap();
        assert_eq!(id.to_i64(), i64::MAX);
        assert_eq!(u64::from(id), (1 << 63) - 1);
        assert_eq!(SnowflakeId::try_from(id.to_i64()).unwrap(), id);
    }

    #[test]
    fn rejects_reserved_top_bit() {
        let err = SnowflakeId::try_from(1u64 << 63).unwrap_err();
        assert_eq!(err, ReservedBitError { value: 1 << 63 });
        assert!(SnowflakeId::try_from(u64::MAX).is_err());
        assert!(SnowflakeId::try_from(-1i64).is_err());
        assert!(SnowflakeId::try_from(0u64).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_plain_integer() {
        let id = SnowflakeId::from_raw(4_194_304_020_480);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "4194304020480");
        let back: SnowflakeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_rejects_reserved_top_bit() {
        let err = serde_json::from_str::<SnowflakeId>("9223372036854775808").unwrap_err();
        assert!(err.to_string().contains("reserved top bit"), "{err}");
        let max: SnowflakeId = serde_json::from_str("9223372036854775807").unwrap();
        assert_eq!(max.to_raw(), SnowflakeId::MAX_RAW);
    }
}
