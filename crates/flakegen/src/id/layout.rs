use crate::{ConfigError, Result, SnowflakeId};

/// Field widths of a 64-bit Snowflake ID.
///
/// Fields are packed most significant first: timestamp delta, datacenter ID,
/// worker ID, then sequence in the low bits. The top bit is always left clear
/// so the value stays non-negative as an `i64`.
///
/// ```text
///  Bit Index:  63           63 62                                                    0
///              +--------------+-----------+--------------+----------+----------------+
///  Field:      | reserved (1) | timestamp | datacenter ID| worker ID|    sequence    |
///              +--------------+-----------+--------------+----------+----------------+
///              |<----------- MSB ---------------- 64 bits -------------- LSB ------->|
/// ```
///
/// # Example
///
/// ```
/// use flakegen::BitLayout;
///
/// let layout = BitLayout::SINGLE_WORKER;
/// let id = layout.encode(1000, 0, 5, 2).unwrap();
/// assert_eq!(id.to_raw(), (1000 << 22) | (5 << 12) | 2);
///
/// let parts = layout.decode(id);
/// assert_eq!(parts.timestamp_delta, 1000);
/// assert_eq!(parts.worker_id, 5);
/// assert_eq!(parts.sequence, 2);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "LayoutWidths"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitLayout {
    sequence_bits: u8,
    worker_bits: u8,
    datacenter_bits: u8,
    timestamp_bits: u8,
}

/// Unchecked widths as they arrive from a serde format.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutWidths {
    sequence_bits: u8,
    worker_bits: u8,
    datacenter_bits: u8,
    timestamp_bits: u8,
}

#[cfg(feature = "serde")]
impl TryFrom<LayoutWidths> for BitLayout {
    type Error = crate::Error;

    fn try_from(widths: LayoutWidths) -> Result<Self> {
        Self::new(
            widths.sequence_bits,
            widths.worker_bits,
            widths.datacenter_bits,
            widths.timestamp_bits,
        )
    }
}

/// The fields of an ID as stored, before the epoch is added back.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawParts {
    pub timestamp_delta: u64,
    pub datacenter_id: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

impl BitLayout {
    /// Bits available to the fields; the sign bit is reserved.
    pub const AVAILABLE_BITS: u32 = 63;

    /// 41-bit timestamp, 5-bit datacenter, 5-bit worker, 12-bit sequence.
    pub const TWITTER: Self = Self {
        sequence_bits: 12,
        worker_bits: 5,
        datacenter_bits: 5,
        timestamp_bits: 41,
    };

    /// 41-bit timestamp, 10-bit worker, 12-bit sequence, no datacenter field.
    pub const SINGLE_WORKER: Self = Self {
        sequence_bits: 12,
        worker_bits: 10,
        datacenter_bits: 0,
        timestamp_bits: 41,
    };

    /// Builds a layout from explicit field widths.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::LayoutTooWide`] if the widths add up to more than 63
    /// - [`ConfigError::EmptyTimestampField`] if `timestamp_bits` is zero
    pub fn new(
        sequence_bits: u8,
        worker_bits: u8,
        datacenter_bits: u8,
        timestamp_bits: u8,
    ) -> Result<Self> {
        let total = u32::from(sequence_bits)
            + u32::from(worker_bits)
            + u32::from(datacenter_bits)
            + u32::from(timestamp_bits);
        if total > Self::AVAILABLE_BITS {
            return Err(ConfigError::LayoutTooWide { total }.into());
        }
        if timestamp_bits == 0 {
            return Err(ConfigError::EmptyTimestampField.into());
        }
        Ok(Self {
            sequence_bits,
            worker_bits,
            datacenter_bits,
            timestamp_bits,
        })
    }

    /// Largest value a field of `bits` bits can hold: `2^bits - 1`.
    pub const fn max_value(bits: u8) -> u64 {
        match bits {
            0 => 0,
            64.. => u64::MAX,
            _ => (1 << bits) - 1,
        }
    }

    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    pub const fn worker_bits(&self) -> u8 {
        self.worker_bits
    }

    pub const fn datacenter_bits(&self) -> u8 {
        self.datacenter_bits
    }

    pub const fn timestamp_bits(&self) -> u8 {
        self.timestamp_bits
    }

    /// Whether this layout carries a separate datacenter field.
    pub const fn has_datacenter(&self) -> bool {
        self.datacenter_bits > 0
    }

    pub const fn max_sequence(&self) -> u64 {
        Self::max_value(self.sequence_bits)
    }

    pub const fn max_worker_id(&self) -> u64 {
        Self::max_value(self.worker_bits)
    }

    pub const fn max_datacenter_id(&self) -> u64 {
        Self::max_value(self.datacenter_bits)
    }

    /// Largest timestamp delta (milliseconds past the epoch) the layout can
    /// hold. About 69 years for 41 bits.
    pub const fn max_timestamp_delta(&self) -> u64 {
        Self::max_value(self.timestamp_bits)
    }

    pub const fn worker_shift(&self) -> u32 {
        self.sequence_bits as u32
    }

    pub const fn datacenter_shift(&self) -> u32 {
        self.sequence_bits as u32 + self.worker_bits as u32
    }

    pub const fn timestamp_shift(&self) -> u32 {
        self.sequence_bits as u32 + self.worker_bits as u32 + self.datacenter_bits as u32
    }

    /// Packs the fields into an ID.
    ///
    /// Identity fields and the sequence are masked to their widths; callers
    /// validate them up front (see [`Identity::new`]). The timestamp delta is
    /// checked on every call since it grows with wall-clock time.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TimestampOverflow`] if `timestamp_delta` needs more than
    /// `timestamp_bits` bits.
    ///
    /// [`Identity::new`]: crate::Identity::new
    pub fn encode(
        &self,
        timestamp_delta: u64,
        datacenter_id: u64,
        worker_id: u64,
        sequence: u64,
    ) -> Result<SnowflakeId> {
        let max = self.max_timestamp_delta();
        if timestamp_delta > max {
            return Err(ConfigError::TimestampOverflow {
                delta: timestamp_delta,
                max,
            }
            .into());
        }
        debug_assert!(datacenter_id <= self.max_datacenter_id(), "datacenter_id overflow");
        debug_assert!(worker_id <= self.max_worker_id(), "worker_id overflow");
        debug_assert!(sequence <= self.max_sequence(), "sequence overflow");

        let raw = (timestamp_delta << self.timestamp_shift())
            | ((datacenter_id & self.max_datacenter_id()) << self.datacenter_shift())
            | ((worker_id & self.max_worker_id()) << self.worker_shift())
            | (sequence & self.max_sequence());
        Ok(SnowflakeId::from_raw(raw))
    }

    /// Splits an ID back into its fields.
    ///
    /// Never fails: any 64-bit value decodes, though values this layout did not
    /// produce decode to meaningless fields.
    pub const fn decode(&self, id: SnowflakeId) -> RawParts {
        let raw = id.to_raw();
        RawParts {
            timestamp_delta: (raw >> self.timestamp_shift()) & self.max_timestamp_delta(),
            datacenter_id: (raw >> self.datacenter_shift()) & self.max_datacenter_id(),
            worker_id: (raw >> self.worker_shift()) & self.max_worker_id(),
            sequence: raw & self.max_sequence(),
        }
    }
}

impl Default for BitLayout {
    fn default() -> Self {
        Self::TWITTER
    }
}
