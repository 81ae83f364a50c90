//! The `Slot` and `Epoch` types are defined as new types over u64 to enforce type-safety between
//! the two types.
//!
//! `Slot` and `Epoch` have implementations which permit conversion, comparison and math operations
//! between each and `u64`, however specifically not between each other.
//!
//! The operator implementations on `Slot` and `Epoch` are saturating, they never wrap. Checked
//! arithmetic is available through `SafeArith`.
//!
//! It would be easy to define `PartialOrd` and other traits generically across all types which
//! implement `Into<u64>`, however this would allow operations between `Slots` and `Epochs` which
//! may lead to programming errors which are not detected by the compiler.

use safe_arith::SafeArith;
use serde::{Deserialize, Serialize};
use ssz::{Decode, DecodeError, Encode};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

#[derive(Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Slot(#[serde(with = "serde_utils::quoted_u64")] u64);

#[derive(Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Epoch(#[serde(with = "serde_utils::quoted_u64")] u64);

impl_common!(Slot);
impl_common!(Epoch);

impl Slot {
    pub const fn new(slot: u64) -> Slot {
        Slot(slot)
    }

    /// The epoch containing this slot.
    ///
    /// A zero `slots_per_epoch` maps every slot to epoch zero.
    pub fn epoch(self, slots_per_epoch: u64) -> Epoch {
        Epoch::new(self.0.checked_div(slots_per_epoch).unwrap_or(0))
    }

    pub fn max_value() -> Slot {
        Slot(u64::MAX)
    }
}

impl Epoch {
    pub const fn new(epoch: u64) -> Epoch {
        Epoch(epoch)
    }

    /// The far-future sentinel: an epoch that is never reached.
    pub fn max_value() -> Epoch {
        Epoch(u64::MAX)
    }

    /// The first slot in the epoch.
    pub fn start_slot(self, slots_per_epoch: u64) -> Slot {
        Slot::from(self.0.saturating_mul(slots_per_epoch))
    }

    /// The last slot in the epoch.
    pub fn end_slot(self, slots_per_epoch: u64) -> Slot {
        Slot::from(
            self.0
                .saturating_mul(slots_per_epoch)
                .saturating_add(slots_per_epoch.saturating_sub(1)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_to_epoch() {
        assert_eq!(Slot::new(0).epoch(32), Epoch::new(0));
        assert_eq!(Slot::new(31).epoch(32), Epoch::new(0));
        assert_eq!(Slot::new(32).epoch(32), Epoch::new(1));
        assert_eq!(Slot::new(100).epoch(0), Epoch::new(0));
    }

    #[test]
    fn epoch_start_end_slots() {
        let epoch = Epoch::new(3);
        assert_eq!(epoch.start_slot(8), Slot::new(24));
        assert_eq!(epoch.end_slot(8), Slot::new(31));
        assert_eq!(Epoch::max_value().start_slot(8), Slot::max_value());
    }

    #[test]
    fn operators_saturate() {
        assert_eq!(Epoch::new(0) - 1, Epoch::new(0));
        assert_eq!(Epoch::max_value() + 1, Epoch::max_value());

        let mut slot = Slot::new(1);
        slot -= 5;
        assert_eq!(slot, 0);
        slot += Slot::new(7);
        assert_eq!(slot, 7);
    }

    #[test]
    fn safe_arith() {
        assert_eq!(Epoch::new(4).safe_add(1), Ok(Epoch::new(5)));
        assert!(Epoch::max_value().safe_add(1).is_err());
        assert!(Epoch::new(0).safe_sub(Epoch::new(1)).is_err());
        assert_eq!(Slot::new(9).safe_rem(8), Ok(Slot::new(1)));
    }

    #[test]
    fn serde_is_quoted() {
        let yaml = serde_yaml::to_string(&Epoch::new(74240)).unwrap();
        assert_eq!(serde_yaml::from_str::<String>(&yaml).unwrap(), "74240");
        assert_eq!(
            serde_yaml::from_str::<Epoch>("\"7\"").unwrap(),
            Epoch::new(7)
        );
    }

    #[test]
    fn ssz_is_u64() {
        let epoch = Epoch::new(0x0102);
        assert_eq!(epoch.as_ssz_bytes(), 0x0102_u64.as_ssz_bytes());
        assert_eq!(Epoch::from_ssz_bytes(&epoch.as_ssz_bytes()), Ok(epoch));
    }
}
