// MIT License - Copyright (c) 2026 Peter Wright
// Area bit filters and object property query filters

use bitflags::bitflags;

use crate::constants::{MAX_FILTER_AREA, ObjectType};
use crate::error::{BridgeError, Result};
use crate::protocol::ObjectRecord;

/// Compute the area-membership bitmask for a 1-based area number.
///
/// Bit 0 is area 1, bit 1 is area 2 and so on.
pub fn filter_for_area(area: u16) -> Result<u64> {
    if area < 1 || area > MAX_FILTER_AREA {
        return Err(BridgeError::InvalidArgument(format!(
            "area number {} outside 1..={}",
            area, MAX_FILTER_AREA
        )));
    }
    Ok(1u64 << (area - 1))
}

bitflags! {
    /// Selection flags pushed down into object property requests.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFilter: u8 {
        /// Only objects with a non-empty name
        const NAMED_ONLY = 0b01;
        /// Only units with a load attached
        const ANY_LOAD   = 0b10;
    }
}

/// Filters applied to an object property query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectFilter {
    pub area_mask: Option<u64>,
    pub flags: PropertyFilter,
}

impl ObjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self) -> Self {
        self.flags |= PropertyFilter::NAMED_ONLY;
        self
    }

    pub fn any_load(mut self) -> Self {
        self.flags |= PropertyFilter::ANY_LOAD;
        self
    }

    pub fn area_mask(mut self, mask: u64) -> Self {
        self.area_mask = Some(mask);
        self
    }

    /// Scope the query to a single area.
    pub fn area(self, area: u16) -> Result<Self> {
        Ok(self.area_mask(filter_for_area(area)?))
    }

    pub fn named_only(&self) -> bool {
        self.flags.contains(PropertyFilter::NAMED_ONLY)
    }

    pub fn loads_only(&self) -> bool {
        self.flags.contains(PropertyFilter::ANY_LOAD)
    }

    /// Name selector: 0 = any, 1 = named only.
    pub fn name_selector(&self) -> u8 {
        u8::from(self.named_only())
    }

    /// Area selector: 0 = all areas.
    pub fn area_selector(&self) -> u64 {
        self.area_mask.unwrap_or(0)
    }

    /// Load selector: 0 = any unit, 1 = units with a load.
    pub fn load_selector(&self) -> u8 {
        u8::from(self.loads_only())
    }

    /// Whether `record` passes this filter.
    ///
    /// Records with area 0 are not area-scoped and pass any area mask;
    /// area records are never area-filtered.
    pub fn matches(&self, record: &ObjectRecord) -> bool {
        if self.named_only() && !record.is_named() {
            return false;
        }
        if self.loads_only() && record.unit_type_code() == Some(0) {
            return false;
        }
        match self.area_mask {
            Some(mask) if record.object_type() != ObjectType::Area => {
                match filter_for_area(record.area) {
                    Ok(bit) => mask & bit != 0,
                    Err(_) => record.area == 0,
                }
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_sets_single_bit() {
        for n in 1..=64u16 {
            let mask = filter_for_area(n).unwrap();
            assert_eq!(mask.count_ones(), 1, "area {}", n);
            assert_eq!(mask.trailing_zeros(), u32::from(n - 1), "area {}", n);
        }
    }

    #[test]
    fn test_filter_known_values() {
        assert_eq!(filter_for_area(1).unwrap(), 0b1);
        assert_eq!(filter_for_area(2).unwrap(), 0b10);
        assert_eq!(filter_for_area(8).unwrap(), 0x80);
        assert_eq!(filter_for_area(64).unwrap(), 1u64 << 63);
    }

    #[test]
    fn test_filter_rejects_out_of_range() {
        assert!(matches!(filter_for_area(0), Err(BridgeError::InvalidArgument(_))));
        assert!(matches!(filter_for_area(65), Err(BridgeError::InvalidArgument(_))));
    }

    #[test]
    fn test_object_filter_selectors() {
        let f = ObjectFilter::new();
        assert_eq!(f.name_selector(), 0);
        assert_eq!(f.area_selector(), 0);
        assert_eq!(f.load_selector(), 0);

        let f = ObjectFilter::new().named().any_load().area(3).unwrap();
        assert!(f.named_only());
        assert!(f.loads_only());
        assert_eq!(f.name_selector(), 1);
        assert_eq!(f.area_selector(), 0b100);
        assert_eq!(f.load_selector(), 1);
    }

    #[test]
    fn test_object_filter_matches() {
        use crate::constants::UnitType;

        let f = ObjectFilter::new().named().any_load().area(2).unwrap();
        assert!(f.matches(&ObjectRecord::unit(1, "Lamp", 2, UnitType::Upb)));
        assert!(!f.matches(&ObjectRecord::unit(2, "", 2, UnitType::Upb)));
        assert!(!f.matches(&ObjectRecord::unit(3, "Lamp", 1, UnitType::Upb)));
        assert!(f.matches(&ObjectRecord::unit(4, "Lamp", 0, UnitType::Upb)));

        let mut unloaded = ObjectRecord::unit(5, "Spare", 2, UnitType::Upb);
        unloaded.attributes = crate::protocol::ObjectAttributes::Unit {
            unit_type: 0,
            status: 0,
        };
        assert!(!f.matches(&unloaded));

        // areas ignore the mask
        assert!(ObjectFilter::new().area(1).unwrap().matches(&ObjectRecord::area(3, "Garage")));
    }

    #[test]
    fn test_object_filter_area_error() {
        assert!(ObjectFilter::new().area(0).is_err());
    }
}
