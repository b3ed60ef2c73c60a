//! Property-based tests for zone matching and generator layering.

use hb_ir::{GeneratorId, Range, Zone, ZoneBuilder, ZoneOverrides};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// A zone matches a note iff key and velocity both lie in their inclusive ranges.
    #[test]
    fn matches_iff_both_ranges_contain(
        key_lo in 0u8..=128, key_hi in 0u8..=128,
        vel_lo in 0u8..=128, vel_hi in 0u8..=128,
        key in 0u8..=127, vel in 0u8..=127,
    ) {
        let zone = Zone {
            key_range: Range::new(key_lo, key_hi),
            vel_range: Range::new(vel_lo, vel_hi),
            ..Zone::new()
        };
        let expected = key_lo <= key && key <= key_hi && vel_lo <= vel && vel <= vel_hi;
        prop_assert_eq!(zone.matches(key, vel), expected);
    }

    /// Packed range amounts decode lo from the low byte and hi from the high byte.
    #[test]
    fn packed_range_decodes_bytes(lo in any::<u8>(), hi in any::<u8>()) {
        let range = Range::from_amount(i16::from_le_bytes([lo, hi]));
        prop_assert_eq!(range, Range::new(lo, hi));
    }

    /// Within one level the local zone always shadows the global zone.
    #[test]
    fn local_value_shadows_global(
        global in any::<i16>(),
        local in proptest::option::of(any::<i16>()),
    ) {
        let global_zone = ZoneBuilder::new().generator(GeneratorId::Pan, global).build();
        let mut local_zone = ZoneBuilder::new().sample(0);
        if let Some(v) = local {
            local_zone = local_zone.generator(GeneratorId::Pan, v);
        }
        let overrides = ZoneOverrides::layered(Some(&global_zone), &local_zone.build());
        prop_assert_eq!(overrides.get(GeneratorId::Pan), Some(local.unwrap_or(global)));
    }

    /// Every raw id either maps to a slot whose raw id round-trips or to nothing.
    #[test]
    fn raw_generator_ids_are_consistent(raw in any::<u16>()) {
        if let Some(id) = GeneratorId::from_raw(raw) {
            prop_assert_eq!(id.raw(), raw);
        }
    }
}
