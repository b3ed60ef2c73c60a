//! Property-based tests for generator accumulation.

use hb_engine::{ControllerSnapshot, NoteOn, ResolveOptions, Resolver};
use hb_ir::{
    GeneratorId, Instrument, Preset, SampleHeader, SoundBank, SoundBankBuilder, ZoneBuilder,
};
use proptest::prelude::*;

/// Additive slots with a range wide enough that the tested sums never clamp.
const ADDITIVE: [GeneratorId; 4] = [
    GeneratorId::ModLfoToPitch,
    GeneratorId::VibLfoToPitch,
    GeneratorId::ModEnvToPitch,
    GeneratorId::ModLfoToFilterFc,
];

/// Build a bank where each level sets `slot` to its own amount.
///
/// Global zones write `slot`; local zones write the paired slot so the
/// local value never shadows the global one.
fn layered_bank(slot: GeneratorId, pair: GeneratorId, amounts: [i16; 4]) -> SoundBank {
    let [preset_global, preset_local, inst_global, inst_local] = amounts;
    let mut builder = SoundBankBuilder::new("prop");
    let s = builder.add_sample(SampleHeader::new("s", 0, 100));
    let inst = builder.add_instrument(
        Instrument::new("inst")
            .with_global_zone(ZoneBuilder::new().generator(slot, inst_global).build())
            .with_zone(ZoneBuilder::new().generator(pair, inst_local).sample(s).build()),
    );
    builder.add_preset(
        Preset::new("p", 0, 0)
            .with_global_zone(ZoneBuilder::new().generator(slot, preset_global).build())
            .with_zone(ZoneBuilder::new().generator(pair, preset_local).instrument(inst).build()),
    );
    builder.build().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// An additive slot resolves to the instrument value (else the default)
    /// plus the preset offset.
    #[test]
    fn additive_slots_sum_across_levels(
        slot in 0usize..ADDITIVE.len(),
        amounts in prop::array::uniform4(-2000i16..=2000),
    ) {
        let (slot, pair) = (ADDITIVE[slot], ADDITIVE[(slot + 1) % ADDITIVE.len()]);
        let bank = layered_bank(slot, pair, amounts);
        let options = ResolveOptions { default_modulators: false };
        let voices = Resolver::with_options(&bank, options)
            .resolve(&NoteOn::new(0, 0, 60, 100), &ControllerSnapshot::new())
            .unwrap();
        prop_assert_eq!(voices.len(), 1);

        let [preset_global, preset_local, inst_global, inst_local] = amounts.map(i32::from);
        let generators = &voices[0].generators;
        prop_assert_eq!(generators.get(slot), inst_global + preset_global);
        prop_assert_eq!(generators.get(pair), inst_local + preset_local);
    }

    /// Identical inputs against an unchanged graph give identical voices.
    #[test]
    fn resolution_is_deterministic(
        key in 0u8..=127,
        velocity in 0u8..=127,
        mod_wheel in 0u8..=127,
        pitch_wheel in 0u16..16384,
        amounts in prop::array::uniform4(-2000i16..=2000),
    ) {
        let bank = layered_bank(GeneratorId::ModEnvToPitch, GeneratorId::VibLfoToPitch, amounts);
        let snapshot =
            ControllerSnapshot::new().with_cc(1, mod_wheel).with_pitch_wheel(pitch_wheel);
        let resolver = Resolver::new(&bank);
        let note = NoteOn::new(0, 0, key, velocity);
        let first = resolver.resolve(&note, &snapshot).unwrap();
        prop_assert_eq!(first, resolver.resolve(&note, &snapshot).unwrap());
    }

    /// Every resolved value stays inside its slot's range.
    #[test]
    fn resolved_values_stay_in_range(
        key in 0u8..=127,
        velocity in 0u8..=127,
        volume in 0u8..=127,
        amounts in prop::array::uniform4(any::<i16>()),
    ) {
        let bank = layered_bank(GeneratorId::InitialAttenuation, GeneratorId::Pan, amounts);
        let snapshot = ControllerSnapshot::new().with_cc(7, volume);
        let voices =
            Resolver::new(&bank).resolve(&NoteOn::new(0, 0, key, velocity), &snapshot).unwrap();
        for voice in &voices {
            for id in GeneratorId::all() {
                let (min, max) = id.range();
                let base = voice.generators.get(id);
                prop_assert!(base >= min && base <= max, "{:?} = {}", id, base);
                let value = voice.value(id);
                prop_assert!(value >= min as f32 && value <= max as f32, "{:?} = {}", id, value);
            }
        }
    }
}
