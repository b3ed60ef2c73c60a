//! Integration test: publish banks → note-on through the host → check
//! fallback and snapshot behaviour.

use std::sync::Arc;
use std::thread;

use hb_ir::{GeneratorId, Instrument, Preset, SampleHeader, SoundBankBuilder, ZoneBuilder};
use hb_master::{BankHost, ControllerSnapshot, EngineConfig, HostError, NoteOn, SoundBank};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A bank with the given (bank, program) presets, each one sample whose
/// coarse tune encodes the program so voices can be told apart.
fn bank_with(presets: &[(u16, u8)]) -> SoundBank {
    let mut builder = SoundBankBuilder::new("host test");
    let s = builder.add_sample(SampleHeader::new("s", 0, 1000));
    for &(bank, program) in presets {
        let inst = builder.add_instrument(
            Instrument::new("inst").with_zone(
                ZoneBuilder::new()
                    .generator(GeneratorId::CoarseTune, program as i16)
                    .sample(s)
                    .build(),
            ),
        );
        let zone = ZoneBuilder::new().instrument(inst).build();
        builder.add_preset(Preset::new("preset", bank, program).with_zone(zone));
    }
    builder.build().unwrap()
}

fn note(bank: u16, program: u8) -> NoteOn {
    NoteOn::new(bank, program, 60, 100)
}

// --- fallback ---

#[test]
fn existing_preset_resolves_directly() {
    init_tracing();
    let host = BankHost::new(bank_with(&[(0, 0), (0, 5)]));
    let resolution = host.note_on(&note(0, 5), &ControllerSnapshot::new());
    assert_eq!((resolution.bank, resolution.program), (0, 5));
    assert!(!resolution.fell_back);
    assert_eq!(resolution.voices.len(), 1);
}

#[test]
fn missing_bank_falls_back_to_same_program_in_bank_zero() {
    init_tracing();
    let host = BankHost::new(bank_with(&[(0, 0), (0, 5)]));
    let resolution = host.note_on(&note(3, 5), &ControllerSnapshot::new());
    assert_eq!((resolution.bank, resolution.program), (0, 5));
    assert!(resolution.fell_back);
}

#[test]
fn missing_program_falls_back_to_program_zero() {
    init_tracing();
    let host = BankHost::new(bank_with(&[(0, 0)]));
    let resolution = host.note_on(&note(0, 42), &ControllerSnapshot::new());
    assert_eq!((resolution.bank, resolution.program), (0, 0));
    assert!(resolution.fell_back);
    assert_eq!(resolution.voices[0].generators.get(GeneratorId::CoarseTune), 0);
}

#[test]
fn configured_fallback_program_is_used() {
    init_tracing();
    let config = EngineConfig::from_toml_str("[fallback]\nprogram = 5\n").unwrap();
    let host = BankHost::with_config(bank_with(&[(0, 0), (0, 5)]), config);
    let resolution = host.note_on(&note(0, 42), &ControllerSnapshot::new());
    assert_eq!(resolution.program, 5);
}

#[test]
fn percussion_falls_back_within_percussion_bank() {
    init_tracing();
    let host = BankHost::new(bank_with(&[(0, 0), (128, 0)]));
    let resolution = host.note_on(&note(128, 25), &ControllerSnapshot::new());
    assert_eq!((resolution.bank, resolution.program), (128, 0));
    assert!(resolution.fell_back);
}

#[test]
fn nothing_to_fall_back_to_is_silent() {
    init_tracing();
    let host = BankHost::new(bank_with(&[(0, 7)]));
    let resolution = host.note_on(&note(1, 3), &ControllerSnapshot::new());
    assert!(resolution.is_silent());
    assert!(!resolution.fell_back);
    assert_eq!((resolution.bank, resolution.program), (1, 3));
}

#[test]
fn try_note_on_reports_missing_preset() {
    init_tracing();
    let host = BankHost::new(bank_with(&[(0, 0)]));
    let err = host.try_note_on(&note(0, 42), &ControllerSnapshot::new()).unwrap_err();
    assert!(matches!(
        err,
        HostError::Graph(hb_ir::GraphError::PresetNotFound { bank: 0, program: 42 })
    ));
}

#[test]
fn corrupt_graph_is_silent_through_note_on() {
    init_tracing();
    let mut bank = bank_with(&[(0, 0)]);
    bank.samples.clear();
    let host = BankHost::new(bank);
    assert!(host.note_on(&note(0, 0), &ControllerSnapshot::new()).is_silent());
    assert!(host.try_note_on(&note(0, 0), &ControllerSnapshot::new()).is_err());
}

#[test]
fn config_disables_default_modulators() {
    init_tracing();
    let config =
        EngineConfig::from_toml_str("[resolver]\ndefault_modulators = false\n").unwrap();
    let host = BankHost::with_config(bank_with(&[(0, 0)]), config);
    let voices = host.try_note_on(&note(0, 0), &ControllerSnapshot::new()).unwrap();
    assert!(voices[0].live.is_empty());
}

#[test]
fn default_host_keeps_reset_controllers_neutral() {
    init_tracing();
    let mut builder = SoundBankBuilder::new("neutral");
    let s = builder.add_sample(SampleHeader::new("s", 0, 1000));
    let inst = builder.add_instrument(
        Instrument::new("inst")
            .with_global_zone(ZoneBuilder::new().generator(GeneratorId::Pan, 0).build())
            .with_zone(ZoneBuilder::new().key_range(60, 72).sample(s).build()),
    );
    let zone = ZoneBuilder::new().key_range(0, 127).vel_range(0, 127).instrument(inst).build();
    builder.add_preset(Preset::new("preset", 0, 0).with_zone(zone));
    let host = BankHost::new(builder.build().unwrap());

    let resolution = host.note_on(&NoteOn::new(0, 0, 64, 100), &ControllerSnapshot::new());
    assert_eq!(resolution.voices.len(), 1);
    let voice = &resolution.voices[0];
    assert!(!voice.live.is_empty());
    assert_eq!(voice.pan(), 0.0);
    assert_eq!(voice.value(GeneratorId::InitialPitch), 0.0);
    assert_eq!(voice.pitch_cents(), 400.0);
}

// --- publication ---

#[test]
fn publish_returns_previous_graph() {
    init_tracing();
    let host = BankHost::new(bank_with(&[(0, 0)]));
    let previous = host.publish(bank_with(&[(0, 0), (0, 1)]));
    assert_eq!(previous.preset_count(), 1);
    assert_eq!(host.snapshot().preset_count(), 2);
}

#[test]
fn held_snapshot_survives_publish() {
    init_tracing();
    let host = BankHost::new(bank_with(&[(0, 9)]));
    let held = host.snapshot();
    host.publish(bank_with(&[(0, 0)]));

    assert!(held.preset(0, 9).is_some());
    assert!(host.snapshot().preset(0, 9).is_none());
    let resolution = host.note_on(&note(0, 9), &ControllerSnapshot::new());
    assert!(resolution.fell_back);
}

#[test]
fn concurrent_note_ons_see_whole_graphs() {
    init_tracing();
    // same preset address in both graphs, told apart by the coarse tune marker
    let marked = |marker: i16| {
        let mut builder = SoundBankBuilder::new("marked");
        let s = builder.add_sample(SampleHeader::new("s", 0, 1000));
        let inst = builder.add_instrument(
            Instrument::new("inst").with_zone(
                ZoneBuilder::new().generator(GeneratorId::CoarseTune, marker).sample(s).build(),
            ),
        );
        let zone = ZoneBuilder::new().instrument(inst).build();
        builder.add_preset(Preset::new("preset", 0, 1).with_zone(zone));
        builder.build().unwrap()
    };
    let host = Arc::new(BankHost::new(marked(10)));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let host = Arc::clone(&host);
            thread::spawn(move || {
                for _ in 0..500 {
                    let resolution = host.note_on(&note(0, 1), &ControllerSnapshot::new());
                    assert!(!resolution.fell_back);
                    assert_eq!(resolution.voices.len(), 1);
                    let coarse = resolution.voices[0].generators.get(GeneratorId::CoarseTune);
                    assert!(coarse == 10 || coarse == 20, "torn graph: coarse tune {}", coarse);
                }
            })
        })
        .collect();

    for _ in 0..50 {
        host.publish(marked(20));
        host.publish(marked(10));
    }
    for reader in readers {
        reader.join().unwrap();
    }
}
