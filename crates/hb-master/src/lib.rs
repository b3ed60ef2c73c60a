//! Bank host for hibank.
//!
//! Owns the current bank graph and applies the fallback policy, so a
//! synth front end only ever sees voices and never a lookup failure.

mod config;
mod error;

use std::sync::Arc;

use arc_swap::ArcSwap;
use arrayvec::ArrayVec;
use hb_engine::Resolver;
use hb_ir::GraphError;

// Re-export common types so callers don't need hb-ir/hb-engine directly.
pub use config::{
    EngineConfig, FallbackConfig, LoaderConfig, PolicySetting, ResolverConfig, PERCUSSION_BANK,
};
pub use error::HostError;
pub use hb_engine::{ControllerSnapshot, NoteOn, ResolveOptions, VoiceParams};
pub use hb_ir::SoundBank;

/// Outcome of a note-on.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub voices: Vec<VoiceParams>,
    /// Bank the voices were resolved from
    pub bank: u16,
    /// Program the voices were resolved from
    pub program: u8,
    /// Whether the requested preset was missing and a fallback was used
    pub fell_back: bool,
}

impl Resolution {
    fn silent(note: &NoteOn) -> Self {
        Self { voices: Vec::new(), bank: note.bank, program: note.program, fell_back: false }
    }

    pub fn is_silent(&self) -> bool {
        self.voices.is_empty()
    }
}

/// Holds the published bank graph.
///
/// Note-ons read a snapshot without locking; `publish` swaps in a new
/// graph atomically. A note-on that already took its snapshot finishes
/// against the old graph.
pub struct BankHost {
    bank: ArcSwap<SoundBank>,
    config: EngineConfig,
}

impl BankHost {
    pub fn new(bank: SoundBank) -> Self {
        Self::with_config(bank, EngineConfig::default())
    }

    pub fn with_config(bank: SoundBank, config: EngineConfig) -> Self {
        Self { bank: ArcSwap::from_pointee(bank), config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the bank graph, returning the previous one.
    pub fn publish(&self, bank: SoundBank) -> Arc<SoundBank> {
        let presets = bank.preset_count();
        let previous = self.bank.swap(Arc::new(bank));
        tracing::info!(presets, "published bank graph");
        previous
    }

    /// The graph note-ons currently resolve against.
    pub fn snapshot(&self) -> Arc<SoundBank> {
        self.bank.load_full()
    }

    /// Resolve exactly the requested preset, without fallback.
    pub fn try_note_on(
        &self,
        note: &NoteOn,
        controllers: &ControllerSnapshot,
    ) -> Result<Vec<VoiceParams>, HostError> {
        let bank = self.bank.load();
        let resolver = Resolver::with_options(&bank, self.config.resolve_options());
        Ok(resolver.resolve(note, controllers)?)
    }

    /// Resolve a note-on, falling back to other presets when the requested
    /// one is missing. Never fails; an unresolvable note is silent.
    pub fn note_on(&self, note: &NoteOn, controllers: &ControllerSnapshot) -> Resolution {
        // one snapshot for the whole fallback chain
        let bank = self.bank.load();
        let resolver = Resolver::with_options(&bank, self.config.resolve_options());

        for (step, candidate) in self.fallback_chain(note).iter().enumerate() {
            match resolver.resolve(candidate, controllers) {
                Ok(voices) => {
                    let fell_back = step > 0;
                    if fell_back {
                        tracing::debug!(
                            requested_bank = note.bank,
                            requested_program = note.program,
                            bank = candidate.bank,
                            program = candidate.program,
                            "preset fallback"
                        );
                    }
                    return Resolution {
                        voices,
                        bank: candidate.bank,
                        program: candidate.program,
                        fell_back,
                    };
                }
                Err(GraphError::PresetNotFound { .. }) => continue,
                Err(err) => {
                    tracing::warn!(
                        %err,
                        bank = candidate.bank,
                        program = candidate.program,
                        "note-on dropped"
                    );
                    return Resolution::silent(note);
                }
            }
        }

        tracing::warn!(bank = note.bank, program = note.program, "no preset or fallback available");
        Resolution::silent(note)
    }

    /// Presets to try, in order, without repeats.
    ///
    /// Percussion misses stay in the percussion bank; everything else
    /// tries bank 0 with the same program, then bank 0 with the fallback
    /// program.
    fn fallback_chain(&self, note: &NoteOn) -> ArrayVec<NoteOn, 3> {
        let fallback = &self.config.fallback;
        let mut chain = ArrayVec::new();
        let mut push = |candidate: NoteOn| {
            if !chain.contains(&candidate) {
                chain.push(candidate);
            }
        };
        push(*note);
        if note.bank == fallback.percussion_bank {
            push(note.with_preset(fallback.percussion_bank, fallback.program));
        } else {
            push(note.with_preset(0, note.program));
            push(note.with_preset(0, fallback.program));
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_ir::SoundBankBuilder;

    fn host() -> BankHost {
        BankHost::new(SoundBankBuilder::new("empty").build().unwrap())
    }

    #[test]
    fn melodic_chain_tries_bank_zero() {
        let chain = host().fallback_chain(&NoteOn::new(8, 25, 60, 100));
        let presets: Vec<(u16, u8)> = chain.iter().map(|n| (n.bank, n.program)).collect();
        assert_eq!(presets, vec![(8, 25), (0, 25), (0, 0)]);
    }

    #[test]
    fn percussion_chain_stays_in_bank() {
        let chain = host().fallback_chain(&NoteOn::new(128, 16, 36, 100));
        let presets: Vec<(u16, u8)> = chain.iter().map(|n| (n.bank, n.program)).collect();
        assert_eq!(presets, vec![(128, 16), (128, 0)]);
    }

    #[test]
    fn chain_has_no_repeats() {
        let chain = host().fallback_chain(&NoteOn::new(0, 0, 60, 100));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn empty_bank_is_silent() {
        let resolution = host().note_on(&NoteOn::new(0, 0, 60, 100), &ControllerSnapshot::new());
        assert!(resolution.is_silent());
        assert!(!resolution.fell_back);
    }
}
