//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!
//! The event mapping is platform independent; playback is wasm32 only.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Claw starts its descent
    GrabStart,
    /// Claw closed on a toy
    Grip,
    /// Claw closed on nothing
    Miss,
    /// Toy dropped down the chute
    Deposit,
    /// On-screen direction button
    Nudge,
}

impl SoundEffect {
    /// Sound for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::GrabStarted => Some(SoundEffect::GrabStart),
            GameEvent::Grabbed { .. } => Some(SoundEffect::Grip),
            GameEvent::Missed => Some(SoundEffect::Miss),
            GameEvent::Deposited { .. } => Some(SoundEffect::Deposit),
            GameEvent::ClawReady
            | GameEvent::Replenished { .. }
            | GameEvent::Paused
            | GameEvent::Resumed => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::SoundEffect;
    use crate::settings::Settings;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_sfx_volume(),
            }
        }

        /// Pick up volume/mute changes
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_sfx_volume();
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::GrabStart => self.play_grab_start(ctx, vol),
                SoundEffect::Grip => self.play_grip(ctx, vol),
                SoundEffect::Miss => self.play_miss(ctx, vol),
                SoundEffect::Deposit => self.play_deposit(ctx, vol),
                SoundEffect::Nudge => self.play_nudge(ctx, vol),
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Motor whirr that falls with the claw (one phase long)
        fn play_grab_start(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 180.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol * 0.12, t).ok();
                gain.gain()
                    .linear_ramp_to_value_at_time(vol * 0.08, t + 0.9)
                    .ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 1.0)
                    .ok();
                osc.frequency().set_value_at_time(180.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(110.0, t + 1.0)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 1.05).ok();
            }

            // Gear rattle on top
            if let Some((osc, gain)) = self.create_osc(ctx, 45.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.05, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 1.0)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 1.05).ok();
            }
        }

        /// Metallic clack of the fingers closing on something
        fn play_grip(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.06)
                    .ok();
                osc.frequency().set_value_at_time(900.0, t).ok();
                osc.frequency().set_value_at_time(600.0, t + 0.02).ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.08).ok();
            }

            // Soft thump of the plush
            if let Some((osc, gain)) = self.create_osc(ctx, 140.0, OscillatorType::Sine) {
                gain.gain().set_value_at_time(vol * 0.4, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                    .ok();
                osc.frequency().set_value_at_time(140.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(70.0, t + 0.15)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.2).ok();
            }
        }

        /// Sad two-note descend
        fn play_miss(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [330.0, 247.0].iter().enumerate() {
                let delay = i as f64 * 0.18;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.3).ok();
                }
            }
        }

        /// Prize jingle
        fn play_deposit(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [523.0, 659.0, 784.0, 1047.0].iter().enumerate() {
                let delay = i as f64 * 0.09;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.28, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.35)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.4).ok();
                }
            }

            // Sparkle
            if let Some((osc, gain)) = self.create_osc(ctx, 2093.0, OscillatorType::Sine) {
                let t = ctx.current_time() + 0.36;
                gain.gain().set_value_at_time(vol * 0.12, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.45).ok();
            }
        }

        /// Short tick for button presses
        fn play_nudge(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 700.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.04)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.05).ok();
        }
    }
}
