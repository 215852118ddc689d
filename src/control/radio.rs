//! Radio collaborator and the application of configuration commands.

use serde::{Deserialize, Serialize};

use super::command::{ConfigCommand, ModemPreset};
use crate::error::Result;
use crate::writer::Outbound;

/// Operations the configuration sub-protocol needs from a radio driver.
pub trait RadioControl {
    /// Apply a modem preset (bandwidth, coding rate and spreading factor).
    fn set_modem_preset(&mut self, preset: ModemPreset) -> Result<()>;

    /// Set the signal bandwidth in Hz.
    fn set_signal_bandwidth(&mut self, hz: u32) -> Result<()>;

    /// Set the spreading factor (6..=12).
    fn set_spreading_factor(&mut self, sf: u8) -> Result<()>;

    /// Set the coding-rate denominator (5..=8).
    fn set_coding_rate(&mut self, denominator: u8) -> Result<()>;

    /// Hardware reset followed by re-initialisation.
    fn reset(&mut self) -> Result<()>;
}

/// In-memory radio settings.
///
/// Stands in for a driver on hosts and in tests, and is what the demo
/// reports back when asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioSettings {
    /// Signal bandwidth in Hz.
    pub bandwidth_hz: u32,
    /// Spreading factor.
    pub spreading_factor: u8,
    /// Coding-rate denominator.
    pub coding_rate: u8,
    /// Number of resets performed.
    pub resets: u32,
}

impl Default for RadioSettings {
    fn default() -> Self {
        let preset = ModemPreset::default();
        Self {
            bandwidth_hz: preset.bandwidth_hz(),
            spreading_factor: preset.spreading_factor(),
            coding_rate: preset.coding_rate(),
            resets: 0,
        }
    }
}

impl RadioControl for RadioSettings {
    fn set_modem_preset(&mut self, preset: ModemPreset) -> Result<()> {
        self.bandwidth_hz = preset.bandwidth_hz();
        self.spreading_factor = preset.spreading_factor();
        self.coding_rate = preset.coding_rate();
        Ok(())
    }

    fn set_signal_bandwidth(&mut self, hz: u32) -> Result<()> {
        self.bandwidth_hz = hz;
        Ok(())
    }

    fn set_spreading_factor(&mut self, sf: u8) -> Result<()> {
        self.spreading_factor = sf;
        Ok(())
    }

    fn set_coding_rate(&mut self, denominator: u8) -> Result<()> {
        self.coding_rate = denominator;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        *self = Self {
            resets: self.resets.wrapping_add(1),
            ..Self::default()
        };
        Ok(())
    }
}

/// Carry out one configuration command.
///
/// The flush interval goes to the outbound side; everything else to the
/// radio.
pub fn apply<R>(cmd: ConfigCommand, radio: &mut R, out: &mut dyn Outbound) -> Result<()>
where
    R: RadioControl + ?Sized,
{
    match cmd {
        ConfigCommand::FlushInterval(ms) => {
            out.set_max_flush_interval(ms);
            Ok(())
        }
        ConfigCommand::ModemPreset(preset) => radio.set_modem_preset(preset),
        ConfigCommand::Bandwidth(hz) => radio.set_signal_bandwidth(hz),
        ConfigCommand::SpreadingFactor(sf) => radio.set_spreading_factor(sf),
        ConfigCommand::CodingRate(cr) => radio.set_coding_rate(cr),
        ConfigCommand::Reset => radio.reset(),
    }
}

/// Parse and apply a configuration frame.
///
/// Never fails: unknown sub-commands and radio errors are logged and the
/// frame is otherwise ignored. Suitable as the body of a command handler.
pub fn handle_config_frame<R>(frame: &[u8], radio: &mut R, out: &mut dyn Outbound)
where
    R: RadioControl + ?Sized,
{
    let cmd = match ConfigCommand::parse(frame) {
        Ok(cmd) => cmd,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring config frame");
            return;
        }
    };

    match apply(cmd, radio, out) {
        Ok(()) => tracing::debug!(?cmd, "config applied"),
        Err(e) => tracing::warn!(?cmd, error = %e, "config command failed"),
    }
}
