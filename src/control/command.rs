//! Parsing of configuration frames.
//!
//! Layout: `SOP, selector, sub-command, value...`. The value is the run of
//! decimal digits starting at offset 3; anything after it is ignored and a
//! missing value reads as 0.

use crate::error::{LinkError, Result};

/// Offset of the sub-command byte within a configuration frame.
pub const SUBCOMMAND_OFFSET: usize = 2;

/// Offset where the numeric value starts.
pub const VALUE_OFFSET: usize = 3;

/// Allowed spreading factors.
pub const SPREADING_FACTOR_RANGE: std::ops::RangeInclusive<u8> = 6..=12;

/// Allowed coding-rate denominators.
pub const CODING_RATE_RANGE: std::ops::RangeInclusive<u8> = 5..=8;

/// Modem presets selectable with the `M` sub-command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModemPreset {
    /// 125 kHz, 4/5, SF7. Default medium range.
    #[default]
    Bw125Cr45Sf128,
    /// 500 kHz, 4/5, SF7. Fast, short range.
    Bw500Cr45Sf128,
    /// 31.25 kHz, 4/8, SF9. Slow, long range.
    Bw31_25Cr48Sf512,
    /// 125 kHz, 4/8, SF12. Slow, long range.
    Bw125Cr48Sf4096,
}

impl ModemPreset {
    /// Preset for a selector digit; unknown selectors fall back to the default.
    pub fn from_selector(c: u8) -> Self {
        match c {
            b'1' => ModemPreset::Bw500Cr45Sf128,
            b'2' => ModemPreset::Bw31_25Cr48Sf512,
            b'3' => ModemPreset::Bw125Cr48Sf4096,
            _ => ModemPreset::Bw125Cr45Sf128,
        }
    }

    /// Signal bandwidth in Hz.
    pub fn bandwidth_hz(self) -> u32 {
        match self {
            ModemPreset::Bw125Cr45Sf128 | ModemPreset::Bw125Cr48Sf4096 => 125_000,
            ModemPreset::Bw500Cr45Sf128 => 500_000,
            ModemPreset::Bw31_25Cr48Sf512 => 31_250,
        }
    }

    /// Spreading factor (log2 of chips per symbol).
    pub fn spreading_factor(self) -> u8 {
        match self {
            ModemPreset::Bw125Cr45Sf128 | ModemPreset::Bw500Cr45Sf128 => 7,
            ModemPreset::Bw31_25Cr48Sf512 => 9,
            ModemPreset::Bw125Cr48Sf4096 => 12,
        }
    }

    /// Coding-rate denominator (4/x).
    pub fn coding_rate(self) -> u8 {
        match self {
            ModemPreset::Bw125Cr45Sf128 | ModemPreset::Bw500Cr45Sf128 => 5,
            ModemPreset::Bw31_25Cr48Sf512 | ModemPreset::Bw125Cr48Sf4096 => 8,
        }
    }
}

/// One decoded configuration command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    /// `I`: maximum time output may wait in the holding buffer.
    FlushInterval(u32),
    /// `M`: apply a modem preset.
    ModemPreset(ModemPreset),
    /// `B`: signal bandwidth in Hz, passed through unchecked.
    Bandwidth(u32),
    /// `S`: spreading factor, already clamped.
    SpreadingFactor(u8),
    /// `C`: coding-rate denominator, already clamped.
    CodingRate(u8),
    /// `R`: hardware reset of the radio.
    Reset,
}

impl ConfigCommand {
    /// Decode a full configuration frame.
    pub fn parse(frame: &[u8]) -> Result<Self> {
        let sub = *frame.get(SUBCOMMAND_OFFSET).ok_or_else(|| {
            LinkError::InvalidCommand(format!("config frame too short: {} bytes", frame.len()))
        })?;
        let rest = frame.get(VALUE_OFFSET..).unwrap_or_default();

        let cmd = match sub {
            b'I' => ConfigCommand::FlushInterval(leading_u32(rest)),
            b'M' => ConfigCommand::ModemPreset(ModemPreset::from_selector(
                rest.first().copied().unwrap_or(b'0'),
            )),
            b'B' => ConfigCommand::Bandwidth(leading_u32(rest)),
            b'S' => ConfigCommand::SpreadingFactor(clamp_u8(leading_u32(rest), SPREADING_FACTOR_RANGE)),
            b'C' => ConfigCommand::CodingRate(clamp_u8(leading_u32(rest), CODING_RATE_RANGE)),
            b'R' => ConfigCommand::Reset,
            other => {
                return Err(LinkError::InvalidCommand(format!(
                    "unknown config sub-command {:?}",
                    char::from(other)
                )))
            }
        };
        Ok(cmd)
    }
}

/// Leading decimal digits as a number, saturating; no digits reads as 0.
fn leading_u32(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |acc, b| acc.saturating_mul(10).saturating_add(u32::from(b - b'0')))
}

fn clamp_u8(value: u32, range: std::ops::RangeInclusive<u8>) -> u8 {
    let (lo, hi) = range.into_inner();
    value.clamp(u32::from(lo), u32::from(hi)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_interval() {
        assert_eq!(ConfigCommand::parse(b"<LI250>").unwrap(), ConfigCommand::FlushInterval(250));
        assert_eq!(ConfigCommand::parse(b"<LI>").unwrap(), ConfigCommand::FlushInterval(0));
    }

    #[test]
    fn test_value_stops_at_first_non_digit() {
        assert_eq!(ConfigCommand::parse(b"<LB62500x9>").unwrap(), ConfigCommand::Bandwidth(62_500));
    }

    #[test]
    fn test_huge_value_saturates() {
        assert_eq!(
            ConfigCommand::parse(b"<LI99999999999>").unwrap(),
            ConfigCommand::FlushInterval(u32::MAX)
        );
    }

    #[test]
    fn test_modem_presets() {
        let cases = [
            (&b"<LM0>"[..], ModemPreset::Bw125Cr45Sf128),
            (b"<LM1>", ModemPreset::Bw500Cr45Sf128),
            (b"<LM2>", ModemPreset::Bw31_25Cr48Sf512),
            (b"<LM3>", ModemPreset::Bw125Cr48Sf4096),
            (b"<LM7>", ModemPreset::Bw125Cr45Sf128),
            (b"<LMx>", ModemPreset::Bw125Cr45Sf128),
        ];
        for (frame, preset) in cases {
            assert_eq!(ConfigCommand::parse(frame).unwrap(), ConfigCommand::ModemPreset(preset));
        }
    }

    #[test]
    fn test_spreading_factor_clamped() {
        assert_eq!(ConfigCommand::parse(b"<LS3>").unwrap(), ConfigCommand::SpreadingFactor(6));
        assert_eq!(ConfigCommand::parse(b"<LS9>").unwrap(), ConfigCommand::SpreadingFactor(9));
        assert_eq!(ConfigCommand::parse(b"<LS300>").unwrap(), ConfigCommand::SpreadingFactor(12));
    }

    #[test]
    fn test_coding_rate_clamped() {
        assert_eq!(ConfigCommand::parse(b"<LC>").unwrap(), ConfigCommand::CodingRate(5));
        assert_eq!(ConfigCommand::parse(b"<LC7>").unwrap(), ConfigCommand::CodingRate(7));
        assert_eq!(ConfigCommand::parse(b"<LC9>").unwrap(), ConfigCommand::CodingRate(8));
    }

    #[test]
    fn test_reset_and_unknown() {
        assert_eq!(ConfigCommand::parse(b"<LR>").unwrap(), ConfigCommand::Reset);
        assert!(matches!(
            ConfigCommand::parse(b"<LQ1>"),
            Err(LinkError::InvalidCommand(_))
        ));
        assert!(matches!(ConfigCommand::parse(b"<L"), Err(LinkError::InvalidCommand(_))));
    }

    #[test]
    fn test_preset_parameters() {
        let preset = ModemPreset::Bw125Cr48Sf4096;
        assert_eq!(preset.bandwidth_hz(), 125_000);
        assert_eq!(preset.spreading_factor(), 12);
        assert_eq!(preset.coding_rate(), 8);
        assert_eq!(ModemPreset::default(), ModemPreset::Bw125Cr45Sf128);
    }
}
