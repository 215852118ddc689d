//! Control module - the link configuration sub-protocol.
//!
//! A configuration frame carries a sub-command letter and a decimal value:
//!
//! | frame      | effect                                   |
//! |------------|------------------------------------------|
//! | `<LI250>`  | max flush interval 250 ms                |
//! | `<LM1>`    | modem preset 1 (500 kHz, 4/5, SF7)       |
//! | `<LB62500>`| signal bandwidth 62.5 kHz                |
//! | `<LS9>`    | spreading factor 9 (clamped to 6..=12)   |
//! | `<LC8>`    | coding rate 4/8 (clamped to 5..=8)       |
//! | `<LR>`     | reset the radio                          |
//!
//! The selector letter (`L` above) is whatever the application's command
//! table binds [`handle_config_frame`] to.
//!
//! # Example
//!
//! ```
//! use radiolink::control::{ConfigCommand, ModemPreset};
//!
//! let cmd = ConfigCommand::parse(b"<LM3>").unwrap();
//! assert_eq!(cmd, ConfigCommand::ModemPreset(ModemPreset::Bw125Cr48Sf4096));
//! ```

mod command;
mod radio;

pub use command::{
    ConfigCommand, ModemPreset, CODING_RATE_RANGE, SPREADING_FACTOR_RANGE, SUBCOMMAND_OFFSET,
    VALUE_OFFSET,
};
pub use radio::{apply, handle_config_frame, RadioControl, RadioSettings};
