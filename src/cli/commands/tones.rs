//! Tones Command
//!
//! List the supported tone categories.

use crate::cli::ui::Output;
use crate::cli::util::{OutputFormat, print_json};
use crate::service::ToneService;
use crate::types::Result;

pub fn run(format: OutputFormat) -> Result<()> {
    let tones = ToneService::supported_tones();

    if format.is_json() {
        return print_json(&tones);
    }

    let out = Output::new();
    out.header("Supported Tones");
    println!("{}", tones.description);
    println!();
    for tone in &tones.supported_tones {
        out.bullet(tone);
    }
    Ok(())
}
