//! Plain-text instrument lists.
//!
//! One instrument per line as `SYMBOL [GLYPH]`. Blank lines and `#` comments
//! are skipped.

use crate::domain::errors::{Result, TickerError};
use crate::domain::instrument::Instrument;
use std::fs;
use std::path::Path;

pub fn parse_instrument_list(text: &str) -> Vec<Instrument> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(char::is_whitespace) {
            Some((symbol, glyph)) => Instrument::new(symbol).with_glyph(glyph.trim()),
            None => Instrument::new(line),
        })
        .collect()
}

pub fn load_instrument_list(path: &Path) -> Result<Vec<Instrument>> {
    let text = fs::read_to_string(path).map_err(|e| {
        TickerError::config(format!("could not read instrument list {:?}: {}", path, e))
    })?;
    Ok(parse_instrument_list(&text))
}
