use serde::{Deserialize, Serialize};
use std::fmt;

/// A tracked symbol or trading pair plus an optional display glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "InstrumentSpec")]
pub struct Instrument {
    pub symbol: String,
    pub glyph: Option<String>,
}

/// Accepts both `"AAPL"` and `{ symbol = "AAPL", glyph = "" }` in config files.
#[derive(Deserialize)]
#[serde(untagged)]
enum InstrumentSpec {
    Bare(String),
    Full {
        symbol: String,
        #[serde(default)]
        glyph: Option<String>,
    },
}

impl From<InstrumentSpec> for Instrument {
    fn from(spec: InstrumentSpec) -> Self {
        match spec {
            InstrumentSpec::Bare(symbol) => Instrument::new(symbol),
            InstrumentSpec::Full { symbol, glyph } => Instrument {
                symbol: symbol.trim().to_string(),
                glyph: glyph.filter(|g| !g.trim().is_empty()),
            },
        }
    }
}

impl Instrument {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into().trim().to_string(),
            glyph: None,
        }
    }

    pub fn with_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.glyph = Some(glyph.into());
        self
    }

    /// File-name safe form of the symbol, used for cache keys.
    /// `BTC/USD` becomes `BTC_USD`.
    pub fn cache_key(&self) -> String {
        self.symbol
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.glyph {
            Some(glyph) => write!(f, "{} {}", glyph, self.symbol),
            None => write!(f, "{}", self.symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        tickers: Vec<Instrument>,
    }

    #[test]
    fn test_deserialize_bare_and_table_forms() {
        let parsed: Wrapper = toml::from_str(
            r#"tickers = ["AAPL", { symbol = "BTCUSDT", glyph = "B" }, { symbol = "ETH", glyph = " " }]"#,
        )
        .unwrap();

        assert_eq!(parsed.tickers[0], Instrument::new("AAPL"));
        assert_eq!(
            parsed.tickers[1],
            Instrument::new("BTCUSDT").with_glyph("B")
        );
        // Blank glyphs are dropped
        assert_eq!(parsed.tickers[2].glyph, None);
    }

    #[test]
    fn test_cache_key_is_filesystem_safe() {
        assert_eq!(Instrument::new("BTC/USD").cache_key(), "BTC_USD");
        assert_eq!(Instrument::new("BRK.B").cache_key(), "BRK.B");
    }

    #[test]
    fn test_display_includes_glyph() {
        assert_eq!(Instrument::new("AAPL").to_string(), "AAPL");
        assert_eq!(
            Instrument::new("AAPL").with_glyph("*").to_string(),
            "* AAPL"
        );
    }
}
