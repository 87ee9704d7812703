use std::fmt;

/// Tickers offered by the picker when the config does not override them.
pub const DEFAULT_SYMBOLS: [&str; 7] = ["AAPL", "AMZN", "MSFT", "TSLA", "GOOGL", "META", "NVDA"];

/// Upper-cased ticker, e.g. `AAPL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive match against a symbol reported by the backend.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<Symbol> for String {
    fn from(s: Symbol) -> Self {
        s.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a configured ticker list: upper-case, drop blanks and duplicates, keep order.
pub fn normalize_symbols<S: AsRef<str>>(raw: &[S]) -> Vec<Symbol> {
    let mut out: Vec<Symbol> = Vec::new();
    for item in raw {
        let sym = Symbol::new(item.as_ref());
        if !sym.is_empty() && !out.contains(&sym) {
            out.push(sym);
        }
    }
    out
}

pub fn default_symbols() -> Vec<Symbol> {
    normalize_symbols(&DEFAULT_SYMBOLS)
}
