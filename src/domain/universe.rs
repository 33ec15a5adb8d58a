//! Asset universe: instruments grouped by asset class.
//!
//! Parses symbol lists from configuration and checks a runtime selection
//! against the loaded universe.

use std::collections::HashSet;

use crate::domain::error::ScannerError;

/// One asset class and its symbols, in configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetClass {
    pub label: String,
    pub symbols: Vec<String>,
}

/// Ordered mapping from asset-class label to symbols. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetUniverse {
    classes: Vec<AssetClass>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("duplicate asset class: {0}")]
    DuplicateClass(String),

    #[error("asset class {0} has no symbols")]
    EmptyClass(String),
}

const DEFAULT_UNIVERSE: &[(&str, &[&str])] = &[
    (
        "FOREX",
        &[
            "EURUSD", "GBPUSD", "USDJPY", "USDCAD", "AUDUSD", "NZDUSD", "USDCHF",
        ],
    ),
    ("INDICES", &["US30", "NAS100", "GER40"]),
    ("METALS", &["XAUUSD", "XAGUSD"]),
    ("ENERGY", &["USOIL", "UKOIL"]),
    ("CRYPTO", &["BTCUSD", "ETHUSD"]),
];

impl Default for AssetUniverse {
    fn default() -> Self {
        let classes = DEFAULT_UNIVERSE
            .iter()
            .map(|(label, symbols)| AssetClass {
                label: label.to_string(),
                symbols: symbols.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        AssetUniverse { classes }
    }
}

impl AssetUniverse {
    /// Build a universe from `(label, symbols)` pairs.
    ///
    /// Labels are upper-cased. A symbol may appear in only one class.
    pub fn new(classes: Vec<(String, Vec<String>)>) -> Result<Self, UniverseError> {
        let mut seen_labels = HashSet::new();
        let mut seen_symbols = HashSet::new();
        let mut out = Vec::with_capacity(classes.len());

        for (label, symbols) in classes {
            let label = label.trim().to_uppercase();
            if !seen_labels.insert(label.clone()) {
                return Err(UniverseError::DuplicateClass(label));
            }
            if symbols.is_empty() {
                return Err(UniverseError::EmptyClass(label));
            }
            for symbol in &symbols {
                if !seen_symbols.insert(symbol.clone()) {
                    return Err(UniverseError::DuplicateSymbol(symbol.clone()));
                }
            }
            out.push(AssetClass { label, symbols });
        }

        Ok(AssetUniverse { classes: out })
    }

    pub fn classes(&self) -> &[AssetClass] {
        &self.classes
    }

    /// Every symbol, class by class.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.classes
            .iter()
            .flat_map(|c| c.symbols.iter().map(String::as_str))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols().any(|s| s == symbol)
    }

    pub fn count(&self) -> usize {
        self.classes.iter().map(|c| c.symbols.len()).sum()
    }

    /// Check a runtime selection against the universe.
    ///
    /// The selection must be non-empty and every symbol must belong to the universe.
    /// Order is preserved; it becomes the discovery order of the scan.
    pub fn select(&self, selection: &[String]) -> Result<Vec<String>, ScannerError> {
        if selection.is_empty() {
            return Err(ScannerError::InvalidSelection {
                reason: "no symbols selected".to_string(),
            });
        }
        if let Some(unknown) = selection.iter().find(|s| !self.contains(s)) {
            return Err(ScannerError::InvalidSelection {
                reason: format!("{} is not in the asset universe", unknown),
            });
        }
        Ok(selection.to_vec())
    }
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}
