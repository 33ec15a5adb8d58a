//! Market-side inputs: quotes, symbol trading metadata, account state, timeframes.

use std::fmt;
use std::str::FromStr;

/// Top of book for one symbol at evaluation time. `ask >= bid` is assumed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
}

impl Quote {
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

/// Broker trading metadata for one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolMetadata {
    pub point_size: f64,
    pub tick_value: f64,
    pub volume_min: f64,
    pub volume_max: f64,
    pub volume_step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountSnapshot {
    pub balance: f64,
    pub equity: f64,
}

/// Account figures published once per cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountStats {
    pub balance: f64,
    pub equity: f64,
    pub daily_pl: f64,
}

impl AccountStats {
    /// `daily_pl` is measured against the equity captured when the scanner started.
    pub fn from_snapshot(snapshot: &AccountSnapshot, initial_equity: f64) -> Self {
        AccountStats {
            balance: snapshot.balance,
            equity: snapshot.equity,
            daily_pl: snapshot.equity - initial_equity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    #[default]
    H1,
    H4,
    D1,
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D1",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "M1" | "1M" => Ok(Timeframe::M1),
            "M5" | "5M" => Ok(Timeframe::M5),
            "M15" | "15M" => Ok(Timeframe::M15),
            "M30" | "30M" => Ok(Timeframe::M30),
            "H1" | "1H" => Ok(Timeframe::H1),
            "H4" | "4H" => Ok(Timeframe::H4),
            "D1" | "1D" => Ok(Timeframe::D1),
            other => Err(format!("unknown timeframe '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_spread() {
        let q = Quote {
            bid: 1.1048,
            ask: 1.1052,
        };
        assert!((q.spread() - 0.0004).abs() < 1e-12);
    }

    #[test]
    fn stats_daily_pl_against_initial_equity() {
        let snap = AccountSnapshot {
            balance: 10_000.0,
            equity: 10_250.0,
        };
        let stats = AccountStats::from_snapshot(&snap, 10_100.0);
        assert_eq!(stats.balance, 10_000.0);
        assert_eq!(stats.equity, 10_250.0);
        assert!((stats.daily_pl - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn timeframe_default_is_h1() {
        assert_eq!(Timeframe::default(), Timeframe::H1);
    }

    #[test]
    fn timeframe_parse_round_trip_names() {
        for tf in [
            Timeframe::M1,
            Timeframe::M5,
            Timeframe::M15,
            Timeframe::M30,
            Timeframe::H1,
            Timeframe::H4,
            Timeframe::D1,
        ] {
            assert_eq!(tf.to_string().parse::<Timeframe>(), Ok(tf));
        }
    }

    #[test]
    fn timeframe_parse_accepts_lowercase_alias() {
        assert_eq!("1h".parse::<Timeframe>(), Ok(Timeframe::H1));
        assert_eq!("d1".parse::<Timeframe>(), Ok(Timeframe::D1));
    }

    #[test]
    fn timeframe_parse_rejects_unknown() {
        assert!("W1".parse::<Timeframe>().is_err());
    }
}
