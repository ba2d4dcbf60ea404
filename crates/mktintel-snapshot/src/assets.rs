use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SnapshotError;

/// The instruments tracked by a snapshot, in their fixed column order.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    CrudeOil,
    Gold,
    Corn,
    UsdBrl,
}

impl Asset {
    /// Column order of every series produced by the pipeline.
    pub const ALL: [Asset; 4] = [Asset::CrudeOil, Asset::Gold, Asset::Corn, Asset::UsdBrl];

    /// Yahoo Finance symbol.
    pub fn ticker(&self) -> &'static str {
        match self {
            Asset::CrudeOil => "CL=F",
            Asset::Gold => "GC=F",
            Asset::Corn => "ZC=F",
            Asset::UsdBrl => "BRL=X",
        }
    }

    /// Column label, as shown in tables & the CSV header.
    pub fn label(&self) -> &'static str {
        match self {
            Asset::CrudeOil => "Crude Oil (USD)",
            Asset::Gold => "Gold (USD)",
            Asset::Corn => "Corn (USD)",
            Asset::UsdBrl => "USD/BRL",
        }
    }

    /// Position of the asset in [`Asset::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// accepts the ticker, or a loose name such as "gold", "crude-oil", "usd_brl"
impl FromStr for Asset {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '=')
            .collect();

        match key.as_str() {
            "crudeoil" | "oil" | "crude" | "cl=f" => Ok(Asset::CrudeOil),
            "gold" | "gc=f" => Ok(Asset::Gold),
            "corn" | "zc=f" => Ok(Asset::Corn),
            "usdbrl" | "brl" | "brl=x" => Ok(Asset::UsdBrl),
            _ => Err(SnapshotError::UnknownAsset(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_order_matches_index() {
        for (i, asset) in Asset::ALL.iter().enumerate() {
            assert_eq!(asset.index(), i);
        }
    }

    #[test]
    fn parses_names_and_tickers() {
        assert_eq!("Gold".parse::<Asset>().unwrap(), Asset::Gold);
        assert_eq!("crude-oil".parse::<Asset>().unwrap(), Asset::CrudeOil);
        assert_eq!("usd_brl".parse::<Asset>().unwrap(), Asset::UsdBrl);
        assert_eq!("ZC=F".parse::<Asset>().unwrap(), Asset::Corn);
        assert!("wheat".parse::<Asset>().is_err());
    }
}
