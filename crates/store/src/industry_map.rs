//! Vendor industry classification mapping.

use std::collections::BTreeMap;
use std::path::Path;

use cne5_primitives::{Industry, SecurityCode};
use tracing::warn;

use crate::frame::{read_parquet, str_column};

/// Default mapping from the vendor's free-text (Shenwan level-1) industry
/// labels to the canonical industries. Labels absent from this table
/// resolve to [`Industry::Comprehensive`].
#[must_use]
pub fn default_label_mapping() -> &'static [(&'static str, Industry)] {
    &[
        ("银行", Industry::Banking),
        ("农林牧渔", Industry::Agriculture),
        ("采掘", Industry::Petrochemical),
        ("石油石化", Industry::Petrochemical),
        ("煤炭", Industry::Coal),
        ("化工", Industry::Chemicals),
        ("基础化工", Industry::Chemicals),
        ("钢铁", Industry::Steel),
        ("有色金属", Industry::Nonferrous),
        ("电子", Industry::Electronics),
        ("汽车", Industry::Automobiles),
        ("家用电器", Industry::ConsumerAppliances),
        ("食品饮料", Industry::FoodBeverage),
        ("纺织服饰", Industry::TextilesApparel),
        ("纺织服装", Industry::TextilesApparel),
        ("轻工制造", Industry::LightManufacturing),
        ("医药生物", Industry::Pharmaceuticals),
        ("公用事业", Industry::Utilities),
        ("交通运输", Industry::Transportation),
        ("房地产", Industry::RealEstate),
        ("商业贸易", Industry::CommerceRetail),
        ("商贸零售", Industry::CommerceRetail),
        ("休闲服务", Industry::SocialServices),
        ("社会服务", Industry::SocialServices),
        ("综合", Industry::Comprehensive),
        ("建筑材料", Industry::BuildingMaterials),
        ("建筑装饰", Industry::Construction),
        ("电气设备", Industry::ElectricalEquipment),
        ("电力设备", Industry::ElectricalEquipment),
        ("国防军工", Industry::Defense),
        ("计算机", Industry::Computers),
        ("传媒", Industry::Media),
        ("通信", Industry::Communications),
        ("非银金融", Industry::NonBankFinance),
        ("环保", Industry::Environmental),
        ("机械设备", Industry::Machinery),
    ]
}

/// Per-security industry classification with the comprehensive fallback.
#[derive(Debug, Clone, Default)]
pub struct IndustryMap {
    map: BTreeMap<SecurityCode, Industry>,
}

impl IndustryMap {
    /// Build a map from explicit assignments.
    #[must_use]
    pub const fn from_map(map: BTreeMap<SecurityCode, Industry>) -> Self {
        Self { map }
    }

    /// Load the map from a `stock_basic` table with `ts_code` and
    /// free-text `industry` columns, translated through `labels`.
    /// A missing or unreadable file yields an empty map with a warning.
    #[must_use]
    pub fn load(path: &Path, labels: &[(&str, Industry)]) -> Self {
        let df = match read_parquet(path) {
            Ok(df) => df,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "stock basics unavailable");
                return Self::default();
            }
        };

        let (codes, industries) = match (str_column(&df, "ts_code"), str_column(&df, "industry"))
        {
            (Ok(codes), Ok(industries)) => (codes, industries),
            _ => {
                warn!(path = %path.display(), "stock basics have unexpected schema");
                return Self::default();
            }
        };

        let mut map = BTreeMap::new();
        let mut skipped = 0usize;
        for (code, label) in codes.iter().zip(&industries) {
            let Ok(code) = SecurityCode::parse(code.clone()) else {
                skipped += 1;
                continue;
            };
            let industry = labels
                .iter()
                .find(|(l, _)| *l == label.as_str())
                .map_or(Industry::Comprehensive, |(_, industry)| *industry);
            map.insert(code, industry);
        }
        if skipped > 0 {
            warn!(skipped, "stock basics contained malformed security codes");
        }

        Self { map }
    }

    /// Canonical industry of a security; unknown securities resolve to
    /// [`Industry::Comprehensive`].
    #[must_use]
    pub fn industry(&self, code: &SecurityCode) -> Industry {
        self.map.get(code).copied().unwrap_or(Industry::Comprehensive)
    }

    /// Number of mapped securities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_resolve() {
        let labels = default_label_mapping();
        assert!(labels.iter().any(|(l, i)| *l == "银行" && *i == Industry::Banking));
        assert!(labels.iter().any(|(l, i)| *l == "煤炭" && *i == Industry::Coal));
    }

    #[test]
    fn unknown_security_falls_back_to_comprehensive() {
        let mut map = BTreeMap::new();
        map.insert(SecurityCode::parse("000001.SZ").unwrap(), Industry::Banking);
        let industries = IndustryMap::from_map(map);

        assert_eq!(
            industries.industry(&SecurityCode::parse("000001.SZ").unwrap()),
            Industry::Banking
        );
        assert_eq!(
            industries.industry(&SecurityCode::parse("999999.SZ").unwrap()),
            Industry::Comprehensive
        );
    }

    #[test]
    fn missing_file_is_an_empty_map() {
        let map = IndustryMap::load(Path::new("/nonexistent/stock_basic.parquet"), &[]);
        assert!(map.is_empty());
    }
}
