//! Canonical industry classification.

use serde::{Deserialize, Serialize};

/// The thirty canonical CNE5 industries, in the contractual column order.
///
/// The last thirty columns of every exposure row are the one-hot encoding
/// of this enum in `Industry::ALL` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    /// Petroleum and petrochemicals.
    Petrochemical,
    /// Coal.
    Coal,
    /// Non-ferrous metals.
    Nonferrous,
    /// Power and public utilities.
    Utilities,
    /// Steel.
    Steel,
    /// Basic chemicals.
    Chemicals,
    /// Building materials.
    BuildingMaterials,
    /// Construction.
    Construction,
    /// Transportation.
    Transportation,
    /// Automobiles.
    Automobiles,
    /// Machinery.
    Machinery,
    /// Defense and military industry.
    Defense,
    /// Electrical equipment.
    ElectricalEquipment,
    /// Electronics.
    Electronics,
    /// Computers.
    Computers,
    /// Communications.
    Communications,
    /// Consumer appliances.
    ConsumerAppliances,
    /// Light manufacturing.
    LightManufacturing,
    /// Textiles and apparel.
    TextilesApparel,
    /// Food and beverage.
    FoodBeverage,
    /// Agriculture, forestry, animal husbandry and fishery.
    Agriculture,
    /// Banking.
    Banking,
    /// Non-bank finance.
    NonBankFinance,
    /// Real estate.
    RealEstate,
    /// Commerce and retail.
    CommerceRetail,
    /// Social services.
    SocialServices,
    /// Media.
    Media,
    /// Pharmaceuticals.
    Pharmaceuticals,
    /// Environmental protection.
    Environmental,
    /// Comprehensive (conglomerates and the unknown-label fallback).
    Comprehensive,
}

impl Industry {
    /// All industries in canonical column order.
    pub const ALL: [Self; 30] = [
        Self::Petrochemical,
        Self::Coal,
        Self::Nonferrous,
        Self::Utilities,
        Self::Steel,
        Self::Chemicals,
        Self::BuildingMaterials,
        Self::Construction,
        Self::Transportation,
        Self::Automobiles,
        Self::Machinery,
        Self::Defense,
        Self::ElectricalEquipment,
        Self::Electronics,
        Self::Computers,
        Self::Communications,
        Self::ConsumerAppliances,
        Self::LightManufacturing,
        Self::TextilesApparel,
        Self::FoodBeverage,
        Self::Agriculture,
        Self::Banking,
        Self::NonBankFinance,
        Self::RealEstate,
        Self::CommerceRetail,
        Self::SocialServices,
        Self::Media,
        Self::Pharmaceuticals,
        Self::Environmental,
        Self::Comprehensive,
    ];

    /// Contractual column name of the industry dummy.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Petrochemical => "ind_petrochemical",
            Self::Coal => "ind_coal",
            Self::Nonferrous => "ind_nonferrous",
            Self::Utilities => "ind_utilities",
            Self::Steel => "ind_steel",
            Self::Chemicals => "ind_chemicals",
            Self::BuildingMaterials => "ind_building_materials",
            Self::Construction => "ind_construction",
            Self::Transportation => "ind_transportation",
            Self::Automobiles => "ind_automobiles",
            Self::Machinery => "ind_machinery",
            Self::Defense => "ind_defense",
            Self::ElectricalEquipment => "ind_electrical_equipment",
            Self::Electronics => "ind_electronics",
            Self::Computers => "ind_computers",
            Self::Communications => "ind_communications",
            Self::ConsumerAppliances => "ind_consumer_appliances",
            Self::LightManufacturing => "ind_light_manufacturing",
            Self::TextilesApparel => "ind_textiles_apparel",
            Self::FoodBeverage => "ind_food_beverage",
            Self::Agriculture => "ind_agriculture",
            Self::Banking => "ind_banking",
            Self::NonBankFinance => "ind_non_bank_finance",
            Self::RealEstate => "ind_real_estate",
            Self::CommerceRetail => "ind_commerce_retail",
            Self::SocialServices => "ind_social_services",
            Self::Media => "ind_media",
            Self::Pharmaceuticals => "ind_pharmaceuticals",
            Self::Environmental => "ind_environmental",
            Self::Comprehensive => "ind_comprehensive",
        }
    }

    /// Position of this industry within [`Industry::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Resolve a contractual column name back to an industry.
    #[must_use]
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|ind| ind.column_name() == name)
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}
