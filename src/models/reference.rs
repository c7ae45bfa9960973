use serde::{Deserialize, Serialize};

/// 物料主数据行 (item master CSV)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
    #[serde(rename = "Item_Code")]
    pub item_code: String,
    #[serde(rename = "Item_Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Weight_per_Unit", default)]
    pub weight: Option<String>,
    #[serde(rename = "Bin_1", default)]
    pub bin_location: Option<String>,
    #[serde(rename = "Aditional_Bin_Location", default)]
    pub additional_bins: Option<String>,
}

/// GRN 预期数量行 (expected quantity CSV)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExpectedQtyRecord {
    #[serde(rename = "GRN_Number")]
    pub shipment_ref: String,
    #[serde(rename = "Item_Code")]
    pub item_code: String,
    #[serde(rename = "Quantity", default)]
    pub quantity: Option<String>,
}

/// lookupItem 返回
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLookup {
    pub item_code: String,
    pub description: String,
    pub bin_location: String,
    pub additional_bins: String,
    pub weight: String,
    pub default_expected_qty: i64,
}

impl ItemLookup {
    pub fn new(details: ItemDetails, default_expected_qty: i64) -> Self {
        Self {
            item_code: details.item_code,
            description: details.description.unwrap_or_default(),
            bin_location: details.bin_location.unwrap_or_default(),
            additional_bins: details.additional_bins.unwrap_or_default(),
            weight: details.weight.unwrap_or_default(),
            default_expected_qty,
        }
    }
}
