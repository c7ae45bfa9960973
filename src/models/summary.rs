use serde::{Deserialize, Serialize};

/// 按 (shipment_ref, item_code) 汇总的一行, 仅在导出时派生, 不落库
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub shipment_ref: String,
    pub item_code: String,
    pub item_description: String,
    pub total_received: i64,
    pub total_expected: i64,
    pub difference: i64,
}
