use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::error::{ReceivingError, Result};

/// 收货记录 (receipt_logs 表)
///
/// `item_description` / `bin_location` / `qty_grn` 为创建时的快照, 编辑时不会重新查询.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptEntry {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub shipment_ref: String,
    pub waybill: String,
    pub item_code: String,
    pub item_description: String,
    pub bin_location: String,
    pub relocated_bin: String,
    pub qty_received: i64,
    pub qty_grn: i64,
    /// 截至本条记录的累计差异 (累计收货 - 预期)
    pub difference: i64,
}

/// 待写入的新收货记录 (id 由存储分配)
#[derive(Debug, Clone)]
pub struct NewReceiptEntry {
    pub timestamp: NaiveDateTime,
    pub shipment_ref: String,
    pub waybill: String,
    pub item_code: String,
    pub item_description: String,
    pub bin_location: String,
    pub relocated_bin: String,
    pub qty_received: i64,
    pub qty_grn: i64,
    pub difference: i64,
}

impl NewReceiptEntry {
    pub fn with_id(self, id: i64) -> ReceiptEntry {
        ReceiptEntry {
            id,
            timestamp: self.timestamp,
            shipment_ref: self.shipment_ref,
            waybill: self.waybill,
            item_code: self.item_code,
            item_description: self.item_description,
            bin_location: self.bin_location,
            relocated_bin: self.relocated_bin,
            qty_received: self.qty_received,
            qty_grn: self.qty_grn,
            difference: self.difference,
        }
    }
}

/// 编辑后写回的可变字段
#[derive(Debug, Clone)]
pub struct ReceiptUpdate {
    pub waybill: String,
    pub relocated_bin: String,
    pub qty_received: i64,
    pub difference: i64,
    pub timestamp: NaiveDateTime,
}

impl ReceiptEntry {
    /// 合并不可变的原始字段与编辑后的字段
    pub fn apply(mut self, update: ReceiptUpdate) -> ReceiptEntry {
        self.waybill = update.waybill;
        self.relocated_bin = update.relocated_bin;
        self.qty_received = update.qty_received;
        self.difference = update.difference;
        self.timestamp = update.timestamp;
        self
    }
}

/// 创建收货请求体
///
/// 字段存在即视为已提供, 显式 `null` 与缺失不同.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceiptRequest {
    #[serde(alias = "importRef", default, deserialize_with = "present")]
    pub shipment_ref: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub waybill: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub item_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub quantity: Option<Value>,
    #[serde(alias = "relocateBin")]
    pub relocated_bin: Option<String>,
}

/// 校验后的创建参数
#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub shipment_ref: String,
    pub waybill: String,
    pub item_code: String,
    pub quantity: i64,
    pub relocated_bin: String,
}

impl CreateReceiptRequest {
    pub fn validate(self) -> Result<NewReceipt> {
        let mut missing = Vec::new();
        if self.shipment_ref.is_none() {
            missing.push("shipmentRef");
        }
        if self.waybill.is_none() {
            missing.push("waybill");
        }
        if self.item_code.is_none() {
            missing.push("itemCode");
        }
        if self.quantity.is_none() {
            missing.push("quantity");
        }
        if !missing.is_empty() {
            return Err(missing_fields(&missing));
        }

        let quantity = parse_quantity(self.quantity.as_ref().unwrap_or(&Value::Null))?;
        if quantity <= 0 {
            return Err(ReceivingError::Validation(
                "quantity must be greater than 0".to_string(),
            ));
        }

        Ok(NewReceipt {
            shipment_ref: self.shipment_ref.flatten().unwrap_or_default(),
            waybill: self.waybill.flatten().unwrap_or_default(),
            item_code: self.item_code.flatten().unwrap_or_default(),
            quantity,
            relocated_bin: self.relocated_bin.unwrap_or_default(),
        })
    }
}

/// 编辑收货请求体
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditReceiptRequest {
    #[serde(default, deserialize_with = "present")]
    pub waybill: Option<Option<String>>,
    #[serde(alias = "relocateBin", default, deserialize_with = "present")]
    pub relocated_bin: Option<Option<String>>,
    #[serde(alias = "quantity", default, deserialize_with = "present")]
    pub qty_received: Option<Value>,
}

/// 校验后的编辑参数
#[derive(Debug, Clone)]
pub struct ReceiptEdit {
    pub waybill: String,
    pub relocated_bin: String,
    pub quantity: i64,
}

impl EditReceiptRequest {
    pub fn validate(self) -> Result<ReceiptEdit> {
        let mut missing = Vec::new();
        if self.waybill.is_none() {
            missing.push("waybill");
        }
        if self.qty_received.is_none() {
            missing.push("qtyReceived");
        }
        if self.relocated_bin.is_none() {
            missing.push("relocatedBin");
        }
        if !missing.is_empty() {
            return Err(missing_fields(&missing));
        }

        let quantity = parse_quantity(self.qty_received.as_ref().unwrap_or(&Value::Null))?;
        if quantity < 0 {
            return Err(ReceivingError::Validation(
                "quantity received cannot be negative".to_string(),
            ));
        }

        Ok(ReceiptEdit {
            waybill: self.waybill.flatten().unwrap_or_default(),
            relocated_bin: self.relocated_bin.flatten().unwrap_or_default(),
            quantity,
        })
    }
}

/// 键存在时 (包括 null) 返回 Some, 配合 `#[serde(default)]` 区分缺失字段
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn missing_fields(fields: &[&str]) -> ReceivingError {
    ReceivingError::Validation(format!("missing required fields: {}", fields.join(", ")))
}

/// 解析数量: 整数, 浮点 (向零截断) 或数字字符串
///
/// 超出 i64 范围或非有限的浮点直接拒绝, 不做截断到边界.
pub fn parse_quantity(value: &Value) -> Result<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_to_i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        ReceivingError::Validation("quantity must be a whole number within range".to_string())
    })
}

/// 向零截断; 非有限或超出 i64 范围时返回 None
pub fn truncate_to_i64(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    // i64::MAX as f64 == 2^63, 本身已越界
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}

/// 当前本地时间, 秒级精度
pub fn now_timestamp() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}
