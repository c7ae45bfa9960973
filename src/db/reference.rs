use crate::config::ReferenceConfig;
use crate::error::{ReceivingError, Result};
use crate::models::receipt::truncate_to_i64;
use crate::models::{ExpectedQtyRecord, ItemDetails};
use std::io;
use std::path::{Path, PathBuf};

/// 参考数据目录: 物料主数据 + GRN 预期数量
///
/// 每次查询都重新读取 CSV 文件, 不做缓存, 外部对文件的修改立即可见.
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    item_master_path: PathBuf,
    expected_qty_path: PathBuf,
}

impl ReferenceCatalog {
    pub fn new(item_master_path: impl Into<PathBuf>, expected_qty_path: impl Into<PathBuf>) -> Self {
        Self {
            item_master_path: item_master_path.into(),
            expected_qty_path: expected_qty_path.into(),
        }
    }

    pub fn from_config(config: &ReferenceConfig) -> Self {
        Self::new(&config.item_master_path, &config.expected_qty_path)
    }

    /// 按物料编码精确匹配, 有重复时取第一条
    pub async fn find_item(&self, item_code: &str) -> Result<Option<ItemDetails>> {
        let Some(bytes) = read_optional(&self.item_master_path).await? else {
            tracing::warn!(
                "物料主数据文件不存在: {}",
                self.item_master_path.display()
            );
            return Ok(None);
        };

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        for record in reader.deserialize::<ItemDetails>() {
            let item = record.map_err(|e| reference_error(&self.item_master_path, e))?;
            if item.item_code == item_code {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// 按 (shipment_ref, item_code) 精确匹配预期数量
    ///
    /// 未命中、文件缺失或数值非法时返回 0, 从不报错.
    pub async fn expected_quantity(&self, shipment_ref: &str, item_code: &str) -> i64 {
        let bytes = match read_optional(&self.expected_qty_path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::warn!(
                    "GRN 文件不存在: {}, 预期数量按 0 处理",
                    self.expected_qty_path.display()
                );
                return 0;
            }
            Err(e) => {
                tracing::warn!("读取 GRN 文件失败: {}, 预期数量按 0 处理", e);
                return 0;
            }
        };

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        for record in reader.deserialize::<ExpectedQtyRecord>() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("GRN 文件行解析失败, 跳过: {}", e);
                    continue;
                }
            };
            if record.shipment_ref != shipment_ref || record.item_code != item_code {
                continue;
            }

            let raw = record.quantity.unwrap_or_default();
            return match parse_expected_quantity(&raw) {
                Some(qty) => qty,
                None => {
                    tracing::warn!(
                        "GRN {} 物料 {} 数量非数字 ('{}'), 按 0 处理",
                        shipment_ref,
                        item_code,
                        raw
                    );
                    0
                }
            };
        }
        0
    }

    /// 参考文件缺失时写入示例数据
    pub fn seed_samples_if_missing(&self) -> Result<()> {
        if !self.item_master_path.exists() {
            tracing::warn!(
                "物料主数据文件不存在, 写入示例: {}",
                self.item_master_path.display()
            );
            write_csv(&self.item_master_path, &sample_items())?;
        }
        if !self.expected_qty_path.exists() {
            tracing::warn!(
                "GRN 文件不存在, 写入示例: {}",
                self.expected_qty_path.display()
            );
            write_csv(&self.expected_qty_path, &sample_expected_quantities())?;
        }
        Ok(())
    }
}

/// 解析预期数量: 整数, 或小数向零截断
pub fn parse_expected_quantity(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(truncate_to_i64))
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(reference_error(path, e)),
    }
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| reference_error(path, e))?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(|e| reference_error(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| reference_error(path, e))?;
    }
    writer.flush().map_err(|e| reference_error(path, e))?;
    Ok(())
}

fn reference_error(path: &Path, e: impl std::fmt::Display) -> ReceivingError {
    ReceivingError::ReferenceData(format!("{}: {}", path.display(), e))
}

fn sample_items() -> Vec<ItemDetails> {
    let item = |code: &str, description: &str, weight: &str, bin: &str, extra: &str| ItemDetails {
        item_code: code.to_string(),
        description: Some(description.to_string()),
        weight: Some(weight.to_string()),
        bin_location: Some(bin.to_string()),
        additional_bins: Some(extra.to_string()),
    };
    vec![
        item("BG1234567890123", "Maintenance Kit 1000h", "10 kg", "RA25A", "RA25A"),
        item("FT9876543210987", "Oil Filter Model X", "2 kg", "SB10C", "SB10C, SB11A"),
        item("OTRO_ITEM_001", "Generic Spare Part Alpha", "0.5 kg", "ZC01X", "ZC01X"),
    ]
}

fn sample_expected_quantities() -> Vec<ExpectedQtyRecord> {
    [
        ("21044", "BG01499917", "12"),
        ("21044", "FT9876543210987", "5"),
        ("21048", "BG01499917", "8"),
        ("21049", "OTRO_ITEM_001", "20"),
    ]
    .into_iter()
    .map(|(shipment_ref, item_code, qty)| ExpectedQtyRecord {
        shipment_ref: shipment_ref.to_string(),
        item_code: item_code.to_string(),
        quantity: Some(qty.to_string()),
    })
    .collect()
}
