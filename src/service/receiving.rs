use crate::db::{queries, ReferenceCatalog};
use crate::error::{ReceivingError, Result};
use crate::models::receipt::now_timestamp;
use crate::models::{
    CreateReceiptRequest, EditReceiptRequest, ItemDetails, ItemLookup, NewReceipt,
    NewReceiptEntry, ReceiptEntry, ReceiptUpdate, Report, ReportFormat,
};
use crate::service::{report, summary};
use dashmap::DashMap;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

type GroupKey = (String, String);

/// 收货对账服务
///
/// 创建记录时按 (shipment_ref, item_code) 串行执行 "读取已收总量 -> 追加记录",
/// 同一进程内不会出现两个并发创建读到相同的已收总量.
pub struct ReceivingService {
    pool: SqlitePool,
    catalog: ReferenceCatalog,
    group_locks: DashMap<GroupKey, Arc<Mutex<()>>>,
}

impl ReceivingService {
    pub fn new(pool: SqlitePool, catalog: ReferenceCatalog) -> Self {
        Self {
            pool,
            catalog,
            group_locks: DashMap::new(),
        }
    }

    /// 查询物料信息及该 shipment 的预期数量
    pub async fn lookup_item(&self, item_code: &str, shipment_ref: &str) -> Result<ItemLookup> {
        let details = self
            .catalog
            .find_item(item_code)
            .await?
            .ok_or_else(|| item_not_found(item_code))?;
        let expected = self.catalog.expected_quantity(shipment_ref, item_code).await;
        Ok(ItemLookup::new(details, expected))
    }

    /// 新增收货记录, 差异为截至本条的累计差异
    pub async fn create_receipt(&self, request: CreateReceiptRequest) -> Result<ReceiptEntry> {
        let receipt = request.validate()?;

        let details = self
            .catalog
            .find_item(&receipt.item_code)
            .await?
            .ok_or_else(|| item_not_found(&receipt.item_code))?;
        let expected = self
            .catalog
            .expected_quantity(&receipt.shipment_ref, &receipt.item_code)
            .await;

        let key = (receipt.shipment_ref.clone(), receipt.item_code.clone());
        let lock = self.group_lock(&key);
        let result = {
            let _guard = lock.lock().await;
            self.append_receipt(receipt, details, expected).await
        };
        drop(lock);
        self.release_group_lock(&key);
        result
    }

    /// 读取已收总量并追加记录 (调用方持有该组的锁)
    async fn append_receipt(
        &self,
        receipt: NewReceipt,
        details: ItemDetails,
        expected: i64,
    ) -> Result<ReceiptEntry> {
        let mut tx = self.pool.begin().await?;
        let prior_total =
            queries::total_received(&mut *tx, &receipt.shipment_ref, &receipt.item_code).await?;
        let new_total = prior_total
            .checked_add(receipt.quantity)
            .ok_or_else(|| quantity_overflow(&receipt.shipment_ref, &receipt.item_code))?;
        let difference = new_total
            .checked_sub(expected)
            .ok_or_else(|| quantity_overflow(&receipt.shipment_ref, &receipt.item_code))?;

        let new_entry = NewReceiptEntry {
            timestamp: now_timestamp(),
            shipment_ref: receipt.shipment_ref,
            waybill: receipt.waybill,
            item_code: receipt.item_code,
            item_description: details.description.unwrap_or_default(),
            bin_location: details.bin_location.unwrap_or_default(),
            relocated_bin: receipt.relocated_bin,
            qty_received: receipt.quantity,
            qty_grn: expected,
            difference,
        };

        let id = match queries::insert_entry(&mut *tx, &new_entry).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("✗ 收货记录写入失败: {:?}", e);
                tx.rollback().await?;
                return Err(e.into());
            }
        };
        tx.commit().await?;

        tracing::info!(
            "✓ 收货记录 {} 已保存: shipment {} 物料 {} 本次 {} 累计 {} 预期 {} 差异 {}",
            id,
            new_entry.shipment_ref,
            new_entry.item_code,
            new_entry.qty_received,
            new_total,
            expected,
            new_entry.difference
        );
        Ok(new_entry.with_id(id))
    }

    /// 编辑收货记录
    ///
    /// 差异按 本条数量 - 本条预期 重新计算, 不回溯同组其它记录.
    pub async fn edit_receipt(&self, id: i64, request: EditReceiptRequest) -> Result<ReceiptEntry> {
        let edit = request.validate()?;

        let original = queries::get_entry(&self.pool, id)
            .await?
            .ok_or_else(|| entry_not_found(id))?;

        let update = ReceiptUpdate {
            waybill: edit.waybill,
            relocated_bin: edit.relocated_bin,
            qty_received: edit.quantity,
            difference: edit
                .quantity
                .checked_sub(original.qty_grn)
                .ok_or_else(|| quantity_overflow(&original.shipment_ref, &original.item_code))?,
            timestamp: now_timestamp(),
        };

        let affected = queries::update_entry(&self.pool, id, &update).await?;
        if affected == 0 {
            return Err(entry_not_found(id));
        }

        tracing::info!(
            "✓ 收货记录 {} 已更新: 数量 {} 差异 {}",
            id,
            update.qty_received,
            update.difference
        );
        Ok(original.apply(update))
    }

    /// 全部收货记录, 最新在前
    pub async fn list_receipts(&self) -> Result<Vec<ReceiptEntry>> {
        let entries = queries::list_entries_newest_first(&self.pool).await?;
        tracing::debug!("加载 {} 条收货记录", entries.len());
        Ok(entries)
    }

    /// 导出明细报表
    pub async fn export_detail_report(&self, format: ReportFormat) -> Result<Report> {
        let entries = queries::list_entries_newest_first(&self.pool).await?;
        if entries.is_empty() {
            return Err(ReceivingError::EmptyInput(
                "no records to export".to_string(),
            ));
        }
        tracing::info!("导出明细报表: {} 条记录", entries.len());
        report::detail_report(&entries, format, now_timestamp())
    }

    /// 导出按 shipment + item 汇总的报表
    pub async fn export_summary_report(&self, format: ReportFormat) -> Result<Report> {
        // 与明细一致按最新在前扫描, 组内描述/预期取最新记录
        let entries = queries::list_entries_newest_first(&self.pool).await?;
        let rows = summary::summarize(&entries)?;
        tracing::info!(
            "导出汇总报表: {} 条记录, {} 个分组",
            entries.len(),
            rows.len()
        );
        report::summary_report(&rows, format, now_timestamp())
    }

    fn group_lock(&self, key: &GroupKey) -> Arc<Mutex<()>> {
        self.group_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 没有其它任务持有或等待时移除该组的锁
    fn release_group_lock(&self, key: &GroupKey) {
        self.group_locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

fn item_not_found(item_code: &str) -> ReceivingError {
    ReceivingError::NotFound(format!("item {} not found in item master", item_code))
}

fn entry_not_found(id: i64) -> ReceivingError {
    ReceivingError::NotFound(format!("receipt entry {} not found", id))
}

fn quantity_overflow(shipment_ref: &str, item_code: &str) -> ReceivingError {
    ReceivingError::Validation(format!(
        "quantities for shipment {} item {} exceed the supported range",
        shipment_ref, item_code
    ))
}
