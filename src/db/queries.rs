use crate::models::{NewReceiptEntry, ReceiptEntry, ReceiptUpdate};
use sqlx::{Executor, Sqlite, SqlitePool};

const SELECT_COLUMNS: &str = r#"
    SELECT id, timestamp, shipment_ref, waybill, item_code, item_description,
           bin_location, relocated_bin, qty_received, qty_grn, difference
    FROM receipt_logs
"#;

/// 统计某 shipment + item 已收货总量 (无记录时为 0)
pub async fn total_received<'e, E>(
    executor: E,
    shipment_ref: &str,
    item_code: &str,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COALESCE(SUM(qty_received), 0)
        FROM receipt_logs
        WHERE shipment_ref = ?1 AND item_code = ?2
        "#,
    )
    .bind(shipment_ref)
    .bind(item_code)
    .fetch_one(executor)
    .await
}

/// 插入收货记录, 返回分配的 id
pub async fn insert_entry<'e, E>(executor: E, entry: &NewReceiptEntry) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO receipt_logs (
            timestamp, shipment_ref, waybill, item_code, item_description,
            bin_location, relocated_bin, qty_received, qty_grn, difference
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(entry.timestamp)
    .bind(&entry.shipment_ref)
    .bind(&entry.waybill)
    .bind(&entry.item_code)
    .bind(&entry.item_description)
    .bind(&entry.bin_location)
    .bind(&entry.relocated_bin)
    .bind(entry.qty_received)
    .bind(entry.qty_grn)
    .bind(entry.difference)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// 按 id 更新可编辑字段, 返回影响行数
pub async fn update_entry<'e, E>(
    executor: E,
    id: i64,
    update: &ReceiptUpdate,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE receipt_logs
        SET waybill = ?1,
            relocated_bin = ?2,
            qty_received = ?3,
            difference = ?4,
            timestamp = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&update.waybill)
    .bind(&update.relocated_bin)
    .bind(update.qty_received)
    .bind(update.difference)
    .bind(update.timestamp)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// 按 id 查询
pub async fn get_entry(pool: &SqlitePool, id: i64) -> Result<Option<ReceiptEntry>, sqlx::Error> {
    sqlx::query_as::<_, ReceiptEntry>(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// 全部记录, 最新在前
pub async fn list_entries_newest_first(pool: &SqlitePool) -> Result<Vec<ReceiptEntry>, sqlx::Error> {
    sqlx::query_as::<_, ReceiptEntry>(&format!("{SELECT_COLUMNS} ORDER BY id DESC"))
        .fetch_all(pool)
        .await
}
