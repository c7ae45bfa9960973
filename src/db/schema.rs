use sqlx::SqlitePool;

/// 建表 (幂等)
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS receipt_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            shipment_ref TEXT NOT NULL,
            waybill TEXT NOT NULL,
            item_code TEXT NOT NULL,
            item_description TEXT NOT NULL,
            bin_location TEXT NOT NULL,
            relocated_bin TEXT NOT NULL,
            qty_received INTEGER NOT NULL,
            qty_grn INTEGER NOT NULL,
            difference INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_receipt_logs_group ON receipt_logs (shipment_ref, item_code)",
    )
    .execute(pool)
    .await?;

    tracing::info!("receipt_logs 表已就绪");
    Ok(())
}
