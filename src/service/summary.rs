use crate::error::{ReceivingError, Result};
use crate::models::{ReceiptEntry, SummaryRow};
use indexmap::IndexMap;

/// 按 (shipment_ref, item_code) 汇总收货记录
///
/// 描述与预期数量取组内首次出现的记录 (按传入顺序, 导出时为最新在前), 结果按 shipment_ref, item_code 升序.
pub fn summarize(entries: &[ReceiptEntry]) -> Result<Vec<SummaryRow>> {
    if entries.is_empty() {
        return Err(ReceivingError::EmptyInput(
            "no records to summarize".to_string(),
        ));
    }

    let mut groups: IndexMap<(&str, &str), SummaryRow> = IndexMap::new();
    for entry in entries {
        let key = (entry.shipment_ref.as_str(), entry.item_code.as_str());
        match groups.get_mut(&key) {
            Some(row) => {
                let total = row.total_received.checked_add(entry.qty_received);
                row.total_received = total.ok_or_else(|| quantity_overflow(row))?;
            }
            None => {
                groups.insert(
                    key,
                    SummaryRow {
                        shipment_ref: entry.shipment_ref.clone(),
                        item_code: entry.item_code.clone(),
                        item_description: entry.item_description.clone(),
                        total_received: entry.qty_received,
                        total_expected: entry.qty_grn,
                        difference: 0,
                    },
                );
            }
        }
    }

    let mut rows = Vec::with_capacity(groups.len());
    for mut row in groups.into_values() {
        row.difference = row
            .total_received
            .checked_sub(row.total_expected)
            .ok_or_else(|| quantity_overflow(&row))?;
        rows.push(row);
    }

    rows.sort_by(|a, b| {
        a.shipment_ref
            .cmp(&b.shipment_ref)
            .then_with(|| a.item_code.cmp(&b.item_code))
    });

    Ok(rows)
}

fn quantity_overflow(row: &SummaryRow) -> ReceivingError {
    ReceivingError::Validation(format!(
        "quantities for shipment {} item {} exceed the supported range",
        row.shipment_ref, row.item_code
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::now_timestamp;

    fn entry(id: i64, shipment_ref: &str, item_code: &str, qty: i64, grn: i64, desc: &str) -> ReceiptEntry {
        ReceiptEntry {
            id,
            timestamp: now_timestamp(),
            shipment_ref: shipment_ref.into(),
            waybill: format!("WB-{id}"),
            item_code: item_code.into(),
            item_description: desc.into(),
            bin_location: "RA25A".into(),
            relocated_bin: String::new(),
            qty_received: qty,
            qty_grn: grn,
            difference: 0,
        }
    }

    #[test]
    fn empty_log_is_rejected() {
        assert!(matches!(summarize(&[]), Err(ReceivingError::EmptyInput(_))));
    }

    #[test]
    fn groups_and_sorts_by_shipment_then_item() {
        let entries = vec![
            entry(1, "21048", "BG01499917", 3, 8, "Kit"),
            entry(2, "21044", "FT9876543210987", 5, 5, "Filter"),
            entry(3, "21044", "BG01499917", 5, 12, "Kit"),
            entry(4, "21044", "BG01499917", 10, 12, "Kit"),
        ];

        let rows = summarize(&entries).unwrap();
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.shipment_ref.as_str(), r.item_code.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("21044", "BG01499917"),
                ("21044", "FT9876543210987"),
                ("21048", "BG01499917"),
            ]
        );

        assert_eq!(rows[0].total_received, 15);
        assert_eq!(rows[0].total_expected, 12);
        assert_eq!(rows[0].difference, 3);
        assert_eq!(rows[1].difference, 0);
        assert_eq!(rows[2].difference, -5);
    }

    #[test]
    fn first_entry_in_scan_order_supplies_snapshot_fields() {
        // 日志按最新在前扫描, 组内首条即最新记录
        let entries = vec![
            entry(2, "21044", "BG01499917", 4, 30, "New description"),
            entry(1, "21044", "BG01499917", 2, 12, "Old description"),
        ];

        let rows = summarize(&entries).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_description, "New description");
        assert_eq!(rows[0].total_expected, 30);
        assert_eq!(rows[0].total_received, 6);
        assert_eq!(rows[0].difference, -24);
    }

    #[test]
    fn overflowing_group_total_is_rejected() {
        let entries = vec![
            entry(1, "21044", "BG01499917", i64::MAX, 12, "Kit"),
            entry(2, "21044", "BG01499917", 1, 12, "Kit"),
        ];
        assert!(matches!(
            summarize(&entries),
            Err(ReceivingError::Validation(_))
        ));

        let negative_expected = vec![entry(1, "21044", "BG01499917", i64::MAX, -1, "Kit")];
        assert!(matches!(
            summarize(&negative_expected),
            Err(ReceivingError::Validation(_))
        ));
    }

    #[test]
    fn totals_do_not_depend_on_entry_order() {
        let mut entries = vec![
            entry(1, "A", "X", 1, 10, "x"),
            entry(2, "A", "X", 2, 10, "x"),
            entry(3, "B", "Y", 7, 0, "y"),
            entry(4, "A", "X", 4, 10, "x"),
        ];
        let forward = summarize(&entries).unwrap();
        entries.reverse();
        let backward = summarize(&entries).unwrap();

        let totals = |rows: &[SummaryRow]| rows.iter().map(|r| r.total_received).collect::<Vec<_>>();
        assert_eq!(totals(&forward), vec![7, 7]);
        assert_eq!(totals(&forward), totals(&backward));
    }
}
