// Bulk CSV import: parsing, diffing against current stock, and confirmation

use std::collections::HashMap;

use crate::entities::{
    quantity_in_range, BulkUpdate, CsvRow, DiffValues, FieldErrors, ImportDiffRow, ImportStatus,
    QuantitySnapshot, RawQuantities, Resource, CSV_HEADER, MAX_QUANTITY,
};
use crate::error::DomainError;

const QUANTITY_ERROR: &str = "Must be a positive integer";
const TARGET_ERROR: &str = "Must be a positive integer or empty";

pub fn parse_csv(data: &[u8]) -> Result<Vec<CsvRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);
    reader.deserialize::<CsvRow>().collect()
}

pub fn render_csv(resources: &[Resource]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for resource in resources {
        writer.write_record([
            resource.id.clone(),
            resource.name.clone(),
            resource.quantity_hagga.to_string(),
            resource.quantity_deep_desert.to_string(),
            resource
                .target_quantity
                .map(|value| value.to_string())
                .unwrap_or_default(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Ids referenced by the upload, in file order, blanks skipped.
pub fn referenced_ids(rows: &[CsvRow]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for row in rows {
        if !row.id.is_empty() && !ids.contains(&row.id) {
            ids.push(row.id.clone());
        }
    }
    ids
}

/// Parses a whole count within `0..=MAX_QUANTITY`. Blank cells count as zero.
fn parse_quantity(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return quantity_in_range(value).then_some(value);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > MAX_QUANTITY as f64 {
        return None;
    }
    Some(value as i64)
}

/// Blank targets mean "no target"; anything else must be a whole count.
fn parse_target(raw: &str) -> Result<Option<i64>, ()> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_quantity(raw).map(Some).ok_or(())
}

fn snapshot(resource: &Resource) -> QuantitySnapshot {
    QuantitySnapshot {
        quantity_hagga: resource.quantity_hagga,
        quantity_deep_desert: resource.quantity_deep_desert,
        target_quantity: resource.target_quantity,
    }
}

pub fn diff_row(row: &CsvRow, current: Option<&Resource>) -> ImportDiffRow {
    let Some(current) = current else {
        return ImportDiffRow {
            id: row.id.clone(),
            name: row.name.clone(),
            status: ImportStatus::NotFound,
            errors: None,
            old: None,
            new: None,
        };
    };

    let mut errors = FieldErrors::default();
    let hagga = parse_quantity(&row.quantity_hagga);
    if hagga.is_none() {
        errors.quantity_hagga = Some(QUANTITY_ERROR.to_string());
    }
    let deep_desert = parse_quantity(&row.quantity_deep_desert);
    if deep_desert.is_none() {
        errors.quantity_deep_desert = Some(QUANTITY_ERROR.to_string());
    }
    let target = parse_target(&row.target_quantity);
    if target.is_err() {
        errors.target_quantity = Some(TARGET_ERROR.to_string());
    }

    let old = snapshot(current);
    let (Some(quantity_hagga), Some(quantity_deep_desert), Ok(target_quantity)) =
        (hagga, deep_desert, target)
    else {
        return ImportDiffRow {
            id: row.id.clone(),
            name: current.name.clone(),
            status: ImportStatus::Invalid,
            errors: Some(errors),
            old: Some(old),
            new: Some(DiffValues::Raw(RawQuantities {
                quantity_hagga: row.quantity_hagga.clone(),
                quantity_deep_desert: row.quantity_deep_desert.clone(),
                target_quantity: row.target_quantity.clone(),
            })),
        };
    };

    let proposed = QuantitySnapshot {
        quantity_hagga,
        quantity_deep_desert,
        target_quantity,
    };
    if proposed == old {
        return ImportDiffRow {
            id: row.id.clone(),
            name: current.name.clone(),
            status: ImportStatus::Unchanged,
            errors: None,
            old: None,
            new: None,
        };
    }
    ImportDiffRow {
        id: row.id.clone(),
        name: current.name.clone(),
        status: ImportStatus::Changed,
        errors: None,
        old: Some(old),
        new: Some(DiffValues::Parsed(proposed)),
    }
}

pub fn diff_rows(rows: &[CsvRow], current: &[Resource]) -> Vec<ImportDiffRow> {
    let by_id: HashMap<&str, &Resource> = current
        .iter()
        .map(|resource| (resource.id.as_str(), resource))
        .collect();
    rows.iter()
        .map(|row| diff_row(row, by_id.get(row.id.as_str()).copied()))
        .collect()
}

/// Keeps only `changed` rows, last occurrence of an id winning.
pub fn collect_confirmed_updates(rows: Vec<ImportDiffRow>) -> Result<Vec<BulkUpdate>, DomainError> {
    let mut order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, QuantitySnapshot> = HashMap::new();
    for row in rows {
        if row.status != ImportStatus::Changed {
            continue;
        }
        let Some(DiffValues::Parsed(values)) = row.new else {
            return Err(DomainError::InvalidInput(format!(
                "changed row '{}' is missing parsed values",
                row.id
            )));
        };
        if !quantity_in_range(values.quantity_hagga)
            || !quantity_in_range(values.quantity_deep_desert)
            || values.target_quantity.map(|target| !quantity_in_range(target)).unwrap_or(false)
        {
            return Err(DomainError::InvalidInput(format!(
                "changed row '{}' has quantities out of range",
                row.id
            )));
        }
        if !latest.contains_key(&row.id) {
            order.push(row.id.clone());
        }
        latest.insert(row.id, values);
    }
    Ok(order
        .into_iter()
        .filter_map(|id| latest.remove(&id).map(|values| BulkUpdate { id, values }))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn resource(id: &str, hagga: i64, deep: i64, target: Option<i64>) -> Resource {
        let now = Utc::now();
        Resource {
            id: id.to_string(),
            name: format!("Resource {}", id),
            category: Some("Raw".to_string()),
            subcategory: None,
            tier: None,
            description: None,
            icon: None,
            image_url: None,
            quantity_hagga: hagga,
            quantity_deep_desert: deep,
            target_quantity: target,
            multiplier: 1.0,
            is_priority: false,
            last_updated_by: "tester".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn rows_are_classified_against_current_stock() {
        let csv = "id,name,quantityHagga,quantityDeepDesert,targetQuantity\n\
                   a,Spice,10,5,100\n\
                   b,Water,7,3,\n\
                   c,Melange,-1,2.5,abc\n\
                   zzz,Ghost,1,1,1\n";
        let rows = parse_csv(csv.as_bytes()).expect("parse csv");
        let current = vec![
            resource("a", 10, 5, Some(100)),
            resource("b", 1, 3, None),
            resource("c", 0, 0, None),
        ];

        let diff = diff_rows(&rows, &current);
        let statuses: Vec<ImportStatus> = diff.iter().map(|row| row.status).collect();
        assert_eq!(
            statuses,
            vec![
                ImportStatus::Unchanged,
                ImportStatus::Changed,
                ImportStatus::Invalid,
                ImportStatus::NotFound
            ]
        );

        let changed = &diff[1];
        assert_eq!(
            changed.new,
            Some(DiffValues::Parsed(QuantitySnapshot {
                quantity_hagga: 7,
                quantity_deep_desert: 3,
                target_quantity: None,
            }))
        );

        let invalid = diff[2].errors.clone().expect("field errors");
        assert_eq!(invalid.quantity_hagga.as_deref(), Some("Must be a positive integer"));
        assert_eq!(invalid.quantity_deep_desert.as_deref(), Some("Must be a positive integer"));
        assert_eq!(
            invalid.target_quantity.as_deref(),
            Some("Must be a positive integer or empty")
        );
        assert_eq!(diff[3].name, "Ghost");
    }

    #[test]
    fn whole_number_notation_is_accepted() {
        assert_eq!(parse_quantity("1e3"), Some(1000));
        assert_eq!(parse_quantity("4.0"), Some(4));
        assert_eq!(parse_quantity(""), Some(0));
        assert_eq!(parse_quantity("4.5"), None);
        assert_eq!(parse_target(""), Ok(None));
        assert_eq!(parse_target("-3"), Err(()));
    }

    #[test]
    fn oversized_counts_are_invalid() {
        assert_eq!(parse_quantity("2147483647"), Some(MAX_QUANTITY));
        assert_eq!(parse_quantity("2147483648"), None);
        assert_eq!(parse_quantity("9000000000000000000"), None);
        assert_eq!(parse_quantity("9e18"), None);
        assert_eq!(parse_target("1e12"), Err(()));

        let csv = "id,name,quantityHagga,quantityDeepDesert,targetQuantity\n\
                   a,Spice,9000000000000000000,9000000000000000000,\n";
        let rows = parse_csv(csv.as_bytes()).expect("parse csv");
        let diff = diff_rows(&rows, &[resource("a", 0, 0, None)]);
        assert_eq!(diff[0].status, ImportStatus::Invalid);
        assert!(collect_confirmed_updates(diff).expect("collect").is_empty());
    }

    #[test]
    fn confirmation_rejects_out_of_range_values() {
        let row = ImportDiffRow {
            id: "a".to_string(),
            name: String::new(),
            status: ImportStatus::Changed,
            errors: None,
            old: None,
            new: Some(DiffValues::Parsed(QuantitySnapshot {
                quantity_hagga: MAX_QUANTITY + 1,
                quantity_deep_desert: 0,
                target_quantity: None,
            })),
        };
        assert!(collect_confirmed_updates(vec![row]).is_err());
    }

    #[test]
    fn confirmation_keeps_last_changed_row_per_id() {
        let changed = |id: &str, hagga: i64| ImportDiffRow {
            id: id.to_string(),
            name: String::new(),
            status: ImportStatus::Changed,
            errors: None,
            old: None,
            new: Some(DiffValues::Parsed(QuantitySnapshot {
                quantity_hagga: hagga,
                quantity_deep_desert: 0,
                target_quantity: None,
            })),
        };
        let unchanged = ImportDiffRow {
            id: "b".to_string(),
            name: String::new(),
            status: ImportStatus::Unchanged,
            errors: None,
            old: None,
            new: None,
        };
        let updates =
            collect_confirmed_updates(vec![changed("a", 1), unchanged, changed("c", 3), changed("a", 9)])
                .expect("collect");
        let flattened: Vec<(&str, i64)> = updates
            .iter()
            .map(|update| (update.id.as_str(), update.values.quantity_hagga))
            .collect();
        assert_eq!(flattened, vec![("a", 9), ("c", 3)]);
    }

    #[test]
    fn export_writes_blank_targets() {
        let csv = render_csv(&[resource("a", 3, 4, None)]).expect("render");
        assert_eq!(
            csv,
            "id,name,quantityHagga,quantityDeepDesert,targetQuantity\na,Resource a,3,4,\n"
        );
    }
}
