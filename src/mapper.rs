use crate::coerce::coerce;
use crate::models::{MappedRecord, MatchedRecord};
use crate::schema::{
    GROSS_PAY, HOURS_OVERTIME, HOURS_PTO, HOURS_REGULAR, PAY_DATE, PRETAX, PRETAX_CATCHUP, ROTH,
    ROTH_CATCHUP, SAFE_HARBOR,
};
use crate::table::Row;

fn amount(row: Option<Row<'_>>, column: &str) -> f64 {
    coerce(row.and_then(|r| r.get(column)))
}

/// Project one matched row onto the upload's payroll fields.
///
/// Absent numeric columns read as zero; the check date is the raw pay-date
/// text and is absent when there is no payroll row or no pay-date column.
pub fn map_record(matched: &MatchedRecord<'_>) -> MappedRecord {
    let row = matched.transaction;
    MappedRecord {
        roster: matched.roster.clone(),
        match_type: matched.match_type,
        check_date: row.and_then(|r| r.get(PAY_DATE)).map(str::to_string),
        gross_pay: amount(row, GROSS_PAY),
        hours_worked: amount(row, HOURS_REGULAR) + amount(row, HOURS_OVERTIME) + amount(row, HOURS_PTO),
        pretax: amount(row, PRETAX),
        pretax_catchup: amount(row, PRETAX_CATCHUP),
        roth: amount(row, ROTH),
        roth_catchup: amount(row, ROTH_CATCHUP),
        safe_harbor: amount(row, SAFE_HARBOR),
    }
}

pub fn apply_field_mapping(matched: &[MatchedRecord<'_>]) -> Vec<MappedRecord> {
    matched.iter().map(map_record).collect()
}
