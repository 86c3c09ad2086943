use serde::Deserialize;

use crate::table::Row;

/// One employee from the roster file. Read-only for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RosterRecord {
    #[serde(rename = "SSN")]
    pub ssn: String,
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "MI")]
    pub middle_initial: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
    #[serde(rename = "Address 1")]
    pub address1: String,
    #[serde(rename = "Address 2")]
    pub address2: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Zip")]
    pub zip: String,
    #[serde(rename = "Date of Birth")]
    pub date_of_birth: String,
    #[serde(rename = "Date of Hire")]
    pub date_of_hire: String,
    #[serde(rename = "Date of Term")]
    pub date_of_term: String,
    #[serde(rename = "Rehire Date")]
    pub rehire_date: String,
    #[serde(rename = "Email Address")]
    pub email: String,
    #[serde(rename = "Profit Share")]
    pub profit_share: String,
}

impl RosterRecord {
    /// Identity columns in upload order (everything before the payroll fields).
    pub fn identity_values(&self) -> [&str; 14] {
        [
            &self.ssn,
            &self.first_name,
            &self.middle_initial,
            &self.last_name,
            &self.address1,
            &self.address2,
            &self.city,
            &self.state,
            &self.zip,
            &self.date_of_birth,
            &self.date_of_hire,
            &self.date_of_term,
            &self.rehire_date,
            &self.email,
        ]
    }
}

pub const ROSTER_COLUMNS: &[&str] = &[
    "SSN",
    "First Name",
    "MI",
    "Last Name",
    "Address 1",
    "Address 2",
    "City",
    "State",
    "Zip",
    "Date of Birth",
    "Date of Hire",
    "Date of Term",
    "Rehire Date",
    "Email Address",
    "Profit Share",
];

pub const OUT_CHECK_DATE: &str = "Check Date";
pub const OUT_GROSS_PAY: &str = "Gross Pay";
pub const OUT_HOURS_WORKED: &str = "Hours Worked";
pub const OUT_PRETAX: &str = "Pretax 401k";
pub const OUT_PRETAX_CATCHUP: &str = "Pretax Catch-Up";
pub const OUT_ROTH: &str = "Roth 401k";
pub const OUT_ROTH_CATCHUP: &str = "Roth Catch-Up";
pub const OUT_SAFE_HARBOR: &str = "Safe Harbor NE";

/// Upload file column order.
pub const FINAL_COLUMNS: &[&str] = &[
    "SSN",
    "First Name",
    "MI",
    "Last Name",
    "Address 1",
    "Address 2",
    "City",
    "State",
    "Zip",
    "Date of Birth",
    "Date of Hire",
    "Date of Term",
    "Rehire Date",
    "Email Address",
    OUT_CHECK_DATE,
    OUT_GROSS_PAY,
    OUT_HOURS_WORKED,
    OUT_PRETAX,
    OUT_PRETAX_CATCHUP,
    OUT_ROTH,
    OUT_ROTH_CATCHUP,
    OUT_SAFE_HARBOR,
    "Profit Share",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchType {
    Strict,
    Loose,
    Unmatched,
}

impl MatchType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Loose => "loose",
            Self::Unmatched => "unmatched",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A roster row joined to at most one payroll row.
#[derive(Debug, Clone, Copy)]
pub struct MatchedRecord<'a> {
    pub roster: &'a RosterRecord,
    pub transaction: Option<Row<'a>>,
    pub match_type: MatchType,
}

/// A matched row projected onto the upload's payroll fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRecord {
    pub roster: RosterRecord,
    pub match_type: MatchType,
    /// Raw pay-date text, copied verbatim; `None` when unmatched or the column is absent.
    pub check_date: Option<String>,
    pub gross_pay: f64,
    pub hours_worked: f64,
    pub pretax: f64,
    pub pretax_catchup: f64,
    pub roth: f64,
    pub roth_catchup: f64,
    pub safe_harbor: f64,
}
