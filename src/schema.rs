//! Canonical transaction schema and the vendor alias table.
//!
//! The schema is a single immutable value built at startup and passed by
//! reference to header detection and column normalization.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{PayfillError, Result};

pub const EMP_LAST: &str = "Employee Last Name";
pub const EMP_FIRST: &str = "Employee First Name";
pub const PRETAX: &str = "401k";
pub const PRETAX_CATCHUP: &str = "401k Catch-Up";
pub const ROTH: &str = "Roth 401K";
pub const ROTH_CATCHUP: &str = "Roth Catch-Up";
pub const SAFE_HARBOR: &str = "401K Match 2";
pub const GROSS_PAY: &str = "Gross Pay";
pub const HOURS_REGULAR: &str = "Regular Hours";
pub const HOURS_OVERTIME: &str = "Overtime Hours";
pub const HOURS_PTO: &str = "Vacation/PTO Hours";
pub const PAY_DATE: &str = "Pay Date";

/// Columns the fill run cannot do without.
pub const REQUIRED_COLUMNS: &[&str] = &[EMP_LAST, EMP_FIRST, PAY_DATE];

/// Lowercase and strip everything that is not an ASCII letter or digit.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Name,
    Amount,
    Hours,
    Date,
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Amount => "amount",
            Self::Hours => "hours",
            Self::Date => "date",
        }
    }
}

const HOURS_MARKERS: &[&str] = &["hour", "hrs", "pto", "timeoff"];

fn looks_like_hours(normalized: &str) -> bool {
    HOURS_MARKERS.iter().any(|m| normalized.contains(m))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalField {
    pub name: String,
    pub kind: FieldKind,
    pub aliases: Vec<String>,
}

impl CanonicalField {
    fn new(name: &str, kind: FieldKind, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn spellings(&self) -> BTreeSet<String> {
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .map(|s| normalize(s))
            .collect()
    }
}

/// Canonical name -> normalized accepted spellings, in schema order.
pub type AliasMap = Vec<(String, BTreeSet<String>)>;

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaConfig {
    fields: Vec<CanonicalField>,
}

pub fn builtin_fields() -> Vec<CanonicalField> {
    use FieldKind::*;
    vec![
        CanonicalField::new(EMP_LAST, Name, &["Emp Last Name", "Employee Last", "Last", "Last Name"]),
        CanonicalField::new(EMP_FIRST, Name, &["Emp First Name", "Employee First", "First", "First Name"]),
        CanonicalField::new(
            PRETAX,
            Amount,
            &["401(k)", "401 k", "Pre tax 401k", "Pre-tax 401k", "Pretax 401k"],
        ),
        CanonicalField::new(
            PRETAX_CATCHUP,
            Amount,
            &["401k Catch Up", "Pre-tax Catch Up", "Pretax Catch-Up", "401(k) Catch-Up"],
        ),
        CanonicalField::new(ROTH, Amount, &["Roth 401k", "Roth401k", "Roth-401k"]),
        CanonicalField::new(
            ROTH_CATCHUP,
            Amount,
            &["Roth Catch Up", "Roth 401k Catch-Up", "Roth 401(k) Catch-Up"],
        ),
        CanonicalField::new(
            SAFE_HARBOR,
            Amount,
            &["401k Match2", "Safe Harbor Non Elective", "Safe Harbor"],
        ),
        CanonicalField::new(
            GROSS_PAY,
            Amount,
            &["Gross", "Gross Wages", "Current Period Compensation"],
        ),
        // Bare "Regular" and "Overtime" are dollar columns in some exports.
        CanonicalField::new(HOURS_REGULAR, Hours, &["Reg Hours", "Base Hours"]),
        CanonicalField::new(HOURS_OVERTIME, Hours, &["OT Hours"]),
        CanonicalField::new(
            HOURS_PTO,
            Hours,
            &["PTO Hours", "Vacation Hours", "Paid Time Off", "Leave Hours"],
        ),
        CanonicalField::new(PAY_DATE, Date, &["Paydate", "Pay Dt", "Check Date"]),
    ]
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            fields: builtin_fields(),
        }
    }
}

impl SchemaConfig {
    pub fn new(fields: Vec<CanonicalField>) -> Result<Self> {
        validate(&fields)?;
        Ok(Self { fields })
    }

    /// Merge additional vendor spellings into the builtin table.
    pub fn with_extra_aliases(self, extra: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut fields = self.fields;
        for (canon, aliases) in extra {
            let field = fields
                .iter_mut()
                .find(|f| f.name == *canon)
                .ok_or_else(|| PayfillError::Config(format!("unknown canonical field '{canon}'")))?;
            for alias in aliases {
                if !field.aliases.contains(alias) {
                    field.aliases.push(alias.clone());
                }
            }
        }
        Self::new(fields)
    }

    pub fn fields(&self) -> &[CanonicalField] {
        &self.fields
    }

    pub fn canonical_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Every canonical name and alias; what header detection scores against.
    pub fn header_vocabulary(&self) -> Vec<&str> {
        self.fields
            .iter()
            .flat_map(|f| std::iter::once(f.name.as_str()).chain(f.aliases.iter().map(String::as_str)))
            .collect()
    }

    pub fn alias_map(&self) -> AliasMap {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.spellings()))
            .collect()
    }
}

fn validate(fields: &[CanonicalField]) -> Result<()> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    for field in fields {
        for spelling in field.spellings() {
            if spelling.is_empty() {
                return Err(PayfillError::Config(format!(
                    "'{}' has an alias with no letters or digits",
                    field.name
                )));
            }
            let hours_like = looks_like_hours(&spelling);
            if (field.kind == FieldKind::Hours && !hours_like)
                || (field.kind == FieldKind::Amount && hours_like)
            {
                return Err(PayfillError::Config(format!(
                    "alias '{spelling}' does not fit {} field '{}'",
                    field.kind.label(),
                    field.name
                )));
            }
            if let Some(owner) = owners.insert(spelling.clone(), &field.name) {
                if owner != field.name {
                    return Err(PayfillError::Config(format!(
                        "alias '{spelling}' claimed by both '{owner}' and '{}'",
                        field.name
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("401(k)"), "401k");
        assert_eq!(normalize("Vacation/PTO Hours"), "vacationptohours");
        assert_eq!(normalize("  Emp-Last Name "), "emplastname");
        assert_eq!(normalize(&normalize("Roth-401K")), normalize("Roth-401K"));
    }

    #[test]
    fn test_builtin_table_is_valid() {
        assert!(SchemaConfig::new(builtin_fields()).is_ok());
    }

    #[test]
    fn test_alias_map_is_idempotent() {
        let schema = SchemaConfig::default();
        assert_eq!(schema.alias_map(), schema.alias_map());
        let (canon, spellings) = &schema.alias_map()[2];
        assert_eq!(canon, PRETAX);
        assert!(spellings.contains("401k"));
        assert!(spellings.contains("pretax401k"));
        // "401(k)" and "401 k" fold into the canonical spelling
        assert_eq!(spellings.len(), 2);
    }

    #[test]
    fn test_regular_is_not_an_hours_alias() {
        let schema = SchemaConfig::default();
        let map = schema.alias_map();
        let (_, hours) = map.iter().find(|(c, _)| c == HOURS_REGULAR).unwrap();
        assert!(!hours.contains("regular"));
        let (_, ot) = map.iter().find(|(c, _)| c == HOURS_OVERTIME).unwrap();
        assert!(!ot.contains("overtime"));
    }

    #[test]
    fn test_extra_aliases_merge() {
        let mut extra = BTreeMap::new();
        extra.insert(GROSS_PAY.to_string(), vec!["Total Gross".to_string()]);
        let schema = SchemaConfig::default().with_extra_aliases(&extra).unwrap();
        let map = schema.alias_map();
        let (_, gross) = map.iter().find(|(c, _)| c == GROSS_PAY).unwrap();
        assert!(gross.contains("totalgross"));
        assert!(schema.header_vocabulary().contains(&"Total Gross"));
    }

    #[test]
    fn test_extra_aliases_reject_unknown_field() {
        let mut extra = BTreeMap::new();
        extra.insert("Bonus".to_string(), vec!["Bonus Pay".to_string()]);
        assert!(matches!(
            SchemaConfig::default().with_extra_aliases(&extra),
            Err(PayfillError::Config(_))
        ));
    }

    #[test]
    fn test_amount_spelling_rejected_on_hours_field() {
        let mut extra = BTreeMap::new();
        extra.insert(HOURS_REGULAR.to_string(), vec!["Regular".to_string()]);
        assert!(SchemaConfig::default().with_extra_aliases(&extra).is_err());

        let mut extra = BTreeMap::new();
        extra.insert(GROSS_PAY.to_string(), vec!["Gross Hours".to_string()]);
        assert!(SchemaConfig::default().with_extra_aliases(&extra).is_err());
    }

    #[test]
    fn test_collision_between_fields_rejected() {
        let mut extra = BTreeMap::new();
        extra.insert(ROTH.to_string(), vec!["401 (k)".to_string()]);
        let err = SchemaConfig::default().with_extra_aliases(&extra).unwrap_err();
        assert!(err.to_string().contains("claimed by both"));
    }
}
