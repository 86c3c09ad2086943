//! Two-pass roster to payroll name matching.
//!
//! Pass one joins roster rows that carry a middle initial against payroll
//! rows that carry one, on `LAST|FIRST|MI`. Every roster row that entered
//! pass one is finished, matched or not. Pass two joins the rest on
//! `LAST|FIRST` against the whole payroll table. Within each pass, duplicate
//! payroll keys resolve to the first row in file order.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::models::{MatchType, MatchedRecord, RosterRecord};
use crate::names::ParsedName;
use crate::schema::{EMP_FIRST, EMP_LAST};
use crate::table::Table;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub strict: usize,
    pub loose: usize,
    pub unmatched: usize,
}

impl MatchSummary {
    pub fn total(&self) -> usize {
        self.strict + self.loose + self.unmatched
    }
}

pub fn summarize(matched: &[MatchedRecord<'_>]) -> MatchSummary {
    let mut summary = MatchSummary::default();
    for m in matched {
        match m.match_type {
            MatchType::Strict => summary.strict += 1,
            MatchType::Loose => summary.loose += 1,
            MatchType::Unmatched => summary.unmatched += 1,
        }
    }
    summary
}

/// First payroll row index per key; later duplicates are dropped.
fn first_by_key<'n>(
    names: impl Iterator<Item = (usize, &'n ParsedName)>,
    key: impl Fn(&ParsedName) -> String,
    pass: &str,
) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (i, name) in names {
        let k = key(name);
        if let Some(first) = index.get(&k) {
            debug!(pass, key = %k, kept = first, dropped = i, "duplicate payroll key");
            continue;
        }
        index.insert(k, i);
    }
    index
}

/// Join each roster row to at most one payroll row.
///
/// Output holds one record per roster row: strict-pass rows first, then
/// loose-pass rows, each group in roster order. A record whose joined payroll
/// row is missing or has a blank last name is labelled unmatched.
pub fn match_roster<'a>(roster: &'a [RosterRecord], transactions: &'a Table) -> Vec<MatchedRecord<'a>> {
    let roster_names: Vec<ParsedName> = roster
        .iter()
        .map(|r| ParsedName::from_roster(&r.first_name, &r.middle_initial, &r.last_name))
        .collect();
    let txn_names: Vec<ParsedName> = transactions
        .rows()
        .map(|row| ParsedName::from_transaction(row.text(EMP_FIRST), row.text(EMP_LAST)))
        .collect();

    let mut out = Vec::with_capacity(roster.len());

    // Strict pass
    let strict_index = first_by_key(
        txn_names.iter().enumerate().filter(|(_, n)| n.has_middle_initial()),
        ParsedName::strict_key,
        "strict",
    );
    let strict_roster: Vec<usize> = (0..roster.len())
        .filter(|&i| roster_names[i].has_middle_initial())
        .collect();
    for &i in &strict_roster {
        let joined = strict_index.get(&roster_names[i].strict_key()).copied();
        if joined.is_none() {
            warn!(
                employee = %roster_names[i].strict_key(),
                "no payroll row with matching middle initial; not retried by first and last name"
            );
        }
        out.push(MatchedRecord {
            roster: &roster[i],
            transaction: joined.and_then(|t| transactions.row(t)),
            match_type: MatchType::Strict,
        });
    }
    let done: HashSet<String> = strict_roster
        .iter()
        .map(|&i| roster_names[i].strict_key())
        .collect();

    // Loose pass
    let loose_index = first_by_key(txn_names.iter().enumerate(), ParsedName::loose_key, "loose");
    for (i, name) in roster_names.iter().enumerate() {
        if done.contains(&name.strict_key()) {
            continue;
        }
        let joined = loose_index.get(&name.loose_key()).copied();
        out.push(MatchedRecord {
            roster: &roster[i],
            transaction: joined.and_then(|t| transactions.row(t)),
            match_type: MatchType::Loose,
        });
    }

    for record in &mut out {
        let has_last = record
            .transaction
            .is_some_and(|row| !row.text(EMP_LAST).is_empty());
        if !has_last {
            record.match_type = MatchType::Unmatched;
        }
    }

    let summary = summarize(&out);
    info!(
        strict = summary.strict,
        loose = summary.loose,
        unmatched = summary.unmatched,
        "matched roster to payroll"
    );
    out
}
