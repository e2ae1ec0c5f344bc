//! Grouping pairing
//!
//! `start`/`stop` pair by (number, memberOf) over the whole document.
//! Distinct keys may interleave freely; only key equality matters.

use std::collections::BTreeMap;

use super::PairingReport;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Locator};
use crate::models::{Element, Event, Grouping, GroupingType};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupingKey {
    pub number: String,
    pub member_of: Option<String>,
}

impl GroupingKey {
    pub fn of(grouping: &Grouping) -> Self {
        Self {
            number: grouping.number.clone(),
            member_of: grouping.member_of.clone(),
        }
    }

    fn describe(&self) -> String {
        match &self.member_of {
            Some(member_of) => format!("grouping {} (member of {})", self.number, member_of),
            None => format!("grouping {}", self.number),
        }
    }
}

/// Open groupings with the locator of their `start`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupingLedger {
    open: BTreeMap<GroupingKey, Locator>,
}

impl GroupingLedger {
    pub fn is_open(&self, key: &GroupingKey) -> bool {
        self.open.contains_key(key)
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

pub fn resolve_groupings(
    mut ledger: GroupingLedger,
    events: &[Event],
    measure: &Locator,
) -> PairingReport<GroupingLedger> {
    let mut diagnostics = Vec::new();

    for event in events {
        let grouping = match &event.element {
            Element::Grouping(grouping) => grouping,
            Element::Note(_)
            | Element::Beam(_)
            | Element::TimeModification(_)
            | Element::Forward(_)
            | Element::Backup(_)
            | Element::InstrumentChange(_)
            | Element::MidiDevice(_)
            | Element::MidiInstrument(_)
            | Element::Unpitched(_)
            | Element::Opus(_)
            | Element::Stem(_)
            | Element::Cue(_)
            | Element::Tie(_) => continue,
        };

        let key = GroupingKey::of(grouping);
        let at = measure.at_event(event.index);
        match grouping.kind {
            GroupingType::Start => {
                if ledger.open.contains_key(&key) {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticCode::GroupingReopen,
                        at,
                        format!("{} starts while already open", key.describe()),
                    ));
                } else {
                    ledger.open.insert(key, at);
                }
            }
            GroupingType::Stop => {
                if ledger.open.remove(&key).is_none() {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticCode::GroupingUnmatchedStop,
                        at,
                        format!("{} stops without a start", key.describe()),
                    ));
                }
            }
            GroupingType::Single => {
                if ledger.open.contains_key(&key) {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticCode::GroupingKeyCollision,
                        at,
                        format!("single {} collides with an open start", key.describe()),
                    ));
                }
            }
        }
    }

    PairingReport {
        ledger,
        diagnostics,
    }
}

/// End of document: every grouping still open is unclosed
pub fn close_groupings(ledger: GroupingLedger) -> Vec<Diagnostic> {
    ledger
        .open
        .into_iter()
        .map(|(key, locator)| {
            Diagnostic::error(
                DiagnosticCode::GroupingUnclosed,
                locator,
                format!("{} is never stopped", key.describe()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_support::events;

    fn grouping(kind: GroupingType, number: &str, member_of: Option<&str>) -> Element {
        Element::Grouping(Grouping {
            kind,
            number: number.to_string(),
            member_of: member_of.map(str::to_string),
            features: Vec::new(),
        })
    }

    fn run(elements: Vec<Element>) -> Vec<DiagnosticCode> {
        let report = resolve_groupings(GroupingLedger::default(), &events(elements), &Locator::default());
        let mut diagnostics = report.diagnostics;
        diagnostics.extend(close_groupings(report.ledger));
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_start_stop() {
        assert!(run(vec![
            grouping(GroupingType::Start, "1", None),
            grouping(GroupingType::Stop, "1", None),
        ])
        .is_empty());
    }

    #[test]
    fn test_stop_alone() {
        assert_eq!(
            run(vec![grouping(GroupingType::Stop, "1", None)]),
            vec![DiagnosticCode::GroupingUnmatchedStop]
        );
    }

    #[test]
    fn test_start_alone_is_unclosed() {
        assert_eq!(
            run(vec![grouping(GroupingType::Start, "1", None)]),
            vec![DiagnosticCode::GroupingUnclosed]
        );
    }

    #[test]
    fn test_single_is_standalone() {
        assert!(run(vec![grouping(GroupingType::Single, "1", None)]).is_empty());
    }

    #[test]
    fn test_single_on_open_key_collides() {
        assert_eq!(
            run(vec![
                grouping(GroupingType::Start, "1", None),
                grouping(GroupingType::Single, "1", None),
                grouping(GroupingType::Stop, "1", None),
            ]),
            vec![DiagnosticCode::GroupingKeyCollision]
        );
    }

    #[test]
    fn test_reopen() {
        assert_eq!(
            run(vec![
                grouping(GroupingType::Start, "1", None),
                grouping(GroupingType::Start, "1", None),
                grouping(GroupingType::Stop, "1", None),
            ]),
            vec![DiagnosticCode::GroupingReopen]
        );
    }

    #[test]
    fn test_keys_interleave() {
        assert!(run(vec![
            grouping(GroupingType::Start, "1", None),
            grouping(GroupingType::Start, "2", None),
            grouping(GroupingType::Stop, "1", None),
            grouping(GroupingType::Stop, "2", None),
        ])
        .is_empty());
    }

    #[test]
    fn test_member_of_separates_keys() {
        assert_eq!(
            run(vec![
                grouping(GroupingType::Start, "1", Some("phrase")),
                grouping(GroupingType::Stop, "1", None),
            ]),
            vec![DiagnosticCode::GroupingUnmatchedStop, DiagnosticCode::GroupingUnclosed]
        );
    }
}
