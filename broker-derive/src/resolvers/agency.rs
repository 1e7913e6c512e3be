//! Agency hierarchy resolution
//!
//! Sub-tier code → top-tier (CGAC or FREC, by `is_frec`) code and name.
//! Office codes fill a missing sub-tier and carry their own names.

use crate::models::fields::present;
use crate::models::RecordContext;
use crate::sink::{DerivationEvent, DerivationSink, EventLevel};
use crate::snapshot::ReferenceSnapshot;

/// Agency code used when the top-tier parent cannot be resolved
pub const UNKNOWN_AGENCY_CODE: &str = "999";

/// Which agency slot is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgencyRole {
    Awarding,
    Funding,
}

impl AgencyRole {
    pub fn label(self) -> &'static str {
        match self {
            AgencyRole::Awarding => "awarding",
            AgencyRole::Funding => "funding",
        }
    }
}

/// Mutable view of one role's agency and office columns
pub struct AgencyFieldsMut<'a> {
    pub agency_code: &'a mut Option<String>,
    pub agency_name: &'a mut Option<String>,
    pub sub_tier_code: &'a mut Option<String>,
    pub sub_tier_name: &'a mut Option<String>,
    pub office_code: &'a Option<String>,
    pub office_name: &'a mut Option<String>,
}

/// Office name for a code, `None` when unknown
pub fn office_name(snapshot: &ReferenceSnapshot, office_code: &Option<String>) -> Option<String> {
    present(office_code)
        .and_then(|code| snapshot.office(code))
        .and_then(|office| office.name.clone())
}

/// Resolve one role's agency, sub-tier and office names
pub fn resolve_agency(
    snapshot: &ReferenceSnapshot,
    role: AgencyRole,
    fields: AgencyFieldsMut<'_>,
    ctx: &RecordContext,
    sink: &dyn DerivationSink,
) {
    let AgencyFieldsMut {
        agency_code,
        agency_name,
        sub_tier_code,
        sub_tier_name,
        office_code,
        office_name: office_name_slot,
    } = fields;

    if present(sub_tier_code).is_none() {
        if let Some(owner) = present(office_code)
            .and_then(|code| snapshot.office(code))
            .and_then(|office| office.sub_tier_code.clone())
        {
            *sub_tier_code = Some(owner);
        }
    }

    *office_name_slot = office_name(snapshot, office_code);

    let Some(code) = present(sub_tier_code).map(str::to_string) else {
        return;
    };

    match snapshot.sub_tier(&code) {
        Some(sub_tier) => {
            *sub_tier_name = sub_tier.name.clone();
            match sub_tier.top_tier() {
                Some(top) => {
                    *agency_code = Some(top.code.clone());
                    *agency_name = top.name.clone();
                }
                None => {
                    *agency_code = Some(UNKNOWN_AGENCY_CODE.to_string());
                    *agency_name = None;
                }
            }
        }
        None => {
            *agency_code = Some(UNKNOWN_AGENCY_CODE.to_string());
            *agency_name = None;
            *sub_tier_name = None;
            sink.emit(DerivationEvent::new(
                EventLevel::Warn,
                format!(
                    "No {} sub-tier agency found for code {}",
                    role.label(),
                    code
                ),
                ctx,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;
    use crate::snapshot::{FrecRow, OfficeRow, SubTierRow};

    fn snapshot() -> ReferenceSnapshot {
        ReferenceSnapshot::builder()
            .countries(Vec::new())
            .states(Vec::new())
            .counties(Vec::new())
            .cities(Vec::new())
            .zip_cities(Vec::new())
            .zips(Vec::new())
            .cgacs(vec![("097".to_string(), Some("DEPT OF DEFENSE".to_string()))])
            .frecs(vec![FrecRow {
                frec_code: "1601".to_string(),
                agency_name: Some("DEPT OF LABOR FREC".to_string()),
                cgac_code: Some("016".to_string()),
            }])
            .sub_tiers(vec![
                SubTierRow {
                    sub_tier_agency_code: "9700".to_string(),
                    sub_tier_agency_name: Some("DEFENSE".to_string()),
                    cgac_code: Some("097".to_string()),
                    frec_code: None,
                    is_frec: false,
                },
                SubTierRow {
                    sub_tier_agency_code: "1630".to_string(),
                    sub_tier_agency_name: Some("LABOR SUB".to_string()),
                    cgac_code: Some("016".to_string()),
                    frec_code: Some("1601".to_string()),
                    is_frec: true,
                },
                SubTierRow {
                    sub_tier_agency_code: "1200".to_string(),
                    sub_tier_agency_name: Some("DANGLING".to_string()),
                    cgac_code: Some("012".to_string()),
                    frec_code: None,
                    is_frec: false,
                },
                SubTierRow {
                    sub_tier_agency_code: "0000".to_string(),
                    sub_tier_agency_name: Some("ORPHAN".to_string()),
                    cgac_code: None,
                    frec_code: None,
                    is_frec: false,
                },
            ])
            .offices(vec![OfficeRow {
                office_code: "W91QUZ".to_string(),
                office_name: Some("ARMY OFFICE".to_string()),
                sub_tier_code: Some("9700".to_string()),
                ..Default::default()
            }])
            .cfda_programs(Vec::new())
            .recipients(Vec::new())
            .exec_comp(Vec::new())
            .build()
            .unwrap()
    }

    #[derive(Default)]
    struct Slots {
        agency_code: Option<String>,
        agency_name: Option<String>,
        sub_tier_code: Option<String>,
        sub_tier_name: Option<String>,
        office_code: Option<String>,
        office_name: Option<String>,
    }

    fn run(slots: &mut Slots, sink: &CollectingSink) {
        resolve_agency(
            &snapshot(),
            AgencyRole::Awarding,
            AgencyFieldsMut {
                agency_code: &mut slots.agency_code,
                agency_name: &mut slots.agency_name,
                sub_tier_code: &mut slots.sub_tier_code,
                sub_tier_name: &mut slots.sub_tier_name,
                office_code: &slots.office_code,
                office_name: &mut slots.office_name,
            },
            &RecordContext::new("1", "1"),
            sink,
        );
    }

    #[test]
    fn test_cgac_parent() {
        let sink = CollectingSink::new();
        let mut slots = Slots { sub_tier_code: Some("9700".into()), ..Default::default() };
        run(&mut slots, &sink);

        assert_eq!(slots.agency_code.as_deref(), Some("097"));
        assert_eq!(slots.agency_name.as_deref(), Some("DEPT OF DEFENSE"));
        assert_eq!(slots.sub_tier_name.as_deref(), Some("DEFENSE"));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_frec_parent_when_flagged() {
        let sink = CollectingSink::new();
        let mut slots = Slots { sub_tier_code: Some("1630".into()), ..Default::default() };
        run(&mut slots, &sink);

        assert_eq!(slots.agency_code.as_deref(), Some("1601"));
        assert_eq!(slots.agency_name.as_deref(), Some("DEPT OF LABOR FREC"));
    }

    #[test]
    fn test_sub_tier_filled_from_office() {
        let sink = CollectingSink::new();
        let mut slots = Slots { office_code: Some("w91quz".into()), ..Default::default() };
        run(&mut slots, &sink);

        assert_eq!(slots.sub_tier_code.as_deref(), Some("9700"));
        assert_eq!(slots.agency_code.as_deref(), Some("097"));
        assert_eq!(slots.office_name.as_deref(), Some("ARMY OFFICE"));
    }

    #[test]
    fn test_unknown_sub_tier_sets_sentinel_and_logs() {
        let sink = CollectingSink::new();
        let mut slots = Slots { sub_tier_code: Some("ZZZZ".into()), ..Default::default() };
        run(&mut slots, &sink);

        assert_eq!(slots.agency_code.as_deref(), Some(UNKNOWN_AGENCY_CODE));
        assert!(slots.agency_name.is_none());
        assert_eq!(sink.find("ZZZZ").len(), 1);
    }

    #[test]
    fn test_orphan_sub_tier_gets_sentinel_without_log() {
        let sink = CollectingSink::new();
        let mut slots = Slots { sub_tier_code: Some("0000".into()), ..Default::default() };
        run(&mut slots, &sink);

        assert_eq!(slots.agency_code.as_deref(), Some(UNKNOWN_AGENCY_CODE));
        assert_eq!(slots.sub_tier_name.as_deref(), Some("ORPHAN"));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_parent_missing_from_cgac_table_gets_sentinel() {
        let sink = CollectingSink::new();
        let mut slots = Slots { sub_tier_code: Some("1200".into()), ..Default::default() };
        run(&mut slots, &sink);

        assert_eq!(slots.agency_code.as_deref(), Some(UNKNOWN_AGENCY_CODE));
        assert!(slots.agency_name.is_none());
        assert_eq!(slots.sub_tier_name.as_deref(), Some("DANGLING"));
    }

    #[test]
    fn test_missing_sub_tier_and_office_is_noop() {
        let sink = CollectingSink::new();
        let mut slots = Slots::default();
        run(&mut slots, &sink);

        assert!(slots.agency_code.is_none());
        assert!(slots.office_name.is_none());
    }
}
