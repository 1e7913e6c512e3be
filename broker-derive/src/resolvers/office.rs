//! Office back-fill for assistance records
//!
//! When a record arrives without an awarding or funding office code, the
//! earliest active published transaction of the same award may donate its
//! codes. Codes are only ever added, never replaced.

use crate::models::fields::present;
use crate::models::{FabsRecord, RecordType};
use crate::snapshot::{DonorKey, OfficeRole, ReferenceSnapshot};

/// Which office slots were filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillOutcome {
    pub awarding: bool,
    pub funding: bool,
}

impl BackfillOutcome {
    pub fn any(&self) -> bool {
        self.awarding || self.funding
    }
}

fn same_modification(a: &Option<String>, b: &Option<String>) -> bool {
    match (present(a), present(b)) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

fn valid_for(snapshot: &ReferenceSnapshot, code: &Option<String>, role: OfficeRole) -> Option<String> {
    let code = present(code)?;
    snapshot
        .office(code)
        .filter(|office| office.roles.allows(role))
        .map(|office| office.code.clone())
}

/// Fill missing office codes from the award's first published transaction
pub fn backfill_offices(snapshot: &ReferenceSnapshot, record: &mut FabsRecord) -> BackfillOutcome {
    let mut outcome = BackfillOutcome::default();

    let awarding_missing = present(&record.awarding_office_code).is_none();
    let funding_missing = present(&record.funding_office_code).is_none();
    if !awarding_missing && !funding_missing {
        return outcome;
    }

    let aggregate = record.record_type() == Some(RecordType::Aggregate);
    let award_key = if aggregate { &record.uri } else { &record.fain };
    let (Some(award_key), Some(sub_tier)) =
        (present(award_key), present(&record.awarding_sub_tier_agency_c))
    else {
        return outcome;
    };

    let Some(donor) = snapshot.award_donor(&DonorKey::new(aggregate, award_key, sub_tier)) else {
        return outcome;
    };
    if same_modification(&donor.award_modification_amendme, &record.award_modification_amendme) {
        return outcome;
    }

    if awarding_missing {
        if let Some(code) = valid_for(snapshot, &donor.awarding_office_code, OfficeRole::AssistanceAwards) {
            record.awarding_office_code = Some(code);
            outcome.awarding = true;
        }
    }
    if funding_missing {
        if let Some(code) = valid_for(snapshot, &donor.funding_office_code, OfficeRole::Funding) {
            record.funding_office_code = Some(code);
            outcome.funding = true;
        }
    }

    outcome
}
