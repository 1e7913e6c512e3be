//! Transaction and award unique keys

use crate::models::fields::present;
use crate::models::{AtomType, FabsRecord, FpdsRecord, RecordType};

/// Placeholder for an absent key component
pub const NONE_SEGMENT: &str = "-none-";

fn segment(value: &Option<String>) -> &str {
    present(value).unwrap_or(NONE_SEGMENT)
}

fn join(parts: &[&str]) -> String {
    parts.join("_")
}

/// Procurement transaction key (six segments, case preserved)
///
/// IDVs only contribute agency, PIID and modification number; the other
/// positions are always the placeholder.
pub fn fpds_transaction_key(record: &FpdsRecord, atom: AtomType) -> String {
    match atom {
        AtomType::Award => join(&[
            segment(&record.agency_id),
            segment(&record.referenced_idv_agency_iden),
            segment(&record.piid),
            segment(&record.award_modification_amendme),
            segment(&record.parent_award_id),
            segment(&record.transaction_number),
        ]),
        AtomType::Idv => join(&[
            segment(&record.agency_id),
            NONE_SEGMENT,
            segment(&record.piid),
            segment(&record.award_modification_amendme),
            NONE_SEGMENT,
            NONE_SEGMENT,
        ]),
    }
}

/// Procurement award key, uppercased
pub fn fpds_award_key(record: &FpdsRecord, atom: AtomType) -> String {
    let key = match atom {
        AtomType::Award => format!(
            "CONT_AWD_{}",
            join(&[
                segment(&record.piid),
                segment(&record.agency_id),
                segment(&record.parent_award_id),
                segment(&record.referenced_idv_agency_iden),
            ])
        ),
        AtomType::Idv => format!(
            "CONT_IDV_{}",
            join(&[segment(&record.piid), segment(&record.agency_id)])
        ),
    };
    key.to_uppercase()
}

/// Assistance transaction key, uppercased
pub fn fabs_transaction_key(record: &FabsRecord) -> String {
    join(&[
        segment(&record.awarding_sub_tier_agency_c),
        segment(&record.fain),
        segment(&record.uri),
        segment(&record.cfda_number),
        segment(&record.award_modification_amendme),
    ])
    .to_uppercase()
}

/// Assistance award key: URI for aggregate records, FAIN otherwise
pub fn fabs_award_key(record: &FabsRecord) -> String {
    let key = if record.record_type() == Some(RecordType::Aggregate) {
        format!(
            "ASST_AGG_{}",
            join(&[segment(&record.uri), segment(&record.awarding_sub_tier_agency_c)])
        )
    } else {
        format!(
            "ASST_NON_{}",
            join(&[segment(&record.fain), segment(&record.awarding_sub_tier_agency_c)])
        )
    };
    key.to_uppercase()
}
