//! Code → description dictionaries for assistance records

use crate::models::fields::present;
use crate::models::FabsRecord;

const ACTION_TYPES: &[(&str, &str)] = &[
    ("A", "NEW"),
    ("B", "CONTINUATION"),
    ("C", "REVISION"),
    ("D", "ADJUSTMENT TO COMPLETED PROJECT"),
    ("E", "AGGREGATE MIXED"),
];

const ASSISTANCE_TYPES: &[(&str, &str)] = &[
    ("02", "BLOCK GRANT (A)"),
    ("03", "FORMULA GRANT (A)"),
    ("04", "PROJECT GRANT (B)"),
    ("05", "COOPERATIVE AGREEMENT (B)"),
    (
        "06",
        "DIRECT PAYMENT FOR SPECIFIED USE, AS A SUBSIDY OR OTHER NON-REIMBURSABLE DIRECT FINANCIAL AID (C)",
    ),
    ("07", "DIRECT LOAN (E)"),
    ("08", "GUARANTEED/INSURED LOAN (F)"),
    ("09", "INSURANCE (G)"),
    (
        "10",
        "DIRECT PAYMENT WITH UNRESTRICTED USE (RETIREMENT, PENSION, VETERANS BENEFITS, ETC.) (D)",
    ),
    (
        "11",
        "OTHER REIMBURSABLE, CONTINGENT, INTANGIBLE, OR INDIRECT FINANCIAL ASSISTANCE",
    ),
];

const CORRECTION_DELETE: &[(&str, &str)] = &[
    ("C", "CORRECT AN EXISTING RECORD"),
    ("D", "DELETE AN EXISTING RECORD"),
];

const RECORD_TYPES: &[(&str, &str)] = &[
    ("1", "AGGREGATE RECORD"),
    ("2", "NON-AGGREGATE RECORD"),
    ("3", "NON-AGGREGATE RECORD TO AN INDIVIDUAL RECIPIENT (PII-REDACTED)"),
];

const BUSINESS_FUNDS: &[(&str, &str)] = &[
    ("REC", "FUNDED BY RECOVERY ACT"),
    ("NON", "NOT RECOVERY ACT"),
];

/// Single-character recipient business types
pub const BUSINESS_TYPES: &[(char, &str)] = &[
    ('A', "STATE GOVERNMENT"),
    ('B', "COUNTY GOVERNMENT"),
    ('C', "CITY OR TOWNSHIP GOVERNMENT"),
    ('D', "SPECIAL DISTRICT GOVERNMENT"),
    ('E', "REGIONAL ORGANIZATION"),
    ('F', "U.S. TERRITORY OR POSSESSION"),
    ('G', "INDEPENDENT SCHOOL DISTRICT"),
    ('H', "PUBLIC/STATE CONTROLLED INSTITUTION OF HIGHER EDUCATION"),
    ('I', "INDIAN/NATIVE AMERICAN TRIBAL GOVERNMENT (FEDERALLY-RECOGNIZED)"),
    ('J', "INDIAN/NATIVE AMERICAN TRIBAL GOVERNMENT (OTHER THAN FEDERALLY-RECOGNIZED)"),
    ('K', "INDIAN/NATIVE AMERICAN TRIBAL DESIGNATED ORGANIZATION"),
    ('L', "PUBLIC/INDIAN HOUSING AUTHORITY"),
    ('M', "NONPROFIT WITH 501C3 IRS STATUS (OTHER THAN AN INSTITUTION OF HIGHER EDUCATION)"),
    ('N', "NONPROFIT WITHOUT 501C3 IRS STATUS (OTHER THAN AN INSTITUTION OF HIGHER EDUCATION)"),
    ('O', "PRIVATE INSTITUTION OF HIGHER EDUCATION"),
    ('P', "INDIVIDUAL"),
    ('Q', "FOR-PROFIT ORGANIZATION (OTHER THAN SMALL BUSINESS)"),
    ('R', "SMALL BUSINESS"),
    ('S', "HISPANIC-SERVING INSTITUTION"),
    ('T', "HISTORICALLY BLACK COLLEGE OR UNIVERSITY (HBCU)"),
    ('U', "TRIBALLY CONTROLLED COLLEGE OR UNIVERSITY (TCCU)"),
    ('V', "ALASKA NATIVE AND NATIVE HAWAIIAN SERVING INSTITUTIONS"),
    ('W', "NON-DOMESTIC (NON-U.S.) ENTITY"),
    ('X', "OTHER"),
];

fn describe(table: &[(&str, &str)], code: &Option<String>, case_fold: bool) -> Option<String> {
    let code = present(code)?;
    let code = if case_fold {
        code.to_uppercase()
    } else {
        code.to_string()
    };
    table
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, label)| label.to_string())
}

/// `;`-joined labels for each mapped character, `None` if nothing maps
pub fn business_types_description(business_types: &Option<String>) -> Option<String> {
    let codes = present(business_types)?;
    let labels: Vec<&str> = codes
        .chars()
        .filter_map(|c| {
            let c = c.to_ascii_uppercase();
            BUSINESS_TYPES
                .iter()
                .find(|(code, _)| *code == c)
                .map(|(_, label)| *label)
        })
        .collect();

    if labels.is_empty() {
        None
    } else {
        Some(labels.join(";"))
    }
}

/// Fill every description column from its code column
pub fn apply_labels(record: &mut FabsRecord) {
    record.action_type_description = describe(ACTION_TYPES, &record.action_type, true);
    record.assistance_type_desc = describe(ASSISTANCE_TYPES, &record.assistance_type, false);
    record.correction_delete_ind_desc =
        describe(CORRECTION_DELETE, &record.correction_delete_indicatr, true);
    record.record_type_description = describe(
        RECORD_TYPES,
        &record.record_type.map(|t| t.to_string()),
        false,
    );
    record.business_funds_ind_desc =
        describe(BUSINESS_FUNDS, &record.business_funds_indicator, true);
    record.business_types_desc = business_types_description(&record.business_types);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_folding_per_column() {
        let mut record = FabsRecord {
            action_type: Some("a".into()),
            assistance_type: Some("02".into()),
            correction_delete_indicatr: Some("c".into()),
            record_type: Some(3),
            business_funds_indicator: Some("rec".into()),
            ..Default::default()
        };
        apply_labels(&mut record);

        assert_eq!(record.action_type_description.as_deref(), Some("NEW"));
        assert_eq!(record.assistance_type_desc.as_deref(), Some("BLOCK GRANT (A)"));
        assert_eq!(
            record.correction_delete_ind_desc.as_deref(),
            Some("CORRECT AN EXISTING RECORD")
        );
        assert_eq!(
            record.record_type_description.as_deref(),
            Some("NON-AGGREGATE RECORD TO AN INDIVIDUAL RECIPIENT (PII-REDACTED)")
        );
        assert_eq!(record.business_funds_ind_desc.as_deref(), Some("FUNDED BY RECOVERY ACT"));
    }

    #[test]
    fn test_unknown_codes_are_null() {
        let mut record = FabsRecord {
            action_type: Some("Z".into()),
            assistance_type: Some("2".into()),
            ..Default::default()
        };
        apply_labels(&mut record);

        assert!(record.action_type_description.is_none());
        assert!(record.assistance_type_desc.is_none());
        assert!(record.record_type_description.is_none());
    }

    #[test]
    fn test_business_types_description() {
        assert_eq!(
            business_types_description(&Some("aR".into())).as_deref(),
            Some("STATE GOVERNMENT;SMALL BUSINESS")
        );
        assert_eq!(
            business_types_description(&Some("Z9R".into())).as_deref(),
            Some("SMALL BUSINESS")
        );
        assert_eq!(business_types_description(&Some("Z9".into())), None);
        assert_eq!(business_types_description(&None), None);
    }
}
