//! Recipient enrichment: ultimate parent and executive compensation

use crate::models::fields::upper;
use crate::models::HighCompOfficers;
use crate::snapshot::ReferenceSnapshot;

/// Identifier used for recipient lookups: UEI when present, else DUNS
pub fn recipient_id(uei: &Option<String>, duns: &Option<String>) -> Option<String> {
    upper(uei).or_else(|| upper(duns))
}

/// Ultimate parent (unique identifier, legal name)
///
/// Both are null unless the recipient is known and carries at least one of
/// them.
pub fn resolve_ultimate_parent(
    snapshot: &ReferenceSnapshot,
    recipient_id: Option<&str>,
) -> (Option<String>, Option<String>) {
    match recipient_id.and_then(|id| snapshot.recipient(id)) {
        Some(parent)
            if parent.ultimate_parent_unique_ide.is_some()
                || parent.ultimate_parent_legal_enti.is_some() =>
        {
            (
                parent.ultimate_parent_unique_ide.clone(),
                parent.ultimate_parent_legal_enti.clone(),
            )
        }
        _ => (None, None),
    }
}

/// Officer columns for a recipient; all null when none are on file
pub fn resolve_exec_comp(snapshot: &ReferenceSnapshot, recipient_id: Option<&str>) -> HighCompOfficers {
    recipient_id
        .and_then(|id| snapshot.exec_comp(id))
        .map(HighCompOfficers::from_slots)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{ExecCompRow, RecipientRow};

    fn snapshot() -> ReferenceSnapshot {
        ReferenceSnapshot::builder()
            .countries(Vec::new())
            .states(Vec::new())
            .counties(Vec::new())
            .cities(Vec::new())
            .zip_cities(Vec::new())
            .zips(Vec::new())
            .cgacs(Vec::new())
            .frecs(Vec::new())
            .sub_tiers(Vec::new())
            .offices(Vec::new())
            .cfda_programs(Vec::new())
            .recipients(vec![
                RecipientRow {
                    recipient_id: "UEI000000001".into(),
                    ultimate_parent_unique_ide: Some("PARENT000001".into()),
                    ultimate_parent_legal_enti: Some("PARENT CORP".into()),
                },
                RecipientRow {
                    recipient_id: "UEI000000002".into(),
                    ..Default::default()
                },
            ])
            .exec_comp(vec![ExecCompRow {
                recipient_id: "UEI000000001".into(),
                officers: [
                    (Some("Ada".into()), Some("100000".into())),
                    (Some("Grace".into()), Some("90000".into())),
                    (None, None),
                    (None, None),
                    (None, None),
                ],
            }])
            .build()
            .unwrap()
    }

    #[test]
    fn test_recipient_id_prefers_uei() {
        assert_eq!(
            recipient_id(&Some("uei1".into()), &Some("123456789".into())).as_deref(),
            Some("UEI1")
        );
        assert_eq!(
            recipient_id(&Some("".into()), &Some("123456789".into())).as_deref(),
            Some("123456789")
        );
        assert_eq!(recipient_id(&None, &None), None);
    }

    #[test]
    fn test_ultimate_parent() {
        let snap = snapshot();
        assert_eq!(
            resolve_ultimate_parent(&snap, Some("uei000000001")),
            (Some("PARENT000001".into()), Some("PARENT CORP".into()))
        );
        assert_eq!(resolve_ultimate_parent(&snap, Some("UEI000000002")), (None, None));
        assert_eq!(resolve_ultimate_parent(&snap, Some("UNKNOWN")), (None, None));
        assert_eq!(resolve_ultimate_parent(&snap, None), (None, None));
    }

    #[test]
    fn test_exec_comp_fills_or_clears() {
        let snap = snapshot();

        let officers = resolve_exec_comp(&snap, Some("UEI000000001"));
        assert_eq!(officers.high_comp_officer1_full_na.as_deref(), Some("Ada"));
        assert_eq!(officers.high_comp_officer2_amount.as_deref(), Some("90000"));
        assert!(officers.high_comp_officer3_full_na.is_none());

        assert!(resolve_exec_comp(&snap, Some("UEI000000002")).is_empty());
    }
}
