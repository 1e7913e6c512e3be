//! Highly compensated officer columns shared by both record kinds

use serde::{Deserialize, Serialize};

/// Five (name, amount) slots, flattened into the record's columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighCompOfficers {
    pub high_comp_officer1_full_na: Option<String>,
    pub high_comp_officer1_amount: Option<String>,
    pub high_comp_officer2_full_na: Option<String>,
    pub high_comp_officer2_amount: Option<String>,
    pub high_comp_officer3_full_na: Option<String>,
    pub high_comp_officer3_amount: Option<String>,
    pub high_comp_officer4_full_na: Option<String>,
    pub high_comp_officer4_amount: Option<String>,
    pub high_comp_officer5_full_na: Option<String>,
    pub high_comp_officer5_amount: Option<String>,
}

impl HighCompOfficers {
    /// Build from up to five (name, amount) pairs, in rank order
    pub fn from_slots(slots: &[(Option<String>, Option<String>); 5]) -> Self {
        let [s1, s2, s3, s4, s5] = slots.clone();
        Self {
            high_comp_officer1_full_na: s1.0,
            high_comp_officer1_amount: s1.1,
            high_comp_officer2_full_na: s2.0,
            high_comp_officer2_amount: s2.1,
            high_comp_officer3_full_na: s3.0,
            high_comp_officer3_amount: s3.1,
            high_comp_officer4_full_na: s4.0,
            high_comp_officer4_amount: s4.1,
            high_comp_officer5_full_na: s5.0,
            high_comp_officer5_amount: s5.1,
        }
    }

    /// True when every slot is null
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
