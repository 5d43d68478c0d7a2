//! Patient identity captured on the first wizard step.

use crate::scheme::Scheme;
use serde::{Deserialize, Serialize};

/// Patient details as typed on the intake form.
///
/// Fields are not validated: blank values are accepted and carried through to the
/// receipt unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Hospital number.
    #[serde(default)]
    pub record_id: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub scheme: Scheme,
}

impl PatientInfo {
    /// First and last name joined by a single space, exactly as entered.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_blank() {
        let info: PatientInfo = serde_json::from_str("{}").expect("empty form");
        assert_eq!(info, PatientInfo::default());
        assert_eq!(info.scheme, Scheme::Universal);
        assert_eq!(info.full_name(), " ");
    }

    #[test]
    fn full_name_keeps_values_verbatim() {
        let info = PatientInfo {
            first_name: " Somchai".into(),
            last_name: "Jaidee ".into(),
            ..Default::default()
        };
        assert_eq!(info.full_name(), " Somchai Jaidee ");
    }
}
