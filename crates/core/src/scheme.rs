//! Healthcare coverage schemes.
//!
//! Every scheme has a short code (what the intake form offers) and a label
//! (the catalog column holding its reimbursement rates). Both are defined once,
//! in [`SCHEME_TABLE`], and nowhere else.

use crate::{CathlabError, CathlabResult};
use std::fmt;
use std::str::FromStr;

/// A healthcare coverage category determining which reimbursement column applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Scheme {
    #[default]
    Universal,
    Ucep,
    SocialSecurity,
    CivilService,
    SelfPay,
}

/// Scheme, form code, catalog column label.
const SCHEME_TABLE: [(Scheme, &str, &str); 5] = [
    (Scheme::Universal, "A", "Universal healthcare"),
    (Scheme::Ucep, "B", "UCEP"),
    (Scheme::SocialSecurity, "C", "Social Security"),
    (Scheme::CivilService, "D", "Civil Service"),
    (Scheme::SelfPay, "E", "Self pay"),
];

impl Scheme {
    /// All schemes in form order.
    pub const ALL: [Scheme; 5] = [
        Scheme::Universal,
        Scheme::Ucep,
        Scheme::SocialSecurity,
        Scheme::CivilService,
        Scheme::SelfPay,
    ];

    // Table rows are in declaration order.
    fn row(self) -> &'static (Scheme, &'static str, &'static str) {
        &SCHEME_TABLE[self as usize]
    }

    /// Short code shown on the intake form ("A" to "E").
    pub fn code(self) -> &'static str {
        self.row().1
    }

    /// Catalog column label holding this scheme's reimbursement rates.
    pub fn label(self) -> &'static str {
        self.row().2
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        SCHEME_TABLE
            .iter()
            .find(|(_, c, _)| c.eq_ignore_ascii_case(code))
            .map(|(scheme, _, _)| *scheme)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        SCHEME_TABLE
            .iter()
            .find(|(_, _, l)| l.eq_ignore_ascii_case(label))
            .map(|(scheme, _, _)| *scheme)
    }

    /// Parses either a form code or a column label, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`CathlabError::UnknownScheme`] if the value matches neither.
    pub fn parse(value: &str) -> CathlabResult<Self> {
        Self::from_code(value)
            .or_else(|| Self::from_label(value))
            .ok_or_else(|| CathlabError::UnknownScheme(value.to_string()))
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Scheme {
    type Err = CathlabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Scheme {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> serde::Deserialize<'de> for Scheme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Scheme::parse(&s).map_err(serde::de::Error::custom)
    }
}
