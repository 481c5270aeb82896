//! API classification enums shared by the manifest and document builders.
//!
//! The catalog and documentation carry these as loose strings (`"ethos"`,
//! `"CF"`, `"Financial Aid"` ...). Conversions into the enums are total:
//! unknown input falls back to a default rather than failing. Serialized
//! forms are the manifest column values.

use serde::Serialize;

/// How an API's schema is sourced and published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ApiType {
    /// Hand-coded web API without Ethos integration.
    #[serde(rename = "web-nonethos")]
    Web,
    /// Ethos data model (EEDM) API.
    #[serde(rename = "ethos")]
    Ethos,
    /// Business process API.
    #[serde(rename = "bus-proc")]
    BusinessProcess,
    /// Specification-based API driven by configuration.
    #[serde(rename = "specification")]
    Specification,
    /// Hand-coded web API that also answers Ethos media types.
    #[serde(rename = "web-ethos")]
    EthosEnabled,
}

impl ApiType {
    /// Parse a manifest/documentation type string.
    ///
    /// Unknown values (including `legacy`) map to [`ApiType::Web`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "ethos" => Self::Ethos,
            "bpa" => Self::BusinessProcess,
            "specification" => Self::Specification,
            "web-ethos" => Self::EthosEnabled,
            _ => Self::Web,
        }
    }

    /// Name written to the manifest `api_type` column and `x-api-type`.
    #[must_use]
    pub const fn manifest_name(self) -> &'static str {
        match self {
            Self::Web => "web-nonethos",
            Self::Ethos => "ethos",
            Self::BusinessProcess => "bus-proc",
            Self::Specification => "specification",
            Self::EthosEnabled => "web-ethos",
        }
    }
}

/// Release status recorded in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    /// Pre-release.
    Beta,
    /// Limited release.
    Select,
    /// Generally available.
    #[serde(rename = "ga")]
    GeneralAvailability,
}

impl ReleaseStatus {
    /// Parse a release status; anything but `beta`/`select` is GA.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "beta" => Self::Beta,
            "select" => Self::Select,
            _ => Self::GeneralAvailability,
        }
    }

    /// Manifest column value.
    #[must_use]
    pub const fn manifest_name(self) -> &'static str {
        match self {
            Self::Beta => "beta",
            Self::Select => "select",
            Self::GeneralAvailability => "ga",
        }
    }
}

/// Publication status of a manifest row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    /// Row is published to the catalog.
    Publish,
}

impl PublishStatus {
    /// Lower-cased manifest column value.
    #[must_use]
    pub const fn manifest_name(self) -> &'static str {
        match self {
            Self::Publish => "publish",
        }
    }
}

/// Business domain an API belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ApiDomain {
    /// Core / base module.
    Foundation,
    /// Student and planning.
    Student,
    /// Colleague finance and accounting.
    Finance,
    /// Financial aid.
    #[serde(rename = "Financial Aid")]
    FinancialAid,
    /// Human resources and time management.
    #[serde(rename = "Human Resources")]
    HumanResources,
}

impl ApiDomain {
    /// Parse a domain code or display name. Unknown input is [`ApiDomain::Foundation`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "st" | "student" => Self::Student,
            "cf" | "finance" => Self::Finance,
            "fa" | "financial aid" | "financialaid" => Self::FinancialAid,
            "hr" | "human resources" | "humanresources" => Self::HumanResources,
            _ => Self::Foundation,
        }
    }

    /// Human readable name used in `x-source-domain` and the manifest.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Foundation => "Foundation",
            Self::Student => "Student",
            Self::Finance => "Finance",
            Self::FinancialAid => "Financial Aid",
            Self::HumanResources => "Human Resources",
        }
    }

    /// Identifier-style name (`FinancialAid`), compared against display
    /// names with spaces removed.
    #[must_use]
    pub const fn variant_name(self) -> &'static str {
        match self {
            Self::Foundation => "Foundation",
            Self::Student => "Student",
            Self::Finance => "Finance",
            Self::FinancialAid => "FinancialAid",
            Self::HumanResources => "HumanResources",
        }
    }
}

/// Map a controller's license module to a domain code.
#[must_use]
pub fn module_domain_code(module: &str) -> &'static str {
    match module {
        "Student" | "Planning" => "ST",
        "Finance" | "ColleagueFinance" | "ProjectsAccounting" | "BudgetManagement" => "CF",
        "FinancialAid" | "FALink" => "FA",
        "HumanResources" | "TimeManagement" => "HR",
        _ => "CORE",
    }
}

/// Display name written to `x-source-domain` for a domain code.
///
/// Codes outside the known set pass through unchanged; an empty code is
/// `Foundation`.
#[must_use]
pub fn source_domain_name(code: &str) -> String {
    match code {
        "" | "CORE" => "Foundation".to_string(),
        "ADV" => "Advancement".to_string(),
        "FA" => "Financial Aid".to_string(),
        "CF" => "Finance".to_string(),
        "HR" => "Human Resources".to_string(),
        "REC" => "Recruitment".to_string(),
        "ST" => "Student".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_type_round_trip_names() {
        assert_eq!(ApiType::from_name("Ethos"), ApiType::Ethos);
        assert_eq!(ApiType::from_name("bpa"), ApiType::BusinessProcess);
        assert_eq!(ApiType::from_name("legacy"), ApiType::Web);
        assert_eq!(ApiType::from_name("Web-Ethos"), ApiType::EthosEnabled);
        assert_eq!(ApiType::from_name("whatever"), ApiType::Web);
        assert_eq!(ApiType::Web.manifest_name(), "web-nonethos");
        assert_eq!(ApiType::BusinessProcess.manifest_name(), "bus-proc");
    }

    #[test]
    fn release_status_defaults_to_ga() {
        assert_eq!(ReleaseStatus::from_name("R"), ReleaseStatus::GeneralAvailability);
        assert_eq!(ReleaseStatus::from_name("Beta"), ReleaseStatus::Beta);
        assert_eq!(ReleaseStatus::Select.manifest_name(), "select");
    }

    #[test]
    fn domain_codes_and_names() {
        assert_eq!(ApiDomain::from_name("CF"), ApiDomain::Finance);
        assert_eq!(ApiDomain::from_name("financial aid"), ApiDomain::FinancialAid);
        assert_eq!(ApiDomain::from_name("HumanResources"), ApiDomain::HumanResources);
        assert_eq!(ApiDomain::from_name(""), ApiDomain::Foundation);
        assert_eq!(ApiDomain::FinancialAid.display_name(), "Financial Aid");
        assert_eq!(ApiDomain::FinancialAid.variant_name(), "FinancialAid");
    }

    #[test]
    fn module_codes_map_to_domains() {
        assert_eq!(module_domain_code("Student"), "ST");
        assert_eq!(module_domain_code("TimeManagement"), "HR");
        assert_eq!(module_domain_code("BudgetManagement"), "CF");
        assert_eq!(module_domain_code("ResidenceLife"), "CORE");
        assert_eq!(module_domain_code("unknown"), "CORE");
    }

    #[test]
    fn source_domain_names() {
        assert_eq!(source_domain_name("ADV"), "Advancement");
        assert_eq!(source_domain_name(""), "Foundation");
        assert_eq!(source_domain_name("Custom"), "Custom");
    }
}
