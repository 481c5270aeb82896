//! Media type and version resolution for a single route.
//!
//! Shared by document synthesis and the manifest builder so both agree on
//! which routes carry a version and which are skipped.

use colleague_metadata_core::version::extract_version;
use colleague_metadata_core::RouteDescriptor;

/// Media type, version and API type a route is documented under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMedia {
    /// Media type without its `application/` prefix when one was declared
    /// (`vnd.hedtech.integration.v12.1.0+json`).
    pub x_media_type: String,
    /// Version number extracted from the media type, or the route version.
    pub version: String,
    /// `Ethos`, `Web-Ethos` or `Web-NonEthos`.
    pub api_type: &'static str,
}

/// Why a route produces no documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSkip {
    /// Neither the media type nor the route carries a version.
    NoVersion,
    /// Obsolete bulk-request endpoint.
    BulkRequests,
    /// An integration media type on a route that is not Ethos.
    UnsupportedIntegration,
}

impl std::fmt::Display for MediaSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NoVersion => "no version",
            Self::BulkRequests => "bulk requests",
            Self::UnsupportedIntegration => "integration media type on a non-Ethos route",
        })
    }
}

impl RouteMedia {
    /// Resolve the media type of `route`.
    ///
    /// The first declared media type wins. Without one, Ethos routes use
    /// the integration media type of their route version and other
    /// versioned routes use `application/vnd.ellucian.v{version}+json`.
    #[must_use]
    pub fn resolve(route: &RouteDescriptor) -> Self {
        let mut x_media_type = String::new();
        let mut version = String::new();
        let mut api_type = "Web-NonEthos";

        if let Some(hv) = &route.header_version {
            if hv.eedm || hv.ethos_enabled {
                api_type = if hv.eedm { "Ethos" } else { "Web-Ethos" };
                x_media_type = format!(
                    "application/vnd.hedtech.integration.v{}+json",
                    hv.route_version
                );
            }
            version.clone_from(&hv.route_version);
        }

        if let Some(first) = route.media_types().first() {
            x_media_type = match first.split_once('/') {
                Some((_, subtype)) => subtype.to_string(),
                None => first.clone(),
            };
        } else if x_media_type.is_empty() {
            if let Some(hv) = route
                .header_version
                .as_ref()
                .filter(|hv| !hv.route_version.is_empty())
            {
                x_media_type = format!("application/vnd.ellucian.v{}+json", hv.route_version);
            }
        }

        if !x_media_type.is_empty() {
            version = extract_version(&x_media_type);
        }
        Self {
            x_media_type,
            version,
            api_type,
        }
    }

    /// The reason this route is left undocumented, if any.
    #[must_use]
    pub fn skip_reason(&self) -> Option<MediaSkip> {
        if self.version.is_empty() {
            return Some(MediaSkip::NoVersion);
        }
        if self.x_media_type.contains("bulk-requests") {
            return Some(MediaSkip::BulkRequests);
        }
        if self.x_media_type.contains("vnd.hedtech.integration")
            && matches!(self.api_type, "Legacy" | "Web-NonEthos")
        {
            return Some(MediaSkip::UnsupportedIntegration);
        }
        None
    }

    /// Parent resource named by an alternate-view media type.
    ///
    /// `vnd.hedtech.integration.person-names.v1+json` names
    /// `person-names`; `vnd.ellucian-student-plans.v1+json` names
    /// `student-plans`. Plain versioned media types name nothing.
    #[must_use]
    pub fn alternate_view(&self) -> String {
        let media = &self.x_media_type;
        if media.contains("integration.v") || media.contains("ellucian.v") {
            return String::new();
        }
        let parts: Vec<&str> = media.split('.').collect();
        if let Some(index) = parts.iter().position(|p| *p == "integration") {
            if index > 0 && index + 1 < parts.len() {
                return parts[index + 1].to_string();
            }
        }
        parts.get(1).map_or_else(String::new, |part| {
            part.strip_prefix("ellucian-").unwrap_or(part).to_string()
        })
    }
}
