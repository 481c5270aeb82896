//! Resource manifest rows and their CSV rendering.

use std::io::Write;

use chrono::NaiveDate;
use colleague_metadata_core::version::{compare_versions, major_version, semantic_version};
use colleague_metadata_core::{
    module_domain_code, ApiDomain, ApiType, Catalog, PublishStatus, ReleaseStatus, RouteDescriptor,
};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::media::RouteMedia;

/// Route action that imports extension data; never documented.
const IMPORT_ACTION: &str = "ImportExtendedEthosData";

/// One API version in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRow {
    /// API name.
    pub api_name: String,
    /// Version extracted from the route's media type.
    pub version: String,
    /// Release status.
    pub release: ReleaseStatus,
    /// Publication status.
    pub status: PublishStatus,
    /// Business domain.
    pub domain: ApiDomain,
    /// Where the API is released (`manual`).
    pub release_environment: String,
    /// API type.
    pub api_type: ApiType,
    /// Owning system (`colleague`).
    pub api_owner: String,
    /// Route prefix whose documents back this row.
    pub route_source: String,
}

/// Which manifest rows to build.
///
/// Empty fields select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestQuery {
    /// Domain code or name.
    pub domain: String,
    /// API type name.
    pub api_type: String,
    /// Resource name.
    pub resource: String,
    /// Version; only its major segment is compared.
    pub version: String,
}

impl ManifestQuery {
    /// Interpret the `/metadata/manifest/{domain}/{api_type}[/{version}]`
    /// path segments.
    ///
    /// A domain of `api` means the next segment names a resource rather
    /// than a type. A version of `any` or `all` selects every version.
    #[must_use]
    pub fn from_path(domain: &str, api_type: &str, version: Option<&str>) -> Self {
        let version = match version {
            Some("any" | "all") | None => String::new(),
            Some(v) => v.to_string(),
        };
        if domain == "api" {
            return Self {
                resource: api_type.to_string(),
                version,
                ..Self::default()
            };
        }
        Self {
            domain: domain.to_string(),
            api_type: api_type.to_string(),
            resource: String::new(),
            version,
        }
    }

    /// Check that every segment can be part of a manifest file name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSegment`] for a segment containing a path
    /// separator or `..`.
    pub fn validate(&self) -> Result<()> {
        for segment in [&self.domain, &self.api_type, &self.resource, &self.version] {
            if segment.contains(['/', '\\']) || segment.contains("..") {
                return Err(Error::InvalidSegment {
                    segment: segment.clone(),
                });
            }
        }
        Ok(())
    }

    /// Whether both a domain and a type were requested.
    #[must_use]
    pub fn filters_domain_and_type(&self) -> bool {
        !self.domain.is_empty() && !self.api_type.is_empty()
    }
}

/// Build manifest rows for the catalog routes selected by `query`.
///
/// Rows are keyed by `(api name, version, api type)`; a later route for the
/// same key replaces the earlier row and moves it to the end.
#[must_use]
pub fn build_manifest(catalog: &Catalog, query: &ManifestQuery) -> Vec<ManifestRow> {
    let routes: Vec<&RouteDescriptor> = if query.resource.is_empty() {
        catalog.routes.iter().collect()
    } else {
        catalog.routes_for(&query.resource)
    };
    let type_selected = (!query.api_type.is_empty()).then(|| ApiType::from_name(&query.api_type));

    let mut rows: Vec<ManifestRow> = Vec::new();
    for route in routes {
        let Some(row) = manifest_row(catalog, route, query) else {
            continue;
        };
        if type_selected.is_some_and(|t| t != row.api_type) {
            continue;
        }
        if let Some(pos) = rows.iter().position(|r| {
            r.api_name == row.api_name && r.version == row.version && r.api_type == row.api_type
        }) {
            rows.remove(pos);
        }
        rows.push(row);
    }
    rows
}

fn manifest_row(catalog: &Catalog, route: &RouteDescriptor, query: &ManifestQuery) -> Option<ManifestRow> {
    let template = if route.template.is_empty() {
        query.resource.as_str()
    } else {
        route.template.as_str()
    };
    if template.starts_with('{') {
        return None;
    }
    let api_name = colleague_metadata_core::api_name(template);
    if !query.resource.is_empty() && !api_name.contains(&query.resource) {
        return None;
    }
    let segments: Vec<&str> = template.split('/').collect();
    let route_source = match segments.as_slice() {
        [first, second, ..] if first.eq_ignore_ascii_case("qapi") => *second,
        [first, ..] => *first,
        [] => "",
    };

    let media = RouteMedia::resolve(route);
    if !query.version.is_empty() && major_version(&media.version) != major_version(&query.version) {
        return None;
    }
    if let Some(reason) = media.skip_reason() {
        tracing::debug!(route = %template, %reason, "route left out of manifest");
        return None;
    }
    let mut api_type = match &route.header_version {
        Some(hv) if hv.ethos_enabled => ApiType::EthosEnabled,
        Some(hv) if hv.eedm => ApiType::Ethos,
        _ => ApiType::Web,
    };

    let controller = catalog.controller(&route.controller)?;
    if route.action == IMPORT_ACTION {
        return None;
    }
    let mut domain = controller
        .docs
        .as_ref()
        .map(|d| d.api_domain.clone())
        .unwrap_or_default();
    if domain.is_empty() && !controller.module.is_empty() {
        domain = module_domain_code(&controller.module).to_string();
    }
    let action = controller.find_action(&route.action)?;
    if let Some(docs) = &action.docs {
        if !docs.api_domain.is_empty() {
            domain.clone_from(&docs.api_domain);
        }
        if !docs.api_type.is_empty() {
            api_type = ApiType::from_name(&docs.api_type);
        }
    }

    Some(ManifestRow {
        api_name,
        version: media.version,
        release: ReleaseStatus::from_name("R"),
        status: PublishStatus::Publish,
        domain: ApiDomain::from_name(&domain),
        release_environment: "manual".to_string(),
        api_type,
        api_owner: "colleague".to_string(),
        route_source: route_source.to_string(),
    })
}

#[derive(Serialize)]
struct CsvRecord<'a> {
    api_name: String,
    version: String,
    release: ReleaseStatus,
    status: PublishStatus,
    domain: ApiDomain,
    release_environment: &'a str,
    api_type: ApiType,
    api_owner: &'a str,
}

/// Rows written to the manifest file, sorted by name then numeric version.
///
/// When `query` names both a domain and a type only matching rows are kept.
#[must_use]
pub fn manifest_file_rows<'a>(rows: &'a [ManifestRow], query: &ManifestQuery) -> Vec<&'a ManifestRow> {
    let mut selected: Vec<&ManifestRow> = rows
        .iter()
        .filter(|row| {
            !query.filters_domain_and_type()
                || (row.domain == ApiDomain::from_name(&query.domain)
                    && row.api_type == ApiType::from_name(&query.api_type))
        })
        .collect();
    selected.sort_by(|a, b| {
        a.api_name.cmp(&b.api_name).then_with(|| {
            compare_versions(&semantic_version(&a.version), &semantic_version(&b.version))
        })
    });
    selected
}

/// Write `rows` as manifest CSV.
///
/// Names are lower-cased and versions padded to three segments.
///
/// # Errors
///
/// Returns [`Error::Csv`](crate::Error::Csv) when the writer fails.
pub fn write_manifest_csv<W: Write>(rows: &[&ManifestRow], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(CsvRecord {
            api_name: row.api_name.to_lowercase(),
            version: semantic_version(&row.version),
            release: row.release,
            status: row.status,
            domain: row.domain,
            release_environment: &row.release_environment,
            api_type: row.api_type,
            api_owner: &row.api_owner,
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// `colleague_{Month}_{Year}[_{resource}][_{domain}][_{type}][_{version}].csv`
#[must_use]
pub fn manifest_file_name(query: &ManifestQuery, today: NaiveDate) -> String {
    let mut name = format!("colleague_{}", today.format("%B_%Y"));
    for part in [&query.resource, &query.domain, &query.api_type, &query.version] {
        if !part.is_empty() {
            name.push('_');
            name.push_str(part);
        }
    }
    name.push_str(".csv");
    name
}
