//! Publishing generated documents and manifests to the documentation tree.
//!
//! Layout under the publish root:
//!
//! ```text
//! {root}/ColleagEedmAPIs/persons-12.1.0/persons.yaml
//! {root}/ColleagueWebEthosAPIs/...
//! {root}/ManifestFiles/colleague_March_2026.csv
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;
use colleague_metadata_core::version::semantic_version;
use colleague_metadata_core::ApiDomain;

use crate::error::{Error, Result};
use crate::manifest::{manifest_file_name, manifest_file_rows, write_manifest_csv, ManifestQuery, ManifestRow};
use crate::model::OpenApiDocument;
use crate::synth::Synthesizer;

/// Directory receiving manifest CSV files.
pub const MANIFEST_DIR: &str = "ManifestFiles";

/// Directory holding documents of the given `x-api-type`.
#[must_use]
pub fn api_type_dir(api_type: &str) -> &'static str {
    match api_type {
        "ethos" => "ColleagEedmAPIs",
        "bus-proc" => "ColleagueBusAPIs",
        "specification" => "ColleagueSpecAPIs",
        "web-ethos" => "ColleagueWebEthosAPIs",
        _ => "ColleagueWebNonEthosAPIs",
    }
}

/// Path a document is published to.
#[must_use]
pub fn document_path(root: &Path, document: &OpenApiDocument) -> PathBuf {
    let name = document.info.title.to_lowercase();
    let version = semantic_version(&document.info.version);
    root.join(api_type_dir(document.api_type().unwrap_or_default()))
        .join(format!("{name}-{version}"))
        .join(format!("{name}.yaml"))
}

/// Write `document` as YAML under `root`, creating directories as needed.
///
/// # Errors
///
/// Returns [`Error::Publish`] when a directory or the file cannot be
/// written, or [`Error::Yaml`] when serialization fails.
pub fn write_document(root: &Path, document: &OpenApiDocument) -> Result<PathBuf> {
    let path = document_path(root, document);
    let yaml = document.to_yaml()?;
    write_file(&path, yaml.as_bytes())?;
    tracing::info!(path = %path.display(), "document published");
    Ok(path)
}

/// Write the manifest file for `rows` under `{root}/ManifestFiles`.
///
/// Nothing is written when no rows remain after the domain and type
/// filter.
///
/// # Errors
///
/// Returns [`Error::InvalidSegment`] when the file name would leave
/// `{root}/ManifestFiles`, or [`Error::Publish`] when the file cannot be
/// written.
pub fn write_manifest(
    root: &Path,
    rows: &[ManifestRow],
    query: &ManifestQuery,
    today: NaiveDate,
) -> Result<Option<PathBuf>> {
    query.validate()?;
    let selected = manifest_file_rows(rows, query);
    if selected.is_empty() {
        return Ok(None);
    }
    let mut buffer = Vec::new();
    write_manifest_csv(&selected, &mut buffer)?;
    let name = manifest_file_name(query, today);
    let mut components = Path::new(&name).components();
    if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
        return Err(Error::InvalidSegment { segment: name });
    }
    let path = root.join(MANIFEST_DIR).join(name);
    write_file(&path, &buffer)?;
    tracing::info!(path = %path.display(), rows = selected.len(), "manifest published");
    Ok(Some(path))
}

/// Publish the documents behind `rows` and the manifest listing them.
///
/// Documents are generated once per route source and written as YAML.
/// When `query` names a domain and type, a row is kept only if one of its
/// documents matches both. Returns the rows that were kept.
///
/// # Errors
///
/// Returns [`Error::InvalidSegment`] for a query that cannot name a
/// manifest file, or [`Error::Publish`] when the manifest cannot be
/// written. Failures generating or writing a single route source are logged and
/// its rows dropped.
pub fn publish_manifest(
    synth: &Synthesizer<'_>,
    rows: Vec<ManifestRow>,
    query: &ManifestQuery,
    root: &Path,
    today: NaiveDate,
) -> Result<Vec<ManifestRow>> {
    query.validate()?;
    let mut generated: HashMap<String, Vec<OpenApiDocument>> = HashMap::new();
    let mut kept = Vec::new();

    for row in rows {
        let source = row.route_source.clone();
        if !generated.contains_key(&source) {
            let routes = synth.catalog().routes_with_prefix(&source);
            if routes.is_empty() {
                continue;
            }
            let documents = synth.build_from_routes(&routes, &source);
            let written: Result<Vec<PathBuf>> =
                documents.iter().map(|doc| write_document(root, doc)).collect();
            if let Err(err) = written {
                tracing::error!(route_source = %source, error = %err, "publish failed");
                continue;
            }
            generated.insert(source.clone(), documents);
        }

        let documents = generated.get(&source).map(Vec::as_slice).unwrap_or_default();
        let matching = documents.iter().any(|doc| {
            !query.filters_domain_and_type() || matches_domain_and_type(doc, query)
        });
        if matching {
            kept.push(row);
        }
    }

    write_manifest(root, &kept, query, today)?;
    Ok(kept)
}

fn matches_domain_and_type(document: &OpenApiDocument, query: &ManifestQuery) -> bool {
    let domain = ApiDomain::from_name(&query.domain).variant_name().to_lowercase();
    let matching_domain = document
        .source_domain()
        .is_some_and(|d| d.replace(' ', "").to_lowercase() == domain);
    let matching_type = document
        .api_type()
        .is_some_and(|t| t.eq_ignore_ascii_case(&query.api_type));
    matching_domain && matching_type
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    let publish_error = |source| Error::Publish {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(publish_error)?;
    }
    fs::write(path, contents).map_err(publish_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Info;
    use colleague_metadata_core::{ApiType, PublishStatus, ReleaseStatus};
    use pretty_assertions::assert_eq;

    fn document(title: &str, version: &str, api_type: &str) -> OpenApiDocument {
        let mut info = Info {
            title: title.to_string(),
            version: version.to_string(),
            ..Info::default()
        };
        info.set_extension("x-api-type", api_type);
        info.set_extension("x-source-domain", "Financial Aid");
        OpenApiDocument::new(info, Vec::new())
    }

    #[test]
    fn documents_land_in_their_type_directory() {
        let root = Path::new("/docs");
        assert_eq!(
            document_path(root, &document("Persons", "12", "ethos")),
            PathBuf::from("/docs/ColleagEedmAPIs/persons-12.0.0/persons.yaml")
        );
        assert_eq!(
            document_path(root, &document("x-widgets", "1.0.0-beta", "specification")),
            PathBuf::from("/docs/ColleagueSpecAPIs/x-widgets-1.0.0-beta/x-widgets.yaml")
        );
        assert_eq!(api_type_dir("legacy"), "ColleagueWebNonEthosAPIs");
        assert_eq!(api_type_dir("bus-proc"), "ColleagueBusAPIs");
        assert_eq!(api_type_dir("web-ethos"), "ColleagueWebEthosAPIs");
    }

    #[test]
    fn write_document_creates_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_document(dir.path(), &document("persons", "12.1.0", "ethos"))
            .expect("written");
        let yaml = fs::read_to_string(&path).expect("readable");
        assert!(yaml.contains("title: persons"));
        assert!(path.ends_with("ColleagEedmAPIs/persons-12.1.0/persons.yaml"));
    }

    #[test]
    fn manifest_file_is_written_under_manifest_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let rows = vec![ManifestRow {
            api_name: "Persons".to_string(),
            version: "12".to_string(),
            release: ReleaseStatus::GeneralAvailability,
            status: PublishStatus::Publish,
            domain: ApiDomain::Foundation,
            release_environment: "manual".to_string(),
            api_type: ApiType::Ethos,
            api_owner: "colleague".to_string(),
            route_source: "persons".to_string(),
        }];
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");
        let path = write_manifest(dir.path(), &rows, &ManifestQuery::default(), today)
            .expect("written")
            .expect("a file");
        assert_eq!(
            path,
            dir.path().join("ManifestFiles").join("colleague_October_2026.csv")
        );
        let csv = fs::read_to_string(path).expect("readable");
        assert!(csv.ends_with("persons,12.0.0,ga,publish,Foundation,manual,ethos,colleague\n"));

        let none = write_manifest(dir.path(), &[], &ManifestQuery::default(), today).expect("ok");
        assert!(none.is_none());
    }

    #[test]
    fn manifest_never_leaves_manifest_dir() {
        let root = tempfile::tempdir().expect("tempdir");
        let publish_dir = root.path().join("a").join("b");
        let rows = vec![ManifestRow {
            api_name: "persons".to_string(),
            version: "12".to_string(),
            release: ReleaseStatus::GeneralAvailability,
            status: PublishStatus::Publish,
            domain: ApiDomain::Foundation,
            release_environment: "manual".to_string(),
            api_type: ApiType::Ethos,
            api_owner: "colleague".to_string(),
            route_source: "persons".to_string(),
        }];
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");
        let query = ManifestQuery::from_path("api", "persons", Some("12.0/../../../escaped"));

        let err = write_manifest(&publish_dir, &rows, &query, today).unwrap_err();
        assert!(matches!(err, Error::InvalidSegment { .. }));
        assert!(!root.path().join("a").exists());
    }

    #[test]
    fn domain_and_type_matching_ignores_spaces_and_case() {
        let doc = document("awards", "1", "Web-Ethos");
        let query = ManifestQuery::from_path("FA", "web-ethos", None);
        assert!(matches_domain_and_type(&doc, &query));
        let other = ManifestQuery::from_path("HR", "web-ethos", None);
        assert!(!matches_domain_and_type(&doc, &other));
    }

    #[test]
    fn unwritable_root_reports_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file, not a directory").expect("write");
        let err = write_document(&blocker, &document("persons", "1", "ethos")).unwrap_err();
        assert!(err.to_string().starts_with("No access to update '"));
    }
}
