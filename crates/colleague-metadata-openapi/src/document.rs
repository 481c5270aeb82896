//! Document-level builders: info, servers and license.

use std::collections::BTreeMap;

use chrono::Datelike;
use colleague_metadata_core::{source_domain_name, ApiConfiguration, ApiDomain, ExtensibleData};

use crate::model::{Info, License, Server, ServerVariable};

/// Value of `x-source-system` on every document.
pub const SOURCE_SYSTEM: &str = "colleague";

/// URL attached to every license.
pub const PRIVACY_URL: &str = "https://www.ellucian.com/privacy";

const ETHOS_SERVERS: [(&str, &str); 4] = [
    ("Ethos Integration API U.S.", "https://integrate.elluciancloud.com"),
    ("Ethos Integration API Canada.", "https://integrate.elluciancloud.ca"),
    ("Ethos Integration API Europe.", "https://integrate.elluciancloud.ie"),
    ("Ethos Integration API Asia-Pacific.", "https://integrate.elluciancloud.com.au"),
];

/// The four regional Ethos servers followed by a templated custom server.
#[must_use]
pub fn servers() -> Vec<Server> {
    let mut servers: Vec<Server> = ETHOS_SERVERS
        .iter()
        .map(|(description, url)| Server {
            url: (*url).to_string(),
            description: (*description).to_string(),
            variables: BTreeMap::new(),
        })
        .collect();
    servers.push(Server {
        url: "{server_url}".to_string(),
        description: "Custom server URL.".to_string(),
        variables: BTreeMap::from([(
            "server_url".to_string(),
            ServerVariable {
                default: "http://localhost".to_string(),
            },
        )]),
    });
    servers
}

/// Build the info object of a resource version.
#[must_use]
pub fn build_info(config: &ApiConfiguration, version: &ExtensibleData) -> Info {
    let mut info = Info {
        title: config.resource_name.clone(),
        description: config.description.clone(),
        version: version.api_version_number.clone(),
        ..Info::default()
    };
    info.set_extension("x-source-system", SOURCE_SYSTEM);

    let api_type = if config.is_bpa() {
        info.set_extension("x-source-name", config.process_id.as_str());
        info.set_extension("x-source-title", config.process_desc.as_str());
        "bus-proc"
    } else if config.is_spec() {
        let source_name = if config.primary_table_name.is_empty() {
            config.primary_entity.clone()
        } else {
            format!(
                "{}-{} {}",
                config.primary_application, config.primary_entity, config.primary_table_name
            )
        };
        info.set_extension("x-source-name", source_name);
        let name = &config.resource_name;
        if !name.is_empty() {
            info.set_extension(
                "x-source-title",
                title_case(name.strip_prefix("x-").unwrap_or(name)),
            );
        }
        "specification"
    } else {
        if !config.resource_name.is_empty() {
            info.set_extension("x-source-title", title_case(&config.resource_name));
        }
        if config.is_ethos() {
            "ethos"
        } else if config.is_ethos_enabled() {
            "web-ethos"
        } else {
            "web-nonethos"
        }
    };
    info.set_extension("x-api-type", api_type);

    let status = if version.version_release_status.is_empty() {
        config.release_status.as_str()
    } else {
        version.version_release_status.as_str()
    };
    let release = match status {
        "B" => {
            info.version = format!("{}-beta", version.api_version_number);
            "beta"
        }
        "R" => "ga",
        _ => "prerelease",
    };
    info.set_extension("x-release-status", release);
    info.set_extension("x-source-domain", source_domain_name(&config.api_domain));
    info
}

/// Build the info object, or fold a new route's domain into an existing one.
///
/// When the domain differs, both descriptions are kept under bold domain
/// headings and `x-source-domain` takes the new domain.
#[must_use]
pub fn update_info(config: &ApiConfiguration, version: &ExtensibleData, existing: Option<Info>) -> Info {
    let Some(mut info) = existing.filter(|info| !info.title.is_empty()) else {
        return build_info(config, version);
    };
    let original = info.extension("x-source-domain").unwrap_or_default().to_string();
    let domain = ApiDomain::from_name(&config.api_domain).display_name();
    if original != domain {
        info.description = if info.description.is_empty() {
            config.description.clone()
        } else {
            format!(
                "<b>({original})</b>\n\n{}\n\n<b>({domain})</b>\n\n{}",
                info.description, config.description
            )
        };
        info.set_extension("x-source-domain", domain);
    }
    info
}

/// License naming `name`, or the default copyright line when `name` is empty.
#[must_use]
pub fn license(name: &str, year: i32) -> License {
    let name = if name.is_empty() {
        format!("© 2023-{year} Ellucian Company L.P. and its affiliates. All rights reserved.")
    } else {
        name.to_string()
    };
    License {
        name,
        url: Some(PRIVACY_URL.to_string()),
    }
}

/// License for the current year.
#[must_use]
pub fn current_license(name: &str) -> License {
    license(name, chrono::Local::now().year())
}

/// `person-names` becomes `Person Names`. Words already in upper case are
/// left alone.
pub(crate) fn title_case(name: &str) -> String {
    name.replace('-', " ")
        .split(' ')
        .map(|word| {
            if word.chars().any(char::is_lowercase) {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                })
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn version(number: &str, status: &str) -> ExtensibleData {
        let mut version = ExtensibleData::new("persons", number, "application/json", "persons");
        version.version_release_status = status.to_string();
        version
    }

    #[test]
    fn ethos_info_extensions() {
        let config = ApiConfiguration {
            resource_name: "person-names".to_string(),
            api_type: "Ethos".to_string(),
            api_domain: "ST".to_string(),
            release_status: "R".to_string(),
            description: "Names.".to_string(),
            ..ApiConfiguration::default()
        };
        let info = build_info(&config, &version("1.0.0", ""));
        assert_eq!(info.title, "person-names");
        assert_eq!(info.version, "1.0.0");
        assert_eq!(info.extension("x-source-system"), Some("colleague"));
        assert_eq!(info.extension("x-source-title"), Some("Person Names"));
        assert_eq!(info.extension("x-api-type"), Some("ethos"));
        assert_eq!(info.extension("x-release-status"), Some("ga"));
        assert_eq!(info.extension("x-source-domain"), Some("Student"));
    }

    #[test]
    fn beta_versions_get_a_suffix() {
        let config = ApiConfiguration {
            resource_name: "x-widgets".to_string(),
            api_type: "A".to_string(),
            primary_application: "ST".to_string(),
            primary_entity: "WIDGETS".to_string(),
            primary_table_name: "WIDGET.TABLE".to_string(),
            release_status: "R".to_string(),
            ..ApiConfiguration::default()
        };
        let info = build_info(&config, &version("2", "B"));
        assert_eq!(info.version, "2-beta");
        assert_eq!(info.extension("x-release-status"), Some("beta"));
        assert_eq!(info.extension("x-source-name"), Some("ST-WIDGETS WIDGET.TABLE"));
        assert_eq!(info.extension("x-source-title"), Some("Widgets"));
        assert_eq!(info.extension("x-api-type"), Some("specification"));
        assert_eq!(info.extension("x-source-domain"), Some("Foundation"));
    }

    #[test]
    fn bpa_and_prerelease() {
        let config = ApiConfiguration {
            resource_name: "x-leave".to_string(),
            api_type: "T".to_string(),
            process_id: "LPN".to_string(),
            process_desc: "Leave Plans".to_string(),
            api_domain: "ADV".to_string(),
            ..ApiConfiguration::default()
        };
        let info = build_info(&config, &version("1.0.0", ""));
        assert_eq!(info.extension("x-api-type"), Some("bus-proc"));
        assert_eq!(info.extension("x-source-title"), Some("Leave Plans"));
        assert_eq!(info.extension("x-release-status"), Some("prerelease"));
        assert_eq!(info.extension("x-source-domain"), Some("Advancement"));
    }

    #[test]
    fn update_merges_descriptions_on_domain_change() {
        let student = ApiConfiguration {
            resource_name: "persons".to_string(),
            api_domain: "ST".to_string(),
            description: "Student view.".to_string(),
            ..ApiConfiguration::default()
        };
        let finance = ApiConfiguration {
            api_domain: "CF".to_string(),
            description: "Finance view.".to_string(),
            ..student.clone()
        };
        let v = version("1.0.0", "R");
        let first = update_info(&student, &v, None);
        let merged = update_info(&finance, &v, Some(first));
        assert_eq!(
            merged.description,
            "<b>(Student)</b>\n\nStudent view.\n\n<b>(Finance)</b>\n\nFinance view."
        );
        assert_eq!(merged.extension("x-source-domain"), Some("Finance"));

        let unchanged = update_info(&finance, &v, Some(merged.clone()));
        assert_eq!(unchanged, merged);
    }

    #[test]
    fn servers_end_with_custom_url() {
        let servers = servers();
        assert_eq!(servers.len(), 5);
        assert_eq!(servers[4].url, "{server_url}");
        assert_eq!(servers[4].variables["server_url"].default, "http://localhost");
    }

    #[test]
    fn license_defaults_to_copyright() {
        assert_eq!(
            license("", 2026).name,
            "© 2023-2026 Ellucian Company L.P. and its affiliates. All rights reserved."
        );
        assert_eq!(license("Proprietary", 2026).name, "Proprietary");
        assert_eq!(license("", 2026).url.as_deref(), Some(PRIVACY_URL));
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("person-names"), "Person Names");
        assert_eq!(title_case("GPA-summary"), "GPA Summary");
    }
}
