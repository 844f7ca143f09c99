// Standard Library Imports
use std::{fs, path::Path, time::Duration};

// External Crate Imports
use glycomod::{CustomTag, EXPORT_COLUMNS, ReducingEnd, SearchParameters};
use miette::{IntoDiagnostic, Result, WrapErr, miette};
use serde::{Deserialize, Serialize};
use tracing::debug;

// Constants ===========================================================================================================

const SERVICE_URL: &str = "https://web.expasy.org/cgi-bin/glycomod/glycomod.pl";
const USER_AGENT: &str = concat!("glycofinder/", env!("CARGO_PKG_VERSION"));
const TIMEOUT_SECONDS: u64 = 120;

// Public API ==========================================================================================================

/// Application settings, read from a JSON file. Every key is optional.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub service_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Names for the exported CSV columns, in the same order as the exported fields
    pub columns: Vec<String>,
    /// `2-AB`, `ProA`, or empty for a free reducing end
    pub reducing_end: String,
    pub custom_tag: Option<CustomTag>,
    pub adduct: String,
    pub search: Option<SearchParameters>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: SERVICE_URL.to_owned(),
            user_agent: USER_AGENT.to_owned(),
            timeout_seconds: TIMEOUT_SECONDS,
            columns: EXPORT_COLUMNS.map(str::to_owned).to_vec(),
            reducing_end: String::new(),
            custom_tag: None,
            adduct: SearchParameters::default().adduct,
            search: None,
        }
    }
}

impl Config {
    /// Reads the config at `path`, or falls back to the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        debug!("reading the config at {}", path.display());
        let json = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read the config file {}", path.display()))?;
        Self::from_json(&json).wrap_err_with(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).into_diagnostic()?;
        if config.columns.len() != EXPORT_COLUMNS.len() {
            return Err(miette!(
                "expected {} column names, but found {}",
                EXPORT_COLUMNS.len(),
                config.columns.len()
            ));
        }
        if let Some(search) = &config.search {
            let default = SearchParameters::default().adduct;
            if config.adduct != default && config.adduct != search.adduct {
                return Err(miette!(
                    "the top-level adduct {:?} conflicts with the adduct {:?} of the search block",
                    config.adduct,
                    search.adduct
                ));
            }
        }
        Ok(config)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// A custom tag, when given, takes precedence over a named one
    pub fn reducing_end(&self) -> Result<ReducingEnd> {
        if let Some(tag) = &self.custom_tag {
            return Ok(ReducingEnd::Custom(tag.clone()));
        }
        Ok(self.reducing_end.parse()?)
    }

    /// The search parameters, with the configured adduct filled in unless a `search` block was given
    #[must_use]
    pub fn search_parameters(&self) -> SearchParameters {
        self.search.clone().unwrap_or_else(|| SearchParameters {
            adduct: self.adduct.clone(),
            ..SearchParameters::default()
        })
    }
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use glycomod::{Linkage, MassType};
    use indoc::indoc;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.reducing_end().unwrap(), ReducingEnd::Free);
        assert_eq!(config.search_parameters(), SearchParameters::default());
        assert_eq!(config.columns[0], "Peak");
    }

    #[test]
    fn partial_config() {
        let config = Config::from_json(indoc! {r#"
            {
                "timeout_seconds": 30,
                "reducing_end": "2-AB",
                "adduct": "Na+"
            }
        "#})
        .unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.reducing_end().unwrap(), ReducingEnd::TwoAb);
        assert_eq!(config.search_parameters().adduct, "Na+");
        assert_eq!(config.service_url, SERVICE_URL);
    }

    #[test]
    fn embedded_search_parameters() {
        let config = Config::from_json(indoc! {r#"
            {
                "custom_tag": { "name": "2-AA", "mass": "121.0528" },
                "search": { "mass_type": "average", "tolerance": 0.2, "linkage": "O" }
            }
        "#})
        .unwrap();
        let ReducingEnd::Custom(tag) = config.reducing_end().unwrap() else {
            panic!("expected a custom tag");
        };
        assert_eq!(tag.mass, dec!(121.0528));

        let params = config.search_parameters();
        assert_eq!(params.mass_type, MassType::Average);
        assert_eq!(params.tolerance, 0.2);
        assert_eq!(params.linkage, Linkage::O);
        assert_eq!(params.adduct, "H+");
    }

    #[test]
    fn adduct_conflicts_with_search_block() {
        let err = Config::from_json(r#"{ "adduct": "K+", "search": { "adduct": "Na+" } }"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"the top-level adduct "K+" conflicts with the adduct "Na+" of the search block"#
        );
        assert!(Config::from_json(r#"{ "adduct": "Na+", "search": { "tolerance": 0.2 } }"#).is_err());

        let config = Config::from_json(r#"{ "adduct": "Na+", "search": { "adduct": "Na+" } }"#).unwrap();
        assert_eq!(config.search_parameters().adduct, "Na+");
    }

    #[test]
    fn invalid_configs() {
        assert!(Config::from_json(r#"{ "columns": ["Peak"] }"#).is_err());
        assert!(Config::from_json(r#"{ "colums": [] }"#).is_err());
        assert!(
            Config::from_json(r#"{ "reducing_end": "biotin" }"#)
                .unwrap()
                .reducing_end()
                .is_err()
        );
    }
}
