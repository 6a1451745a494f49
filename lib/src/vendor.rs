//! Provides NIC vendor lookups by OUI
//!
//! The lookup source is not exhaustive and its records are only loosely
//! structured, so every failure mode resolves to an empty vendor name
//! rather than an error.

#[cfg(test)]
use mockall::automock;
use pnet::util::MacAddr;
use std::sync::Arc;

/// Separator between the fields of a raw OUI record
pub const RECORD_DELIMITER: char = '\t';

// registry, oui, queried mac, organization
const MIN_RECORD_FIELDS: usize = 4;
const VENDOR_FIELD: usize = 3;
const MIN_VENDOR_LEN: usize = 3;

/// Trait describing a source of raw OUI registry records
#[cfg_attr(test, automock)]
pub trait OuiSource: Send + Sync {
    /// Returns the raw record for the OUI of `mac` as
    /// `registry<TAB>oui<TAB>mac<TAB>organization`, if one is known
    fn query(&self, mac: MacAddr) -> Option<String>;
}

/// [`OuiSource`] backed by the IEEE registry embedded in `oui-data`
#[derive(Debug, Default, Clone, Copy)]
pub struct OuiDataSource;

impl OuiSource for OuiDataSource {
    fn query(&self, mac: MacAddr) -> Option<String> {
        let entry = oui_data::lookup(&mac.to_string())?;
        Some(
            [
                "IEEE".to_string(),
                format!("{:02X}{:02X}{:02X}", mac.0, mac.1, mac.2),
                mac.to_string(),
                entry.organization().to_owned(),
            ]
            .join(&RECORD_DELIMITER.to_string()),
        )
    }
}

/// Extracts the manufacturer from a raw OUI record
///
/// Returns `None` for records with fewer than four fields or with a
/// manufacturer shorter than three characters
pub fn parse_vendor_record(record: &str) -> Option<String> {
    let fields: Vec<&str> = record.split(RECORD_DELIMITER).collect();

    if fields.len() < MIN_RECORD_FIELDS {
        return None;
    }

    let vendor = fields[VENDOR_FIELD].trim();

    if vendor.chars().count() < MIN_VENDOR_LEN {
        return None;
    }

    Some(vendor.to_string())
}

/// Maps MAC addresses to manufacturer names
#[derive(Clone)]
pub struct VendorResolver {
    source: Option<Arc<dyn OuiSource>>,
}

impl Default for VendorResolver {
    fn default() -> Self {
        Self::new(OuiDataSource)
    }
}

impl VendorResolver {
    /// Returns a resolver querying the given source
    pub fn new(source: impl OuiSource + 'static) -> Self {
        Self {
            source: Some(Arc::new(source)),
        }
    }

    /// Returns a resolver that never performs lookups
    pub fn disabled() -> Self {
        Self { source: None }
    }

    /// Returns the manufacturer of `mac`, or an empty string when unknown
    pub fn resolve(&self, mac: MacAddr) -> String {
        let Some(source) = &self.source else {
            return String::new();
        };

        match source.query(mac) {
            Some(record) => parse_vendor_record(&record).unwrap_or_else(|| {
                log::debug!("discarding malformed oui record for {}: {:?}", mac, record);
                String::new()
            }),
            None => {
                log::debug!("no oui record for {}", mac);
                String::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "./vendor_tests.rs"]
mod tests;
