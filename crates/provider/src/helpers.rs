//! Mapping between resource configuration and v3 API structs
//!
//! Resources call into these when building request bodies (`get_*`,
//! `validate_*`) and when flattening responses back into state (`set_*`).

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use nutanix_common::{Error, Metadata, Reference, Result};
use tracing::debug;

use crate::state::{get_string_attr, make_state, string_value, DynamicValue};

const ZERO_TIME: &str = "0001-01-01 00:00:00 +0000 UTC";

/// Fill `metadata` from the `categories`, `project_reference` and
/// `owner_reference` attributes of a resource configuration.
pub fn get_metadata_attributes(
    config: &DynamicValue,
    metadata: &mut Metadata,
    kind: &str,
) -> Result<()> {
    metadata.kind = Some(kind.to_string());

    if let Some(categories) = config.get_ok("categories") {
        let items = categories.as_list().unwrap_or_default();
        if items.is_empty() {
            metadata.categories = None;
        } else {
            let mut cl = BTreeMap::new();
            for item in items {
                let name = get_string_attr(item, "name");
                let value = get_string_attr(item, "value");
                if !name.is_empty() && !value.is_empty() {
                    cl.insert(name, value);
                }
            }
            metadata.categories = Some(cl);
        }
    }

    if let Some(project) = config.get_ok("project_reference") {
        metadata.project_reference = Some(required_ref(project, "project_reference")?);
    }
    if let Some(owner) = config.get_ok("owner_reference") {
        metadata.owner_reference = Some(required_ref(owner, "owner_reference")?);
    }

    let categories = metadata.categories.as_ref().map_or(0, |c| c.len());
    debug!(kind, categories, "Built entity metadata");
    Ok(())
}

fn required_ref(block: &DynamicValue, name: &str) -> Result<Reference> {
    let attr = |key: &str| {
        block.get(key)
            .and_then(|v| v.as_string())
            .map(str::to_string)
            .ok_or_else(|| Error::missing(name, key))
    };

    Ok(Reference {
        kind: Some(attr("kind")?),
        uuid: Some(attr("uuid")?),
        name: block.get("name").and_then(|v| v.as_string()).map(str::to_string),
    })
}

/// Flatten entity metadata into the `metadata` state map and the
/// `categories` state list.
pub fn set_rs_entity_metadata(v: &Metadata) -> (DynamicValue, Vec<DynamicValue>) {
    let metadata = make_state(vec![
        ("last_update_time", string_value(format_time(v.last_update_time.as_ref()))),
        ("kind", string_value(v.kind.clone().unwrap_or_default())),
        ("uuid", string_value(v.uuid.clone().unwrap_or_default())),
        ("creation_time", string_value(format_time(v.creation_time.as_ref()))),
        ("spec_version", string_value(v.spec_version.unwrap_or(0).to_string())),
        ("spec_hash", string_value(v.spec_hash.clone().unwrap_or_default())),
        ("name", string_value(v.name.clone().unwrap_or_default())),
    ]);

    let categories = v.categories.iter()
        .flatten()
        .map(|(name, value)| {
            make_state(vec![
                ("name", string_value(name)),
                ("value", string_value(value)),
            ])
        })
        .collect();

    (metadata, categories)
}

/// Render a timestamp the way entity metadata is stored in state.
///
/// Fractional seconds carry no trailing zeros and are omitted when zero,
/// matching the provider's historical Go `Time.String()` output.
pub fn format_time(t: Option<&DateTime<Utc>>) -> String {
    let Some(t) = t else {
        return ZERO_TIME.to_string();
    };

    let mut out = t.format("%Y-%m-%d %H:%M:%S").to_string();
    let nanos = t.timestamp_subsec_nanos();
    if nanos > 0 {
        let fraction = format!("{:09}", nanos);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out.push_str(&t.format(" %z %Z").to_string());
    out
}

/// `{kind, name, uuid}` map for a reference, empty when there is none
pub fn get_reference_values(r: Option<&Reference>) -> DynamicValue {
    let mut reference = HashMap::new();
    if let Some(r) = r {
        reference.insert("kind".to_string(), string_value(r.kind.clone().unwrap_or_default()));
        reference.insert("name".to_string(), string_value(r.name.clone().unwrap_or_default()));
        reference.insert("uuid".to_string(), string_value(r.uuid.clone().unwrap_or_default()));
    }
    DynamicValue::Map(reference)
}

/// Cluster references carry no name.
pub fn get_cluster_reference_values(r: Option<&Reference>) -> DynamicValue {
    let mut reference = HashMap::new();
    if let Some(r) = r {
        reference.insert("kind".to_string(), string_value(r.kind.clone().unwrap_or_default()));
        reference.insert("uuid".to_string(), string_value(r.uuid.clone().unwrap_or_default()));
    }
    DynamicValue::Map(reference)
}

/// Build a reference from any of `kind`, `uuid` and `name`.
pub fn validate_ref(r: &HashMap<String, DynamicValue>) -> Option<Reference> {
    let reference = Reference {
        kind: map_string(r, "kind"),
        uuid: map_string(r, "uuid"),
        name: map_string(r, "name"),
    };
    has_value(&reference).then_some(reference)
}

/// Like [`validate_ref`] but ignores `name`.
pub fn validate_short_ref(r: &HashMap<String, DynamicValue>) -> Option<Reference> {
    let reference = Reference {
        kind: map_string(r, "kind"),
        uuid: map_string(r, "uuid"),
        name: None,
    };
    has_value(&reference).then_some(reference)
}

fn map_string(r: &HashMap<String, DynamicValue>, key: &str) -> Option<String> {
    r.get(key).and_then(|v| v.as_string()).map(str::to_string)
}

fn has_value(r: &Reference) -> bool {
    r.kind.is_some() || r.uuid.is_some() || r.name.is_some()
}

pub fn validate_map_string_value(
    value: &HashMap<String, DynamicValue>,
    key: &str,
) -> Option<String> {
    match value.get(key) {
        Some(DynamicValue::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

pub fn validate_map_int_value(
    value: &HashMap<String, DynamicValue>,
    key: &str,
) -> Option<i64> {
    value.get(key)
        .and_then(|v| v.as_i64())
        .filter(|n| *n != 0)
}
