//! Embedded sample service descriptions
//!
//! Service descriptions bundled into the binary at compile time, laid out as
//! `<service>/<api-version>/service-2.json`.

use std::collections::{BTreeMap, BTreeSet};

use rust_embed::RustEmbed;
use shapebind_model::{ModelError, ServiceDescription, ShapeGraph};

use crate::errors::Result;

/// Embedded service descriptions with compression
#[derive(RustEmbed)]
#[folder = "resources/models"]
#[include = "*.json"]
pub struct EmbeddedModels;

impl EmbeddedModels {
    /// Raw service description by service name and API version
    pub fn get_service_description(service: &str, api_version: &str) -> Option<Vec<u8>> {
        let start_time = std::time::Instant::now();

        let json_path = format!("{}/{}/service-2.json", service, api_version);
        let file = Self::get(&json_path)?;
        let total_time = start_time.elapsed();
        if total_time.as_millis() > 10 {
            log::debug!(
                "Loaded {}/{}: {}KB in {:?}",
                service,
                api_version,
                file.data.len() / 1024,
                total_time
            );
        }
        Some(file.data.to_vec())
    }

    /// Every embedded service with its API versions, sorted.
    pub fn build_service_versions_map() -> BTreeMap<String, Vec<String>> {
        let mut service_versions: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut file_count = 0;

        for file_path in Self::iter() {
            file_count += 1;
            let mut parts = file_path.split('/');
            if let (Some(service), Some(version), Some(_)) = (parts.next(), parts.next(), parts.next()) {
                service_versions
                    .entry(service.to_string())
                    .or_default()
                    .insert(version.to_string());
            }
        }
        log::debug!(
            "Built service versions map (processed {} files, found {} services)",
            file_count,
            service_versions.len()
        );

        service_versions
            .into_iter()
            .map(|(service, versions)| (service, versions.into_iter().collect()))
            .collect()
    }
}

/// Parse and resolve an embedded service description.
pub fn load_graph(service: &str, api_version: &str) -> Result<ShapeGraph> {
    let bytes = EmbeddedModels::get_service_description(service, api_version).ok_or_else(|| {
        let available = EmbeddedModels::build_service_versions_map()
            .remove(service)
            .map_or_else(|| "none".to_string(), |versions| versions.join(", "));
        ModelError::malformed(format!(
            "no embedded description for {} version {} (available: {})",
            service, api_version, available
        ))
    })?;
    let description = ServiceDescription::from_json_slice(&bytes)?;
    Ok(ShapeGraph::build(&description)?)
}
