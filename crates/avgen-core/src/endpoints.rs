//! Regional service URL table.
//!
//! Services are keyed `{group}.{service}` (e.g. `avatar.image_to_video`).
//! The table is built once and only read afterwards; overrides (from config or
//! tests) are applied while building, never on a shared instance.

use std::collections::HashMap;

use crate::api::ApiError;

pub const REGION_MAINLAND: &str = "mainland";
pub const REGION_GLOBAL: &str = "global";

const MAINLAND_BASE: &str = "https://openman.weta365.com/metaman/open";

const MAINLAND_SERVICES: &[(&str, &str)] = &[
    ("avatar.image_to_video", "/image/toman/cmp"),
    ("avatar.image_to_video_result", "/image/toman/cmp/result/"),
    ("avatar.video_dubbing", "/video/voiceover/createTask"),
    ("avatar.video_dubbing_result", "/video/voiceover/detail"),
    ("avatar.video_translate", "/video/translate/start"),
    ("avatar.video_translate_result", "/video/translate/result/"),
];

/// Immutable region → service → URL lookup.
#[derive(Debug, Clone)]
pub struct ServiceTable {
    regions: HashMap<String, HashMap<String, String>>,
}

impl ServiceTable {
    /// The vendor's published endpoints. `global` exists but has no services yet.
    pub fn builtin() -> Self {
        let mainland = MAINLAND_SERVICES
            .iter()
            .map(|(key, path)| (key.to_string(), format!("{}{}", MAINLAND_BASE, path)))
            .collect();
        let mut regions = HashMap::new();
        regions.insert(REGION_MAINLAND.to_string(), mainland);
        regions.insert(REGION_GLOBAL.to_string(), HashMap::new());
        Self { regions }
    }

    /// Table with no regions; combine with `with_service` to build one by hand.
    pub fn empty() -> Self {
        Self {
            regions: HashMap::new(),
        }
    }

    /// Returns a copy with `service` in `region` pointing at `url` (region is created if missing).
    pub fn with_service(mut self, region: &str, service: &str, url: impl Into<String>) -> Self {
        self.regions
            .entry(region.to_string())
            .or_default()
            .insert(service.to_string(), url.into());
        self
    }

    /// Applies a batch of per-service overrides to one region.
    pub fn with_overrides<'a, I>(self, region: &str, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        overrides
            .into_iter()
            .fold(self, |table, (service, url)| table.with_service(region, service, url.clone()))
    }

    /// Resolve a service key for a region.
    pub fn resolve(&self, region: &str, service: &str) -> Result<&str, ApiError> {
        self.regions
            .get(region)
            .and_then(|services| services.get(service))
            .map(String::as_str)
            .ok_or_else(|| ApiError::ServiceNotFound {
                service: service.to_string(),
                region: region.to_string(),
            })
    }
}

impl Default for ServiceTable {
    fn default() -> Self {
        Self::builtin()
    }
}
