
use indexmap::IndexMap;
use lazy_static::lazy_static;
use serde::Serialize;

lazy_static! {
    /// Genome-in-a-bottle samples that the setup script knows how to fetch.
    /// Both the Coriell (NA#####) and GIAB (HG00#) names map to the GIAB id.
    pub static ref GIAB_CATALOG: ReferenceCatalog = ReferenceCatalog::new([
        ("NA12878", "HG001"),
        ("HG001", "HG001"),
        ("NA24385", "HG002"),
        ("HG002", "HG002"),
        ("NA24149", "HG003"),
        ("HG003", "HG003"),
        ("NA24143", "HG004"),
        ("HG004", "HG004"),
        ("NA24631", "HG005"),
        ("HG005", "HG005"),
        ("NA24694", "HG006"),
        ("HG006", "HG006"),
        ("NA24695", "HG007"),
        ("HG007", "HG007"),
    ]);
}

/// Lookup from sample aliases to a canonical reference id.
/// Read-only after construction; pass a different one in tests.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ReferenceCatalog {
    entries: IndexMap<String, String>
}

impl ReferenceCatalog {
    /// Constructor from (alias, id) pairs
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>
    {
        Self {
            entries: entries.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect()
        }
    }

    /// Maps a lab sample label to the key used for reference lookups.
    /// # Examples
    /// * `NA24143_Lib3_Rep1` -> `NA24143`
    /// * `HG004_run1` -> `HG004`
    /// * `CUSTOM_01` -> `CUSTOM`
    /// # Arguments
    /// * `raw_id` - the sample label as provided by the caller
    pub fn resolve_base_sample(&self, raw_id: &str) -> String {
        let prefix = raw_id.split('_').next().unwrap_or(raw_id);
        if self.entries.contains_key(prefix) {
            return prefix.to_string();
        }

        // labels like "NA24143Lib3" have no separator; the longest key wins
        let best_key = self.entries.keys()
            .filter(|k| raw_id.starts_with(k.as_str()))
            .max_by_key(|k| k.len());
        match best_key {
            Some(k) => k.clone(),
            None => prefix.to_string()
        }
    }

    /// Returns true if the resolved base sample is a catalog key
    pub fn is_catalog_sample(&self, raw_id: &str) -> bool {
        self.catalog_id(raw_id).is_some()
    }

    /// Returns the canonical id (e.g. `HG004`) for a sample, if it is catalogued
    pub fn catalog_id(&self, raw_id: &str) -> Option<&str> {
        let base_sample = self.resolve_base_sample(raw_id);
        self.entries.get(&base_sample).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
