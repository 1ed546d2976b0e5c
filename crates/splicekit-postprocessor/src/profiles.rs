//! Filament splice profile database.
//!
//! Splice parameters for common materials and brands: joining temperature,
//! heat/cool timing, and compression distance. Profiles also declare which
//! materials they can be spliced to; dissimilar polymers generally cannot be
//! welded reliably.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Profile for a specific filament material/brand combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilamentProfile {
    pub name: String,
    pub material: String,
    pub brand: Option<String>,

    /// Splice temperature in Celsius.
    pub splice_temp_c: u32,
    /// Heating phase duration.
    pub heat_time_ms: u64,
    /// Cooling phase duration.
    pub cooling_time_ms: u64,
    /// Compression distance during the weld.
    pub compression_mm: f64,

    /// Materials this profile can be spliced to.
    pub compatible_with: Vec<String>,
    pub notes: String,
}

/// Splice parameters selected for joining a pair of materials.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpliceParams {
    pub splice_temp_c: u32,
    pub heat_time_ms: u64,
    pub cooling_time_ms: u64,
    pub compression_mm: f64,
}

#[allow(clippy::too_many_arguments)]
fn profile(
    name: &str,
    material: &str,
    brand: Option<&str>,
    splice_temp_c: u32,
    heat_time_ms: u64,
    cooling_time_ms: u64,
    compression_mm: f64,
    compatible_with: &[&str],
    notes: &str,
) -> FilamentProfile {
    let compatible = if compatible_with.is_empty() {
        vec![material.to_string()]
    } else {
        compatible_with.iter().map(|m| m.to_string()).collect()
    };
    FilamentProfile {
        name: name.to_string(),
        material: material.to_string(),
        brand: brand.map(str::to_string),
        splice_temp_c,
        heat_time_ms,
        cooling_time_ms,
        compression_mm,
        compatible_with: compatible,
        notes: notes.to_string(),
    }
}

/// Built-in profile table, keyed by lowercase id.
fn profile_table() -> &'static BTreeMap<&'static str, FilamentProfile> {
    static TABLE: OnceLock<BTreeMap<&'static str, FilamentProfile>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = BTreeMap::new();

        table.insert(
            "pla",
            profile(
                "Generic PLA",
                "PLA",
                None,
                210,
                3000,
                5000,
                2.0,
                &["PLA", "PLA+", "PLA Matte"],
                "Most common, easy to splice",
            ),
        );
        table.insert(
            "pla_bambu_matte",
            profile(
                "Bambu Lab Matte PLA",
                "PLA",
                Some("Bambu Lab"),
                215,
                3200,
                5000,
                2.0,
                &[],
                "Starry Night Vase colors",
            ),
        );
        table.insert(
            "pla_polymaker",
            profile(
                "Polymaker PolyTerra PLA",
                "PLA",
                Some("Polymaker"),
                205,
                2800,
                4500,
                2.0,
                &[],
                "Lower temp, matte finish",
            ),
        );
        table.insert(
            "petg",
            profile(
                "Generic PETG",
                "PETG",
                None,
                235,
                3500,
                6000,
                2.5,
                &["PETG"],
                "Higher temp than PLA, strong splices",
            ),
        );
        table.insert(
            "petg_overture",
            profile(
                "Overture PETG",
                "PETG",
                Some("Overture"),
                240,
                3500,
                6000,
                2.5,
                &[],
                "Popular budget PETG",
            ),
        );
        table.insert(
            "abs",
            profile(
                "Generic ABS",
                "ABS",
                None,
                250,
                4000,
                7000,
                2.5,
                &["ABS", "ASA"],
                "Requires good ventilation, fumes",
            ),
        );
        table.insert(
            "asa",
            profile(
                "Generic ASA",
                "ASA",
                None,
                255,
                4000,
                7000,
                2.5,
                &["ASA", "ABS"],
                "UV resistant, outdoor use",
            ),
        );
        table.insert(
            "pla_silk",
            profile(
                "Silk PLA",
                "PLA",
                None,
                220,
                3500,
                5500,
                2.0,
                &["PLA", "PLA Silk"],
                "Higher temp for glossy finish",
            ),
        );
        table.insert(
            "pla_wood",
            profile(
                "Wood-fill PLA",
                "PLA",
                None,
                200,
                2500,
                4000,
                1.8,
                &[],
                "Lower temp to prevent burning wood fibers",
            ),
        );

        table
    })
}

/// Look up a profile by id (case-insensitive).
pub fn get_profile(id: &str) -> Option<&'static FilamentProfile> {
    profile_table().get(id.to_lowercase().as_str())
}

/// Default profile for a material type (the brandless entry wins).
pub fn profile_for_material(material: &str) -> Option<&'static FilamentProfile> {
    profile_table()
        .values()
        .find(|p| p.material.eq_ignore_ascii_case(material) && p.brand.is_none())
}

/// All available profile ids.
pub fn list_profiles() -> Vec<&'static str> {
    profile_table().keys().copied().collect()
}

/// Check whether two materials can be spliced together.
pub fn are_compatible(material_a: &str, material_b: &str) -> bool {
    match profile_for_material(material_a) {
        Some(profile) => profile
            .compatible_with
            .iter()
            .any(|m| m.eq_ignore_ascii_case(material_b)),
        None => false,
    }
}

/// Splice parameters for joining two materials.
///
/// Uses the hotter/longer value of the pair for each parameter. Returns
/// `None` for unknown or incompatible materials.
pub fn splice_params(material_a: &str, material_b: &str) -> Option<SpliceParams> {
    let profile_a = profile_for_material(material_a)?;
    let profile_b = profile_for_material(material_b)?;

    if !are_compatible(material_a, material_b) {
        return None;
    }

    Some(SpliceParams {
        splice_temp_c: profile_a.splice_temp_c.max(profile_b.splice_temp_c),
        heat_time_ms: profile_a.heat_time_ms.max(profile_b.heat_time_ms),
        cooling_time_ms: profile_a.cooling_time_ms.max(profile_b.cooling_time_ms),
        compression_mm: profile_a.compression_mm.max(profile_b.compression_mm),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(get_profile("PLA").is_some());
        assert!(get_profile("Petg_Overture").is_some());
        assert!(get_profile("nylon").is_none());
    }

    #[test]
    fn test_material_default_skips_branded_entries() {
        let profile = profile_for_material("pla").expect("generic PLA profile");
        assert_eq!(profile.name, "Generic PLA");
        assert!(profile.brand.is_none());
    }

    #[test]
    fn test_compatibility() {
        assert!(are_compatible("PLA", "PLA"));
        assert!(are_compatible("ABS", "ASA"));
        assert!(!are_compatible("PLA", "PETG"));
        assert!(!are_compatible("nylon", "PLA"));
    }

    #[test]
    fn test_splice_params_take_the_maximum() {
        let params = splice_params("ABS", "ASA").expect("ABS/ASA are compatible");
        assert_eq!(params.splice_temp_c, 255);
        assert_eq!(params.heat_time_ms, 4000);
        assert_eq!(params.cooling_time_ms, 7000);
        assert_eq!(params.compression_mm, 2.5);

        assert!(splice_params("PLA", "PETG").is_none());
    }

    #[test]
    fn test_own_material_is_default_compatible() {
        // Entries without an explicit compatibility list accept their own material
        let profile = get_profile("pla_wood").expect("wood PLA profile");
        assert_eq!(profile.compatible_with, vec!["PLA".to_string()]);
    }
}
