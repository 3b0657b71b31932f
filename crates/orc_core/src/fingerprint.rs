//! Canonical `ArtifactID` fingerprint recipe (spec §3: "Computed as a
//! stable hash over: the producing stage's name + version, each
//! parameter's name and serialized value in a canonical order, and the
//! ArtifactIDs of all input artifacts").
//!
//! Uses `xxhash-rust`'s xxh3 (the teacher's choice for fast content
//! hashing, e.g. asset cache keys in `myth_assets`), fed a
//! deterministically ordered byte stream so that two logically
//! identical invocations always hash to the same bytes regardless of
//! `HashMap` iteration order.

use crate::parameter::ParameterValue;
use crate::ArtifactId;

/// Builds the canonical byte stream fingerprinted into an `ArtifactID`.
///
/// `parameters` must already be in canonical (sorted-by-name) order —
/// callers hold a `BTreeMap<String, ParameterValue>` for exactly this
/// reason, so ordering falls out of the map's own iteration.
pub fn compute_artifact_id<'a>(
    stage_name: &str,
    stage_version: &str,
    parameters: impl IntoIterator<Item = (&'a str, &'a ParameterValue)>,
    input_ids: impl IntoIterator<Item = &'a ArtifactId>,
) -> ArtifactId {
    let mut hasher = xxhash_rust::xxh3::Xxh3::new();

    hash_str(&mut hasher, stage_name);
    hash_str(&mut hasher, stage_version);

    for (name, value) in parameters {
        hash_str(&mut hasher, name);
        hash_str(&mut hasher, value.type_tag().name());
        hash_str(&mut hasher, &value.canonical_string());
    }

    for input in input_ids {
        hash_str(&mut hasher, input.as_str());
    }

    let digest = hasher.digest128();
    ArtifactId::new(format!("{digest:032x}"))
}

fn hash_str(hasher: &mut xxhash_rust::xxh3::Xxh3, s: &str) {
    // Length-prefix every field so that e.g. ("ab", "c") and ("a",
    // "bc") never collide once concatenated.
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn identical_inputs_produce_identical_ids() {
        let mut params = BTreeMap::new();
        params.insert("gain".to_string(), ParameterValue::Double(1.5));
        let params_ref: Vec<_> = params.iter().map(|(k, v)| (k.as_str(), v)).collect();

        let a = compute_artifact_id("dropout_hint", "1.0", params_ref.clone(), &[]);
        let b = compute_artifact_id("dropout_hint", "1.0", params_ref, &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn differing_parameter_value_changes_id() {
        let mut p1 = BTreeMap::new();
        p1.insert("gain".to_string(), ParameterValue::Double(1.5));
        let mut p2 = BTreeMap::new();
        p2.insert("gain".to_string(), ParameterValue::Double(2.5));

        let r1: Vec<_> = p1.iter().map(|(k, v)| (k.as_str(), v)).collect();
        let r2: Vec<_> = p2.iter().map(|(k, v)| (k.as_str(), v)).collect();

        let a = compute_artifact_id("stage", "1.0", r1, &[]);
        let b = compute_artifact_id("stage", "1.0", r2, &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn differing_stage_version_changes_id() {
        let a = compute_artifact_id("stage", "1.0", std::iter::empty(), &[]);
        let b = compute_artifact_id("stage", "1.1", std::iter::empty(), &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn input_artifact_ids_contribute() {
        let input_a = ArtifactId::new("aaaa".to_string());
        let input_b = ArtifactId::new("bbbb".to_string());

        let a = compute_artifact_id("stage", "1.0", std::iter::empty(), &[input_a]);
        let b = compute_artifact_id("stage", "1.0", std::iter::empty(), &[input_b]);
        assert_ne!(a, b);
    }
}
