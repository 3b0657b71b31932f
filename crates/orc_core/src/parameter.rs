//! Stage parameter schema (spec §3 "Parameter schema", §6 canonical
//! serialization, §7 "Configuration errors").
//!
//! Grounded in the original's `stage_parameter.h`/`.cpp`: a
//! `std::variant<int32_t, uint32_t, double, bool, std::string>` plus a
//! parallel type tag and a constraints struct with optional min/max/
//! default/allowed-strings/required/depends_on.

use std::collections::BTreeMap;
use std::fmt;

/// A single parameter value. Mirrors the original's `ParameterValue`
/// variant exactly, plus a `FilePath` case (spec §3: "file-path (string
/// with hint)" is its own `type` but shares `String`'s storage).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ParameterValue {
    Int32(i32),
    UInt32(u32),
    Double(f64),
    Bool(bool),
    String(String),
    FilePath(String),
}

impl ParameterValue {
    #[must_use]
    pub fn type_tag(&self) -> ParameterType {
        match self {
            ParameterValue::Int32(_) => ParameterType::Int32,
            ParameterValue::UInt32(_) => ParameterType::UInt32,
            ParameterValue::Double(_) => ParameterType::Double,
            ParameterValue::Bool(_) => ParameterType::Bool,
            ParameterValue::String(_) => ParameterType::String,
            ParameterValue::FilePath(_) => ParameterType::FilePath,
        }
    }

    /// Canonical textual form used for `ArtifactID` fingerprinting and
    /// GUI round-tripping (spec §6).
    ///
    /// - bool -> `"true"`/`"false"`
    /// - signed/unsigned integer -> decimal, no leading zeros, sign only if negative
    /// - double -> shortest round-trip decimal representation
    /// - string / file-path -> verbatim UTF-8
    #[must_use]
    pub fn canonical_string(&self) -> String {
        match self {
            ParameterValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            ParameterValue::Int32(i) => i.to_string(),
            ParameterValue::UInt32(u) => u.to_string(),
            ParameterValue::Double(d) => format_shortest_round_trip(*d),
            ParameterValue::String(s) | ParameterValue::FilePath(s) => s.clone(),
        }
    }
}

/// Rust's `{}` formatter for `f64` already produces the shortest string
/// that round-trips back to the same bit pattern (ryu-backed since
/// Rust 1.x's grisu/dragon formatter); this just gives that behavior a
/// name at the call site so the canonical-serialization contract reads
/// as deliberate rather than incidental.
fn format_shortest_round_trip(value: f64) -> String {
    if value == value.trunc() && value.is_finite() {
        // Avoid "1" for 1.0 round-tripping ambiguously with an integer
        // parameter's canonical form; doubles always carry a decimal point.
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ParameterType {
    Int32,
    UInt32,
    Double,
    Bool,
    String,
    FilePath,
}

impl ParameterType {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ParameterType::Int32 => "int32",
            ParameterType::UInt32 => "uint32",
            ParameterType::Double => "double",
            ParameterType::Bool => "bool",
            ParameterType::String => "string",
            ParameterType::FilePath => "file_path",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parent-parameter dependency: this parameter only applies when the
/// named parent parameter currently holds one of `allowed_parent_values`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParameterDependency {
    pub parent_name: String,
    pub allowed_parent_values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParameterConstraints {
    pub min_value: Option<ParameterValue>,
    pub max_value: Option<ParameterValue>,
    pub default_value: Option<ParameterValue>,
    pub allowed_strings: Vec<String>,
    pub required: bool,
    pub depends_on: Option<ParameterDependency>,
}

/// Describes a single parameter a stage accepts (spec §3).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub parameter_type: ParameterType,
    pub constraints: ParameterConstraints,
    /// Hint that this is a filesystem path with the given extension
    /// (e.g. `"wav"`), used by GUIs to filter file pickers. Only
    /// meaningful when `parameter_type == FilePath`.
    pub file_extension_hint: Option<String>,
}

impl ParameterDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, parameter_type: ParameterType) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: String::new(),
            parameter_type,
            constraints: ParameterConstraints::default(),
            file_extension_hint: None,
        }
    }
}

/// Configuration errors surfaced from `set_parameters` (spec §7).
///
/// These never escape into `execute` — `set_parameters` rejects and
/// the stage keeps its previous values (spec §7 "Propagation policy").
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ParameterError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("missing required parameter '{0}'")]
    MissingRequired(String),
    #[error("parameter '{name}' expected type {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: ParameterType,
        actual: ParameterType,
    },
    #[error("parameter '{name}' value {value} is below minimum {min}")]
    BelowMinimum {
        name: String,
        value: String,
        min: String,
    },
    #[error("parameter '{name}' value {value} is above maximum {max}")]
    AboveMaximum {
        name: String,
        value: String,
        max: String,
    },
    #[error("parameter '{name}' value '{value}' is not one of the allowed strings")]
    NotAllowed { name: String, value: String },
}

/// Validates a proposed parameter map against a stage's schema,
/// returning the validated map (filled in with defaults for any
/// missing optional parameter) or the first violation encountered.
///
/// This is the shared helper every `ParameterizedStage::set_parameters`
/// implementation in `orc_stages_builtin` calls; the contract (spec
/// §4.2) only requires that validation happen "at `set_parameters`
/// time", not that each stage hand-roll it.
pub fn validate_parameters(
    descriptors: &[ParameterDescriptor],
    proposed: &BTreeMap<String, ParameterValue>,
) -> Result<BTreeMap<String, ParameterValue>, ParameterError> {
    let mut resolved = BTreeMap::new();

    for descriptor in descriptors {
        match proposed.get(&descriptor.name) {
            Some(value) => {
                validate_one(descriptor, value)?;
                resolved.insert(descriptor.name.clone(), value.clone());
            }
            None => {
                if descriptor.constraints.required {
                    return Err(ParameterError::MissingRequired(descriptor.name.clone()));
                }
                if let Some(default) = &descriptor.constraints.default_value {
                    resolved.insert(descriptor.name.clone(), default.clone());
                }
            }
        }
    }

    let known: std::collections::HashSet<&str> =
        descriptors.iter().map(|d| d.name.as_str()).collect();
    for name in proposed.keys() {
        if !known.contains(name.as_str()) {
            return Err(ParameterError::UnknownParameter(name.clone()));
        }
    }

    Ok(resolved)
}

fn validate_one(
    descriptor: &ParameterDescriptor,
    value: &ParameterValue,
) -> Result<(), ParameterError> {
    let expected = descriptor.parameter_type;
    let actual = value.type_tag();
    let compatible = expected == actual
        || (expected == ParameterType::FilePath && actual == ParameterType::String);
    if !compatible {
        return Err(ParameterError::TypeMismatch {
            name: descriptor.name.clone(),
            expected,
            actual,
        });
    }

    if let Some(min) = &descriptor.constraints.min_value {
        if numeric_less_than(value, min) {
            return Err(ParameterError::BelowMinimum {
                name: descriptor.name.clone(),
                value: value.canonical_string(),
                min: min.canonical_string(),
            });
        }
    }
    if let Some(max) = &descriptor.constraints.max_value {
        if numeric_less_than(max, value) {
            return Err(ParameterError::AboveMaximum {
                name: descriptor.name.clone(),
                value: value.canonical_string(),
                max: max.canonical_string(),
            });
        }
    }
    if !descriptor.constraints.allowed_strings.is_empty() {
        if let ParameterValue::String(s) | ParameterValue::FilePath(s) = value {
            if !descriptor.constraints.allowed_strings.iter().any(|a| a == s) {
                return Err(ParameterError::NotAllowed {
                    name: descriptor.name.clone(),
                    value: s.clone(),
                });
            }
        }
    }

    Ok(())
}

fn numeric_less_than(a: &ParameterValue, b: &ParameterValue) -> bool {
    match (a, b) {
        (ParameterValue::Int32(a), ParameterValue::Int32(b)) => a < b,
        (ParameterValue::UInt32(a), ParameterValue::UInt32(b)) => a < b,
        (ParameterValue::Double(a), ParameterValue::Double(b)) => a < b,
        _ => false,
    }
}
