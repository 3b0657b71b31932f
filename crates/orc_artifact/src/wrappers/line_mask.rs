//! Line-masking wrapper (spec §3; grounded in the original's
//! `mask_line_stage.h`): zeroes (or sets to a fixed IRE level) the
//! specified lines of specified-parity fields.
//!
//! Line-spec grammar, comma-separated entries of `PARITY:LINE` or
//! `PARITY:START-END` where `PARITY` is `F` (first field), `S` (second
//! field), or `A` (all fields) — e.g. `"F:20"`, `"S:6-22"`,
//! `"A:10,F:20"`.

use crate::artifact::{Artifact, Provenance};
use crate::vfr::{VfrHandle, VideoFieldRepresentation};
use orc_core::{ArtifactId, FieldId, VideoParameters};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineParity {
    First,
    Second,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpec {
    pub parity: LineParity,
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LineSpecParseError {
    #[error("empty line spec entry")]
    Empty,
    #[error("unknown parity '{0}', expected F, S, or A")]
    UnknownParity(String),
    #[error("invalid line range '{0}'")]
    InvalidRange(String),
}

/// Parses a comma-separated line-spec string into `LineSpec` entries.
pub fn parse_line_spec(spec: &str) -> Result<Vec<LineSpec>, LineSpecParseError> {
    spec.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_one_entry)
        .collect()
}

fn parse_one_entry(entry: &str) -> Result<LineSpec, LineSpecParseError> {
    let (parity_str, range_str) = entry
        .split_once(':')
        .ok_or_else(|| LineSpecParseError::InvalidRange(entry.to_string()))?;

    let parity = match parity_str.trim().to_ascii_uppercase().as_str() {
        "F" => LineParity::First,
        "S" => LineParity::Second,
        "A" => LineParity::All,
        other => return Err(LineSpecParseError::UnknownParity(other.to_string())),
    };

    let range_str = range_str.trim();
    if range_str.is_empty() {
        return Err(LineSpecParseError::Empty);
    }

    let (start, end) = match range_str.split_once('-') {
        Some((a, b)) => {
            let a: u32 = a
                .trim()
                .parse()
                .map_err(|_| LineSpecParseError::InvalidRange(entry.to_string()))?;
            let b: u32 = b
                .trim()
                .parse()
                .map_err(|_| LineSpecParseError::InvalidRange(entry.to_string()))?;
            (a, b)
        }
        None => {
            let line: u32 = range_str
                .parse()
                .map_err(|_| LineSpecParseError::InvalidRange(entry.to_string()))?;
            (line, line)
        }
    };

    Ok(LineSpec { parity, start, end })
}

fn ire_to_sample(ire: f64, video_parameters: &VideoParameters) -> u16 {
    let range = f64::from(video_parameters.white_16b_ire - video_parameters.black_16b_ire);
    let sample = f64::from(video_parameters.black_16b_ire) + ire / 100.0 * range;
    sample.round().clamp(0.0, f64::from(u16::MAX)) as u16
}

pub struct LineMaskWrapper {
    source: VfrHandle,
    id: ArtifactId,
    provenance: Provenance,
    specs: Vec<LineSpec>,
    mask_ire: f64,
    masked_fields: Vec<OnceLock<Vec<u16>>>,
}

impl LineMaskWrapper {
    #[must_use]
    pub fn new(
        source: VfrHandle,
        specs: Vec<LineSpec>,
        mask_ire: f64,
        stage_version: impl Into<String>,
    ) -> Self {
        let mut parameters = std::collections::BTreeMap::new();
        parameters.insert(
            "mask_ire".to_string(),
            orc_core::ParameterValue::Double(mask_ire),
        );
        let provenance = Provenance::new("mask_line", stage_version)
            .with_parameters(parameters)
            .with_input_ids(vec![source.id().clone()]);
        let id = provenance.compute_id();
        let field_count = source.field_count();
        Self {
            source,
            id,
            provenance,
            specs,
            mask_ire,
            masked_fields: (0..field_count).map(|_| OnceLock::new()).collect(),
        }
    }

    fn should_mask_line(&self, line: u32, is_first_field: bool) -> bool {
        self.specs.iter().any(|spec| {
            let parity_matches = match spec.parity {
                LineParity::All => true,
                LineParity::First => is_first_field,
                LineParity::Second => !is_first_field,
            };
            parity_matches && line >= spec.start && line <= spec.end
        })
    }

    fn compute_masked_field(&self, id: FieldId) -> Vec<u16> {
        let mut data = self.source.get_field(id);
        let Some(desc) = self.source.get_descriptor(id) else {
            return data;
        };
        let is_first_field = self
            .source
            .get_field_parity_hint(id)
            .map_or(id.value() % 2 == 0, |hint| hint.is_first_field);
        let mask_sample = self
            .source
            .get_video_parameters()
            .map_or(0, |vp| ire_to_sample(self.mask_ire, &vp));

        for line in 0..desc.height {
            if !self.should_mask_line(line, is_first_field) {
                continue;
            }
            let start = line as usize * desc.width as usize;
            let end = start + desc.width as usize;
            if let Some(row) = data.get_mut(start..end) {
                row.fill(mask_sample);
            }
        }
        data
    }

    fn masked_field(&self, id: FieldId) -> Option<&Vec<u16>> {
        let cache = self.masked_fields.get(id.value() as usize)?;
        Some(cache.get_or_init(|| self.compute_masked_field(id)))
    }
}

impl Artifact for LineMaskWrapper {
    fn type_name(&self) -> &str {
        "LineMaskWrapper"
    }

    fn id(&self) -> &ArtifactId {
        &self.id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn as_vfr(&self) -> Option<&dyn VideoFieldRepresentation> {
        Some(self)
    }

    fn as_vfr_handle(self: std::sync::Arc<Self>) -> Option<crate::vfr::VfrHandle> {
        Some(self)
    }
}

impl VideoFieldRepresentation for LineMaskWrapper {
    fn wrapped_source(&self) -> Option<&VfrHandle> {
        Some(&self.source)
    }

    fn get_line(&self, id: FieldId, line: u32) -> Option<&[u16]> {
        let desc = self.source.get_descriptor(id)?;
        if line >= desc.height {
            return None;
        }
        let start = line as usize * desc.width as usize;
        let end = start + desc.width as usize;
        self.masked_field(id)?.get(start..end)
    }

    fn get_field(&self, id: FieldId) -> Vec<u16> {
        self.masked_field(id).cloned().unwrap_or_default()
    }
}
