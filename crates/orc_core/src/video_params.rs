//! `VideoParameters` — the read-only side-channel every
//! `VideoFieldRepresentation` may expose (spec §6).

/// Video standard a field/frame was captured under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum VideoSystem {
    #[default]
    Unknown,
    Ntsc,
    Pal,
    PalM,
    SecamNonStandard,
}

/// Read-only capture/decode metadata carried alongside a
/// `VideoFieldRepresentation`. Matches the original's `VideoParameters`
/// field-for-field (spec §6); no behavior lives on this type, it is a
/// plain data carrier consumed by the preview renderer's IRE scaling
/// and by stages that need to know field geometry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoParameters {
    pub system: VideoSystem,
    pub is_subcarrier_locked: bool,
    pub is_widescreen: bool,

    pub field_width: i32,
    pub field_height: i32,
    pub number_of_sequential_fields: i32,
    pub is_first_field_first: bool,

    pub colour_burst_start: i32,
    pub colour_burst_end: i32,
    pub active_video_start: i32,
    pub active_video_end: i32,

    pub first_active_field_line: i32,
    pub last_active_field_line: i32,
    pub first_active_frame_line: i32,
    pub last_active_frame_line: i32,

    pub blanking_16b_ire: i32,
    pub black_16b_ire: i32,
    pub white_16b_ire: i32,

    pub sample_rate: f64,
    pub fsc: f64,

    pub is_mapped: bool,
    pub tape_format: String,

    pub decoder: String,
    pub git_branch: String,
    pub git_commit: String,

    pub active_area_cropping_applied: bool,
}

impl VideoParameters {
    /// The IRE range used by the preview renderer's 16-bit -> 8-bit
    /// scaling (spec §4.5). Zero (or negative) means the parameters
    /// are degenerate and callers should fall back to an identity
    /// 16->8 shift rather than dividing by zero.
    #[must_use]
    pub fn ire_range(&self) -> i32 {
        self.white_16b_ire - self.black_16b_ire
    }
}
