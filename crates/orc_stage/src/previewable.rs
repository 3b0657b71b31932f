//! `PreviewableStage` capability mixin (spec §4.2/§4.5). A stage that
//! implements this is consulted by the preview renderer *instead of*
//! the default VFR weave/scale path (spec §4.5 "Previewable stages").

use orc_core::{PreviewImage, PreviewNavigationHint, PreviewOption};

pub trait PreviewableStage {
    fn supports_preview(&self) -> bool;

    fn preview_options(&self) -> Vec<PreviewOption>;

    /// `option_id` must be one returned by `preview_options`; `index`
    /// selects which item of that option (a field or frame number,
    /// depending on the option's declared shape).
    fn render_preview(
        &self,
        option_id: &str,
        index: u64,
        navigation_hint: PreviewNavigationHint,
    ) -> PreviewImage;
}
