//! Line grouping: clusters positioned detections into reading-order lines.
//!
//! Fragments are sorted top to bottom, then swept once. A fragment joins the
//! current line while its `y_center` stays within `y_thresh` of the line's
//! anchor, which is the `y_center` of the line's first fragment. The anchor is
//! never recomputed, so a slowly drifting baseline can chain further than the
//! nominal threshold.

use crate::model::{Detection, Line, PageDetections, PositionedFragment};
use crate::options::LayoutOptions;

/// Groups detections into lines ordered top to bottom.
///
/// Detections below `min_confidence` or with blank text are dropped. Within a
/// line, fragments are ordered by `x_min`; ties keep detection order.
pub fn group_lines(detections: &[Detection], options: &LayoutOptions) -> Vec<Line> {
    let mut fragments: Vec<PositionedFragment> = detections
        .iter()
        .filter(|d| d.is_usable(options.min_confidence))
        .map(Detection::to_fragment)
        .collect();

    if fragments.is_empty() {
        return Vec::new();
    }

    fragments.sort_by(|a, b| {
        a.y_center
            .total_cmp(&b.y_center)
            .then(a.x_min.total_cmp(&b.x_min))
    });

    let mut lines = Vec::new();
    let mut anchor = fragments[0].y_center;
    let mut group: Vec<PositionedFragment> = Vec::new();

    for fragment in fragments {
        if (fragment.y_center - anchor).abs() <= options.y_thresh {
            group.push(fragment);
        } else {
            lines.push(finish_line(std::mem::take(&mut group)));
            anchor = fragment.y_center;
            group.push(fragment);
        }
    }

    if !group.is_empty() {
        lines.push(finish_line(group));
    }

    lines
}

/// Groups detections and returns each line's joined text.
pub fn group_line_texts(detections: &[Detection], options: &LayoutOptions) -> Vec<String> {
    group_lines(detections, options)
        .iter()
        .map(Line::text)
        .collect()
}

/// Produces the raw line strings of a page.
///
/// Text-only pages carry no geometry; each recognized string is already a
/// line and is passed through in engine order.
pub fn page_line_texts(page: &PageDetections, options: &LayoutOptions) -> Vec<String> {
    match page {
        PageDetections::Positioned(detections) => group_line_texts(detections, options),
        PageDetections::TextOnly(detections) => detections
            .iter()
            .map(|d| d.text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

fn finish_line(mut group: Vec<PositionedFragment>) -> Line {
    // sort_by is stable, so equal x_min keeps the earlier detection first
    group.sort_by(|a, b| a.x_min.total_cmp(&b.x_min));
    Line::new(group)
}
