//! Detection ingestion from raw OCR engine output.
//!
//! Engines report a page in one of two shapes:
//!
//! - a mapping with a `rec_texts` list of recognized strings and no geometry;
//! - a list of `[box, [text, confidence]]` or `[box, text]` entries, where
//!   `box` is four `[x, y]` points.
//!
//! Either shape may arrive wrapped in a one-element batch list. Entries that
//! cannot be read are skipped; ingestion itself never fails.

use crate::model::{Detection, PageDetections, Point, Quad};
use serde_json::Value;

/// Raw per-page OCR engine output.
pub type RawOcrOutput = Value;

/// Field holding recognized strings in the geometry-free shape.
const REC_TEXTS_KEY: &str = "rec_texts";

/// Normalizes raw OCR output into detections.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use unocr::ingest::ingest;
///
/// let raw = json!([[[[0, 0], [50, 0], [50, 20], [0, 20]], ["안녕하세요", 0.98]]]);
/// let page = ingest(&raw);
/// assert_eq!(page.len(), 1);
/// ```
pub fn ingest(raw: &RawOcrOutput) -> PageDetections {
    match unwrap_batch(raw) {
        Value::Object(map) => match map.get(REC_TEXTS_KEY) {
            Some(texts) => PageDetections::TextOnly(parse_texts(texts)),
            None => {
                log::debug!("OCR result mapping has no '{REC_TEXTS_KEY}' field");
                PageDetections::default()
            }
        },
        Value::Array(entries) => {
            let detections: Vec<Detection> = entries.iter().filter_map(parse_entry).collect();
            let skipped = entries.len() - detections.len();
            if skipped > 0 {
                log::debug!("Skipped {skipped} malformed OCR entries");
            }
            PageDetections::Positioned(detections)
        }
        _ => PageDetections::default(),
    }
}

/// Parses a JSON document produced by an OCR engine.
pub fn ingest_str(json: &str) -> crate::Result<PageDetections> {
    let raw: Value = serde_json::from_str(json)?;
    Ok(ingest(&raw))
}

/// Strips a one-page batch wrapper (`[page]`) if present.
///
/// The wrapper is recognized by nesting depth alone, so a malformed first
/// entry cannot make a bare entry list look like a wrapped page.
fn unwrap_batch(raw: &Value) -> &Value {
    match raw.as_array().map(Vec::as_slice) {
        Some([page @ (Value::Object(_) | Value::Null), ..]) => page,
        Some([page @ Value::Array(_)]) if !is_entry_shaped(page) => page,
        _ => raw,
    }
}

/// True if the value nests like `[box, ..]` with `box` a list of points,
/// whether or not the box itself is valid.
fn is_entry_shaped(value: &Value) -> bool {
    match value.get(0).and_then(|bbox| bbox.get(0)) {
        Some(Value::Array(point)) => !point.first().is_some_and(Value::is_array),
        _ => false,
    }
}

fn parse_texts(texts: &Value) -> Vec<Detection> {
    match texts {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(Detection::text_only)
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_entry(entry: &Value) -> Option<Detection> {
    let parts = entry.as_array()?;
    if parts.len() < 2 {
        return None;
    }

    let bbox = parse_quad(&parts[0])?;
    let (text, confidence) = match &parts[1] {
        Value::String(text) => (text.as_str(), 1.0),
        Value::Array(info) if info.len() >= 2 => (info[0].as_str()?, info[1].as_f64()?),
        _ => return None,
    };

    if !confidence.is_finite() {
        return None;
    }

    Some(Detection::new(bbox, text, confidence))
}

fn parse_quad(value: &Value) -> Option<Quad> {
    let points = value.as_array()?;
    if points.len() != 4 {
        return None;
    }

    let mut quad = Quad::default();
    for (slot, point) in quad.points.iter_mut().zip(points) {
        *slot = parse_point(point)?;
    }

    quad.is_finite().then_some(quad)
}

fn parse_point(value: &Value) -> Option<Point> {
    match value.as_array()?.as_slice() {
        [x, y, ..] => Some(Point::new(x.as_f64()?, y.as_f64()?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bbox(y: f64) -> Value {
        json!([[0.0, y], [40.0, y], [40.0, y + 10.0], [0.0, y + 10.0]])
    }

    #[test]
    fn test_tuple_entries() {
        let raw = json!([
            [bbox(0.0), ["첫째", 0.95]],
            [bbox(30.0), "둘째"],
        ]);
        let page = ingest(&raw);
        let PageDetections::Positioned(detections) = page else {
            panic!("expected positioned detections");
        };
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].text, "첫째");
        assert_eq!(detections[0].confidence, 0.95);
        assert_eq!(detections[1].confidence, 1.0);
        assert_eq!(detections[1].bbox.y_center(), 35.0);
    }

    #[test]
    fn test_batch_wrapper_unwrapped() {
        let raw = json!([[[bbox(0.0), ["본문", 0.9]], [bbox(40.0), ["내용", 0.8]]]]);
        assert_eq!(ingest(&raw).len(), 2);
    }

    #[test]
    fn test_rec_texts_mapping() {
        let raw = json!([{ "rec_texts": ["제목", "  ", 42, "본문"] }]);
        let page = ingest(&raw);
        let PageDetections::TextOnly(detections) = page else {
            panic!("expected text-only detections");
        };
        assert_eq!(detections.len(), 3);
        assert_eq!(detections[0].text, "제목");
        assert_eq!(detections[2].text, "본문");
    }

    #[test]
    fn test_empty_results() {
        assert!(ingest(&Value::Null).is_empty());
        assert!(ingest(&json!([])).is_empty());
        assert!(ingest(&json!([null])).is_empty());
        assert!(ingest(&json!({ "dt_polys": [] })).is_empty());
        assert!(ingest(&json!("text")).is_empty());
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let raw = json!([
            [bbox(0.0), ["ok", 0.9]],
            [bbox(10.0)],
            [[[0, 0], [1, 1]], ["short box", 0.9]],
            [bbox(20.0), [7, 0.9]],
            [bbox(30.0), ["no score"]],
            [[[0, 0], [1, "x"], [1, 1], [0, 1]], ["bad point", 0.9]],
            "garbage",
        ]);
        let page = ingest(&raw);
        assert_eq!(page.len(), 1);
        assert_eq!(page.detections()[0].text, "ok");
    }

    #[test]
    fn test_malformed_first_entry_keeps_rest() {
        let three_points = json!([[0.0, 0.0], [40.0, 0.0], [40.0, 10.0]]);
        let raw = json!([
            [three_points, ["three-point box", 0.9]],
            [bbox(0.0), ["ok", 0.9]],
            [bbox(30.0), ["also ok", 0.9]],
        ]);
        let page = ingest(&raw);
        assert_eq!(page.len(), 2);
        assert_eq!(page.detections()[0].text, "ok");

        let wrapped = json!([raw]);
        assert_eq!(ingest(&wrapped).len(), 2);
    }

    #[test]
    fn test_single_entry_not_unwrapped() {
        let raw = json!([[bbox(0.0), ["only", 0.9]]]);
        let page = ingest(&raw);
        assert_eq!(page.len(), 1);
        assert_eq!(page.detections()[0].text, "only");
    }

    #[test]
    fn test_ingest_str() {
        let page = ingest_str(r#"[[[[0,0],[9,0],[9,9],[0,9]],["가나",0.99]]]"#).unwrap();
        assert_eq!(page.len(), 1);
        assert!(ingest_str("[[").is_err());
    }
}
