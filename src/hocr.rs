use kuchiki::NodeRef;
use serde::Serialize;

const WORD_CLASS: &str = "ocrx_word";

// source pixel coordinates, top-left origin; corner ordering is taken on
// faith from the producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BBoxPx {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

#[derive(Debug, Clone)]
pub struct OcrWord {
    pub text: String,
    pub bbox: Option<BBoxPx>,
}

pub fn parse_words(hocr: &str) -> Vec<OcrWord> {
    use kuchiki::traits::*;

    let document = kuchiki::parse_html().one(hocr);
    collect_words(&document)
}

fn collect_words(document: &NodeRef) -> Vec<OcrWord> {
    let mut words = Vec::new();
    for node in document.descendants() {
        let Some(element) = node.as_element() else {
            continue;
        };
        let bbox = {
            let attrs = element.attributes.borrow();
            let is_word = attrs
                .get("class")
                .map(|value| has_class_token(value, WORD_CLASS))
                .unwrap_or(false);
            if !is_word {
                continue;
            }
            attrs.get("title").and_then(parse_bbox_from_title)
        };
        let text = normalize_word_text(&node.text_contents());
        words.push(OcrWord { text, bbox });
    }
    words
}

fn has_class_token(value: &str, class: &str) -> bool {
    value.split_whitespace().any(|token| token == class)
}

fn normalize_word_text(text: &str) -> String {
    text.replace('\u{00a0}', " ").trim().to_string()
}

pub(crate) fn parse_bbox_from_title(title: &str) -> Option<BBoxPx> {
    for (idx, _) in title.match_indices("bbox") {
        let rest = &title[idx + "bbox".len()..];
        // skips longer property names such as x_bboxes
        if !rest.starts_with(' ') {
            continue;
        }
        let nums = rest
            .split([' ', ';'])
            .filter(|v| !v.is_empty())
            .take(4)
            .filter_map(|v| v.parse::<u32>().ok())
            .collect::<Vec<_>>();
        if nums.len() == 4 {
            return Some(BBoxPx {
                left: nums[0],
                top: nums[1],
                right: nums[2],
                bottom: nums[3],
            });
        }
    }
    None
}
