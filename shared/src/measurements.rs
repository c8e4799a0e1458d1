//! Best-effort keyword scan over a model answer.
//!
//! This is a heuristic, not a parser. Each line is classified by the first
//! keyword group it mentions, so "a roomy 240 sq ft deck" lands in `rooms`
//! rather than `total_area`, and measurements phrased without the keywords
//! are missed entirely. Treat the output as hints for display only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const ROOM_KEYWORDS: [&str; 3] = ["room", "bedroom", "bathroom"];
const AREA_KEYWORDS: [&str; 2] = ["sq ft", "square feet"];
const DIMENSION_KEYWORDS: [&str; 3] = ["width", "length", "dimension"];
const FEATURE_KEYWORDS: [&str; 4] = ["door", "window", "stair", "elevator"];

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Measurements {
    pub rooms: Vec<String>,
    pub dimensions: BTreeMap<String, String>,
    pub total_area: Option<String>,
    pub features: Vec<String>,
}

fn mentions(line: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| line.contains(keyword))
}

pub fn extract_measurements(text: &str) -> Measurements {
    let mut measurements = Measurements::default();

    for line in text.lines() {
        let lowered = line.to_lowercase();

        if mentions(&lowered, &ROOM_KEYWORDS) {
            measurements.rooms.push(line.trim().to_string());
        } else if mentions(&lowered, &AREA_KEYWORDS) {
            // last match wins
            measurements.total_area = Some(line.trim().to_string());
        } else if mentions(&lowered, &DIMENSION_KEYWORDS) {
            let mut parts = line.split(':');
            let key = parts.next().unwrap_or_default().trim().to_string();
            let value = match parts.next() {
                Some(value) => value.trim().to_string(),
                None => line.to_string(),
            };
            measurements.dimensions.insert(key, value);
        } else if mentions(&lowered, &FEATURE_KEYWORDS) {
            measurements.features.push(line.trim().to_string());
        }
    }

    measurements
}
