use std::collections::HashMap;

use crate::metadata::MetadataRecord;

/// Deterministic string colour: rolling polynomial hash over the UTF-16
/// code units, hue taken modulo 360 (normalised into `[0, 360)`), fixed
/// saturation and lightness.
pub fn color_for(value: &str) -> String {
    let hue = string_hash(value).rem_euclid(360);
    format!("hsl({hue}, 100%, 75%)")
}

fn string_hash(value: &str) -> i32 {
    let mut hash: i32 = 0;
    for code in value.encode_utf16() {
        hash = (code as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash));
    }
    hash
}

/// Categorical value -> colour string, iterated in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    order: Vec<String>,
    colors: HashMap<String, String>,
}

impl ColorMap {
    pub fn get(&self, value: &str) -> Option<&str> {
        self.colors.get(value).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|value| self.colors.get(value).map(|c| (value.as_str(), c.as_str())))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn insert(&mut self, value: &str) {
        if !self.colors.contains_key(value) {
            self.order.push(value.to_string());
            self.colors.insert(value.to_string(), color_for(value));
        }
    }
}

/// Assign a colour to every distinct value of `field` across `records`,
/// preserving the order values are first encountered in.
pub fn build_color_map(records: &[MetadataRecord], field: &str) -> ColorMap {
    let mut map = ColorMap::default();
    for record in records {
        if let Some(value) = record.get(field) {
            map.insert(value);
        }
    }
    map
}
