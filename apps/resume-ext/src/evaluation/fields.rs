use serde_json::{Map, Value};

use crate::models::record::{find_key, scalar_text, skill_list, SKILLS};

pub use crate::models::record::{EMAIL, FIRST_NAME, LAST_NAME};

/// Value under the first accepted spelling present, matched
/// case-insensitively.
pub fn lookup<'a>(record: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    find_key(record, names).and_then(|key| record.get(key))
}

/// Scalar field as text; missing, null and non-scalar values read as "".
pub fn text_field(record: &Map<String, Value>, names: &[&str]) -> String {
    lookup(record, names)
        .and_then(scalar_text)
        .unwrap_or_default()
}

/// Skills as a list; missing or unusable values read as empty.
pub fn skills_field(record: &Map<String, Value>) -> Vec<String> {
    lookup(record, SKILLS).map(skill_list).unwrap_or_default()
}
