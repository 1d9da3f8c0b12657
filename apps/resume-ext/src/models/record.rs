use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

// Accepted key spellings per field, in priority order. Keys match
// case-insensitively; an exact spelling beats a case variant. The first
// entry is the name the field is written under.
pub const STATUS: &[&str] = &["status"];
pub const FIRST_NAME: &[&str] = &["first_name", "firstname"];
pub const LAST_NAME: &[&str] = &["last_name", "lastname"];
pub const EMAIL: &[&str] = &["email", "email_address"];
pub const SKILLS: &[&str] = &["skills"];
pub const PHONE: &[&str] = &["phone", "phone_number"];
pub const LOCATION: &[&str] = &["location"];
pub const LINKEDIN: &[&str] = &["linkedin", "linkedin_url"];
pub const SUMMARY: &[&str] = &["summary"];
pub const WORK_EXPERIENCE: &[&str] = &["work_experience", "experience"];
pub const EDUCATION: &[&str] = &["education"];
pub const CERTIFICATIONS: &[&str] = &["certifications"];

/// Parsing status reported by the model for a resume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RecordStatus {
    #[default]
    Success,
    Fail,
}

impl RecordStatus {
    fn from_text(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "success" | "succeeded" | "ok" => RecordStatus::Success,
            _ => RecordStatus::Fail,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Success => "Success",
            RecordStatus::Fail => "Fail",
        }
    }
}

/// Canonical candidate record produced from one resume.
///
/// Built from whatever JSON object the model emitted. Each field takes the
/// first accepted spelling present; other spellings of the same field and
/// keys the schema does not know are kept in `extra`. A value whose shape
/// does not fit its field (an object where text is expected) is also moved
/// to `extra` under its original key, so nothing the model said is lost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredRecord {
    pub status: RecordStatus,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub skills: Vec<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub summary: Option<String>,
    pub work_experience: Map<String, Value>,
    pub education: Map<String, Value>,
    pub certifications: Map<String, Value>,
    pub extra: Map<String, Value>,
}

impl StructuredRecord {
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let mut misfits = Vec::new();

        let status = match take_field(&mut map, STATUS) {
            Some((key, value)) => match scalar_text(&value) {
                Some(text) => RecordStatus::from_text(&text),
                None => {
                    if !value.is_null() {
                        misfits.push((key, value));
                    }
                    RecordStatus::default()
                }
            },
            None => RecordStatus::default(),
        };

        let mut text = |names: &[&str]| -> Option<String> {
            let (key, value) = take_field(&mut map, names)?;
            let text = scalar_text(&value);
            if text.is_none() && !value.is_null() {
                misfits.push((key, value));
            }
            text
        };
        let first_name = text(FIRST_NAME);
        let last_name = text(LAST_NAME);
        let email = text(EMAIL);
        let phone = text(PHONE);
        let location = text(LOCATION);
        let linkedin = text(LINKEDIN);
        let summary = text(SUMMARY);

        let skills = take_field(&mut map, SKILLS)
            .map(|(_, value)| skill_list(&value))
            .unwrap_or_default();
        let mut section = |names: &[&str]| {
            take_field(&mut map, names)
                .map(|(_, value)| section_map(value))
                .unwrap_or_default()
        };
        let work_experience = section(WORK_EXPERIENCE);
        let education = section(EDUCATION);
        let certifications = section(CERTIFICATIONS);

        let mut extra = map;
        extra.extend(misfits);

        StructuredRecord {
            status,
            first_name,
            last_name,
            email,
            skills,
            phone,
            location,
            linkedin,
            summary,
            work_experience,
            education,
            certifications,
            extra,
        }
    }

    fn canonical_entries(&self) -> [(&'static str, Value); 12] {
        [
            ("status", Value::from(self.status.as_str())),
            ("first_name", Value::from(self.first_name.clone())),
            ("last_name", Value::from(self.last_name.clone())),
            ("email", Value::from(self.email.clone())),
            ("skills", Value::from(self.skills.clone())),
            ("phone", Value::from(self.phone.clone())),
            ("location", Value::from(self.location.clone())),
            ("linkedin", Value::from(self.linkedin.clone())),
            ("summary", Value::from(self.summary.clone())),
            ("work_experience", Value::Object(self.work_experience.clone())),
            ("education", Value::Object(self.education.clone())),
            ("certifications", Value::Object(self.certifications.clone())),
        ]
    }
}

impl<'de> Deserialize<'de> for StructuredRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer).map(StructuredRecord::from_map)
    }
}

/// Canonical fields first, in schema order, then `extra`. An `extra` entry
/// whose key is a canonical name holds the model's misfit value for that
/// field and is written in the field's place.
impl Serialize for StructuredRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let canonical = self.canonical_entries();
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &canonical {
            map.serialize_entry(key, self.extra.get(*key).unwrap_or(value))?;
        }
        for (key, value) in &self.extra {
            if !canonical.iter().any(|(name, _)| name == key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// What gets persisted for one resume: the parsed record, or the model's raw
/// reply when it could not be read as a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordOutcome {
    Parsed(StructuredRecord),
    Unparsed { raw_text: String },
}

impl RecordOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, RecordOutcome::Unparsed { .. })
    }
}

/// Key holding the first accepted spelling present in `map`.
pub fn find_key<'a>(map: &'a Map<String, Value>, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        map.keys()
            .find(|key| key.as_str() == *name)
            .or_else(|| map.keys().find(|key| key.eq_ignore_ascii_case(name)))
            .map(String::as_str)
    })
}

fn take_field(map: &mut Map<String, Value>, names: &[&str]) -> Option<(String, Value)> {
    let key = find_key(map, names)?.to_string();
    map.remove(&key).map(|value| (key, value))
}

/// Reads a scalar JSON value as text. Null, arrays and objects have no text.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Reads a skills value of any shape. Strings outside a list are split on
/// commas and newlines; nested lists and grouped objects are flattened.
/// Blank entries are dropped; case-insensitive duplicates keep the first
/// spelling.
pub fn skill_list(value: &Value) -> Vec<String> {
    let mut raw = Vec::new();
    collect_skills(value, false, &mut raw);

    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

fn collect_skills(value: &Value, in_list: bool, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !in_list => out.extend(s.split([',', '\n']).map(str::to_string)),
        Value::Array(items) => items.iter().for_each(|item| collect_skills(item, true, out)),
        Value::Object(groups) => groups
            .values()
            .for_each(|group| collect_skills(group, false, out)),
        other => out.extend(scalar_text(other)),
    }
}

/// Sections are maps; a list is re-keyed by 1-based position and a lone
/// value becomes entry "1".
fn section_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| ((i + 1).to_string(), item))
            .collect(),
        other => {
            let mut map = Map::new();
            map.insert("1".to_string(), other);
            map
        }
    }
}
