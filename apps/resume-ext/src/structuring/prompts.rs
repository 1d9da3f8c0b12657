// Resume structuring prompt templates.

pub const RESUME_EXTRACT_SYSTEM: &str = "\
You are a precise resume data extractor. \
You read cleaned resume text and return the candidate's details as one JSON object. \
Copy names, contact details and skills exactly as written in the resume.";

pub const RESUME_EXTRACT_PROMPT: &str = r#"Extract the candidate record from the resume below.

SOURCE FILE: {source_path}

RESUME TEXT:
{resume_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "status": "Success" | "Fail",
  "first_name": "string" | null,
  "last_name": "string" | null,
  "email": "string" | null,
  "skills": ["string"],
  "phone": "string" | null,
  "location": "string" | null,
  "linkedin": "string" | null,
  "summary": "string" | null,
  "work_experience": { "<employer or role>": { "title": "string", "dates": "string", "details": ["string"] } },
  "education": { "<institution>": { "degree": "string", "dates": "string" } },
  "certifications": { "<certification>": { "issuer": "string", "date": "string" } }
}

RULES:
1. "status" is "Fail" only when the text is not a resume or is unreadable.
2. "skills" lists each skill once, as written; do not add skills that are not mentioned.
3. Page markers, previews and [WARNING] lines come from the text extractor, not the candidate. Ignore them.
4. Return ONLY the JSON object."#;

/// Fills the extraction prompt for one resume.
pub fn build_extract_prompt(resume_text: &str, source_path: &str) -> String {
    RESUME_EXTRACT_PROMPT
        .replace("{source_path}", source_path)
        .replace("{resume_text}", resume_text)
}
