//! Prompt templates

/// System instruction for turning resume text into a JSON description
pub const RESUME_EXTRACTION_PROMPT: &str = r#"
You are a helpful assistant that extracts the following details from a resume text:

Name, Age, Role, Skills (as a list)

Output the result in a strict JSON format with keys: name, age, role, skills, experience, projects, education, certifications, languages, location, contact_info.
Add internships in the experience.
Do not include any other text or explanation. The JSON should be well-structured and valid.

If any information is missing, use null or an empty list.

Return a JSON object, not a string containing JSON.
Return the object directly without assigning it to a variable or wrapping it in another key, for example:
{
    "name": "Name",
    "age": "Age",
    "role": "Role",
    "skills": ["Skill1", "Skill2", "Skill3"],
    ...
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_every_field() {
        for key in [
            "name",
            "age",
            "role",
            "skills",
            "experience",
            "projects",
            "education",
            "certifications",
            "languages",
            "location",
            "contact_info",
        ] {
            assert!(RESUME_EXTRACTION_PROMPT.contains(key), "missing {key}");
        }
    }
}
