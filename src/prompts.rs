/// Appended to every complexity request so the reply carries a parseable score
pub const COMPLEXITY_INSTRUCTIONS: &str = r#"Rate how technically challenging this repository is to build on a scale from 0 to 10.
End your answer with a line of the exact form:
complexity score: <number>"#;

/// Complexity prompt for one repository; `readme` may be empty
pub fn complexity_prompt(name: &str, readme: &str) -> String {
    format!(
        "Assess the complexity of repository {}. {}\n\n{}",
        name, readme, COMPLEXITY_INSTRUCTIONS
    )
}
