//! Prompt templates for the language services
//!
//! Each builder takes the per-table summaries (see
//! [`crate::dataset::Table::summary`]) or the question/answer pair and returns
//! the single user prompt sent through [`crate::providers::Provider`].

pub mod agent_prompt;

pub use agent_prompt::build_agent_prompt;

/// Prompt asking for PlantUML entity-relationship code
///
/// # Examples
///
/// ```
/// use sheetchat::prompts::diagram_prompt;
///
/// let prompt = diagram_prompt(&["Table \"a\". Data Frame has column names: \n id".to_string()]);
/// assert!(prompt.contains("plantuml"));
/// assert!(prompt.contains("Table \"a\""));
/// ```
pub fn diagram_prompt(summaries: &[String]) -> String {
    format!(
        "Create a ER Diagram by using plantuml code and my description. \
         Don't need to embed sample data in the code. {}. \
         Answer code only without any explaination",
        quoted_list(summaries)
    )
}

/// Prompt asking for one field-description object per table
pub fn field_description_prompt(summaries: &[String]) -> String {
    format!(
        "Describe the meaning of every field of the following tables. {}. \
         Answer with a JSON array only, containing one object per table in the same order, \
         where each object maps a field name to a short description of that field.",
        quoted_list(summaries)
    )
}

/// Prompt asking for `count` suggested questions
///
/// `descriptions` is the rendered field-description text, empty when field
/// descriptions are disabled or failed.
pub fn suggestion_prompt(summaries: &[String], descriptions: &str, count: usize) -> String {
    let mut prompt = format!(
        "Suggest {} questions a user could ask to explore the following tables. {}.",
        count,
        quoted_list(summaries)
    );
    if !descriptions.trim().is_empty() {
        prompt.push_str(&format!(" Field descriptions: {}.", descriptions.trim()));
    }
    prompt.push_str(&format!(
        " Answer with a JSON array of exactly {} strings and nothing else.",
        count
    ));
    prompt
}

/// Prompt asking to rephrase a raw agent answer
///
/// # Examples
///
/// ```
/// use sheetchat::prompts::rewrite_prompt;
///
/// let prompt = rewrite_prompt("How many orders?", "42");
/// assert!(prompt.starts_with("42 is the answer of the question: How many orders?."));
/// ```
pub fn rewrite_prompt(question: &str, answer: &str) -> String {
    format!(
        "{} is the answer of the question: {}. Rewrite that answer in the most user-friendly \
         sentence. Answer in the same language with the question",
        answer, question
    )
}

fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("'{}'", item)).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summaries() -> Vec<String> {
        vec!["first table".to_string(), "second table".to_string()]
    }

    #[test]
    fn test_diagram_prompt_lists_every_summary() {
        let prompt = diagram_prompt(&summaries());
        assert!(prompt.contains("ER Diagram"));
        assert!(prompt.contains("['first table', 'second table']"));
        assert!(prompt.contains("code only"));
    }

    #[test]
    fn test_field_description_prompt_requests_json() {
        let prompt = field_description_prompt(&summaries());
        assert!(prompt.contains("JSON array"));
        assert!(prompt.contains("same order"));
    }

    #[test]
    fn test_suggestion_prompt_with_descriptions() {
        let prompt = suggestion_prompt(&summaries(), "id: identifier", 5);
        assert!(prompt.starts_with("Suggest 5 questions"));
        assert!(prompt.contains("Field descriptions: id: identifier."));
        assert!(prompt.contains("exactly 5 strings"));
    }

    #[test]
    fn test_suggestion_prompt_without_descriptions() {
        let prompt = suggestion_prompt(&summaries(), "  ", 3);
        assert!(!prompt.contains("Field descriptions"));
        assert!(prompt.contains("exactly 3 strings"));
    }

    #[test]
    fn test_rewrite_prompt_exact_text() {
        assert_eq!(
            rewrite_prompt("Q?", "A"),
            "A is the answer of the question: Q?. Rewrite that answer in the most \
             user-friendly sentence. Answer in the same language with the question"
        );
    }
}
