use serde_json::Value;

/// Instruction used when the caller supplies none: ask for everything that
/// could plausibly matter for future actions, completeness over precision
pub const DEFAULT_OBSERVE_INSTRUCTION: &str = "Find elements that can be used for any future actions in the page. These may be navigation links, related pages, section/subsection links, buttons, or other interactive elements. Be comprehensive: if there are multiple elements that may be relevant for future actions, return all of them.";

/// One element as the model reported it, before locator resolution
#[derive(Debug, Clone, PartialEq)]
pub struct RawElement {
    pub element_id: String,
    pub description: String,
    pub method: Option<String>,
    pub arguments: Vec<String>,
}

/// Build the system prompt for an observation call
///
/// Caller-supplied instructions come first so they override the built-in
/// guidance.
pub fn build_system_prompt(user_provided_instructions: Option<&str>, return_action: bool) -> String {
    let mut prompt = String::new();

    if let Some(instructions) = user_provided_instructions {
        prompt.push_str(instructions.trim());
        prompt.push_str("\n\n");
    }

    prompt.push_str(
        "You are helping map a user's instruction to elements of a page. \
         The page is given as an accessibility tree where each addressable node \
         is prefixed with its id in square brackets. \
         Respond with a JSON object of the form {\"elements\": [...]}, where each \
         element has \"elementId\" (the bracketed id, verbatim) and \"description\" \
         (a short description of the element).",
    );

    if return_action {
        prompt.push_str(
            " Each element additionally has \"method\" (the single best action to \
             perform on it, e.g. click or fill) and \"arguments\" (the ordered list \
             of string arguments that action needs, empty if none).",
        );
    }

    prompt.push_str(" Return {\"elements\": []} if nothing matches.");
    prompt
}

/// Build the user message: instruction plus the combined tree
pub fn build_user_message(instruction: &str, combined_tree: &str) -> String {
    format!(
        "Instruction: {}\n\nAccessibility tree:\n{}",
        instruction.trim(),
        combined_tree
    )
}

/// Extract the element list from the model's JSON payload
///
/// Tolerant of minor shape drift: ids may be strings or numbers, methods and
/// arguments may be absent. Entries without an id are dropped.
pub fn parse_elements(data: &Value) -> Vec<RawElement> {
    let Some(elements) = data.get("elements").and_then(Value::as_array) else {
        return Vec::new();
    };

    elements
        .iter()
        .filter_map(|element| {
            let element_id = match element.get("elementId") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => return None,
            };

            let description = element
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let method = element
                .get("method")
                .and_then(Value::as_str)
                .map(str::to_string);

            let arguments = element
                .get("arguments")
                .and_then(Value::as_array)
                .map(|args| {
                    args.iter()
                        .map(|a| match a {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default();

            Some(RawElement {
                element_id,
                description,
                method,
                arguments,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_prompt_puts_user_instructions_first() {
        let prompt = build_system_prompt(Some("Prefer links over buttons."), true);
        assert!(prompt.starts_with("Prefer links over buttons."));
        assert!(prompt.contains("\"method\""));
    }

    #[test]
    fn test_system_prompt_without_actions_omits_method() {
        let prompt = build_system_prompt(None, false);
        assert!(!prompt.contains("\"method\""));
        assert!(prompt.contains("\"elements\""));
    }

    #[test]
    fn test_user_message_contains_tree() {
        let message = build_user_message("click login", "[0-1] button: Login\n");
        assert!(message.contains("Instruction: click login"));
        assert!(message.contains("[0-1] button: Login"));
    }

    #[test]
    fn test_parse_elements_full_shape() {
        let data = json!({
            "elements": [
                {
                    "elementId": "0-12",
                    "description": "the login button",
                    "method": "click",
                    "arguments": []
                }
            ]
        });

        let elements = parse_elements(&data);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].element_id, "0-12");
        assert_eq!(elements[0].method.as_deref(), Some("click"));
    }

    #[test]
    fn test_parse_elements_tolerates_numeric_ids_and_missing_fields() {
        let data = json!({
            "elements": [
                {"elementId": 42, "description": "a link"},
                {"description": "no id, dropped"},
                {"elementId": "0-7", "arguments": ["text to fill", 3]}
            ]
        });

        let elements = parse_elements(&data);
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].element_id, "42");
        assert_eq!(elements[1].arguments, vec!["text to fill".to_string(), "3".to_string()]);
    }

    #[test]
    fn test_parse_elements_empty_or_malformed_payloads() {
        assert!(parse_elements(&json!({"elements": []})).is_empty());
        assert!(parse_elements(&json!({})).is_empty());
        assert!(parse_elements(&json!({"elements": "not an array"})).is_empty());
    }
}
