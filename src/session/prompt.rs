//! Prompt assembly for chat exchanges.

use super::models::ChatMessage;

/// Render a transcript as `Role: content` blocks separated by blank lines.
pub fn format_message_history(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|message| format!("{}: {}", message.role.label(), message.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the prompt for a new chat message.
///
/// With no prior history the message passes through untouched; otherwise the
/// transcript is rendered ahead of the new question so the agent can use the
/// conversation as context.
pub fn build_chat_prompt(history: &[ChatMessage], new_message: &str) -> String {
    if history.is_empty() {
        return new_message.to_string();
    }

    let history_text = format_message_history(history);
    format!(
        "Previous conversation:\n{history_text}\n\nUser's new question: {new_message}\n\n\
         Please respond to the user's new question, using the previous conversation context if relevant."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_passes_message_through() {
        assert_eq!(build_chat_prompt(&[], "hi"), "hi");
    }

    #[test]
    fn history_renders_capitalized_roles() {
        let history = vec![ChatMessage::user("a"), ChatMessage::assistant("b")];
        assert_eq!(format_message_history(&history), "User: a\n\nAssistant: b");
    }

    #[test]
    fn prompt_places_history_before_new_question() {
        let history = vec![ChatMessage::user("a"), ChatMessage::assistant("b")];
        let prompt = build_chat_prompt(&history, "c");

        assert!(prompt.contains("User: a"));
        assert!(prompt.contains("Assistant: b"));
        assert!(prompt.contains("User's new question: c"));
        assert!(prompt.find("Assistant: b").unwrap() < prompt.find("User's new question").unwrap());
        assert!(prompt.starts_with("Previous conversation:"));
    }

    #[test]
    fn prompt_embeds_new_message_verbatim() {
        let history = vec![ChatMessage::user("earlier")];
        let message = "what does `fn main()` do?\nand why?";
        assert!(build_chat_prompt(&history, message).contains(message));
    }
}
