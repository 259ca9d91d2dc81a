// orchestrator/src/prompts.rs

use gate_core::{ChatMessage, MemoryDecision};
use serde_json::Value;

/// How many of the latest turns go into the prompt.
pub const PROMPT_HISTORY_TURNS: usize = 3;
/// Per-turn content cut, in chars.
pub const PROMPT_TURN_CHARS: usize = 100;

pub fn get_memory_decision_messages(
    user_message: &str,
    recent_messages: &[ChatMessage],
    rule_hint: &MemoryDecision,
) -> Vec<Value> {
    let system_prompt = format!(
r#"You are a memory router for a conversational assistant. Your only job is to decide whether answering the user's current message requires retrieving long-term memory about past conversations.

**USE MEMORY when the message:**
- refers to something said or done in a previous conversation ("remember", "last time", "you told me");
- depends on personal facts about the user (their projects, preferences, family, plans);
- continues a long-running topic that is not fully visible in the recent turns.

**SKIP MEMORY when the message:**
- is a greeting, thanks, acknowledgement or farewell;
- is a self-contained request (general knowledge, translation, calculation, creative writing);
- can be answered completely from the recent turns shown below.

**Rule-based hint (for context, may be wrong):**
{}

**Your Output MUST be a valid JSON object and nothing else:**
```json
{{
  "needs_memory": true,
  "confidence": 0.0,
  "reasoning": "one short sentence"
}}
```"#,
        rule_hint.reasoning
    );

    let start = recent_messages.len().saturating_sub(PROMPT_HISTORY_TURNS);
    let history: Vec<String> = recent_messages[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content.chars().take(PROMPT_TURN_CHARS).collect::<String>()))
        .collect();

    let history_context = if history.is_empty() {
        "No conversation history.".to_string()
    } else {
        history.join("\n")
    };

    let user_prompt = format!(
        "<Context>\n{}\n</Context>\n<user_input>{}</user_input>\n\nRespond with the JSON object {{\"needs_memory\", \"confidence\", \"reasoning\"}} only.",
        history_context, user_message
    );

    vec![
        serde_json::json!({"role": "system", "content": system_prompt}),
        serde_json::json!({"role": "user", "content": user_prompt}),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hint() -> MemoryDecision {
        MemoryDecision {
            needs_memory: true,
            confidence: 0.6,
            triggers: vec!["implicit_resume".to_string()],
            reasoning: "Memory triggers: implicit_resume".to_string(),
        }
    }

    #[test]
    fn builds_system_and_user_parts() {
        let messages = get_memory_decision_messages("continue please", &[], &hint());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");

        let system = messages[0]["content"].as_str().unwrap();
        assert!(system.contains("Memory triggers: implicit_resume"));
        assert!(system.contains("\"needs_memory\""));

        let user = messages[1]["content"].as_str().unwrap();
        assert!(user.contains("No conversation history."));
        assert!(user.contains("<user_input>continue please</user_input>"));
    }

    #[test]
    fn keeps_only_last_three_turns_trimmed() {
        let history = vec![
            ChatMessage::user("oldest turn"),
            ChatMessage::assistant("a".repeat(150)),
            ChatMessage::user("second to last"),
            ChatMessage::assistant("last"),
        ];
        let messages = get_memory_decision_messages("and now?", &history, &hint());
        let user = messages[1]["content"].as_str().unwrap();

        assert!(!user.contains("oldest turn"));
        assert!(user.contains(&format!("assistant: {}\n", "a".repeat(100))));
        assert!(!user.contains(&"a".repeat(101)));
        assert!(user.contains("user: second to last"));
        assert!(user.contains("assistant: last"));
    }
}
