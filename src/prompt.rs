//! Prompt assembly: (tone, history, latest message) -> one provider-ready
//! string. Pure string composition, no side effects.

use crate::models::chat::{ Role, Tone, Turn };

const TONE_FRIENDLY: &str =
    "Explain like a friendly, supportive peer using simple language and relatable examples.";
const TONE_TUTOR: &str =
    "Explain like a patient tutor. Use clear steps, gentle guidance, and check for understanding.";
const TONE_PROFESSIONAL: &str =
    "Explain in a concise, professional tone suitable for a university or workplace audience, but still clear and approachable.";

pub fn tone_fragment(tone: Tone) -> &'static str {
    match tone {
        Tone::Friendly => TONE_FRIENDLY,
        Tone::Tutor => TONE_TUTOR,
        Tone::Professional => TONE_PROFESSIONAL,
    }
}

/// Renders prior turns as "<Speaker>: <content>" lines in conversation order.
/// An empty history renders as an empty block rather than an error.
pub fn render_history(history: &[Turn]) -> String {
    history
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                Role::User => "User",
                Role::Assistant => "SAGA",
            };
            format!("{}: {}", speaker, turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Concatenates, in fixed order: persona framing, the tone fragment, the
/// style rules, the rendered history, the latest message, and the closing
/// length directive.
pub fn build_prompt(tone: Tone, history: &[Turn], message: &str) -> String {
    format!(
        "\
You are SAGA — a texting-style AI that explains anything in clear, human language.

Tone style:
{tone}

General rules:
- Be warm, encouraging, and conversational.
- Avoid heavy jargon unless you immediately explain it.
- Prefer short paragraphs and bullet points over long walls of text.
- Assume the user is smart, just unfamiliar with the topic.
- Use analogies and real-world examples whenever helpful.
- At the end, you may offer a small follow-up like:
  \"If you want, I can simplify this more or give another example.\"

Conversation so far:
{history}

User's latest message:
{message}

Now answer as SAGA. Keep the reply roughly 4–8 sentences unless the user clearly asked for a long, detailed breakdown.",
        tone = tone_fragment(tone),
        history = render_history(history),
        message = message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tutor_prompt_orders_fragment_history_and_message() {
        let prompt = build_prompt(Tone::Tutor, &[], "What is recursion?");

        let tone_at = prompt.find(TONE_TUTOR).expect("tone fragment missing");
        let history_at = prompt.find("Conversation so far:").expect("history header missing");
        let message_at = prompt.find("What is recursion?").expect("message missing");

        assert!(tone_at < history_at);
        assert!(history_at < message_at);
        // Empty history renders as an empty block between header and blank line.
        assert!(prompt.contains("Conversation so far:\n\n"));
    }

    #[test]
    fn unrecognized_tone_uses_the_friendly_fragment() {
        let prompt = build_prompt(Tone::from_param("sassy"), &[], "hi");
        assert!(prompt.contains(TONE_FRIENDLY));
    }

    #[test]
    fn history_turns_render_with_fixed_speaker_labels() {
        let history = vec![Turn::user("what is big-O?"), Turn::assistant("a growth bound")];
        assert_eq!(
            render_history(&history),
            "User: what is big-O?\nSAGA: a growth bound"
        );
    }

    #[test]
    fn empty_history_renders_empty() {
        assert_eq!(render_history(&[]), "");
    }

    #[test]
    fn history_is_replayed_verbatim_in_order() {
        let history = vec![
            Turn::user("first"),
            Turn::assistant("second"),
            Turn::user("third"),
        ];
        let prompt = build_prompt(Tone::Friendly, &history, "fourth");
        let first = prompt.find("User: first").unwrap();
        let second = prompt.find("SAGA: second").unwrap();
        let third = prompt.find("User: third").unwrap();
        assert!(first < second && second < third);
    }
}
