//! Persona post-processing of generated replies.

use bluejay_core::Persona;

/// Glyphs appended for emoji density, in order.
pub const PERSONA_EMOJI: [&str; 5] = ["🙂", "😄", "✨", "👍", "🙌"];

/// Rewrite a reply to match a persona.
///
/// Formality 0 contracts `do not`/`cannot`, 2 and above expands
/// `don't`/`can't`, 1 leaves the text alone. Then the first
/// `emoji_density` glyphs of [`PERSONA_EMOJI`] are appended.
///
/// # Examples
///
/// ```
/// use bluejay_bot::apply_persona;
/// use bluejay_core::Persona;
///
/// let persona = Persona { formality: 0, emoji_density: 2, ..Persona::default() };
/// assert_eq!(apply_persona("I do not know", &persona), "I don't know 🙂 😄");
/// ```
pub fn apply_persona(reply: &str, persona: &Persona) -> String {
    if reply.is_empty() {
        return String::new();
    }

    let text = match persona.formality {
        0 => reply.replace("do not", "don't").replace("cannot", "can't"),
        1 => reply.to_string(),
        _ => reply.replace("don't", "do not").replace("can't", "cannot"),
    };

    let density = (persona.emoji_density as usize).min(PERSONA_EMOJI.len());
    if density == 0 {
        return text;
    }
    format!("{} {}", text, PERSONA_EMOJI[..density].join(" "))
        .trim()
        .to_string()
}
