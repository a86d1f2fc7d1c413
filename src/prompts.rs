use crate::models::{EventType, Preferences, PromptRequest, StyleTag};
use tracing::warn;

pub const MAX_STYLES: usize = 3;

/// Placeholder the user template carries; the rendered instruction is bound to it.
pub const USER_TEMPLATE: &str = "{input}";
pub const INPUT_KEY: &str = "input";

const SYSTEM_PROMPT: &str = "You are a helpful AI fashion stylist. \
    You have to suggest outfits according to the user inputs. \
    Please suggest according to the culture of the selected country";

const OUTPUT_CONTRACT: &str = r#"Provide the output in **JSON format ONLY** like this:

[
    {
        "outfit_name": "Outfit 1",
        "items": [
            {"category": "Top", "name": "...", "brand": "...", "color": "...", "material": "...", "price": 0},
            {"category": "Bottom", "name": "...", "brand": "...", "color": "...", "material": "...", "price": 0},
            ...
        ],
        "total_price": 0
    },
    ...
]

Do not include any text outside the JSON array."#;

pub fn build_prompt(prefs: &Preferences) -> PromptRequest {
    let mut styles: Vec<StyleTag> = if prefs.styles.is_empty() { vec![StyleTag::Minimal] } else { prefs.styles.clone() };
    if styles.len() > MAX_STYLES {
        warn!("⚠️ {} styles selected, keeping the first {}", styles.len(), MAX_STYLES);
        styles.truncate(MAX_STYLES);
    }
    let events: Vec<EventType> = if prefs.event_types.is_empty() { vec![EventType::Casual] } else { prefs.event_types.clone() };

    let excluded = prefs.excluded_colors();
    let excluded = if excluded.is_empty() { "None".to_string() } else { excluded.join(", ") };

    let user = format!(
        "You are an AI fashion stylist. Suggest **three different outfits** based on the following preferences:\n\n\
        Gender: {gender}\n\
        Country: {country}\n\
        Body Shape: {shape}\n\
        Personal Style: {styles}\n\
        Event Type: {events}\n\
        Budget: ${budget}\n\
        Exclude Colors: {excluded}\n\n\
        {OUTPUT_CONTRACT}\n",
        gender = prefs.gender,
        country = prefs.country,
        shape = prefs.body_shape,
        styles = join_labels(&styles),
        events = join_labels(&events),
        budget = format_budget(prefs.budget),
    );

    PromptRequest {
        system: format!("{SYSTEM_PROMPT} ({}).", prefs.country),
        user,
    }
}

fn join_labels<T: ToString>(tags: &[T]) -> String {
    tags.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

// Negative or non-finite budgets are clamped to zero; whole amounts print without cents.
fn format_budget(budget: f64) -> String {
    let budget = if budget.is_finite() && budget > 0.0 { budget } else { 0.0 };
    if budget.fract() == 0.0 { format!("{budget:.0}") } else { format!("{budget:.2}") }
}
