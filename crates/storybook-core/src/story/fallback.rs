//! Deterministic fallback story.
//!
//! Used whenever the model reply cannot be trusted or obtained. The output
//! depends only on the character description: no randomness, no I/O.

use crate::defaults;
use crate::models::{Page, Story};

/// (reader text, illustration scene) per page, in reading order.
const PAGES: [(&str, &str); 6] = [
    (
        "Good morning! Today feels like a very special day.",
        "happy and energetic, stretching after waking up in a cozy bedroom",
    ),
    (
        "Out the door we go, ready for a big adventure.",
        "walking outside, starting an adventure on a sunny path",
    ),
    (
        "In the meadow, a little rabbit hops over to say hello.",
        "meeting a friendly rabbit in a meadow full of flowers",
    ),
    (
        "Together they play hide-and-seek among the tall sunflowers.",
        "playing hide-and-seek with the rabbit among tall sunflowers",
    ),
    (
        "Tired and happy, they share a snack under a big tree.",
        "resting under a big shady tree, sharing a snack with the rabbit",
    ),
    (
        "The sun sets and it is time to go home. See you tomorrow!",
        "waving goodbye, warm sunset",
    ),
];

const ART_STYLE: &str = "children's picture book illustration, soft watercolor, warm colors";

/// Build the fallback story for a character.
///
/// Blank descriptions use the default character so prompts never start
/// with a dangling comma.
pub fn fallback_story(character_description: &str) -> Story {
    let character = match character_description.trim() {
        "" => defaults::FALLBACK_CHARACTER,
        described => described,
    };

    let pages = PAGES
        .iter()
        .enumerate()
        .map(|(i, (text, scene))| Page {
            page_number: Some(i as u32 + 1),
            text: (*text).to_string(),
            image_prompt: format!("{}, {}, {}", character, scene, ART_STYLE),
        })
        .collect();

    Story {
        title: defaults::FALLBACK_TITLE.to_string(),
        pages,
    }
}
