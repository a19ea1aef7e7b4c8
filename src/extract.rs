//! Field extraction over review-card snapshots.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::core::types::Review;
use crate::list::ItemHandle;

struct CardSelectors {
    author: Selector,
    date: Selector,
    rating: Selector,
    text: Selector,
    votes: Selector,
}

static CARD_SELECTORS: OnceLock<CardSelectors> = OnceLock::new();

fn card_selectors() -> &'static CardSelectors {
    CARD_SELECTORS.get_or_init(|| CardSelectors {
        author: Selector::parse(".X5PpBb").expect("valid author selector"),
        date: Selector::parse(".bp9Aid").expect("valid date selector"),
        rating: Selector::parse(r#"[aria-label*="Rated"]"#).expect("valid rating selector"),
        text: Selector::parse(".h3YV2d").expect("valid text selector"),
        votes: Selector::parse(".AJTPZc").expect("valid votes selector"),
    })
}

static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();

fn digit_run_re() -> &'static Regex {
    DIGIT_RUN.get_or_init(|| Regex::new(r"\d+").expect("valid digit pattern"))
}

static RATING: OnceLock<Regex> = OnceLock::new();

fn rating_re() -> &'static Regex {
    RATING.get_or_init(|| {
        Regex::new(r"(?i)Rated\s+(\d+(?:\.\d+)?)\s+stars").expect("valid rating pattern")
    })
}

/// Read one review out of a card snapshot.
///
/// Every field is read independently: a missing element or unparsable text
/// degrades that one field to its absent form and never touches the others.
/// Extraction itself cannot fail.
pub fn extract_review(item: &ItemHandle) -> Review {
    let selectors = card_selectors();
    let card = Html::parse_fragment(item.html());

    let rating = card
        .select(&selectors.rating)
        .next()
        .and_then(|el| el.value().attr("aria-label"))
        .and_then(parse_rating);

    Review {
        author: first_text(&card, &selectors.author),
        date: first_text(&card, &selectors.date),
        rating,
        review_text: first_text(&card, &selectors.text),
        helpful_votes: parse_count(&first_text(&card, &selectors.votes)),
    }
}

fn first_text(card: &Html, selector: &Selector) -> String {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// First contiguous digit run after stripping thousands separators:
/// "1,234 people found this review helpful" -> 1234.
fn parse_count(text: &str) -> Option<u64> {
    let cleaned = text.replace(',', "");
    let digits = digit_run_re().find(&cleaned)?;
    digits.as_str().parse().ok()
}

/// Decimal preceding the star marker, truncated: "Rated 4.5 stars" -> 4.
fn parse_rating(aria: &str) -> Option<u8> {
    let captures = rating_re().captures(aria)?;
    let stars: f64 = captures.get(1)?.as_str().parse().ok()?;
    Some(stars as u8)
}
