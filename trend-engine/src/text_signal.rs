//! Reaction-title detection.
//!
//! Reaction videos legitimately ride trending waves, so a reaction-looking
//! title is allowed to override category and keyword blocks in the filter.
//! The detector accumulates an integer score over several textual signals
//! and fires at a fixed threshold.

const REACTION_SCORE_THRESHOLD: u32 = 2;

/// Phrase hits are the strongest signal and score double.
const REACTION_PHRASES: [&str; 24] = [
    "reaction",
    "reacts to",
    "reacting to",
    "first time watching",
    "first time hearing",
    "first time listening",
    "this broke me",
    "let's talk about",
    "lets talk about",
    "i was not ready",
    "try not to",
    "watch with me",
    "live reaction",
    "blind reaction",
    "my honest thoughts",
    "breakdown of",
    "i can't believe",
    "cant believe",
    "made me cry",
    "gave me chills",
    "lost my mind",
    "left me speechless",
    "you need to see",
    "we need to talk",
];

const EMOTION_MARKERS: [&str; 8] = [
    "??", "!!", "what", "crazy", "insane", "shocked", "unexpected", "wild",
];

/// Returns true when the title reads like a reaction/emotional-framing
/// video. Pure and deterministic; ASCII case rules only, so titles in
/// non-cased scripts never trigger the emphasis signal.
pub fn looks_like_reaction(title: &str) -> bool {
    reaction_score(title) >= REACTION_SCORE_THRESHOLD
}

fn reaction_score(title: &str) -> u32 {
    let lowered = title.to_lowercase();
    let mut score = 0;

    if REACTION_PHRASES.iter().any(|p| lowered.contains(p)) {
        score += 2;
    }
    if EMOTION_MARKERS.iter().any(|m| lowered.contains(m)) {
        score += 1;
    }
    // Emphasis check runs on the original-case title.
    if title.split_whitespace().any(is_emphasis_token) {
        score += 1;
    }
    let bangs = title.matches('!').count();
    let questions = title.matches('?').count();
    if bangs >= 2 || questions >= 2 {
        score += 1;
    }

    score
}

fn is_emphasis_token(token: &str) -> bool {
    token.len() > 3 && token.chars().all(|c| c.is_ascii_uppercase())
}
