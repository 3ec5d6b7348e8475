//! Shared corpus generators for the benches.

#![allow(dead_code)]

use canonical::Document;

const WORDS: [&str; 16] = [
    "night", "city", "river", "ghost", "red", "storm", "garden", "iron", "last", "silent",
    "summer", "kingdom", "blue", "winter", "road", "star",
];

const NAMES: [&str; 12] = [
    "Ada", "Bruno", "Chen", "Dara", "Emil", "Farah", "Goran", "Hana", "Ivo", "Jun", "Kira", "Lev",
];

/// Deterministic movie-like document number `i`.
pub fn sample_document(i: usize) -> Document {
    let title = format!(
        "The {} {} {}",
        WORDS[i % WORDS.len()],
        WORDS[(i / 3) % WORDS.len()],
        i
    );
    Document::new(format!("m-{i}"), title)
        .with_directors(format!("{} {}", NAMES[i % NAMES.len()], NAMES[(i / 7) % NAMES.len()]))
        .with_cast(format!(
            "{} Smith, {} Jones, {} Brown",
            NAMES[(i + 1) % NAMES.len()],
            NAMES[(i + 2) % NAMES.len()],
            NAMES[(i + 3) % NAMES.len()]
        ))
        .with_release_year((1950 + i % 70).to_string())
        .with_duration((80 + i % 90).to_string())
        .with_language(if i % 5 == 0 { "French" } else { "English" })
}

pub fn sample_corpus(count: usize) -> Vec<Document> {
    (0..count).map(sample_document).collect()
}
