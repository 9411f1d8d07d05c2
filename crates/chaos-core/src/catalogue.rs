//! Sample payload catalogue and payload synthesis
//!
//! Valid payloads start from a fixed set of sample entities; adversarial
//! payloads drop required fields or are not JSON at all.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};

/// Template entity with every field the service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleEntity {
    pub title: &'static str,
    pub author: &'static str,
    pub published_year: u16,
    pub genre: &'static str,
    pub isbn: &'static str,
}

/// Fixed, ordered sample catalogue
pub const SAMPLE_CATALOGUE: [SampleEntity; 5] = [
    SampleEntity {
        title: "The Rust Programming Language",
        author: "Steve Klabnik",
        published_year: 2018,
        genre: "Programming",
        isbn: "978-1718500440",
    },
    SampleEntity {
        title: "Eloquent JavaScript",
        author: "Marijn Haverbeke",
        published_year: 2018,
        genre: "Programming",
        isbn: "978-1593279509",
    },
    SampleEntity {
        title: "The Hitchhiker's Guide to the Galaxy",
        author: "Douglas Adams",
        published_year: 1979,
        genre: "Science Fiction",
        isbn: "978-0345391803",
    },
    SampleEntity {
        title: "1984",
        author: "George Orwell",
        published_year: 1949,
        genre: "Dystopian",
        isbn: "978-0451524935",
    },
    SampleEntity {
        title: "To Kill a Mockingbird",
        author: "Harper Lee",
        published_year: 1960,
        genre: "Fiction",
        isbn: "978-0061120084",
    },
];

/// Inclusive range of the numeric title suffix on created entities
pub const TITLE_SUFFIX_RANGE: std::ops::RangeInclusive<u16> = 1000..=9999;

/// Title used by the incomplete create payload
pub const INCOMPLETE_TITLE: &str = "Incomplete Book";

/// Body sent by the malformed update
pub const MALFORMED_BODY: &str = "This is not valid JSON";

/// Content type claimed by the malformed update
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Full create payload: a random sample with a random title suffix
pub fn valid_create_payload<R: Rng + ?Sized>(rng: &mut R) -> Value {
    // SAMPLE_CATALOGUE is non-empty
    let sample = SAMPLE_CATALOGUE.choose(rng).unwrap_or(&SAMPLE_CATALOGUE[0]);
    let suffix = rng.gen_range(TITLE_SUFFIX_RANGE);
    json!({
        "title": format!("{} - {}", sample.title, suffix),
        "author": sample.author,
        "published_year": sample.published_year,
        "genre": sample.genre,
        "isbn": sample.isbn,
    })
}

/// Create payload missing the required `author`
#[must_use]
pub fn incomplete_create_payload() -> Value {
    json!({ "title": INCOMPLETE_TITLE })
}

/// Partial update carrying only a new title stamped with `time_of_day`
#[must_use]
pub fn title_update_payload(time_of_day: &str) -> Value {
    json!({ "title": format!("Updated Title - {time_of_day}") })
}

/// Payload sent alongside an unsupported method
#[must_use]
pub fn wrong_method_payload() -> Value {
    json!({ "title": "This won't work" })
}

/// Current local time as `HH:MM:SS`
#[must_use]
pub fn current_time_of_day() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
