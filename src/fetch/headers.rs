//! Randomized browser-like request headers.
//!
//! Each proxied attempt presents a different User-Agent so consecutive
//! requests do not share a fingerprint.

use rand::Rng;
use rand::seq::IndexedRandom;

const BROWSERS: &[&str] = &["Mozilla", "Chrome", "Opera", "Safari", "Edge"];

const OPERATING_SYSTEMS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Linux x86_64",
    "Macintosh; Intel Mac OS X 10_15_7",
];

/// A bogus but plausible User-Agent string.
pub fn user_agent<R: Rng + ?Sized>(rng: &mut R) -> String {
    let browser = BROWSERS.choose(rng).copied().unwrap_or("Mozilla");
    let os = OPERATING_SYSTEMS.choose(rng).copied().unwrap_or("Linux x86_64");
    let version: u32 = rng.random_range(60..=99);
    format!(
        "{browser}/{version}.0 ({os}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{version}.0 Safari/537.36"
    )
}

/// Full header set for one attempt.
pub fn randomized<R: Rng + ?Sized>(rng: &mut R) -> Vec<(String, String)> {
    vec![
        ("User-Agent".to_string(), user_agent(rng)),
        (
            "Accept".to_string(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string(),
        ),
        ("Accept-Language".to_string(), "en-US,en;q=0.5".to_string()),
        ("Accept-Encoding".to_string(), "gzip, deflate, br".to_string()),
        ("Referer".to_string(), "https://www.google.com/".to_string()),
        ("Connection".to_string(), "keep-alive".to_string()),
    ]
}
