// src/services/composer.rs

//! Platform post composition with character budgets.
//!
//! Both platforms share the same text shape:
//!
//! ```text
//! {section} - {title}
//!
//! {description}
//! ```
//!
//! Twitter appends the link as a final line and reserves room for it up
//! front (the platform displays every link at a fixed shortened length).
//! Bluesky carries the link as a styled title segment plus a preview card, so
//! its whole cap is available to the text and only the description is
//! shortened.

use unicode_segmentation::UnicodeSegmentation;

use crate::models::{ComposedPost, Config, Platform, PlatformLimits, Segment};
use crate::services::hashtags::HashtagAnnotator;
use crate::services::rich_text;

const TITLE_SEPARATOR: &str = " - ";
const BODY_SEPARATOR: &str = "\n\n";

/// Builds platform-ready posts from catalog entries.
#[derive(Debug, Clone)]
pub struct PostComposer {
    annotator: HashtagAnnotator,
    ellipsis: String,
    twitter: PlatformLimits,
    bluesky: PlatformLimits,
}

impl PostComposer {
    pub fn new(config: &Config) -> Self {
        Self {
            annotator: HashtagAnnotator::new(config.hashtags.clone()),
            ellipsis: config.post.ellipsis.clone(),
            twitter: config.limits(Platform::Twitter),
            bluesky: config.limits(Platform::Bluesky),
        }
    }

    /// Compose the post for one platform.
    pub fn compose(
        &self,
        platform: Platform,
        section: &str,
        title: &str,
        url: &str,
        description: &str,
    ) -> ComposedPost {
        let description = self.annotator.annotate(description);
        match platform {
            Platform::Twitter => self.compose_twitter(section, title, url, &description),
            Platform::Bluesky => self.compose_bluesky(section, title, url, &description),
        }
    }

    fn compose_twitter(
        &self,
        section: &str,
        title: &str,
        url: &str,
        description: &str,
    ) -> ComposedPost {
        let candidate = format!("{section}{TITLE_SEPARATOR}{title}{BODY_SEPARATOR}{description}");
        let budget = self
            .twitter
            .max_chars
            .saturating_sub(self.twitter.link_reservation);
        let text = fit(&candidate, budget, &self.ellipsis);

        ComposedPost {
            platform: Platform::Twitter,
            body: format!("{text}\n{url}"),
            segments: None,
            preview: None,
            url: url.to_string(),
        }
    }

    fn compose_bluesky(
        &self,
        section: &str,
        title: &str,
        url: &str,
        description: &str,
    ) -> ComposedPost {
        let max = self.bluesky.max_chars;
        let ellipsis_len = char_len(&self.ellipsis);
        let header_len = char_len(section)
            + char_len(TITLE_SEPARATOR)
            + char_len(title)
            + char_len(BODY_SEPARATOR);

        let (section, title, description) = if header_len + ellipsis_len <= max {
            let description = fit(description, max - header_len, &self.ellipsis);
            (section.to_string(), title.to_string(), description)
        } else {
            // Header alone overflows: keep only the ellipsis as description
            // and shorten the header itself. The title keeps at least one
            // grapheme plus the ellipsis so the link segment survives.
            let fixed = char_len(TITLE_SEPARATOR) + char_len(BODY_SEPARATOR) + ellipsis_len;
            let min_title = char_len(title).min(ellipsis_len + 1);
            let section = fit(section, max.saturating_sub(fixed + min_title), &self.ellipsis);
            let title_room = max.saturating_sub(fixed + char_len(&section));
            let title = fit(title, title_room, &self.ellipsis);
            (section, title, self.ellipsis.clone())
        };

        let mut segments = vec![
            Segment::plain(format!("{section}{TITLE_SEPARATOR}")),
            Segment::link(title, url),
            Segment::plain(BODY_SEPARATOR),
        ];
        segments.extend(rich_text::build(&description));
        segments.retain(|segment| !segment.text().is_empty());

        let body = rich_text::render(&segments).text;
        ComposedPost {
            platform: Platform::Bluesky,
            body,
            segments: Some(segments),
            preview: None,
            url: url.to_string(),
        }
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Shorten `text` to at most `room` characters, ending in `ellipsis`.
///
/// Text that already fits is returned unchanged. Without room for any text
/// next to the ellipsis, only the ellipsis (or as much of it as fits) is kept.
fn fit(text: &str, room: usize, ellipsis: &str) -> String {
    if char_len(text) <= room {
        return text.to_string();
    }
    let ellipsis_len = char_len(ellipsis);
    if room <= ellipsis_len {
        return char_prefix(ellipsis, room).to_string();
    }
    format!("{}{}", cut_at_word(text, room - ellipsis_len), ellipsis)
}

/// Take `limit` characters and drop everything from the last space on, so a
/// word cut in half never survives. Without any space, fall back to the last
/// whole grapheme.
fn cut_at_word(text: &str, limit: usize) -> &str {
    let prefix = char_prefix(text, limit);
    match prefix.rfind(' ') {
        Some(index) => &prefix[..index],
        None => grapheme_floor(text, prefix.len()),
    }
}

fn char_prefix(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Longest prefix of `text` that ends on a grapheme boundary within `byte_limit`.
fn grapheme_floor(text: &str, byte_limit: usize) -> &str {
    let end = text
        .grapheme_indices(true)
        .map(|(index, grapheme)| index + grapheme.len())
        .take_while(|end| *end <= byte_limit)
        .last()
        .unwrap_or(0);
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SegmentKind;

    fn composer() -> PostComposer {
        PostComposer::new(&Config::default())
    }

    #[test]
    fn test_twitter_simple_post() {
        let post = composer().compose(
            Platform::Twitter,
            "MicroPython Libraries",
            "MB1013",
            "https://github.com/liamkinne/microbit-mb1013",
            "Module for the MB1013 ultrasonic sensor controlled via UART.",
        );
        assert_eq!(
            post.body,
            "MicroPython Libraries - MB1013\n\n\
             Module for the MB1013 ultrasonic sensor controlled via UART.\n\
             https://github.com/liamkinne/microbit-mb1013"
        );
        assert!(post.segments.is_none());
    }

    #[test]
    fn test_twitter_exact_budget_is_not_truncated() {
        let description = format!("{}.", "d".repeat(229));
        let post = composer().compose(
            Platform::Twitter,
            &"s".repeat(9),
            &"t".repeat(12),
            &"u".repeat(23),
            &description,
        );

        assert_eq!(post.char_len(), 280);
        assert_eq!(
            post.body,
            format!(
                "sssssssss - tttttttttttt\n\n{description}\n{}",
                "u".repeat(23)
            )
        );
    }

    #[test]
    fn test_twitter_one_over_budget_truncates() {
        let description = format!("{} {}", "word ".repeat(45).trim_end(), "x".repeat(25));
        let candidate_len = char_len(&format!("S - T\n\n{description}"));
        assert_eq!(candidate_len, 257);

        let post = composer().compose(Platform::Twitter, "S", "T", "https://x.test/a", &description);
        let text = post.body.strip_suffix("\nhttps://x.test/a").unwrap();

        assert!(text.ends_with("word..."));
        assert!(char_len(text) <= 256);
        assert!(!text.contains('x'));
    }

    #[test]
    fn test_twitter_over_length_cuts_at_word() {
        let post = composer().compose(
            Platform::Twitter,
            &"s".repeat(9),
            &"t".repeat(12),
            &"u".repeat(23),
            &"dd ".repeat(1000),
        );

        assert_eq!(post.char_len(), 277);
        assert_eq!(
            post.body,
            format!(
                "sssssssss - tttttttttttt\n\n{}dd...\n{}",
                "dd ".repeat(74),
                "u".repeat(23)
            )
        );
    }

    #[test]
    fn test_twitter_short_entry_keeps_full_url_line() {
        let description = format!("{}.", "d".repeat(229));
        let post = composer().compose(
            Platform::Twitter,
            "Projects",
            "Widget",
            "http://x.test/a",
            &description,
        );

        assert!(post.char_len() <= 280);
        assert!(post.body.ends_with("\nhttp://x.test/a"));
        assert!(post.body.contains(&description));
    }

    #[test]
    fn test_long_entry_both_platforms() {
        let description = "Radiobit is composed of a dedicated Micropython-based firmware and a set of tools \
                           allowing security researchers to sniff, receive and send data over Nordic's \
                           ShockBurst protocol, Enhanced ShockBurst protocol, Bluetooth Smart Link Layer \
                           and sniff raw 2.4GHz GFSK demodulated data.";
        let composer = composer();
        let section = "Miscellaneous";
        let title = "Radiobit, a BBC Micro:Bit RF firmware";
        let url = "https://github.com/virtualabs/radiobit";

        let tweet = composer.compose(Platform::Twitter, section, title, url, description);
        assert_eq!(
            tweet.body,
            "Miscellaneous - Radiobit, a BBC Micro:Bit RF firmware\n\n\
             Radiobit is composed of a dedicated #MicroPython-based firmware \
             and a set of tools allowing security researchers to sniff, \
             receive and send data over Nordic's ShockBurst protocol, \
             Enhanced...\n\
             https://github.com/virtualabs/radiobit"
        );

        let skeet = composer.compose(Platform::Bluesky, section, title, url, description);
        assert_eq!(
            skeet.body,
            "Miscellaneous - Radiobit, a BBC Micro:Bit RF firmware\n\n\
             Radiobit is composed of a dedicated #MicroPython-based firmware \
             and a set of tools allowing security researchers to sniff, \
             receive and send data over Nordic's ShockBurst protocol, \
             Enhanced ShockBurst protocol, Bluetooth Smart Link Layer and..."
        );
    }

    #[test]
    fn test_bluesky_exact_budget() {
        let description = format!("{}.", "d".repeat(279));
        let post = composer().compose(
            Platform::Bluesky,
            &"s".repeat(7),
            &"t".repeat(8),
            &"u".repeat(100),
            &description,
        );

        assert_eq!(post.char_len(), 300);
        assert_eq!(
            post.body,
            format!("sssssss - tttttttt\n\n{description}")
        );
    }

    #[test]
    fn test_bluesky_over_length_truncates_description() {
        let post = composer().compose(
            Platform::Bluesky,
            &"s".repeat(7),
            &"t".repeat(8),
            &"u".repeat(100),
            &"dd ".repeat(1000),
        );

        assert_eq!(post.char_len(), 298);
        assert_eq!(
            post.body,
            format!("sssssss - tttttttt\n\n{}dd...", "dd ".repeat(91))
        );
    }

    #[test]
    fn test_bluesky_segments() {
        let post = composer().compose(
            Platform::Bluesky,
            "MakeCode Libraries",
            "CCS811",
            "https://github.com/ADataDate/pxt-airQuality",
            "Makecode Package for the CCS811 Air Quality Sensor.",
        );

        assert_eq!(
            post.body,
            "MakeCode Libraries - CCS811\n\n#MakeCode Package for the CCS811 Air Quality Sensor."
        );
        let segments = post.segments.unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::plain("MakeCode Libraries - "),
                Segment::link("CCS811", "https://github.com/ADataDate/pxt-airQuality"),
                Segment::plain("\n\n"),
                Segment::hashtag("#MakeCode"),
                Segment::plain(" Package for the CCS811 Air Quality Sensor."),
            ]
        );
        assert!(segments.iter().all(|s| !s.text().is_empty()));
        assert_eq!(
            segments
                .iter()
                .filter(|s| s.kind() == SegmentKind::Link)
                .count(),
            1
        );
    }

    #[test]
    fn test_bluesky_oversized_header_stays_within_cap() {
        let title = "long ".repeat(80);
        let post = composer().compose(
            Platform::Bluesky,
            "Projects",
            title.trim_end(),
            "https://x.test/a",
            "Short description.",
        );

        assert!(post.char_len() <= 300);
        assert!(post.body.starts_with("Projects - long"));
        assert!(post.body.ends_with("\n\n..."));
    }

    #[test]
    fn test_bluesky_oversized_section_keeps_link() {
        let post = composer().compose(
            Platform::Bluesky,
            &"S".repeat(400),
            "Widget",
            "https://x.test/widget",
            "Desc.",
        );

        assert_eq!(post.char_len(), 300);
        assert!(post.body.ends_with(" - W...\n\n..."));
        let segments = post.segments.unwrap();
        assert!(segments.contains(&Segment::link("W...", "https://x.test/widget")));
    }

    #[test]
    fn test_bluesky_no_room_for_description_text_keeps_ellipsis() {
        let post = composer().compose(
            Platform::Bluesky,
            &"s".repeat(290),
            "tt",
            "https://x.test/a",
            "abcdef ghi",
        );

        assert_eq!(post.char_len(), 300);
        assert!(post.body.ends_with(" - tt\n\n..."));
        assert!(!post.body.contains("abc"));
    }

    #[test]
    fn test_twitter_long_url_is_weighted() {
        let url = format!("https://github.com/{}", "a".repeat(120));
        let post = composer().compose(Platform::Twitter, "Tools", "Entry", &url, &"dd ".repeat(1000));

        assert!(post.char_len() > 280);
        assert!(post.weighted_len() <= 280);
        assert!(post.body.ends_with(&format!("...\n{url}")));
    }

    #[test]
    fn test_budget_never_exceeded() {
        let composer = composer();
        let words = ["a", "bb", "ccc", "micro:bit", "Python", "🏗️", "Raspberry Pi"];
        for len in [0usize, 10, 100, 250, 256, 257, 300, 301, 600] {
            let description: String = words
                .iter()
                .cycle()
                .take(len)
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            let description = if description.is_empty() {
                "x".to_string()
            } else {
                description
            };

            let tweet = composer.compose(Platform::Twitter, "Tools", "Entry", "https://x.test/e", &description);
            assert!(tweet.char_len() <= 280, "tweet too long for {len} words");
            assert!(tweet.body.ends_with("\nhttps://x.test/e"));

            let long_url = format!("https://x.test/{}", "e".repeat(60));
            let tweet = composer.compose(Platform::Twitter, "Tools", "Entry", &long_url, &description);
            assert!(tweet.weighted_len() <= 280, "weighted tweet too long for {len} words");
            assert!(tweet.body.ends_with(&format!("\n{long_url}")));

            let skeet = composer.compose(Platform::Bluesky, "Tools", "Entry", "https://x.test/e", &description);
            assert!(skeet.char_len() <= 300, "skeet too long for {len} words");
        }
    }

    #[test]
    fn test_cut_at_word_without_space_keeps_graphemes() {
        assert_eq!(cut_at_word("abcdef", 3), "abc");
        assert_eq!(cut_at_word("ab cdef", 5), "ab");
        // "e" followed by a combining acute accent is one grapheme
        assert_eq!(cut_at_word("abe\u{301}x", 3), "ab");
    }

    #[test]
    fn test_fit_tiny_room() {
        assert_eq!(fit("abcdef", 2, "..."), "..");
        assert_eq!(fit("abcdef", 3, "..."), "...");
        assert_eq!(fit("abc", 3, "..."), "abc");
        assert_eq!(fit("abcd efgh", 8, "..."), "abcd...");
    }
}
