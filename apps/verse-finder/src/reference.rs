//! Reference formatter: turns a scripture citation into a phrase that reads
//! naturally when spoken in Korean.
//!
//! `"요한복음 3:16"` becomes `"요한복음 3장 16절"`. Citations come from the
//! model with no enforced grammar, so anything that does not look like
//! `chapter:verse` is handed back untouched instead of failing.

const CHAPTER_SUFFIX: &str = "장";
const VERSE_SUFFIX: &str = "절";
const RANGE_JOINER: &str = "에서 ";
const LIST_JOINER: &str = " 그리고 ";

/// Formats a reference such as `"로마서 8:28-30"` for speech synthesis.
///
/// Returns the input unchanged when it has no `chapter:verse` part.
pub fn format_reference_for_speech(reference: &str) -> String {
    if reference.is_empty() {
        return String::new();
    }

    let (book, chapter_verse) = match reference.rfind(' ') {
        Some(idx) => (Some(&reference[..idx]), &reference[idx + 1..]),
        None => (None, reference),
    };

    let Some((chapter, verses)) = chapter_verse.split_once(':') else {
        return reference.to_string();
    };

    let spoken = format!(
        "{}{CHAPTER_SUFFIX} {}",
        chapter.trim(),
        format_verses(verses)
    );

    match book {
        Some(book) => format!("{book} {spoken}"),
        None => spoken,
    }
}

fn format_verses(verses: &str) -> String {
    if verses.contains('-') {
        let parts: Vec<&str> = verses.split('-').collect();
        return match parts.as_slice() {
            [start, end] => format!(
                "{}{VERSE_SUFFIX}{RANGE_JOINER}{}{VERSE_SUFFIX}",
                start.trim(),
                end.trim()
            ),
            _ => format!("{verses}{VERSE_SUFFIX}"),
        };
    }

    if verses.contains(',') {
        return verses
            .split(',')
            .map(|v| format!("{}{VERSE_SUFFIX}", v.trim()))
            .collect::<Vec<_>>()
            .join(LIST_JOINER);
    }

    format!("{}{VERSE_SUFFIX}", verses.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_verse() {
        assert_eq!(
            format_reference_for_speech("요한복음 3:16"),
            "요한복음 3장 16절"
        );
    }

    #[test]
    fn test_verse_range() {
        assert_eq!(
            format_reference_for_speech("로마서 8:28-30"),
            "로마서 8장 28절에서 30절"
        );
    }

    #[test]
    fn test_verse_list() {
        assert_eq!(
            format_reference_for_speech("시편 23:1,2"),
            "시편 23장 1절 그리고 2절"
        );
    }

    #[test]
    fn test_verse_list_trims_each_part() {
        assert_eq!(
            format_reference_for_speech("시편 23:1,2,3"),
            "시편 23장 1절 그리고 2절 그리고 3절"
        );
    }

    #[test]
    fn test_multi_word_book_keeps_everything_before_last_space() {
        assert_eq!(
            format_reference_for_speech("요한 일서 4:7"),
            "요한 일서 4장 7절"
        );
    }

    #[test]
    fn test_no_book_name() {
        assert_eq!(format_reference_for_speech("3:16"), "3장 16절");
        assert_eq!(format_reference_for_speech("8:28-30"), "8장 28절에서 30절");
    }

    #[test]
    fn test_no_colon_returned_verbatim() {
        assert_eq!(format_reference_for_speech("詩篇"), "詩篇");
        assert_eq!(format_reference_for_speech("시편 23편"), "시편 23편");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format_reference_for_speech(""), "");
    }

    #[test]
    fn test_malformed_input_is_stable_across_calls() {
        let once = format_reference_for_speech("詩篇");
        let twice = format_reference_for_speech(&once);
        assert_eq!(once, "詩篇");
        assert_eq!(twice, "詩篇");
    }

    #[test]
    fn test_three_part_range_falls_back_to_raw_suffix() {
        assert_eq!(
            format_reference_for_speech("창세기 1:1-2-3"),
            "창세기 1장 1-2-3절"
        );
    }

    #[test]
    fn test_hyphen_takes_precedence_over_comma() {
        assert_eq!(
            format_reference_for_speech("마태복음 5:3-5,7"),
            "마태복음 5장 3절에서 5,7절"
        );
    }
}
