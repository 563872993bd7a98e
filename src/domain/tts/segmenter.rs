use pragmatic_segmenter::Segmenter;
use unicode_segmentation::UnicodeSegmentation;

/// Split a unit of text into two or more smaller units.
///
/// Sentence boundaries win: if the text contains at least two sentences they
/// are returned in order. A single-sentence text is instead split at the
/// midpoint of its Unicode word list, each half rejoined with single spaces.
///
/// Empty halves are dropped, so a single-word text yields a one-element
/// result. Callers deciding whether a chunk can still shrink must compare the
/// parts against the input rather than rely on the length alone.
pub fn segment(text: &str) -> Vec<String> {
    let segmenter = Segmenter::new().expect("sentence segmenter init");
    let sentences: Vec<String> = segmenter
        .segment(text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.len() > 1 {
        return sentences;
    }

    let words: Vec<&str> = text.unicode_words().collect();
    let mid = words.len() / 2;

    [&words[..mid], &words[mid..]]
        .iter()
        .map(|half| half.join(" "))
        .filter(|half| !half.is_empty())
        .collect()
}
