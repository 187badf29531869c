//! Word-window chunking for policy text

/// Default chunk window in words
pub const CHUNK_SIZE_WORDS: usize = 512;
/// Default overlap between consecutive windows
pub const CHUNK_OVERLAP_WORDS: usize = 50;

/// Split text into overlapping word windows
///
/// `overlap` must be smaller than `chunk_size` (enforced by config
/// validation); equal or larger values would loop forever.
pub fn chunk_by_words(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < chunk_size);

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_by_words("a small policy clause", 512, 50);
        assert_eq!(chunks, vec!["a small policy clause"]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(chunk_by_words("   \n\t ", 512, 50).is_empty());
    }

    #[test]
    fn test_windows_overlap() {
        let words: Vec<String> = (0..10).map(|i| format!("w{}", i)).collect();
        let text = words.join(" ");
        let chunks = chunk_by_words(&text, 6, 2);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "w0 w1 w2 w3 w4 w5");
        // Second window starts chunk_size - overlap = 4 words in
        assert_eq!(chunks[1], "w4 w5 w6 w7 w8 w9");
    }

    #[test]
    fn test_whitespace_normalized() {
        let chunks = chunk_by_words("spaced \t out\n\nwords", 512, 50);
        assert_eq!(chunks, vec!["spaced out words"]);
    }
}
