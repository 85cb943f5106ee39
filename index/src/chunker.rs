/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;
/// Default overlap between consecutive chunks, in characters.
pub const DEFAULT_OVERLAP: usize = 100;

/// Splits `text` into chunks of roughly `chunk_size` characters on word
/// boundaries, with consecutive chunks sharing roughly `overlap` trailing
/// characters. Whitespace runs are collapsed. Empty input yields no chunks.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < chunk_size, "overlap must be smaller than chunk size");

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let mut end = start;
        let mut len = 0;
        while end < words.len() {
            let add = words[end].len() + usize::from(len > 0);
            // A single word longer than chunk_size still gets its own chunk.
            if len + add > chunk_size && len > 0 {
                break;
            }
            len += add;
            end += 1;
        }

        chunks.push(words[start..end].join(" "));
        if end >= words.len() {
            break;
        }

        // Walk back from the end of this chunk until we have carried roughly
        // `overlap` characters into the next one, always making progress.
        let mut next = end;
        let mut carried = 0;
        while next > start + 1 && carried < overlap {
            next -= 1;
            carried += words[next].len() + 1;
        }
        start = next;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 500, 100).is_empty());
        assert!(chunk_text("   \n\t ", 500, 100).is_empty());
    }

    #[test]
    fn short_input_is_a_single_chunk() {
        let chunks = chunk_text("a short document", 500, 100);
        assert_eq!(chunks, vec!["a short document".to_string()]);
    }

    #[test]
    fn chunks_respect_size_and_overlap() {
        let text = (0..200)
            .map(|i| format!("word{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = chunk_text(&text, 100, 20);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 100, "chunk too long: {}", chunk.len());
        }

        // Consecutive chunks share their boundary words.
        for pair in chunks.windows(2) {
            let tail: Vec<&str> = pair[0].split_whitespace().rev().take(2).collect();
            for word in tail {
                assert!(pair[1].contains(word), "missing overlap word {}", word);
            }
        }
    }

    #[test]
    fn every_word_appears_in_some_chunk() {
        let text = (0..50)
            .map(|i| format!("tok{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = chunk_text(&text, 60, 15);
        let joined = chunks.join(" ");
        for i in 0..50 {
            assert!(joined.contains(&format!("tok{}", i)));
        }
    }

    #[test]
    fn oversized_word_still_chunks() {
        let long_word = "x".repeat(50);
        let chunks = chunk_text(&long_word, 10, 2);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], long_word);
    }
}
