/// Splits page text into snippets of at most `chunk_size` characters,
/// breaking on whitespace. Consecutive chunks share up to `chunk_overlap`
/// characters of trailing words.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < words.len() {
            let mut end = start;
            let mut len = 0;
            while end < words.len() {
                let added = words[end].chars().count() + usize::from(end > start);
                // a single oversized word still becomes its own chunk
                if end > start && len + added > self.chunk_size {
                    break;
                }
                len += added;
                end += 1;
            }

            chunks.push(words[start..end].join(" "));
            if end >= words.len() {
                break;
            }

            let mut next = end;
            let mut overlap = 0;
            while next > start + 1 {
                let added = words[next - 1].chars().count() + 1;
                if overlap + added > self.chunk_overlap {
                    break;
                }
                overlap += added;
                next -= 1;
            }
            start = next;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunker = TextChunker::new(5000, 0);
        assert_eq!(chunker.chunk("hello   world"), vec!["hello world"]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        let chunker = TextChunker::new(100, 0);
        assert!(chunker.chunk("  \n\t ").is_empty());
    }

    #[test]
    fn test_chunks_respect_size() {
        let chunker = TextChunker::new(11, 0);
        let chunks = chunker.chunk("aaaa bbbb cccc dddd eeee");
        assert_eq!(chunks, vec!["aaaa bbbb", "cccc dddd", "eeee"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 11));
    }

    #[test]
    fn test_overlap_repeats_trailing_words() {
        let chunker = TextChunker::new(14, 5);
        let chunks = chunker.chunk("aaaa bbbb cccc dddd");
        assert_eq!(chunks, vec!["aaaa bbbb cccc", "cccc dddd"]);
    }

    #[test]
    fn test_oversized_word_still_emitted() {
        let chunker = TextChunker::new(3, 0);
        assert_eq!(chunker.chunk("abcdefgh ij"), vec!["abcdefgh", "ij"]);
    }
}
