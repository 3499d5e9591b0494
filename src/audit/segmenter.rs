//! Content segmentation
//!
//! Large documents are split on line boundaries into chunks small enough
//! for one model request.

/// A contiguous run of lines from one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position within the document, starting at 0
    pub index: usize,

    /// The chunk's lines joined with `\n`
    pub text: String,

    /// The document this chunk was cut from (usually its URL)
    pub source: String,
}

impl Chunk {
    /// Number of lines in this chunk
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

/// Splits `document` into chunks of at most `chunk_size` lines
///
/// Lines keep their order, the last chunk may be shorter, and joining every
/// chunk's text with `\n` reproduces `document.lines()`. An empty document
/// yields no chunks. A `chunk_size` of zero is treated as one.
///
/// # Examples
///
/// ```
/// use seo_auditor::audit::segment;
///
/// let chunks = segment("a\nb\nc", "doc", 2);
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[0].text, "a\nb");
/// assert_eq!(chunks[1].text, "c");
/// ```
pub fn segment(document: &str, source: &str, chunk_size: usize) -> Vec<Chunk> {
    let chunk_size = chunk_size.max(1);
    let lines: Vec<&str> = document.lines().collect();

    lines
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, group)| Chunk {
            index,
            text: group.join("\n"),
            source: source.to_string(),
        })
        .collect()
}
