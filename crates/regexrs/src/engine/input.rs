// Subject text as seen by the VM
// Decoded once per search call; all VM positions are code-point indices.

/// Code-point index -> byte offset: identity for ASCII text, else a precomputed table
/// with `len + 1` entries.
#[derive(Debug, Clone)]
enum ByteMap {
    Ascii,
    Map(Vec<usize>),
}

impl ByteMap {
    #[inline(always)]
    fn get(&self, i: usize) -> usize {
        match self {
            ByteMap::Ascii => i,
            ByteMap::Map(m) => m[i],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Subject<'t> {
    text: &'t str,
    chars: Vec<char>,
    bytes: ByteMap,
}

impl<'t> Subject<'t> {
    pub fn new(text: &'t str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let bytes = if text.is_ascii() {
            ByteMap::Ascii
        } else {
            ByteMap::Map(
                text.char_indices()
                    .map(|(i, _)| i)
                    .chain(std::iter::once(text.len()))
                    .collect(),
            )
        };
        Self { text, chars, bytes }
    }

    #[inline]
    pub fn text(&self) -> &'t str {
        self.text
    }

    #[inline]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Length in code points.
    #[inline]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[inline]
    pub fn byte_offset(&self, i: usize) -> usize {
        self.bytes.get(i)
    }
}
