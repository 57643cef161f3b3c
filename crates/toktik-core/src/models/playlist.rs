use crate::constants::SEGMENT_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Passed through verbatim.
    Directive,
    /// Replaced by a read capability for `<root>/<content>`.
    SegmentReference,
}

/// One line of a stored playlist, terminator stripped. Content is kept as
/// raw bytes; playlists are not required to be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistLine {
    pub index: usize,
    pub kind: LineKind,
    pub content: Vec<u8>,
}

impl PlaylistLine {
    /// Strips one trailing `\r`, then classifies by the `vid` prefix.
    pub fn classify(index: usize, mut content: Vec<u8>) -> Self {
        if content.last() == Some(&b'\r') {
            content.pop();
        }
        let kind = if content.starts_with(SEGMENT_PREFIX.as_bytes()) {
            LineKind::SegmentReference
        } else {
            LineKind::Directive
        };
        Self {
            index,
            kind,
            content,
        }
    }

    pub fn is_segment_reference(&self) -> bool {
        self.kind == LineKind::SegmentReference
    }

    /// Line content as text, `None` if it is not valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}
