//! Parsing of workshop cells written as `Workshop Name (Leader Name)`.

/// Workshop name and leader parsed from one cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkshopLabel {
    pub name: String,
    /// Empty when the cell carries no well-formed `(...)` suffix. May hold
    /// several co-leaders joined with `" and "`.
    pub leader: String,
}

impl WorkshopLabel {
    /// Splits a cell on the parenthesised group that closes the string.
    ///
    /// The group is found by walking back from the final `)` to its matching
    /// `(`, so parentheses inside the workshop name survive. Matching is
    /// balanced on purpose rather than splitting at the last `(`: for
    /// `Archery (Robin Hood (Jr))` the leader is `Robin Hood (Jr)`, where a
    /// last-`(` split would leave the name as `Archery (Robin Hood` and the
    /// leader as `Jr)`. Without such a group the whole trimmed text is the
    /// name and the leader is empty.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        match leader_group(trimmed) {
            Some(open) => Self {
                name: trimmed[..open].trim().to_string(),
                leader: trimmed[open + 1..trimmed.len() - 1].trim().to_string(),
            },
            None => Self {
                name: trimmed.to_string(),
                leader: String::new(),
            },
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Byte offset of the `(` matching a trailing `)`.
fn leader_group(text: &str) -> Option<usize> {
    if !text.ends_with(')') {
        return None;
    }

    let mut depth = 0usize;
    for (offset, ch) in text.char_indices().rev() {
        match ch {
            ')' => depth += 1,
            '(' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}
