// Structured field tag parsing
//
// Field tags follow the `name,flag,flag` convention used by serialization
// tags: the first token is the exposed name, the remaining tokens are flags.

use bitflags::bitflags;

/// Flag token marking a field as optional.
pub const OMIT_EMPTY: &str = "omitempty";

/// Flag token marking a field for flattening into its parent record.
pub const INLINE: &str = "inline";

bitflags! {
    /// Flags carried by a structured tag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TagFlags: u8 {
        /// The field may be absent (`omitempty`).
        const OPTIONAL = 0b01;
        /// The field's own fields are spliced into the parent (`inline`).
        const INLINE = 0b10;
    }
}

impl Default for TagFlags {
    fn default() -> Self {
        TagFlags::empty()
    }
}

/// A parsed field tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuredTag {
    /// Exposed field name, empty when the tag only carries flags.
    pub name: String,
    /// Flags found after the name.
    pub flags: TagFlags,
}

impl StructuredTag {
    /// Returns true if the tag carries `omitempty`.
    pub fn is_optional(&self) -> bool {
        self.flags.contains(TagFlags::OPTIONAL)
    }

    /// Returns true if the tag carries `inline`.
    pub fn is_inline(&self) -> bool {
        self.flags.contains(TagFlags::INLINE)
    }
}

/// Parses a tag string such as `"field_name,omitempty,inline"`.
///
/// Never fails: unknown flag tokens are ignored and an empty tag yields an
/// empty name with no flags.
pub fn parse_tag(tag: &str) -> StructuredTag {
    let mut tokens = tag.split(',');
    let name = tokens.next().unwrap_or_default().trim().to_string();

    let mut flags = TagFlags::empty();
    for token in tokens {
        match token.trim() {
            OMIT_EMPTY => flags |= TagFlags::OPTIONAL,
            INLINE => flags |= TagFlags::INLINE,
            _ => {}
        }
    }

    StructuredTag { name, flags }
}

/// Returns the tag's name and whether it is marked `omitempty`.
pub fn get_name_and_omit(tag: &str) -> (String, bool) {
    let parsed = parse_tag(tag);
    let optional = parsed.is_optional();
    (parsed.name, optional)
}
