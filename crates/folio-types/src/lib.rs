/// Errors that can occur when cleaning a caller-supplied file name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// Nothing was left after stripping separators and `.` segments
    #[error("file name cannot be empty")]
    Empty,

    /// The name contained a `..` segment
    #[error("file name must not contain parent directory segments: {0}")]
    ParentSegment(String),

    /// The name still described a nested path after cleaning
    #[error("file name must be a single path segment: {0}")]
    Nested(String),

    /// The name contained NUL or another control character
    #[error("file name contains control characters")]
    ControlCharacter,
}

/// A file name that is safe to join onto a storage root.
///
/// A `FileName` always holds exactly one path segment: no separators, no `.` or `..`, no
/// control characters. The only way to build one is [`FileName::clean`], so any function taking
/// a `FileName` can rely on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileName(String);

impl FileName {
    /// Cleans a raw, caller-supplied name into a single path segment.
    ///
    /// Backslashes are treated as separators. Empty and `.` segments are dropped, which strips
    /// leading and trailing separators (`"/a.pdf"` becomes `"a.pdf"`). Anything that still
    /// describes more than one segment, or contains `..`, is rejected rather than rewritten.
    ///
    /// # Errors
    ///
    /// Returns a [`NameError`] describing the first rule the input broke.
    pub fn clean(raw: impl AsRef<str>) -> Result<Self, NameError> {
        let raw = raw.as_ref();
        let normalised = raw.replace('\\', "/");

        let segments: Vec<&str> = normalised
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect();

        if segments.iter().any(|segment| *segment == "..") {
            return Err(NameError::ParentSegment(raw.to_owned()));
        }

        let segment = match segments.as_slice() {
            [] => return Err(NameError::Empty),
            [single] => *single,
            _ => return Err(NameError::Nested(raw.to_owned())),
        };

        if segment.chars().any(char::is_control) {
            return Err(NameError::ControlCharacter);
        }

        Ok(Self(segment.to_owned()))
    }

    /// Returns the cleaned name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for FileName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::clean(s)
    }
}

impl serde::Serialize for FileName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for FileName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FileName::clean(&s).map_err(serde::de::Error::custom)
    }
}
