use std::fmt;

use crate::data_uri::EncodedBlob;

/// Reference value the site configuration uses for "no resume provided".
pub const ABSENT_REFERENCE: &str = "#";

/// The overridable resources of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetKind {
    Photo,
    Resume,
}

impl AssetKind {
    pub const ALL: [AssetKind; 2] = [AssetKind::Photo, AssetKind::Resume];

    /// Durable storage key holding the override for this kind.
    pub fn storage_key(&self) -> &'static str {
        match self {
            AssetKind::Photo => "custom_photo",
            AssetKind::Resume => "custom_resume",
        }
    }

    /// MIME filter handed to the file picker.
    pub fn accept(&self) -> &'static str {
        match self {
            AssetKind::Photo => "image/*",
            AssetKind::Resume => "application/pdf",
        }
    }

    /// Extension for handles whose MIME type is not recognised.
    pub fn fallback_extension(&self) -> &'static str {
        match self {
            AssetKind::Photo => "img",
            AssetKind::Resume => "pdf",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Photo => write!(f, "photo"),
            AssetKind::Resume => write!(f, "resume"),
        }
    }
}

/// Current representation of a single asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRecord {
    /// Reference baked into the site configuration.
    Default { reference: String },
    /// The configuration carries the "nothing provided" sentinel.
    Absent,
    /// A user-supplied local file captured as a data URI.
    Override { data: EncodedBlob },
}

impl AssetRecord {
    /// Builds the default record for a configured reference, mapping the
    /// sentinel to [`AssetRecord::Absent`].
    pub fn from_reference(reference: &str) -> Self {
        if reference.is_empty() || reference == ABSENT_REFERENCE {
            AssetRecord::Absent
        } else {
            AssetRecord::Default {
                reference: reference.to_owned(),
            }
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, AssetRecord::Override { .. })
    }
}

/// One record per asset kind, at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetState {
    pub photo: AssetRecord,
    pub resume: AssetRecord,
}

impl AssetState {
    pub fn get(&self, kind: AssetKind) -> &AssetRecord {
        match kind {
            AssetKind::Photo => &self.photo,
            AssetKind::Resume => &self.resume,
        }
    }

    pub(crate) fn replace(&mut self, kind: AssetKind, record: AssetRecord) {
        match kind {
            AssetKind::Photo => self.photo = record,
            AssetKind::Resume => self.resume = record,
        }
    }
}

/// Default references for every kind, taken from the site configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDefaults {
    pub photo: AssetRecord,
    pub resume: AssetRecord,
}

impl AssetDefaults {
    pub fn new(photo: &str, resume: &str) -> Self {
        Self {
            photo: AssetRecord::from_reference(photo),
            resume: AssetRecord::from_reference(resume),
        }
    }

    pub fn get(&self, kind: AssetKind) -> &AssetRecord {
        match kind {
            AssetKind::Photo => &self.photo,
            AssetKind::Resume => &self.resume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_keys_are_distinct() {
        assert_eq!(AssetKind::Photo.storage_key(), "custom_photo");
        assert_eq!(AssetKind::Resume.storage_key(), "custom_resume");
    }

    #[test]
    fn sentinel_reference_is_absent() {
        assert_eq!(AssetRecord::from_reference("#"), AssetRecord::Absent);
        assert_eq!(AssetRecord::from_reference(""), AssetRecord::Absent);
        assert_eq!(
            AssetRecord::from_reference("https://example.org/cv.pdf"),
            AssetRecord::Default {
                reference: "https://example.org/cv.pdf".to_owned()
            }
        );
    }

    #[test]
    fn state_replace_touches_one_kind() {
        let defaults = AssetDefaults::new("https://example.org/me.jpg", "#");
        let mut state = AssetState {
            photo: defaults.photo.clone(),
            resume: defaults.resume.clone(),
        };
        state.replace(
            AssetKind::Resume,
            AssetRecord::Override {
                data: EncodedBlob::from("data:application/pdf;base64,JVBERg=="),
            },
        );
        assert_eq!(state.get(AssetKind::Photo), &defaults.photo);
        assert!(state.get(AssetKind::Resume).is_override());
    }
}
