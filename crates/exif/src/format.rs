use std::path::Path;

/// An image format this tool is willing to organize.
///
/// Detection is by file extension only, matched case-insensitively. Anything
/// not on this list is left exactly where it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Adobe Digital Negative (.dng)
    Dng,
    /// Canon Raw version 2 (.cr2)
    Cr2,
    /// JPEG (.jpg / .jpeg)
    Jpeg,
}
impl Format {
    /// Detect a supported image format from a file extension.
    ///
    /// Returns `None` for unsupported extensions and for files with no
    /// extension at all (dotfiles like `.cr2` count as extensionless).
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref().extension().and_then(|ext| ext.to_str()).and_then(|ext| match ext.to_lowercase().as_str() {
            "dng" => Some(Format::Dng),
            "cr2" => Some(Format::Cr2),
            "jpg" | "jpeg" => Some(Format::Jpeg),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Format;
    use rstest::rstest;

    #[rstest]
    #[case("scan.dng", Some(Format::Dng))]
    #[case("IMG_0042.CR2", Some(Format::Cr2))]
    #[case("holiday.jpg", Some(Format::Jpeg))]
    #[case("holiday.jpeg", Some(Format::Jpeg))]
    #[case("HOLIDAY.JPG", Some(Format::Jpeg))]
    #[case("weird.JpEg", Some(Format::Jpeg))]
    #[case("nested/dir/photo.cr2", Some(Format::Cr2))]
    #[case("notes.txt", None)]
    #[case("archive.jpg.bak", None)]
    #[case("noextension", None)]
    // `.dng` is a dotfile with no extension (like `.bashrc`), and therefore
    // not recognized as an image.
    #[case(".dng", None)]
    fn test_from_path(#[case] test: &str, #[case] expected: Option<Format>) {
        assert_eq!(Format::from_path(test), expected);
    }
}
