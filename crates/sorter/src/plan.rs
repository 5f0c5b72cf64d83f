//! Destination Planning
//!
//! Converts a capture date into the `YYYY/MM/` shelf a photo belongs on, and
//! optionally renames the file so its timestamp is visible at a glance.
//! Planning is pure; nothing here touches the filesystem.
//!
//! # Example
//!
//! ```
//! use shoebox_sorter::{RenamePolicy, plan};
//! use std::path::Path;
//! use time::{Date, Month, PrimitiveDateTime, Time};
//!
//! let taken = PrimitiveDateTime::new(
//!     Date::from_calendar_date(2024, Month::June, 15).unwrap(),
//!     Time::from_hms(10, 30, 0).unwrap(),
//! );
//! let planned = plan(Path::new("/photos"), Path::new("/photos/dump/IMG_0042.CR2"), taken, RenamePolicy::Keep);
//! assert_eq!(planned.dest, Path::new("/photos/2024/06/IMG_0042.CR2"));
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use time::PrimitiveDateTime;

/// What to call the file once it lands on its shelf.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenamePolicy {
    /// Keep the camera's original filename.
    #[default]
    Keep,
    /// Prefix the filename with the capture timestamp,
    /// e.g. `2024-06-15-103000_IMG_0042.CR2`.
    Timestamped,
}

/// A single planned copy-then-remove, decided but not yet executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Plan where `source` should live under `root`, given its capture date.
///
/// Total: every input produces a plan. Whether that plan is worth executing
/// (the file may already be exactly where it belongs) is the caller's call.
// TODO: two photos taken within the same second collide under
//       RenamePolicy::Timestamped when their stems also match. Needs a
//       dedupe suffix before burst shots from two bodies share a shelf.
pub fn plan(root: &Path, source: &Path, taken: PrimitiveDateTime, policy: RenamePolicy) -> PlannedMove {
    let shelf = root
        .join(format!("{:04}", taken.year()))
        .join(format!("{:02}", u8::from(taken.month())));
    let name = match policy {
        RenamePolicy::Keep => source.file_name().map(OsString::from).unwrap_or_default(),
        RenamePolicy::Timestamped => {
            let mut name = OsString::from(format!(
                "{:04}-{:02}-{:02}-{:02}{:02}{:02}_",
                taken.year(),
                u8::from(taken.month()),
                taken.day(),
                taken.hour(),
                taken.minute(),
                taken.second(),
            ));
            name.push(source.file_stem().unwrap_or_default());
            if let Some(ext) = source.extension() {
                name.push(".");
                name.push(ext);
            }
            name
        },
    };
    PlannedMove { source: source.to_path_buf(), dest: shelf.join(name) }
}
