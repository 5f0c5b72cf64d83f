use crate::error::{ErrorKind, Result};
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// Where a [`CaptureDate`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateSource {
    /// The image carried a well-formed EXIF capture timestamp.
    Embedded,
    /// No usable metadata; the filesystem modification time was used instead.
    Fallback,
}

/// The moment a photo was taken, as best as it can be determined.
///
/// Timestamps are naive on purpose. EXIF datetime strings carry no zone
/// information, and mixing them with zone-aware fallback values would make
/// two photos from the same afternoon sort into different months.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureDate {
    /// The capture timestamp (fallback values are UTC-derived).
    pub taken: PrimitiveDateTime,
    /// Whether the timestamp was embedded in the image or derived from the file.
    pub source: DateSource,
}

/// Resolves the capture date for the image at `path`.
///
/// The embedded EXIF timestamp wins when one can be read; the tag ladder is
/// `DateTimeOriginal`, then `DateTimeDigitized`, then plain `DateTime`, since
/// cameras and editing software disagree about which one they fill in.
/// *Every* metadata problem — unreadable file, no EXIF segment, missing tags,
/// garbage values — silently falls back to the file's modification time.
///
/// # Errors
/// Only a real I/O failure is an error: the file vanished, or its metadata
/// cannot be read at all. Returns [`ErrorKind::NotFound`],
/// [`ErrorKind::PermissionDenied`] or [`ErrorKind::Io`] accordingly.
pub fn resolve(path: impl AsRef<Path>) -> Result<CaptureDate> {
    let path = path.as_ref();
    if let Some(taken) = embedded_datetime(path) {
        return Ok(CaptureDate { taken, source: DateSource::Embedded });
    }
    tracing::debug!(path = %path.display(), "no usable capture metadata; using file modification time");
    let metadata = std::fs::metadata(path).map_err(|e| map_io_error(e, path))?;
    let modified = metadata.modified().map_err(ErrorKind::Io)?;
    Ok(CaptureDate { taken: naive(modified.into()), source: DateSource::Fallback })
}

/// Strip the offset; see [`CaptureDate`] for why timestamps stay naive.
fn naive(datetime: OffsetDateTime) -> PrimitiveDateTime {
    PrimitiveDateTime::new(datetime.date(), datetime.time())
}

/// Reads the EXIF capture timestamp, or `None` for any reason at all.
fn embedded_datetime(path: &Path) -> Option<PrimitiveDateTime> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let parsed = Reader::new().read_from_container(&mut reader).ok()?;
    let field = parsed
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .or_else(|| parsed.get_field(Tag::DateTimeDigitized, In::PRIMARY))
        .or_else(|| parsed.get_field(Tag::DateTime, In::PRIMARY))?;
    let Value::Ascii(ref lines) = field.value else {
        return None;
    };
    let datetime = exif::DateTime::from_ascii(lines.first()?).ok()?;
    from_exif_datetime(&datetime)
}

/// Converts a parsed EXIF datetime into a calendar-validated timestamp.
///
/// EXIF files in the wild contain months like `13` and hours like `25`;
/// out-of-range components disqualify the whole value.
fn from_exif_datetime(datetime: &exif::DateTime) -> Option<PrimitiveDateTime> {
    let month = Month::try_from(datetime.month).ok()?;
    let date = Date::from_calendar_date(i32::from(datetime.year), month, datetime.day).ok()?;
    let time = Time::from_hms(datetime.hour, datetime.minute, datetime.second).ok()?;
    Some(PrimitiveDateTime::new(date, time))
}

fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
    match e.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
        _ => ErrorKind::Io(e),
    }
}
