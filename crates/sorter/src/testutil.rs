//! Shared fixtures for the sorter's own tests.

use crate::progress::{PipelineEvent, ProgressSink};
use std::sync::Mutex;

/// Minimal TIFF whose IFD0 points at an Exif sub-IFD holding
/// `DateTimeOriginal`. The tag belongs in the sub-IFD, not IFD0; the reader
/// namespaces tags by the IFD they sit in and would not match it anywhere
/// else. Raw formats like DNG are TIFF containers, so this doubles as one.
pub(crate) fn tiff_with_capture_date(ascii: &[u8; 19]) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II\x2a\x00\x08\x00\x00\x00"); // little-endian, IFD0 at offset 8
    tiff.extend_from_slice(&1u16.to_le_bytes()); // one IFD0 entry
    tiff.extend_from_slice(&0x8769u16.to_le_bytes()); // Exif IFD pointer
    tiff.extend_from_slice(&4u16.to_le_bytes()); // LONG
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&26u32.to_le_bytes()); // sub-IFD offset: 8 + 2 + 12 + 4
    tiff.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
    tiff.extend_from_slice(&1u16.to_le_bytes()); // one sub-IFD entry
    tiff.extend_from_slice(&0x9003u16.to_le_bytes()); // DateTimeOriginal
    tiff.extend_from_slice(&2u16.to_le_bytes()); // ASCII
    tiff.extend_from_slice(&20u32.to_le_bytes()); // 19 chars + NUL
    tiff.extend_from_slice(&44u32.to_le_bytes()); // value offset: 26 + 2 + 12 + 4
    tiff.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
    tiff.extend_from_slice(ascii);
    tiff.push(0);
    tiff
}

/// Smallest JPEG that the EXIF reader accepts: SOI, one APP1 segment wrapping
/// the TIFF above, then EOI.
pub(crate) fn jpeg_with_capture_date(ascii: &[u8; 19]) -> Vec<u8> {
    let tiff = tiff_with_capture_date(ascii);
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&u16::try_from(tiff.len() + 8).unwrap().to_be_bytes());
    jpeg.extend_from_slice(b"Exif\x00\x00");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// A sink that remembers every event it saw, in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink(Mutex<Vec<PipelineEvent>>);

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<PipelineEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn handle(&self, event: &PipelineEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}
