//! Header-level duration probing for common audio/video containers.
//!
//! Only the container metadata is inspected; nothing is decoded. Supported layouts:
//! RIFF/WAVE, ISO base media (MP4, M4A, MOV) and Ogg (Vorbis, Opus).

use async_trait::async_trait;
use shared::{LogError, Result};

use crate::media::MetadataProbe;

const OPUS_GRANULE_RATE: f64 = 48_000.0;
const OGG_PAGE_HEADER_LEN: usize = 27;

/// Probe that sniffs the container from the payload's magic bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerProbe;

#[async_trait]
impl MetadataProbe for ContainerProbe {
    async fn duration_seconds(&self, mime_type: &str, bytes: &[u8]) -> Result<f64> {
        match Container::sniff(bytes) {
            Some(Container::Wave) => wave_duration(bytes),
            Some(Container::IsoBmff) => iso_bmff_duration(bytes),
            Some(Container::Ogg) => ogg_duration(bytes),
            None => Err(unreadable(format!(
                "unsupported container for '{mime_type}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Wave,
    IsoBmff,
    Ogg,
}

impl Container {
    fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(&b"WAVE"[..]) {
            return Some(Self::Wave);
        }
        if bytes.starts_with(b"OggS") {
            return Some(Self::Ogg);
        }
        match bytes.get(4..8) {
            Some(b"ftyp" | b"moov" | b"mdat" | b"free" | b"skip" | b"wide") => Some(Self::IsoBmff),
            _ => None,
        }
    }
}

fn unreadable(reason: impl Into<String>) -> LogError {
    LogError::MediaMetadata(reason.into())
}

fn u16_le(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn u32_le(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn u32_be(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn u64_be(bytes: &[u8], at: usize) -> Option<u64> {
    Some(u64::from_be_bytes(bytes.get(at..at + 8)?.try_into().ok()?))
}

fn u64_le(bytes: &[u8], at: usize) -> Option<u64> {
    Some(u64::from_le_bytes(bytes.get(at..at + 8)?.try_into().ok()?))
}

/// `data` chunk length divided by the `fmt ` chunk's byte rate.
fn wave_duration(bytes: &[u8]) -> Result<f64> {
    let mut byte_rate = None;
    let mut data_len = None;
    let mut at = 12;

    while let (Some(id), Some(size)) = (bytes.get(at..at + 4), u32_le(bytes, at + 4)) {
        let body = at + 8;
        match id {
            b"fmt " => {
                let rate = u32_le(bytes, body + 8).ok_or_else(|| unreadable("truncated fmt chunk"))?;
                byte_rate = Some(rate);
            }
            b"data" => {
                let available = bytes.len().saturating_sub(body) as u64;
                // Streamed writers leave the size as 0 or all ones.
                let declared = u64::from(size);
                data_len = Some(if size == 0 || size == u32::MAX {
                    available
                } else {
                    declared
                });
            }
            _ => {}
        }
        if byte_rate.is_some() && data_len.is_some() {
            break;
        }
        // Chunks are word aligned.
        at = body + size as usize + (size as usize & 1);
    }

    match (byte_rate, data_len) {
        (Some(0), _) => Err(unreadable("wave byte rate is zero")),
        (Some(rate), Some(len)) => Ok(len as f64 / f64::from(rate)),
        (None, _) => Err(unreadable("wave file has no fmt chunk")),
        (_, None) => Err(unreadable("wave file has no data chunk")),
    }
}

/// Duration from the movie header (`moov/mvhd`).
fn iso_bmff_duration(bytes: &[u8]) -> Result<f64> {
    let moov = find_box(bytes, b"moov").ok_or_else(|| unreadable("no moov box"))?;
    let mvhd = find_box(moov, b"mvhd").ok_or_else(|| unreadable("no mvhd box"))?;

    let version = *mvhd.first().ok_or_else(|| unreadable("empty mvhd box"))?;
    let (timescale, duration) = match version {
        0 => (
            u32_be(mvhd, 12),
            u32_be(mvhd, 16).filter(|d| *d != u32::MAX).map(u64::from),
        ),
        1 => (u32_be(mvhd, 20), u64_be(mvhd, 24).filter(|d| *d != u64::MAX)),
        other => return Err(unreadable(format!("unknown mvhd version {other}"))),
    };

    match (timescale, duration) {
        (Some(0), _) => Err(unreadable("mvhd timescale is zero")),
        (Some(scale), Some(units)) => Ok(units as f64 / f64::from(scale)),
        _ => Err(unreadable("mvhd duration unknown")),
    }
}

/// Body of the first box of type `kind` among the sibling boxes in `bytes`.
fn find_box<'a>(bytes: &'a [u8], kind: &[u8; 4]) -> Option<&'a [u8]> {
    let mut at = 0usize;
    while at + 8 <= bytes.len() {
        let size = u32_be(bytes, at)?;
        let (header_len, box_len) = match size {
            0 => (8, bytes.len() - at),
            1 => (16, usize::try_from(u64_be(bytes, at + 8)?).ok()?),
            n => (8, n as usize),
        };
        if box_len < header_len {
            return None;
        }
        let end = at.checked_add(box_len)?.min(bytes.len());
        if bytes.get(at + 4..at + 8)? == kind {
            return bytes.get(at + header_len..end);
        }
        at = at.checked_add(box_len)?;
    }
    None
}

struct OggPage<'a> {
    granule: u64,
    serial: u32,
    body: &'a [u8],
}

fn ogg_pages(bytes: &[u8]) -> impl Iterator<Item = OggPage<'_>> {
    let mut at = 0usize;
    std::iter::from_fn(move || {
        if bytes.get(at..at + 4)? != b"OggS" {
            return None;
        }
        let segments = usize::from(*bytes.get(at + 26)?);
        let table = bytes.get(at + OGG_PAGE_HEADER_LEN..at + OGG_PAGE_HEADER_LEN + segments)?;
        let body_len: usize = table.iter().map(|s| usize::from(*s)).sum();
        let body_start = at + OGG_PAGE_HEADER_LEN + segments;
        let page = OggPage {
            granule: u64_le(bytes, at + 6)?,
            serial: u32_le(bytes, at + 14)?,
            body: bytes.get(body_start..(body_start + body_len).min(bytes.len()))?,
        };
        at = body_start + body_len;
        Some(page)
    })
}

/// Last granule position of the first logical stream over its sample rate.
fn ogg_duration(bytes: &[u8]) -> Result<f64> {
    let mut pages = ogg_pages(bytes);
    let first = pages.next().ok_or_else(|| unreadable("no ogg pages"))?;
    let head = first.body;

    let (rate, pre_skip) = if head.starts_with(b"\x01vorbis") {
        let rate = u32_le(head, 12).ok_or_else(|| unreadable("truncated vorbis header"))?;
        (f64::from(rate), 0u64)
    } else if head.starts_with(b"OpusHead") {
        let pre_skip = u16_le(head, 10).ok_or_else(|| unreadable("truncated opus header"))?;
        (OPUS_GRANULE_RATE, u64::from(pre_skip))
    } else {
        return Err(unreadable("unsupported ogg codec"));
    };
    if rate == 0.0 {
        return Err(unreadable("ogg sample rate is zero"));
    }

    let serial = first.serial;
    let last_granule = pages
        .filter(|page| page.serial == serial && page.granule != u64::MAX)
        .map(|page| page.granule)
        .last()
        .ok_or_else(|| unreadable("ogg stream has no audio pages"))?;

    Ok(last_granule.saturating_sub(pre_skip) as f64 / rate)
}

#[cfg(test)]
#[path = "tests/probe_tests.rs"]
mod tests;
