use super::*;
use crate::fixtures;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Probe returning a fixed answer and counting how often it was asked.
struct FixedProbe {
    seconds: f64,
    calls: AtomicUsize,
}

impl FixedProbe {
    fn new(seconds: f64) -> Arc<Self> {
        Arc::new(Self {
            seconds,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl MetadataProbe for FixedProbe {
    async fn duration_seconds(&self, _mime_type: &str, _bytes: &[u8]) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.seconds)
    }
}

struct BrokenProbe;

#[async_trait]
impl MetadataProbe for BrokenProbe {
    async fn duration_seconds(&self, _mime_type: &str, _bytes: &[u8]) -> Result<f64> {
        Err(LogError::MediaMetadata("codec not supported".to_string()))
    }
}

fn temp_path(name: &str) -> PathBuf {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir().join(format!("captains_log_media_{suffix}_{name}"))
}

#[tokio::test]
async fn encodes_bytes_into_data_uri_with_declared_mime() {
    let encoder = MediaEncoder::default();
    let blob = MediaBlob::from_bytes(b"hello".to_vec(), Some("text/plain".to_string()));
    let uri = encoder.encode(Some(&blob)).await.expect("encode");
    assert_eq!(uri.as_deref(), Some("data:text/plain;base64,aGVsbG8="));
}

#[tokio::test]
async fn absent_or_empty_blobs_encode_to_none() {
    let encoder = MediaEncoder::default();
    assert_eq!(encoder.encode(None).await.expect("absent"), None);

    let empty = MediaBlob::from_bytes(Vec::new(), Some("image/png".to_string()));
    assert_eq!(encoder.encode(Some(&empty)).await.expect("empty"), None);
}

#[test]
fn mime_type_falls_back_from_declared_to_name_to_octet_stream() {
    let declared = MediaBlob::from_bytes(vec![1], Some("audio/ogg".to_string()));
    assert_eq!(declared.mime_type(), "audio/ogg");

    let named = MediaBlob::named(vec![1], "bridge.png");
    assert_eq!(named.mime_type(), "image/png");

    let blank = MediaBlob::from_bytes(vec![1], Some("  ".to_string()));
    assert_eq!(blank.mime_type(), "application/octet-stream");

    let from_path = MediaBlob::from_path("/tmp/log.wav");
    assert!(from_path.mime_type().starts_with("audio/"));
}

#[tokio::test]
async fn reads_file_backed_blobs() {
    let path = temp_path("clip.wav");
    tokio::fs::write(&path, fixtures::wav(100, 2.0))
        .await
        .expect("write fixture");

    let encoder = MediaEncoder::default();
    let uri = encoder
        .encode(Some(&MediaBlob::from_path(&path)))
        .await
        .expect("encode")
        .expect("non-empty");
    assert!(uri.starts_with("data:audio/"));
    assert_eq!(
        encoder.probe_duration(EntryKind::Audio, Some(&uri)).await,
        Some(2)
    );

    tokio::fs::remove_file(&path).await.expect("cleanup");
}

#[tokio::test]
async fn unreadable_file_is_a_media_read_error() {
    let encoder = MediaEncoder::default();
    let missing = MediaBlob::from_path(temp_path("missing.mp4"));
    let err = encoder.encode(Some(&missing)).await.expect_err("missing file");
    assert!(matches!(err, LogError::MediaRead(_)));
    assert!(err.to_string().contains("missing.mp4"));
}

#[tokio::test]
async fn duration_is_rounded_to_nearest_second() {
    let uri = to_data_uri("audio/wav", b"opaque");
    for (seconds, expected) in [(12.6, 13), (12.4, 12), (12.5, 13), (0.2, 0)] {
        let encoder = MediaEncoder::new(FixedProbe::new(seconds));
        assert_eq!(
            encoder.probe_duration(EntryKind::Video, Some(&uri)).await,
            Some(expected),
            "{seconds}s"
        );
    }
}

#[tokio::test]
async fn indeterminate_durations_resolve_to_none() {
    let uri = to_data_uri("audio/wav", b"opaque");
    for seconds in [f64::NAN, f64::INFINITY, -1.0] {
        let encoder = MediaEncoder::new(FixedProbe::new(seconds));
        assert_eq!(encoder.probe_duration(EntryKind::Audio, Some(&uri)).await, None);
    }

    let encoder = MediaEncoder::new(Arc::new(BrokenProbe));
    assert_eq!(encoder.probe_duration(EntryKind::Audio, Some(&uri)).await, None);
    assert_eq!(
        encoder
            .probe_duration(EntryKind::Audio, Some("not-a-data-uri"))
            .await,
        None
    );
}

#[tokio::test]
async fn non_playable_kinds_never_load_metadata() {
    let probe = FixedProbe::new(9.0);
    let encoder = MediaEncoder::new(probe.clone());
    let uri = to_data_uri("image/png", &fixtures::png(16));

    assert_eq!(encoder.probe_duration(EntryKind::Image, Some(&uri)).await, None);
    assert_eq!(encoder.probe_duration(EntryKind::Text, Some(&uri)).await, None);
    assert_eq!(encoder.probe_duration(EntryKind::Audio, None).await, None);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn parses_data_uris() {
    let (mime, bytes) = parse_data_uri("data:video/mp4;base64,AAEC").expect("parse");
    assert_eq!(mime, "video/mp4");
    assert_eq!(bytes, vec![0, 1, 2]);

    let (mime, _) = parse_data_uri("data:;base64,AA==").expect("parse");
    assert_eq!(mime, "application/octet-stream");

    assert!(parse_data_uri("data:text/plain,hello").is_err());
    assert!(parse_data_uri("data:text/plain;base64,***").is_err());
    assert!(parse_data_uri("https://example.invalid/a.png").is_err());
}

#[tokio::test]
async fn in_memory_assets_are_read_without_copying() {
    let blob = MediaBlob::from_bytes(fixtures::png(64), None);
    let read = blob.read().await.expect("read");
    assert!(matches!(read, Cow::Borrowed(_)));
    assert_eq!(read.len(), 64);
}
