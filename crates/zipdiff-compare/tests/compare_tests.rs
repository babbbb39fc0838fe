//! End-to-end comparison tests over real archives on disk

use std::path::PathBuf;

use zipdiff_compare::{ArchiveDiff, LoadOptions, ReportConfig, Reporter, ZipReader};
use zipdiff_core::{ReferenceSide, ReportCategory};
use zipdiff_parsers::zip::ZipFixture;

struct Pair {
    _dir: tempfile::TempDir,
    a: PathBuf,
    b: PathBuf,
}

fn pair(a: ZipFixture, b: ZipFixture) -> Pair {
    let dir = tempfile::tempdir().unwrap();
    let a_path = dir.path().join("a.zip");
    let b_path = dir.path().join("b.zip");
    a.write_to(&a_path).unwrap();
    b.write_to(&b_path).unwrap();
    Pair { _dir: dir, a: a_path, b: b_path }
}

fn listed(diff: &ArchiveDiff, reference: ReferenceSide, category: ReportCategory) -> Vec<String> {
    let config = ReportConfig::new(reference);
    Reporter::new(diff, &config)
        .entries(category)
        .into_iter()
        .map(|e| e.name)
        .collect()
}

#[test]
fn test_same_and_deleted_from_reference() {
    let p = pair(
        ZipFixture::new().stored("x", b"H1"),
        ZipFixture::new().deflated("x", b"H1").stored("y", b"H2"),
    );
    let diff = ArchiveDiff::compare(&p.a, &p.b, &ZipReader::default());

    assert_eq!(listed(&diff, ReferenceSide::A, ReportCategory::Same), ["x"]);
    assert!(listed(&diff, ReferenceSide::A, ReportCategory::Deleted).is_empty());

    assert_eq!(listed(&diff, ReferenceSide::B, ReportCategory::Same), ["x"]);
    assert_eq!(listed(&diff, ReferenceSide::B, ReportCategory::Deleted), ["y"]);
}

#[test]
fn test_compression_does_not_affect_identity() {
    let data = "0123456789".repeat(100);
    let p = pair(
        ZipFixture::new().stored("payload.bin", data.as_bytes()),
        ZipFixture::new().deflated("payload.bin", data.as_bytes()),
    );
    let diff = ArchiveDiff::compare(&p.a, &p.b, &ZipReader::default());

    assert_eq!(diff.classification().present_count(), 2);
}

#[test]
fn test_bzip2_and_lzma_members_match_stored() {
    use zipdiff_parsers::CompressionMethod;

    let data = b"hello from x.txt\n".repeat(16);
    for method in [CompressionMethod::Bzip2, CompressionMethod::Lzma] {
        let p = pair(
            ZipFixture::new().stored("x.txt", &data),
            ZipFixture::new().member("x.txt", &data, method),
        );
        let diff = ArchiveDiff::compare(&p.a, &p.b, &ZipReader::default());

        assert!(diff.ensure_loaded().is_ok(), "{:?}", method);
        assert_eq!(diff.classification().present_count(), 2, "{:?}", method);
        assert_eq!(listed(&diff, ReferenceSide::A, ReportCategory::Same), ["x.txt"]);
        assert!(listed(&diff, ReferenceSide::A, ReportCategory::Deleted).is_empty());
    }
}

#[test]
fn test_duplicated_content_clique() {
    let p = pair(
        ZipFixture::new().stored("x.txt", b"copy").stored("x.txt", b"copy"),
        ZipFixture::new().stored("x.txt", b"copy"),
    );
    let diff = ArchiveDiff::compare(&p.a, &p.b, &ZipReader::default());

    assert_eq!(diff.graph().len(), 3);
    assert_eq!(diff.classification().present_count(), 3);
}

#[test]
fn test_modified_member_is_deleted() {
    let p = pair(
        ZipFixture::new().stored("config.ini", b"debug=false"),
        ZipFixture::new().stored("config.ini", b"debug=true"),
    );
    let diff = ArchiveDiff::compare(&p.a, &p.b, &ZipReader::default());

    assert_eq!(listed(&diff, ReferenceSide::A, ReportCategory::Deleted), ["config.ini"]);
    assert!(listed(&diff, ReferenceSide::A, ReportCategory::Same).is_empty());
}

#[test]
fn test_directories_follow_load_options() {
    let p = pair(
        ZipFixture::new().directory("assets").stored("assets/a.png", b"png"),
        ZipFixture::new().directory("assets").stored("assets/a.png", b"png"),
    );

    let with_dirs = ArchiveDiff::compare(&p.a, &p.b, &ZipReader::default());
    let files_only = ArchiveDiff::compare(&p.a, &p.b, &ZipReader::new(LoadOptions::default().files_only()));

    assert_eq!(listed(&with_dirs, ReferenceSide::A, ReportCategory::Same), ["assets/", "assets/a.png"]);
    assert_eq!(listed(&files_only, ReferenceSide::A, ReportCategory::Same), ["assets/a.png"]);
}

#[test]
fn test_corrupted_member_fails_whole_archive() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.zip");
    let b = dir.path().join("b.zip");
    ZipFixture::new().stored("x", b"fine").write_to(&a).unwrap();

    // Flip a byte of the stored payload so the CRC check fails
    let mut bytes = ZipFixture::new().stored("ok", b"fine").stored("y", b"payload").finish().unwrap();
    let payload_offset = 30 + 2 + 4 + 30 + 1;
    bytes[payload_offset] ^= 0xff;
    std::fs::write(&b, bytes).unwrap();

    let diff = ArchiveDiff::compare(&a, &b, &ZipReader::default());

    let failed: Vec<_> = diff.failures().map(|i| i.id.as_str()).collect();
    assert_eq!(failed, ["b.zip"]);
    assert_eq!(diff.graph().len(), 1);
}
