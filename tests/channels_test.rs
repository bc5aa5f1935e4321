use powerpi::channels::{ChannelLayout, QuantityKind, resolve_channel_kind};
use std::fs;

#[test]
fn resolves_declarations_from_file() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), "addchannel 0 1\naddchannel 1 3\naddchannel 2 4\n").unwrap();

    assert_eq!(resolve_channel_kind(Some(tmp.path()), 0), QuantityKind::RealPower);
    assert_eq!(resolve_channel_kind(Some(tmp.path()), 1), QuantityKind::Voltage);
    assert_eq!(resolve_channel_kind(Some(tmp.path()), 2), QuantityKind::Current);
    assert_eq!(resolve_channel_kind(Some(tmp.path()), 3), QuantityKind::Unknown);
}

#[test]
fn no_source_resolves_unknown() {
    assert_eq!(resolve_channel_kind(None, 0), QuantityKind::Unknown);
    assert!(ChannelLayout::load(None).is_empty());
}

#[test]
fn unreadable_source_resolves_unknown() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be read as a text file
    let layout = ChannelLayout::load(Some(dir.path()));
    assert!(layout.is_empty());
    assert_eq!(layout.kind(0), QuantityKind::Unknown);
}

#[test]
fn non_utf8_source_resolves_unknown() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"addchannel 0 1\n\xff\xfe\n").unwrap();
    assert_eq!(resolve_channel_kind(Some(tmp.path()), 0), QuantityKind::Unknown);
}
