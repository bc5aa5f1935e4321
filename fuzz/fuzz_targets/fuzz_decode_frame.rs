#![no_main]
use libfuzzer_sys::fuzz_target;
use powerpi::channels::ChannelLayout;
use powerpi::sensor::frame::decode_line;
use powerpi::sensor::{Normalizer, Snapshot};

fuzz_target!(|data: &[u8]| {
    // Serial lines are decoded lossily, do the same here
    let line = String::from_utf8_lossy(data);

    // Accepted frames must always build a snapshot of the same width
    if let Ok(frame) = decode_line(&line) {
        let snap = Snapshot::build(&frame, None, &Normalizer::default())
            .expect("accepted frame must normalize");
        assert_eq!(snap.len(), frame.len());
    }

    // Channel configuration parsing never fails
    let layout = ChannelLayout::parse(&line);
    let _ = layout.kind(layout.len());
});
