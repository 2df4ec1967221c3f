#![no_main]

use libfuzzer_sys::fuzz_target;
use uasset_rs::{Container, ContainerOptions, VersionTag};

fuzz_target!(|data: &[u8]| {
    // Skip inputs shorter than the smallest header (193 bytes)
    if data.len() < 193 {
        return;
    }

    // First byte picks the split point between metadata and payload
    let split = data.len() - (data[0] as usize).min(data.len() - 193);
    let (metadata, payload) = data.split_at(split);

    for tag in ["ff7r", "5.0"] {
        let options = match VersionTag::parse(tag) {
            Ok(version) => ContainerOptions::default().with_version(version),
            Err(_) => return,
        };

        // Parsing must never panic
        let mut container = match Container::from_bytes(metadata, Some(payload), options) {
            Ok(c) => c,
            Err(_) => continue,
        };

        let _ = container.summary();
        let _ = container.to_json();

        // Whatever parsed must serialize and parse back
        if let Ok((out_metadata, out_payload)) = container.to_bytes() {
            let options = container.options().clone();
            assert!(Container::from_bytes(&out_metadata, Some(&out_payload), options).is_ok());
        }
    }
});
