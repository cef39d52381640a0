#![no_main]
use fbchunks::{ContainerDecoder, FormatProfile, ProfileSelection};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let selections = [
        ProfileSelection::default(),
        ProfileSelection::Fixed(FormatProfile::WIDE),
        ProfileSelection::Fixed(FormatProfile::NARROW),
    ];

    for selection in selections {
        // Skip checksums so the fuzzer can reach the structured decoders
        let decoder = ContainerDecoder::builder()
            .profile(selection)
            .verify_checksums(false)
            .build();

        match decoder.decode_slice(data) {
            Ok(save) => {
                let _ = save.record().timestamp().to_string();
            }
            Err(err) => {
                let _ = err.to_string();
            }
        }
    }
});
