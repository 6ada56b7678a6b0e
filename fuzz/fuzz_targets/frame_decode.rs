//! Fuzz target for relay frame decoding.
//!
//! Decoding must never panic, and anything that decodes must re-encode to
//! the same bytes. Batch payloads are decoded too when the opcode says so.

#![no_main]

use libfuzzer_sys::fuzz_target;
use shroud_proto::{Frame, Opcode};

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = Frame::decode(data) else {
        return;
    };

    assert_eq!(frame.to_bytes().as_ref(), data);

    if frame.opcode() == Ok(Opcode::Batch) {
        if let Ok(entries) = frame.batch_entries() {
            let rebuilt = Frame::batch(frame.header.metric_id(), frame.header.day_index(), &entries)
                .unwrap();
            assert_eq!(rebuilt, frame);
        }
    }
});
