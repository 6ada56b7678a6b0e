//! Fuzz target for curve point decoding.
//!
//! Arbitrary bytes must either be rejected or decode to a point on the curve
//! whose encoding reproduces the input.

#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use shroud_curve::{CurveCodec, CurveParams};

fuzz_target!(|data: &[u8]| {
    let codec = CurveCodec::new(Arc::new(CurveParams::p256()));

    match codec.decode(data) {
        Ok(point) => {
            assert!(codec.params().contains(point.x(), point.y()));

            let reencoded = if data.len() == codec.params().uncompressed_len() {
                codec.encode_uncompressed(&point).unwrap()
            } else {
                codec.encode(&point).unwrap().into_bytes()
            };
            assert_eq!(reencoded, data);
        },
        Err(err) => assert!(err.is_rejection(), "unexpected error class: {err}"),
    }
});
