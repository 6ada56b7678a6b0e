//! Interop tests against the RustCrypto `p256` crate.
//!
//! Peers on the other side of the key exchange are not necessarily built on
//! this crate, so encodings and shared secrets must match an independent
//! P-256 implementation byte for byte.

#![allow(deprecated)] // p256 0.13 exposes generic-array 0.14, whose as_slice is deprecated

use std::sync::Arc;

use p256::{PublicKey, SecretKey, ecdh::diffie_hellman, elliptic_curve::sec1::ToEncodedPoint};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use shroud_curve::{CurveCodec, CurveParams, KeyExchange, PrivateScalar};

fn setup() -> (CurveCodec, KeyExchange) {
    let params = Arc::new(CurveParams::p256());
    (CurveCodec::new(Arc::clone(&params)), KeyExchange::new(params))
}

/// 32 random bytes with the top byte cleared so the scalar is below `n`.
fn scalar_bytes(rng: &mut ChaCha20Rng) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    bytes[0] &= 0x7f;
    bytes[31] |= 1;
    bytes
}

#[test]
fn compressed_encoding_matches_p256() {
    let (codec, kx) = setup();
    let mut rng = ChaCha20Rng::seed_from_u64(0x5eed);

    for _ in 0..16 {
        let bytes = scalar_bytes(&mut rng);
        let theirs = SecretKey::from_slice(&bytes).unwrap().public_key();
        let ours = kx.public_key(&PrivateScalar::from_be_bytes(&bytes)).unwrap();

        let their_encoding = theirs.to_encoded_point(true);
        let our_encoding = codec.encode(&ours).unwrap();
        assert_eq!(
            our_encoding.as_bytes(),
            their_encoding.as_bytes(),
            "compressed encodings differ for scalar {}",
            hex::encode(bytes)
        );
    }
}

#[test]
fn p256_accepts_our_encodings() {
    let (codec, kx) = setup();
    let mut rng = ChaCha20Rng::seed_from_u64(42);

    for _ in 0..8 {
        let pair = kx.generate_key_pair(&mut rng).unwrap();
        let compressed = codec.encode(pair.public()).unwrap();
        let uncompressed = codec.encode_uncompressed(pair.public()).unwrap();

        let from_compressed = PublicKey::from_sec1_bytes(compressed.as_bytes()).unwrap();
        let from_uncompressed = PublicKey::from_sec1_bytes(&uncompressed).unwrap();
        assert_eq!(from_compressed, from_uncompressed);
    }
}

#[test]
fn we_decode_p256_encodings() {
    let (codec, kx) = setup();
    let mut rng = ChaCha20Rng::seed_from_u64(99);

    for _ in 0..8 {
        let bytes = scalar_bytes(&mut rng);
        let theirs = SecretKey::from_slice(&bytes).unwrap().public_key();
        let expected = kx.public_key(&PrivateScalar::from_be_bytes(&bytes)).unwrap();

        let compressed = theirs.to_encoded_point(true);
        let uncompressed = theirs.to_encoded_point(false);
        assert_eq!(codec.decode(compressed.as_bytes()).unwrap(), expected);
        assert_eq!(codec.decode(uncompressed.as_bytes()).unwrap(), expected);
    }
}

#[test]
fn shared_secret_matches_p256_ecdh() {
    let (codec, kx) = setup();
    let mut rng = ChaCha20Rng::seed_from_u64(7);

    for _ in 0..8 {
        let ours = scalar_bytes(&mut rng);
        let peer = SecretKey::from_slice(&scalar_bytes(&mut rng)).unwrap();

        // Peer publishes a compressed point; we decode it at the trust boundary
        let peer_encoding = peer.public_key().to_encoded_point(true);
        let peer_point = codec.decode(peer_encoding.as_bytes()).unwrap();
        let our_secret =
            kx.derive_shared_secret(&peer_point, &PrivateScalar::from_be_bytes(&ours)).unwrap();

        // Peer derives from our public key with p256's ECDH
        let our_public = SecretKey::from_slice(&ours).unwrap().public_key();
        let their_secret = diffie_hellman(peer.to_nonzero_scalar(), our_public.as_affine());

        assert_eq!(our_secret.as_bytes(), their_secret.raw_secret_bytes().as_slice());
    }
}
