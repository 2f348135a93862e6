//! EC-Schnorr signatures over secp256k1 with SHA-256.
//!
//! ```text
//! sign:   k ← random, Q = kG, r = H(Q ‖ P ‖ m) mod n, s = k − r·x mod n
//! verify: Q = sG + rP, accept iff H(Q ‖ P ‖ m) mod n == r
//! ```
//! Points are hashed in compressed SEC1 form.

use alloy::primitives::hex;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, NonZeroScalar, ProjectivePoint, PublicKey, Scalar, SecretKey, U256};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::blockchain::types::{DeployError, DeployResult};

/// A 64-byte `r ‖ s` signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchnorrSignature {
    r: Scalar,
    s: Scalar,
}

impl SchnorrSignature {
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r.to_bytes());
        out[32..].copy_from_slice(&self.s.to_bytes());
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(signature_hex: &str) -> DeployResult<Self> {
        let bytes = hex::decode(signature_hex)
            .map_err(|e| DeployError::Signing(format!("signature is not hex: {}", e)))?;
        if bytes.len() != 64 {
            return Err(DeployError::Signing(format!(
                "signature must be 64 bytes, got {}",
                bytes.len()
            )));
        }
        let r = scalar_from_slice(&bytes[..32])?;
        let s = scalar_from_slice(&bytes[32..])?;
        Ok(Self { r, s })
    }
}

fn scalar_from_slice(bytes: &[u8]) -> DeployResult<Scalar> {
    let repr = FieldBytes::clone_from_slice(bytes);
    Option::<Scalar>::from(Scalar::from_repr(repr))
        .ok_or_else(|| DeployError::Signing("signature component out of range".to_string()))
}

fn challenge(q: &ProjectivePoint, public_key: &[u8], message: &[u8]) -> Scalar {
    let mut hasher = Sha256::new();
    hasher.update(q.to_affine().to_encoded_point(true).as_bytes());
    hasher.update(public_key);
    hasher.update(message);
    <Scalar as Reduce<U256>>::reduce_bytes(&hasher.finalize())
}

/// Sign `message` with `secret`.
pub fn sign(secret: &SecretKey, message: &[u8]) -> SchnorrSignature {
    loop {
        let k = NonZeroScalar::random(&mut OsRng);
        if let Some(signature) = sign_with_nonce(secret, message, &k) {
            return signature;
        }
    }
}

/// Sign with a caller-chosen nonce `k`. `None` when `k` yields a zero
/// `r` or `s` and a fresh nonce is needed.
pub(crate) fn sign_with_nonce(
    secret: &SecretKey,
    message: &[u8],
    k: &NonZeroScalar,
) -> Option<SchnorrSignature> {
    let x = *secret.to_nonzero_scalar();
    let public_key = secret.public_key().to_encoded_point(true);

    let q = ProjectivePoint::GENERATOR * **k;
    let r = challenge(&q, public_key.as_bytes(), message);
    if bool::from(r.is_zero()) {
        return None;
    }
    let s = **k - r * x;
    if bool::from(s.is_zero()) {
        return None;
    }
    Some(SchnorrSignature { r, s })
}

/// Verify `signature` over `message` for `public_key`.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &SchnorrSignature) -> bool {
    if bool::from(signature.r.is_zero()) || bool::from(signature.s.is_zero()) {
        return false;
    }
    let q = ProjectivePoint::GENERATOR * signature.s + public_key.to_projective() * signature.r;
    if q == ProjectivePoint::IDENTITY {
        return false;
    }
    let encoded = public_key.to_encoded_point(true);
    challenge(&q, encoded.as_bytes(), message) == signature.r
}
