// Copyright 2025 Horizen Labs, Inc.
// SPDX-License-Identifier: Apache-2.0 or MIT

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// 	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    constants::{FIELD_ELEMENT_SIZE, GROUP_ELEMENT_SIZE},
    errors::{FieldError, GroupError},
    types::{Fq, Fq2, Fr, G1, G2, U256},
};
use ark_ec::AffineRepr;
use ark_ff::{AdditiveGroup, PrimeField};

pub(crate) trait IntoU256 {
    fn into_u256(self) -> U256;
}

impl IntoU256 for &[u8; 32] {
    fn into_u256(self) -> U256 {
        let mut rchunks_iter = self.rchunks_exact(8);
        let limbs: [_; 4] = core::array::from_fn(|_| {
            u64::from_be_bytes(rchunks_iter.next().unwrap().try_into().unwrap())
        });
        debug_assert!(rchunks_iter.remainder().is_empty());

        U256::new(limbs)
    }
}

impl IntoU256 for [u8; 32] {
    fn into_u256(self) -> U256 {
        (&self).into_u256()
    }
}

/// Trait for returning a big-endian representation of some object as a `[u8; 32]`.
pub(crate) trait IntoBEBytes32 {
    fn into_be_bytes32(self) -> [u8; 32];
}

impl IntoBEBytes32 for U256 {
    fn into_be_bytes32(self) -> [u8; 32] {
        let mut rev_iter_be = self.0.iter().rev().flat_map(|limb| limb.to_be_bytes());
        core::array::from_fn(|_| rev_iter_be.next().unwrap())
    }
}

impl IntoBEBytes32 for Fr {
    fn into_be_bytes32(self) -> [u8; 32] {
        self.into_bigint().into_be_bytes32()
    }
}

impl IntoBEBytes32 for Fq {
    fn into_be_bytes32(self) -> [u8; 32] {
        self.into_bigint().into_be_bytes32()
    }
}

impl IntoBEBytes32 for u64 {
    fn into_be_bytes32(self) -> [u8; 32] {
        let be = self.to_be_bytes();
        let mut arr = [0u8; 32];
        arr[24..].copy_from_slice(&be);
        arr
    }
}

pub(crate) fn read_u256(bytes: &[u8]) -> Result<U256, FieldError> {
    <&[u8; 32]>::try_from(bytes)
        .map_err(|_| FieldError::InvalidSliceLength {
            actual_length: bytes.len(),
            expected_length: 32,
        })
        .map(IntoU256::into_u256)
}

/// Parse a scalar field element, rejecting any value not strictly below `r`.
///
/// Values from an external buffer are never reduced: an out-of-range word is
/// a rejection, not a wrap-around.
pub(crate) fn read_fr(data: &[u8]) -> Result<Fr, FieldError> {
    if data.len() < FIELD_ELEMENT_SIZE {
        return Err(FieldError::InvalidSliceLength {
            actual_length: data.len(),
            expected_length: FIELD_ELEMENT_SIZE,
        });
    }

    Fr::from_bigint(read_u256(&data[..FIELD_ELEMENT_SIZE])?).ok_or(FieldError::NotMember)
}

// Parse a base field element, without reduction.
fn read_fq(data: &[u8]) -> Result<Fq, GroupError> {
    let value = read_u256(data).map_err(|_| GroupError::InvalidSliceLength {
        actual_length: data.len(),
        expected_length: 32,
    })?;
    Fq::from_bigint(value).ok_or(GroupError::CoordinateNotMember)
}

// Parse point in G1.
pub(crate) fn read_g1(data: &[u8]) -> Result<G1, GroupError> {
    if data.len() < GROUP_ELEMENT_SIZE {
        return Err(GroupError::InvalidSliceLength {
            actual_length: data.len(),
            expected_length: GROUP_ELEMENT_SIZE,
        });
    }

    let x = read_fq(&data[0..32])?;
    let y = read_fq(&data[32..64])?;

    // If (0, 0) is given, we interpret this as the point at infinity:
    // https://docs.rs/ark-ec/0.5.0/src/ark_ec/models/short_weierstrass/affine.rs.html#212-218
    if x == Fq::ZERO && y == Fq::ZERO {
        return Ok(G1::zero());
    }

    let point = G1::new_unchecked(x, y);

    if !point.is_on_curve() {
        return Err(GroupError::NotOnCurve);
    }
    // This is always true for G1 with the BN254 curve.
    debug_assert!(point.is_in_correct_subgroup_assuming_on_curve());

    Ok(point)
}

// Parse point in G2.
pub(crate) fn read_g2(data: &[u8]) -> Result<G2, GroupError> {
    if data.len() != 2 * GROUP_ELEMENT_SIZE {
        return Err(GroupError::InvalidSliceLength {
            actual_length: data.len(),
            expected_length: 2 * GROUP_ELEMENT_SIZE,
        });
    }

    // Read in reverse order (i.e., imaginary part before real part) to match
    // the EIP-197 encoding used by the SRS artifacts:
    // https://eips.ethereum.org/EIPS/eip-197#encoding
    let x_c1 = read_fq(&data[0..32])?;
    let x_c0 = read_fq(&data[32..64])?;
    let y_c1 = read_fq(&data[64..96])?;
    let y_c0 = read_fq(&data[96..128])?;

    let x = Fq2::new(x_c0, x_c1);
    let y = Fq2::new(y_c0, y_c1);

    let point = G2::new_unchecked(x, y);
    if !point.is_on_curve() {
        return Err(GroupError::NotOnCurve);
    }

    Ok(point)
}

/// Serialize a G1 point the way the parser reads it: two 32-byte big-endian
/// coordinates, with the identity encoded as (0, 0).
pub(crate) fn write_g1(point: &G1) -> [u8; GROUP_ELEMENT_SIZE] {
    let mut out = [0u8; GROUP_ELEMENT_SIZE];
    if let Some((x, y)) = point.xy() {
        out[..32].copy_from_slice(&x.into_be_bytes32());
        out[32..].copy_from_slice(&y.into_be_bytes32());
    }
    out
}
