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
    constants::{ACCUMULATOR_INSTANCES, ACCUMULATOR_LIMBS, ACCUMULATOR_LIMB_BITS},
    errors::VerifyError,
    key::VerificationKey,
    multiopen::BatchOpening,
    types::{Fq, Fr, G1, U256},
    utils::write_g1,
};
use alloc::format;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{PrimeField, Zero};
use sha3::{Digest, Keccak256};

/// A deferred pairing check handed forward by a recursive circuit: the two
/// group elements of an earlier batch opening, carried as public instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Accumulator {
    pub(crate) lhs: G1,
    pub(crate) rhs: G1,
}

impl Accumulator {
    /// Decode the accumulator embedded in the instance vector, if the key
    /// declares one.
    ///
    /// Each base-field coordinate travels as four 68-bit limbs, least
    /// significant first, so one coordinate spans four scalar instances and
    /// the whole accumulator sixteen.
    pub(crate) fn extract(
        vk: &VerificationKey,
        instances: &[Fr],
    ) -> Result<Option<Self>, VerifyError> {
        let Some(offset) = vk.accumulator_offset else {
            return Ok(None);
        };
        let scalars = &instances[offset..offset + ACCUMULATOR_INSTANCES];

        let mut coordinates = [Fq::zero(); 4];
        for (i, limbs) in scalars.chunks(ACCUMULATOR_LIMBS).enumerate() {
            coordinates[i] = compose_coordinate(limbs, offset + i * ACCUMULATOR_LIMBS)?;
        }
        let [lhs_x, lhs_y, rhs_x, rhs_y] = coordinates;

        Ok(Some(Self {
            lhs: decode_point(lhs_x, lhs_y, "ACCUMULATOR_LHS")?,
            rhs: decode_point(rhs_x, rhs_y, "ACCUMULATOR_RHS")?,
        }))
    }

    /// Fold the carried check into the current one.
    ///
    /// A challenge bound to all four points scales the accumulator before it
    /// is added on both sides, so the combined pairing check holds only if
    /// both the fresh and the carried one do.
    pub(crate) fn fold_into(&self, opening: &mut BatchOpening) {
        let mut hasher = Keccak256::new();
        hasher.update(write_g1(&opening.lhs.into_affine()));
        hasher.update(write_g1(&opening.rhs.into_affine()));
        hasher.update(write_g1(&self.lhs));
        hasher.update(write_g1(&self.rhs));
        let challenge = Fr::from_be_bytes_mod_order(&hasher.finalize());

        opening.lhs += self.lhs * challenge;
        opening.rhs += self.rhs * challenge;
    }
}

/// Reassemble one base-field coordinate from its limb scalars.
fn compose_coordinate(limbs: &[Fr], first_instance: usize) -> Result<Fq, VerifyError> {
    let mut words = [0u64; 4];
    for (i, limb) in limbs.iter().enumerate() {
        let raw = limb.into_bigint().0;
        if raw[1] >> (ACCUMULATOR_LIMB_BITS - 64) != 0 || raw[2] != 0 || raw[3] != 0 {
            return Err(VerifyError::MalformedInput {
                message: format!(
                    "Accumulator limb at instance {} exceeds {ACCUMULATOR_LIMB_BITS} bits",
                    first_instance + i
                ),
            });
        }
        let value = (raw[0] as u128) | ((raw[1] as u128) << 64);

        let offset = ACCUMULATOR_LIMB_BITS * i;
        let mut word = offset / 64;
        let mut carry = value << (offset % 64);
        while carry != 0 {
            if word >= words.len() {
                return Err(VerifyError::MalformedInput {
                    message: format!(
                        "Accumulator coordinate at instance {first_instance} overflows 256 bits"
                    ),
                });
            }
            let sum = words[word] as u128 + (carry & u64::MAX as u128);
            words[word] = sum as u64;
            carry = (carry >> 64) + (sum >> 64);
            word += 1;
        }
    }

    Fq::from_bigint(U256::new(words)).ok_or(VerifyError::OutOfRangeFieldElement {
        field: format!("ACCUMULATOR_COORDINATE_{first_instance}"),
    })
}

fn decode_point(x: Fq, y: Fq, field: &str) -> Result<G1, VerifyError> {
    if x.is_zero() && y.is_zero() {
        return Ok(G1::zero());
    }
    let point = G1::new_unchecked(x, y);
    if !point.is_on_curve() {
        return Err(VerifyError::PointNotOnCurve {
            field: field.into(),
        });
    }
    debug_assert!(point.is_in_correct_subgroup_assuming_on_curve());
    Ok(point)
}
