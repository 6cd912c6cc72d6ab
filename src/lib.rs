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

#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod accumulator;
mod constants;
mod domain;
pub mod errors;
pub mod expression;
pub mod key;
mod multiopen;
pub mod proof;
mod quotient;
pub mod srs;
mod transcript;
mod types;
mod utils;

#[cfg(test)]
mod should;

use crate::{
    accumulator::Accumulator,
    domain::EvaluatedDomain,
    errors::VerifyError,
    key::VerificationKey,
    multiopen::{collect_claims, open_claims, reconstruct_quotient_commitment},
    proof::{parse_instances, Proof},
    quotient::evaluate_quotient,
    transcript::Challenges,
};
use ark_bn254::Bn254;
use ark_ec::{pairing::Pairing, CurveGroup};
use ark_ff::One;

pub use types::*;

pub const PUB_SIZE: usize = constants::FIELD_ELEMENT_SIZE;

/// A single public input, as 32 big-endian bytes of a scalar.
pub type PublicInput = [u8; PUB_SIZE];
pub type Pubs = [PublicInput];

/// Verify a proof against a verification key and its public inputs.
///
/// The proof buffer must match the key's layout to the byte; every scalar
/// and curve point in it is validated while parsing. All challenges are
/// re-derived from the key digest, the public inputs and the proof itself,
/// and the claimed evaluations are checked against the commitments with a
/// single pairing. When the key declares a recursion accumulator, the
/// carried pairing check is folded into the same equation.
pub fn verify(
    vk: &VerificationKey,
    proof_bytes: &[u8],
    pubs: &Pubs,
) -> Result<(), VerifyError> {
    let instances = parse_instances(vk, pubs)?;
    let proof = Proof::parse(vk, proof_bytes)?;
    let challenges = Challenges::derive(vk, &proof, &instances);

    let domain = EvaluatedDomain::new(vk, challenges.x, &instances);
    let quotient_eval = evaluate_quotient(vk, &proof, &challenges, &domain);
    let quotient_commitment =
        reconstruct_quotient_commitment(&proof.quotient_segment_commitments, domain.x_n);

    let claims = collect_claims(vk, &proof, quotient_commitment, quotient_eval);
    let mut opening = open_claims(vk, &claims, &proof.w, &proof.w_prime, &challenges);

    if let Some(accumulator) = Accumulator::extract(vk, &instances)? {
        accumulator.fold_into(&mut opening);
    }

    let pairing = Bn254::multi_pairing(
        [opening.lhs.into_affine(), opening.rhs.into_affine()],
        [vk.kzg.g2, vk.kzg.neg_s_g2],
    );
    if pairing.0.is_one() {
        Ok(())
    } else {
        Err(VerifyError::PairingCheckFailed)
    }
}
