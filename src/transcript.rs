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
    constants::TRANSCRIPT_REPEATED_SQUEEZE_SEPARATOR,
    key::VerificationKey,
    proof::Proof,
    types::{Fr, G1},
    utils::{write_g1, IntoBEBytes32},
};
use alloc::vec::Vec;
use ark_ff::PrimeField;
use sha3::{Digest, Keccak256};

/// Fiat-Shamir transcript over a running Keccak state.
///
/// `squeeze` hashes the accumulated state, returns the hash reduced mod `r`,
/// and replaces the state with the raw hash, so every later challenge is
/// bound to everything absorbed before it. Challenges are never supplied by
/// the caller: recomputing them from the same bytes always reproduces the
/// same sequence.
#[derive(Debug, Clone)]
pub(crate) struct Transcript {
    state: Vec<u8>,
}

impl Transcript {
    pub(crate) fn new(vk_digest: &[u8; 32]) -> Self {
        Self {
            state: vk_digest.to_vec(),
        }
    }

    pub(crate) fn absorb_scalar(&mut self, value: &Fr) {
        self.state.extend_from_slice(&value.into_be_bytes32());
    }

    pub(crate) fn absorb_point(&mut self, point: &G1) {
        self.state.extend_from_slice(&write_g1(point));
    }

    pub(crate) fn squeeze(&mut self) -> Fr {
        let hash: [u8; 32] = Keccak256::new()
            .chain_update(&self.state)
            .finalize()
            .into();
        self.state = hash.to_vec();
        Fr::from_be_bytes_mod_order(&hash)
    }

    /// Squeeze a further challenge without absorbing new data, separated
    /// from the previous squeeze by a fixed byte.
    pub(crate) fn squeeze_continued(&mut self) -> Fr {
        self.state.push(TRANSCRIPT_REPEATED_SQUEEZE_SEPARATOR);
        self.squeeze()
    }
}

/// The full challenge sequence of one verification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Challenges {
    /// Lookup input/table compression.
    pub(crate) theta: Fr,
    /// Grand-product numerator shift.
    pub(crate) beta: Fr,
    /// Grand-product offset.
    pub(crate) gamma: Fr,
    /// Horner batching of the constraint terms.
    pub(crate) y: Fr,
    /// The evaluation point.
    pub(crate) x: Fr,
    /// Within-group opening batching.
    pub(crate) zeta: Fr,
    /// Across-group opening batching.
    pub(crate) nu: Fr,
    /// Final opening point of the batched claim.
    pub(crate) mu: Fr,
}

impl Challenges {
    /// Replay the protocol's absorb/squeeze schedule against a parsed proof.
    ///
    /// The interleaving is load-bearing: seed digest, instances, then one
    /// challenge after each commitment phase, two after the evaluations and
    /// one after the first opening point.
    pub(crate) fn derive(vk: &VerificationKey, proof: &Proof, instances: &[Fr]) -> Self {
        let mut transcript = Transcript::new(&vk.digest());

        for instance in instances {
            transcript.absorb_scalar(instance);
        }

        for commitment in &proof.advice_commitments {
            transcript.absorb_point(commitment);
        }
        let theta = transcript.squeeze();

        for (permuted_input, permuted_table) in &proof.lookup_permuted_commitments {
            transcript.absorb_point(permuted_input);
            transcript.absorb_point(permuted_table);
        }
        let beta = transcript.squeeze();
        let gamma = transcript.squeeze_continued();

        for commitment in proof
            .permutation_z_commitments
            .iter()
            .chain(proof.lookup_z_commitments.iter())
        {
            transcript.absorb_point(commitment);
        }
        let y = transcript.squeeze();

        for commitment in &proof.quotient_segment_commitments {
            transcript.absorb_point(commitment);
        }
        let x = transcript.squeeze();

        for evaluation in proof.evaluations() {
            transcript.absorb_scalar(&evaluation);
        }
        let zeta = transcript.squeeze();
        let nu = transcript.squeeze_continued();

        transcript.absorb_point(&proof.w);
        let mu = transcript.squeeze();
        transcript.absorb_point(&proof.w_prime);

        Self {
            theta,
            beta,
            gamma,
            y,
            x,
            zeta,
            nu,
            mu,
        }
    }
}
