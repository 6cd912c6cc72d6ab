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
    constants::{FIELD_ELEMENT_SIZE, GROUP_ELEMENT_SIZE, LOOKUP_COMMITMENTS, LOOKUP_EVALS},
    errors::VerifyError,
    key::VerificationKey,
    types::{Fr, G1},
    utils::{read_fr, read_g1},
};
use alloc::{format, vec::Vec};
use core::fmt;

/// Name of an input field, attached to parse errors for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofField {
    AdviceCommitment(usize),
    LookupPermutedInput(usize),
    LookupPermutedTable(usize),
    PermutationZCommitment(usize),
    LookupZCommitment(usize),
    QuotientSegment(usize),
    AdviceEval(usize),
    FixedEval(usize),
    SigmaEval(usize),
    PermutationZEval(usize),
    LookupEval(usize),
    W,
    WPrime,
    Instance(usize),
}

impl fmt::Display for ProofField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofField::AdviceCommitment(i) => write!(f, "ADVICE_COMMITMENT_{i}"),
            ProofField::LookupPermutedInput(i) => write!(f, "LOOKUP_PERMUTED_INPUT_{i}"),
            ProofField::LookupPermutedTable(i) => write!(f, "LOOKUP_PERMUTED_TABLE_{i}"),
            ProofField::PermutationZCommitment(i) => write!(f, "PERMUTATION_Z_{i}"),
            ProofField::LookupZCommitment(i) => write!(f, "LOOKUP_Z_{i}"),
            ProofField::QuotientSegment(i) => write!(f, "QUOTIENT_SEGMENT_{i}"),
            ProofField::AdviceEval(i) => write!(f, "ADVICE_EVAL_{i}"),
            ProofField::FixedEval(i) => write!(f, "FIXED_EVAL_{i}"),
            ProofField::SigmaEval(i) => write!(f, "SIGMA_EVAL_{i}"),
            ProofField::PermutationZEval(i) => write!(f, "PERMUTATION_Z_EVAL_{i}"),
            ProofField::LookupEval(i) => write!(f, "LOOKUP_EVAL_{i}"),
            ProofField::W => write!(f, "W"),
            ProofField::WPrime => write!(f, "W_PRIME"),
            ProofField::Instance(i) => write!(f, "INSTANCE_{i}"),
        }
    }
}

/// Evaluations of one permutation grand product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationZEvals {
    pub z: Fr,
    pub z_next: Fr,
    /// `z(omega^last * x)`; carried by every chunk except the last one.
    pub z_last_rot: Option<Fr>,
}

/// Evaluations of one lookup argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEvals {
    pub z: Fr,
    pub z_next: Fr,
    pub permuted_input: Fr,
    pub permuted_input_prev: Fr,
    pub permuted_table: Fr,
}

/// One decoded proof, laid out exactly as the key declares.
///
/// Constructed once per verification call from the input buffer and
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    // Phase 1
    pub advice_commitments: Vec<G1>,
    // Phase 2
    pub lookup_permuted_commitments: Vec<(G1, G1)>,
    // Phase 3
    pub permutation_z_commitments: Vec<G1>,
    pub lookup_z_commitments: Vec<G1>,
    // Phase 4
    pub quotient_segment_commitments: Vec<G1>,
    // Evaluations at the challenge point and its rotations
    pub advice_evals: Vec<Fr>,
    pub fixed_evals: Vec<Fr>,
    pub sigma_evals: Vec<Fr>,
    pub permutation_z_evals: Vec<PermutationZEvals>,
    pub lookup_evals: Vec<LookupEvals>,
    // Opening proof
    pub w: G1,
    pub w_prime: G1,
}

struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn point(&mut self, field: ProofField) -> Result<G1, VerifyError> {
        if self.data.len() < GROUP_ELEMENT_SIZE {
            return Err(truncated(&field, self.data.len()));
        }
        let (chunk, rest) = self.data.split_at(GROUP_ELEMENT_SIZE);
        self.data = rest;
        read_g1(chunk).map_err(|e| e.into_verify_error(field))
    }

    fn scalar(&mut self, field: ProofField) -> Result<Fr, VerifyError> {
        if self.data.len() < FIELD_ELEMENT_SIZE {
            return Err(truncated(&field, self.data.len()));
        }
        let (chunk, rest) = self.data.split_at(FIELD_ELEMENT_SIZE);
        self.data = rest;
        read_fr(chunk).map_err(|e| e.into_verify_error(field))
    }
}

fn truncated(field: &ProofField, remaining: usize) -> VerifyError {
    VerifyError::MalformedInput {
        message: format!("Buffer exhausted at \"{field}\" ({remaining} bytes left)"),
    }
}

impl Proof {
    /// Exact byte length of a proof for the given key's layout.
    pub fn expected_size(vk: &VerificationKey) -> usize {
        let chunks = vk.permutation_chunks();
        let lookups = vk.lookups.len();
        let points = vk.num_advice
            + LOOKUP_COMMITMENTS * lookups
            + chunks
            + vk.num_quotient_segments
            + 2;
        let scalars = vk.advice_queries.len()
            + vk.fixed_queries.len()
            + vk.permutation_columns.len()
            + if chunks > 0 { 3 * chunks - 1 } else { 0 }
            + LOOKUP_EVALS * lookups;

        points * GROUP_ELEMENT_SIZE + scalars * FIELD_ELEMENT_SIZE
    }

    /// Decode a proof buffer, enforcing the key's layout to the byte.
    ///
    /// Every scalar is range-checked against `r` and every point against the
    /// curve equation; the first failure aborts the parse.
    pub fn parse(vk: &VerificationKey, bytes: &[u8]) -> Result<Self, VerifyError> {
        let expected_size = Self::expected_size(vk);
        if bytes.len() != expected_size {
            return Err(VerifyError::MalformedInput {
                message: format!(
                    "Incorrect proof size. Expected: {expected_size}; Got: {}",
                    bytes.len()
                ),
            });
        }

        let mut reader = Reader { data: bytes };
        let chunks = vk.permutation_chunks();

        let advice_commitments = (0..vk.num_advice)
            .map(|i| reader.point(ProofField::AdviceCommitment(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let lookup_permuted_commitments = (0..vk.lookups.len())
            .map(|i| {
                Ok((
                    reader.point(ProofField::LookupPermutedInput(i))?,
                    reader.point(ProofField::LookupPermutedTable(i))?,
                ))
            })
            .collect::<Result<Vec<_>, VerifyError>>()?;

        let permutation_z_commitments = (0..chunks)
            .map(|i| reader.point(ProofField::PermutationZCommitment(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let lookup_z_commitments = (0..vk.lookups.len())
            .map(|i| reader.point(ProofField::LookupZCommitment(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let quotient_segment_commitments = (0..vk.num_quotient_segments)
            .map(|i| reader.point(ProofField::QuotientSegment(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let advice_evals = (0..vk.advice_queries.len())
            .map(|i| reader.scalar(ProofField::AdviceEval(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let fixed_evals = (0..vk.fixed_queries.len())
            .map(|i| reader.scalar(ProofField::FixedEval(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let sigma_evals = (0..vk.permutation_columns.len())
            .map(|i| reader.scalar(ProofField::SigmaEval(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let permutation_z_evals = (0..chunks)
            .map(|i| {
                Ok(PermutationZEvals {
                    z: reader.scalar(ProofField::PermutationZEval(i))?,
                    z_next: reader.scalar(ProofField::PermutationZEval(i))?,
                    z_last_rot: if i + 1 < chunks {
                        Some(reader.scalar(ProofField::PermutationZEval(i))?)
                    } else {
                        None
                    },
                })
            })
            .collect::<Result<Vec<_>, VerifyError>>()?;

        let lookup_evals = (0..vk.lookups.len())
            .map(|i| {
                Ok(LookupEvals {
                    z: reader.scalar(ProofField::LookupEval(i))?,
                    z_next: reader.scalar(ProofField::LookupEval(i))?,
                    permuted_input: reader.scalar(ProofField::LookupEval(i))?,
                    permuted_input_prev: reader.scalar(ProofField::LookupEval(i))?,
                    permuted_table: reader.scalar(ProofField::LookupEval(i))?,
                })
            })
            .collect::<Result<Vec<_>, VerifyError>>()?;

        let w = reader.point(ProofField::W)?;
        let w_prime = reader.point(ProofField::WPrime)?;
        debug_assert!(reader.data.is_empty());

        Ok(Self {
            advice_commitments,
            lookup_permuted_commitments,
            permutation_z_commitments,
            lookup_z_commitments,
            quotient_segment_commitments,
            advice_evals,
            fixed_evals,
            sigma_evals,
            permutation_z_evals,
            lookup_evals,
            w,
            w_prime,
        })
    }

    /// All claimed evaluations, in the order the transcript absorbs them.
    pub(crate) fn evaluations(&self) -> Vec<Fr> {
        let mut evals = Vec::new();
        evals.extend_from_slice(&self.advice_evals);
        evals.extend_from_slice(&self.fixed_evals);
        evals.extend_from_slice(&self.sigma_evals);
        for z in &self.permutation_z_evals {
            evals.push(z.z);
            evals.push(z.z_next);
            if let Some(last) = z.z_last_rot {
                evals.push(last);
            }
        }
        for l in &self.lookup_evals {
            evals.extend_from_slice(&[
                l.z,
                l.z_next,
                l.permuted_input,
                l.permuted_input_prev,
                l.permuted_table,
            ]);
        }
        evals
    }
}

/// Decode and range-check the public instance vector.
///
/// The count is checked against the key before any scalar is decoded, so a
/// wrong-length instance vector never reaches curve or pairing work.
pub fn parse_instances(
    vk: &VerificationKey,
    instances: &[[u8; FIELD_ELEMENT_SIZE]],
) -> Result<Vec<Fr>, VerifyError> {
    if instances.len() != vk.num_instances {
        return Err(VerifyError::MalformedInput {
            message: format!(
                "Provided public inputs length does not match. Expected: {}; Got: {}",
                vk.num_instances,
                instances.len()
            ),
        });
    }

    instances
        .iter()
        .enumerate()
        .map(|(i, bytes)| {
            read_fr(bytes).map_err(|e| e.into_verify_error(ProofField::Instance(i)))
        })
        .collect()
}
