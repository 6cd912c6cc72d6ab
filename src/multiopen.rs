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
    key::VerificationKey,
    proof::Proof,
    transcript::Challenges,
    types::{Fr, G1, G1Projective},
};
use alloc::vec::Vec;
use ark_ec::AffineRepr;
use ark_ff::{batch_inversion, AdditiveGroup, Field, Zero};

/// One committed polynomial together with its claimed evaluations at a set
/// of rotations of the challenge point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpeningClaim {
    pub(crate) commitment: G1Projective,
    /// Sorted ascending; `evals` is aligned with it.
    pub(crate) rotations: Vec<i32>,
    pub(crate) evals: Vec<Fr>,
}

impl OpeningClaim {
    fn new(commitment: G1Projective, mut entries: Vec<(i32, Fr)>) -> Self {
        entries.sort_by_key(|(rotation, _)| *rotation);
        Self {
            commitment,
            rotations: entries.iter().map(|(rotation, _)| *rotation).collect(),
            evals: entries.iter().map(|(_, eval)| *eval).collect(),
        }
    }
}

/// The two group elements of the final pairing check, still in projective
/// form. The check accepts when `e(lhs, g2) * e(rhs, -s*g2) == 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BatchOpening {
    pub(crate) lhs: G1Projective,
    pub(crate) rhs: G1Projective,
}

/// Fold the quotient segments back into one commitment: the segments are
/// the degree slices of the quotient polynomial, so the commitment to the
/// whole is a Horner walk in `x^n` from the highest slice down.
pub(crate) fn reconstruct_quotient_commitment(segments: &[G1], x_n: Fr) -> G1Projective {
    segments
        .iter()
        .rev()
        .fold(G1Projective::zero(), |acc, segment| acc * x_n + *segment)
}

/// Every opening the proof must answer for, in protocol order: advice
/// columns, permutation grand products, lookup polynomials, fixed columns,
/// sigma columns, then the reconstructed quotient.
pub(crate) fn collect_claims(
    vk: &VerificationKey,
    proof: &Proof,
    quotient_commitment: G1Projective,
    quotient_eval: Fr,
) -> Vec<OpeningClaim> {
    let mut claims = Vec::new();

    for column in 0..vk.num_advice {
        let entries: Vec<(i32, Fr)> = vk
            .advice_queries
            .iter()
            .enumerate()
            .filter(|(_, (col, _))| *col == column)
            .map(|(query, (_, rotation))| (*rotation, proof.advice_evals[query]))
            .collect();
        if !entries.is_empty() {
            claims.push(OpeningClaim::new(
                proof.advice_commitments[column].into(),
                entries,
            ));
        }
    }

    let chunks = proof.permutation_z_evals.len();
    for (i, (commitment, evals)) in proof
        .permutation_z_commitments
        .iter()
        .zip(proof.permutation_z_evals.iter())
        .enumerate()
    {
        let mut entries = alloc::vec![(0, evals.z), (1, evals.z_next)];
        if i + 1 < chunks {
            let wrapped = evals
                .z_last_rot
                .expect("every chunk but the last carries the wrap-around evaluation");
            entries.push((vk.last_rotation(), wrapped));
        }
        claims.push(OpeningClaim::new((*commitment).into(), entries));
    }

    for (i, evals) in proof.lookup_evals.iter().enumerate() {
        let (permuted_input, permuted_table) = proof.lookup_permuted_commitments[i];
        claims.push(OpeningClaim::new(
            proof.lookup_z_commitments[i].into(),
            alloc::vec![(0, evals.z), (1, evals.z_next)],
        ));
        claims.push(OpeningClaim::new(
            permuted_input.into(),
            alloc::vec![(0, evals.permuted_input), (-1, evals.permuted_input_prev)],
        ));
        claims.push(OpeningClaim::new(
            permuted_table.into(),
            alloc::vec![(0, evals.permuted_table)],
        ));
    }

    for column in 0..vk.fixed_commitments.len() {
        let entries: Vec<(i32, Fr)> = vk
            .fixed_queries
            .iter()
            .enumerate()
            .filter(|(_, (col, _))| *col == column)
            .map(|(query, (_, rotation))| (*rotation, proof.fixed_evals[query]))
            .collect();
        if !entries.is_empty() {
            claims.push(OpeningClaim::new(
                vk.fixed_commitments[column].into(),
                entries,
            ));
        }
    }

    for (commitment, eval) in vk
        .permutation_commitments
        .iter()
        .zip(proof.sigma_evals.iter())
    {
        claims.push(OpeningClaim::new(
            (*commitment).into(),
            alloc::vec![(0, *eval)],
        ));
    }

    claims.push(OpeningClaim::new(
        quotient_commitment,
        alloc::vec![(0, quotient_eval)],
    ));

    claims
}

/// Claims sharing a rotation set, folded into one commitment and one
/// evaluation vector with powers of `zeta`.
struct RotationSetGroup {
    rotations: Vec<i32>,
    commitment: G1Projective,
    evals: Vec<Fr>,
    next_weight: Fr,
}

/// Reduce all claims to the two sides of the pairing check.
///
/// Claims are grouped by rotation set (first-appearance order); within a
/// group commitments and evaluations fold with powers of `zeta`, across
/// groups with powers of `nu`. Each group contributes its interpolated
/// evaluation polynomial at `mu` and the vanishing factor of the points it
/// does not open at, so a single quotient pair `(w, w_prime)` certifies
/// every claim at once.
pub(crate) fn open_claims(
    vk: &VerificationKey,
    claims: &[OpeningClaim],
    w: &G1,
    w_prime: &G1,
    challenges: &Challenges,
) -> BatchOpening {
    let mut groups: Vec<RotationSetGroup> = Vec::new();
    for claim in claims {
        match groups.iter_mut().find(|g| g.rotations == claim.rotations) {
            Some(group) => {
                group.commitment += claim.commitment * group.next_weight;
                for (acc, eval) in group.evals.iter_mut().zip(claim.evals.iter()) {
                    *acc += group.next_weight * eval;
                }
                group.next_weight *= challenges.zeta;
            }
            None => groups.push(RotationSetGroup {
                rotations: claim.rotations.clone(),
                commitment: claim.commitment,
                evals: claim.evals.clone(),
                next_weight: challenges.zeta,
            }),
        }
    }

    let mut all_rotations: Vec<i32> = groups
        .iter()
        .flat_map(|g| g.rotations.iter().copied())
        .collect();
    all_rotations.sort_unstable();
    all_rotations.dedup();
    let all_points: Vec<Fr> = all_rotations
        .iter()
        .map(|rotation| rotation_point(vk, challenges.x, *rotation))
        .collect();

    let mu = challenges.mu;

    // Lagrange denominators for every group, inverted in one batch:
    // for point i of a group, (mu - p_i) * prod_{k != i} (p_i - p_k).
    let mut denominators = Vec::new();
    for group in &groups {
        let points: Vec<Fr> = group
            .rotations
            .iter()
            .map(|rotation| rotation_point(vk, challenges.x, *rotation))
            .collect();
        for (i, p_i) in points.iter().enumerate() {
            let mut denominator = mu - p_i;
            for (k, p_k) in points.iter().enumerate() {
                if k != i {
                    denominator *= *p_i - p_k;
                }
            }
            denominators.push(denominator);
        }
    }
    batch_inversion(&mut denominators);
    let mut inverses = denominators.into_iter();

    let z_t: Fr = all_points.iter().map(|point| mu - point).product();

    let mut lhs = G1Projective::zero();
    let mut r_eval = Fr::ZERO;
    let mut group_weight = Fr::ONE;
    for group in &groups {
        // Z_{S_g}(mu) and the interpolated r_g(mu) over the group's points.
        let z_set: Fr = group
            .rotations
            .iter()
            .map(|rotation| mu - rotation_point(vk, challenges.x, *rotation))
            .product();
        let interpolated: Fr = group
            .evals
            .iter()
            .map(|eval| {
                let inverse = inverses
                    .next()
                    .expect("one denominator was queued per evaluation");
                *eval * inverse
            })
            .sum::<Fr>()
            * z_set;

        // Z_{T \ S_g}(mu): the batched claim must vanish at every point the
        // group does not open at.
        let z_complement: Fr = all_rotations
            .iter()
            .zip(all_points.iter())
            .filter(|(rotation, _)| !group.rotations.contains(*rotation))
            .map(|(_, point)| mu - point)
            .product();

        let weight = group_weight * z_complement;
        lhs += group.commitment * weight;
        r_eval += weight * interpolated;
        group_weight *= challenges.nu;
    }

    lhs -= G1Projective::from(G1::generator()) * r_eval;
    lhs -= G1Projective::from(*w) * z_t;
    lhs += G1Projective::from(*w_prime) * mu;

    BatchOpening {
        lhs,
        rhs: (*w_prime).into(),
    }
}

/// `x * omega^rotation`, the domain point a rotated query opens at.
fn rotation_point(vk: &VerificationKey, x: Fr, rotation: i32) -> Fr {
    if rotation >= 0 {
        x * vk.omega.pow([rotation as u64])
    } else {
        x * vk.omega_inv.pow([-(rotation as i64) as u64])
    }
}
