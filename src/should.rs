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

//! End-to-end tests backed by a miniature honest prover.
//!
//! The prover commits with a toy trusted setup whose secret is known to the
//! test, builds every polynomial of the protocol with `ark-poly`, and
//! replays the same transcript schedule the verifier replays. Anything it
//! produces for a satisfied circuit must verify; anything tampered with
//! afterwards must not.

use crate::{
    constants::ACCUMULATOR_LIMB_BITS,
    errors::VerifyError,
    expression::{EvaluationContext, Expression},
    key::{Column, Lookup, VerificationKey},
    proof::{LookupEvals, PermutationZEvals, Proof},
    srs::KzgParams,
    transcript::Transcript,
    types::{Fq, Fr, G1, G2},
    utils::{write_g1, IntoBEBytes32},
    verify, PublicInput,
};
use alloc::{vec, vec::Vec};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{AdditiveGroup, FftField, Field, PrimeField, Zero};
use ark_poly::{
    univariate::{DenseOrSparsePolynomial, DensePolynomial},
    DenseUVPolynomial, EvaluationDomain, Evaluations, Polynomial, Radix2EvaluationDomain,
};
use rstest::rstest;

/// The toy trusted-setup secret shared by every test circuit.
fn setup_secret() -> Fr {
    Fr::from(0x5eed_1234u64)
}

struct TestCircuit {
    vk: VerificationKey,
    secret: Fr,
    advice: Vec<Vec<Fr>>,
    fixed: Vec<Vec<Fr>>,
    sigmas: Vec<Vec<Fr>>,
    instances: Vec<Fr>,
}

impl TestCircuit {
    fn pubs(&self) -> Vec<PublicInput> {
        self.instances.iter().map(|i| i.into_be_bytes32()).collect()
    }
}

fn commit(poly: &DensePolynomial<Fr>, secret: Fr) -> G1 {
    (G1::generator() * poly.evaluate(&secret)).into_affine()
}

fn interpolate(values: &[Fr], domain: Radix2EvaluationDomain<Fr>) -> DensePolynomial<Fr> {
    Evaluations::from_vec_and_domain(values.to_vec(), domain).interpolate()
}

fn constant(value: Fr) -> DensePolynomial<Fr> {
    DensePolynomial::from_coefficients_vec(vec![value])
}

fn scale(poly: &DensePolynomial<Fr>, factor: Fr) -> DensePolynomial<Fr> {
    DensePolynomial::from_coefficients_vec(poly.coeffs.iter().map(|c| *c * factor).collect())
}

/// `p(omega^rotation * X)`: scales coefficient `i` by `omega^(rotation*i)`.
fn rotate(poly: &DensePolynomial<Fr>, vk: &VerificationKey, rotation: i32) -> DensePolynomial<Fr> {
    let factor = if rotation >= 0 {
        vk.omega.pow([rotation as u64])
    } else {
        vk.omega_inv.pow([(-(rotation as i64)) as u64])
    };
    let mut power = Fr::ONE;
    DensePolynomial::from_coefficients_vec(
        poly.coeffs
            .iter()
            .map(|c| {
                let coefficient = *c * power;
                power *= factor;
                coefficient
            })
            .collect(),
    )
}

fn wrapped_row(row: usize, rotation: i32, n: usize) -> usize {
    (row as i64 + rotation as i64).rem_euclid(n as i64) as usize
}

fn expression_poly(
    expr: &Expression,
    advice_query_polys: &[DensePolynomial<Fr>],
    fixed_query_polys: &[DensePolynomial<Fr>],
    instance_poly: &DensePolynomial<Fr>,
) -> DensePolynomial<Fr> {
    let recurse =
        |e: &Expression| expression_poly(e, advice_query_polys, fixed_query_polys, instance_poly);
    match expr {
        Expression::Constant(c) => constant(*c),
        Expression::Fixed(query) => fixed_query_polys[*query].clone(),
        Expression::Advice(query) => advice_query_polys[*query].clone(),
        Expression::Instance => instance_poly.clone(),
        Expression::Negated(e) => scale(&recurse(e), -Fr::ONE),
        Expression::Sum(lhs, rhs) => &recurse(lhs) + &recurse(rhs),
        Expression::Product(lhs, rhs) => &recurse(lhs) * &recurse(rhs),
        Expression::Scaled(e, f) => scale(&recurse(e), *f),
    }
}

struct LookupWitness {
    input_rows: Vec<Fr>,
    table_rows: Vec<Fr>,
    permuted_input_rows: Vec<Fr>,
    permuted_table_rows: Vec<Fr>,
}

/// Sort the usable input rows and permute the table so every first
/// occurrence of an input value faces its table entry.
fn permute_lookup(input_rows: &[Fr], table_rows: &[Fr], usable: usize, n: usize) -> LookupWitness {
    let mut sorted = input_rows[..usable].to_vec();
    sorted.sort();

    let mut permuted_input_rows = vec![Fr::ZERO; n];
    permuted_input_rows[..usable].copy_from_slice(&sorted);

    let mut leftover = table_rows[..usable].to_vec();
    let mut permuted_table_rows = vec![Fr::ZERO; n];
    let mut repeats = Vec::new();
    for r in 0..usable {
        if r == 0 || sorted[r] != sorted[r - 1] {
            let position = leftover
                .iter()
                .position(|v| *v == sorted[r])
                .expect("lookup input value missing from the table");
            permuted_table_rows[r] = leftover.swap_remove(position);
        } else {
            repeats.push(r);
        }
    }
    for r in repeats {
        permuted_table_rows[r] = leftover.pop().expect("unused table rows remain");
    }

    LookupWitness {
        input_rows: input_rows.to_vec(),
        table_rows: table_rows.to_vec(),
        permuted_input_rows,
        permuted_table_rows,
    }
}

struct PolyClaim {
    rotations: Vec<i32>,
    poly: DensePolynomial<Fr>,
}

impl PolyClaim {
    fn new(poly: DensePolynomial<Fr>, mut rotations: Vec<i32>) -> Self {
        rotations.sort_unstable();
        Self { rotations, poly }
    }
}

/// Produce a complete proof for a satisfied circuit.
fn prove(circuit: &TestCircuit) -> Proof {
    let vk = &circuit.vk;
    let n = vk.n() as usize;
    let usable = n - vk.blinding_rows - 1;
    let domain = Radix2EvaluationDomain::<Fr>::new(n).expect("power-of-two domain");

    let advice_polys: Vec<_> = circuit
        .advice
        .iter()
        .map(|v| interpolate(v, domain))
        .collect();
    let fixed_polys: Vec<_> = circuit
        .fixed
        .iter()
        .map(|v| interpolate(v, domain))
        .collect();
    let sigma_polys: Vec<_> = circuit
        .sigmas
        .iter()
        .map(|v| interpolate(v, domain))
        .collect();
    let mut instance_rows = circuit.instances.clone();
    instance_rows.resize(n, Fr::ZERO);
    let instance_poly = interpolate(&instance_rows, domain);

    let advice_query_polys: Vec<_> = vk
        .advice_queries
        .iter()
        .map(|(col, rot)| rotate(&advice_polys[*col], vk, *rot))
        .collect();
    let fixed_query_polys: Vec<_> = vk
        .fixed_queries
        .iter()
        .map(|(col, rot)| rotate(&fixed_polys[*col], vk, *rot))
        .collect();

    let row_value = |expr: &Expression, row: usize| -> Fr {
        let advice: Vec<Fr> = vk
            .advice_queries
            .iter()
            .map(|(col, rot)| circuit.advice[*col][wrapped_row(row, *rot, n)])
            .collect();
        let fixed: Vec<Fr> = vk
            .fixed_queries
            .iter()
            .map(|(col, rot)| circuit.fixed[*col][wrapped_row(row, *rot, n)])
            .collect();
        expr.evaluate(&EvaluationContext {
            advice_evals: &advice,
            fixed_evals: &fixed,
            instance_eval: instance_rows[row],
        })
    };

    // Phase 1: advice commitments.
    let mut transcript = Transcript::new(&vk.digest());
    for instance in &circuit.instances {
        transcript.absorb_scalar(instance);
    }
    let advice_commitments: Vec<G1> = advice_polys
        .iter()
        .map(|p| commit(p, circuit.secret))
        .collect();
    for commitment in &advice_commitments {
        transcript.absorb_point(commitment);
    }
    let theta = transcript.squeeze();

    // Phase 2: permuted lookup columns.
    let mut lookup_witnesses = Vec::new();
    let mut lookup_permuted_polys = Vec::new();
    let mut lookup_permuted_commitments = Vec::new();
    for lookup in &vk.lookups {
        let compress = |expressions: &[Expression]| -> Vec<Fr> {
            (0..n)
                .map(|row| {
                    expressions
                        .iter()
                        .fold(Fr::ZERO, |acc, e| acc * theta + row_value(e, row))
                })
                .collect()
        };
        let witness = permute_lookup(
            &compress(&lookup.input_expressions),
            &compress(&lookup.table_expressions),
            usable,
            n,
        );
        let permuted_input_poly = interpolate(&witness.permuted_input_rows, domain);
        let permuted_table_poly = interpolate(&witness.permuted_table_rows, domain);
        let pair = (
            commit(&permuted_input_poly, circuit.secret),
            commit(&permuted_table_poly, circuit.secret),
        );
        transcript.absorb_point(&pair.0);
        transcript.absorb_point(&pair.1);
        lookup_witnesses.push(witness);
        lookup_permuted_polys.push((permuted_input_poly, permuted_table_poly));
        lookup_permuted_commitments.push(pair);
    }
    let beta = transcript.squeeze();
    let gamma = transcript.squeeze_continued();

    // Phase 3: grand products.
    let column_rows = |column: &Column, row: usize| -> Fr {
        match column {
            Column::Advice(col) => circuit.advice[*col][row],
            Column::Fixed(col) => circuit.fixed[*col][row],
            Column::Instance => instance_rows[row],
        }
    };
    let mut z_perm_rows: Vec<Vec<Fr>> = Vec::new();
    let mut carry = Fr::ONE;
    let mut global = 0usize;
    for columns in vk.permutation_columns.chunks(vk.permutation_chunk_len.max(1)) {
        let mut rows = vec![Fr::ONE; n];
        rows[0] = carry;
        for r in 0..usable {
            let mut ratio = Fr::ONE;
            for (offset, column) in columns.iter().enumerate() {
                let j = global + offset;
                let value = column_rows(column, r);
                let id = value + beta * vk.delta.pow([j as u64]) * vk.omega.pow([r as u64]) + gamma;
                let mapped = value + beta * circuit.sigmas[j][r] + gamma;
                ratio *= id * mapped.inverse().expect("shifted label is non-zero");
            }
            rows[r + 1] = rows[r] * ratio;
        }
        carry = rows[usable];
        for row in rows.iter_mut().skip(usable + 1) {
            *row = Fr::ONE;
        }
        global += columns.len();
        z_perm_rows.push(rows);
    }
    if !vk.permutation_columns.is_empty() {
        assert_eq!(carry, Fr::ONE, "copy constraints must close the cycle");
    }
    let z_perm_polys: Vec<_> = z_perm_rows
        .iter()
        .map(|rows| interpolate(rows, domain))
        .collect();

    let mut z_lookup_polys = Vec::new();
    for witness in &lookup_witnesses {
        let mut rows = vec![Fr::ONE; n];
        for r in 0..usable {
            let numerator =
                (witness.input_rows[r] + beta) * (witness.table_rows[r] + gamma);
            let denominator = (witness.permuted_input_rows[r] + beta)
                * (witness.permuted_table_rows[r] + gamma);
            rows[r + 1] =
                rows[r] * numerator * denominator.inverse().expect("shifted row is non-zero");
        }
        assert_eq!(rows[usable], Fr::ONE, "lookup multisets must match");
        for row in rows.iter_mut().skip(usable + 1) {
            *row = Fr::ONE;
        }
        z_lookup_polys.push(interpolate(&rows, domain));
    }

    let permutation_z_commitments: Vec<G1> = z_perm_polys
        .iter()
        .map(|p| commit(p, circuit.secret))
        .collect();
    let lookup_z_commitments: Vec<G1> = z_lookup_polys
        .iter()
        .map(|p| commit(p, circuit.secret))
        .collect();
    for commitment in permutation_z_commitments
        .iter()
        .chain(lookup_z_commitments.iter())
    {
        transcript.absorb_point(commitment);
    }
    let y = transcript.squeeze();

    // Phase 4: the quotient.
    let one = constant(Fr::ONE);
    let unit_row = |row: usize| {
        let mut rows = vec![Fr::ZERO; n];
        rows[row] = Fr::ONE;
        interpolate(&rows, domain)
    };
    let l_0 = unit_row(0);
    let l_last = unit_row(usable);
    let mut blind_rows = vec![Fr::ZERO; n];
    for row in blind_rows.iter_mut().skip(usable + 1) {
        *row = Fr::ONE;
    }
    let l_blind = interpolate(&blind_rows, domain);
    let active = &(&one - &l_last) - &l_blind;

    let mut terms: Vec<DensePolynomial<Fr>> = Vec::new();
    for gate in &vk.gates {
        terms.push(expression_poly(
            gate,
            &advice_query_polys,
            &fixed_query_polys,
            &instance_poly,
        ));
    }
    if let Some(first) = z_perm_polys.first() {
        terms.push(&l_0 * &(&one - first));
        let last_z = &z_perm_polys[z_perm_polys.len() - 1];
        terms.push(&l_last * &(&(last_z * last_z) - last_z));
        for i in 1..z_perm_polys.len() {
            let wrapped = rotate(&z_perm_polys[i - 1], vk, vk.last_rotation());
            terms.push(&l_0 * &(&z_perm_polys[i] - &wrapped));
        }
        let column_poly = |column: &Column| -> DensePolynomial<Fr> {
            match column {
                Column::Advice(col) => advice_polys[*col].clone(),
                Column::Fixed(col) => fixed_polys[*col].clone(),
                Column::Instance => instance_poly.clone(),
            }
        };
        let mut global = 0usize;
        for (chunk, columns) in vk
            .permutation_columns
            .chunks(vk.permutation_chunk_len)
            .enumerate()
        {
            let z = &z_perm_polys[chunk];
            let mut left = rotate(z, vk, 1);
            let mut right = z.clone();
            for (offset, column) in columns.iter().enumerate() {
                let j = global + offset;
                let value = column_poly(column);
                let mapped = &(&value + &scale(&sigma_polys[j], beta)) + &constant(gamma);
                left = &left * &mapped;
                let id = &value
                    + &DensePolynomial::from_coefficients_vec(vec![
                        gamma,
                        beta * vk.delta.pow([j as u64]),
                    ]);
                right = &right * &id;
            }
            global += columns.len();
            terms.push(&(&left - &right) * &active);
        }
    }
    for (i, lookup) in vk.lookups.iter().enumerate() {
        let fold = |expressions: &[Expression]| {
            expressions.iter().fold(constant(Fr::ZERO), |acc, e| {
                &scale(&acc, theta)
                    + &expression_poly(e, &advice_query_polys, &fixed_query_polys, &instance_poly)
            })
        };
        let input_poly = fold(&lookup.input_expressions);
        let table_poly = fold(&lookup.table_expressions);
        let (permuted_input_poly, permuted_table_poly) = &lookup_permuted_polys[i];
        let z = &z_lookup_polys[i];

        terms.push(&l_0 * &(&one - z));
        terms.push(&l_last * &(&(z * z) - z));
        let left = {
            let a_shift = permuted_input_poly + &constant(beta);
            let s_shift = permuted_table_poly + &constant(gamma);
            &rotate(z, vk, 1) * &(&a_shift * &s_shift)
        };
        let right = {
            let input_shift = &input_poly + &constant(beta);
            let table_shift = &table_poly + &constant(gamma);
            z * &(&input_shift * &table_shift)
        };
        terms.push(&(&left - &right) * &active);
        let diff = permuted_input_poly - permuted_table_poly;
        terms.push(&l_0 * &diff);
        let step = permuted_input_poly - &rotate(permuted_input_poly, vk, -1);
        terms.push(&(&diff * &step) * &active);
    }

    let numerator = terms
        .iter()
        .fold(constant(Fr::ZERO), |acc, term| &scale(&acc, y) + term);
    let mut vanishing_coeffs = vec![Fr::ZERO; n + 1];
    vanishing_coeffs[0] = -Fr::ONE;
    vanishing_coeffs[n] = Fr::ONE;
    let vanishing_poly = DensePolynomial::from_coefficients_vec(vanishing_coeffs);
    let (quotient_poly, remainder) = DenseOrSparsePolynomial::from(&numerator)
        .divide_with_q_and_r(&DenseOrSparsePolynomial::from(&vanishing_poly))
        .expect("vanishing polynomial is non-zero");
    assert!(
        remainder.is_zero(),
        "constraints must hold on the whole domain"
    );
    assert!(quotient_poly.coeffs.len() <= n * vk.num_quotient_segments);

    let mut quotient_coeffs = quotient_poly.coeffs.clone();
    quotient_coeffs.resize(n * vk.num_quotient_segments, Fr::ZERO);
    let segment_polys: Vec<DensePolynomial<Fr>> = quotient_coeffs
        .chunks(n)
        .map(|coeffs| DensePolynomial::from_coefficients_vec(coeffs.to_vec()))
        .collect();
    let quotient_segment_commitments: Vec<G1> = segment_polys
        .iter()
        .map(|p| commit(p, circuit.secret))
        .collect();
    for commitment in &quotient_segment_commitments {
        transcript.absorb_point(commitment);
    }
    let x = transcript.squeeze();

    // The verifier folds the segment commitments with powers of x^n, so the
    // opened polynomial is the same fold of the segments, not the quotient
    // itself.
    let x_n = x.pow([n as u64]);
    let folded_quotient_poly = segment_polys
        .iter()
        .rev()
        .fold(constant(Fr::ZERO), |acc, segment| &scale(&acc, x_n) + segment);

    // Evaluations at x and its rotations.
    let point = |rotation: i32| -> Fr {
        if rotation >= 0 {
            x * vk.omega.pow([rotation as u64])
        } else {
            x * vk.omega_inv.pow([(-(rotation as i64)) as u64])
        }
    };
    let chunks = z_perm_polys.len();
    let mut proof = Proof {
        advice_commitments,
        lookup_permuted_commitments,
        permutation_z_commitments,
        lookup_z_commitments,
        quotient_segment_commitments,
        advice_evals: vk
            .advice_queries
            .iter()
            .map(|(col, rot)| advice_polys[*col].evaluate(&point(*rot)))
            .collect(),
        fixed_evals: vk
            .fixed_queries
            .iter()
            .map(|(col, rot)| fixed_polys[*col].evaluate(&point(*rot)))
            .collect(),
        sigma_evals: sigma_polys.iter().map(|p| p.evaluate(&x)).collect(),
        permutation_z_evals: z_perm_polys
            .iter()
            .enumerate()
            .map(|(i, z)| PermutationZEvals {
                z: z.evaluate(&x),
                z_next: z.evaluate(&point(1)),
                z_last_rot: (i + 1 < chunks).then(|| z.evaluate(&point(vk.last_rotation()))),
            })
            .collect(),
        lookup_evals: z_lookup_polys
            .iter()
            .zip(lookup_permuted_polys.iter())
            .map(|(z, (a, s))| LookupEvals {
                z: z.evaluate(&x),
                z_next: z.evaluate(&point(1)),
                permuted_input: a.evaluate(&x),
                permuted_input_prev: a.evaluate(&point(-1)),
                permuted_table: s.evaluate(&x),
            })
            .collect(),
        w: G1::zero(),
        w_prime: G1::zero(),
    };
    for evaluation in proof.evaluations() {
        transcript.absorb_scalar(&evaluation);
    }
    let zeta = transcript.squeeze();
    let nu = transcript.squeeze_continued();

    // The batch opening witnesses, claim by claim in verifier order.
    let mut claims: Vec<PolyClaim> = Vec::new();
    for col in 0..vk.num_advice {
        let rotations: Vec<i32> = vk
            .advice_queries
            .iter()
            .filter(|(c, _)| *c == col)
            .map(|(_, rot)| *rot)
            .collect();
        if !rotations.is_empty() {
            claims.push(PolyClaim::new(advice_polys[col].clone(), rotations));
        }
    }
    for (i, z) in z_perm_polys.iter().enumerate() {
        let mut rotations = vec![0, 1];
        if i + 1 < chunks {
            rotations.push(vk.last_rotation());
        }
        claims.push(PolyClaim::new(z.clone(), rotations));
    }
    for (i, z) in z_lookup_polys.iter().enumerate() {
        let (a, s) = &lookup_permuted_polys[i];
        claims.push(PolyClaim::new(z.clone(), vec![0, 1]));
        claims.push(PolyClaim::new(a.clone(), vec![0, -1]));
        claims.push(PolyClaim::new(s.clone(), vec![0]));
    }
    for col in 0..vk.fixed_commitments.len() {
        let rotations: Vec<i32> = vk
            .fixed_queries
            .iter()
            .filter(|(c, _)| *c == col)
            .map(|(_, rot)| *rot)
            .collect();
        if !rotations.is_empty() {
            claims.push(PolyClaim::new(fixed_polys[col].clone(), rotations));
        }
    }
    for sigma in &sigma_polys {
        claims.push(PolyClaim::new(sigma.clone(), vec![0]));
    }
    claims.push(PolyClaim::new(folded_quotient_poly, vec![0]));

    struct PolyGroup {
        rotations: Vec<i32>,
        poly: DensePolynomial<Fr>,
        next_weight: Fr,
    }
    let mut groups: Vec<PolyGroup> = Vec::new();
    for claim in claims {
        match groups.iter_mut().find(|g| g.rotations == claim.rotations) {
            Some(group) => {
                group.poly = &group.poly + &scale(&claim.poly, group.next_weight);
                group.next_weight *= zeta;
            }
            None => groups.push(PolyGroup {
                rotations: claim.rotations,
                poly: claim.poly,
                next_weight: zeta,
            }),
        }
    }
    let mut all_rotations: Vec<i32> = groups
        .iter()
        .flat_map(|g| g.rotations.iter().copied())
        .collect();
    all_rotations.sort_unstable();
    all_rotations.dedup();

    let mut outer_quotient = constant(Fr::ZERO);
    let mut remainders = Vec::new();
    let mut weight = Fr::ONE;
    for group in &groups {
        let z_set = group.rotations.iter().fold(constant(Fr::ONE), |acc, rot| {
            &acc * &DensePolynomial::from_coefficients_vec(vec![-point(*rot), Fr::ONE])
        });
        let (q_g, r_g) = DenseOrSparsePolynomial::from(&group.poly)
            .divide_with_q_and_r(&DenseOrSparsePolynomial::from(&z_set))
            .expect("rotation-set vanishing polynomial is non-zero");
        outer_quotient = &outer_quotient + &scale(&q_g, weight);
        remainders.push(r_g);
        weight *= nu;
    }
    let w = commit(&outer_quotient, circuit.secret);
    transcript.absorb_point(&w);
    let mu = transcript.squeeze();

    let z_t: Fr = all_rotations.iter().map(|rot| mu - point(*rot)).product();
    let mut linearized = scale(&outer_quotient, -z_t);
    let mut weight = Fr::ONE;
    for (group, r_g) in groups.iter().zip(remainders.iter()) {
        let z_complement: Fr = all_rotations
            .iter()
            .filter(|rot| !group.rotations.contains(*rot))
            .map(|rot| mu - point(*rot))
            .product();
        let shifted = &group.poly - &constant(r_g.evaluate(&mu));
        linearized = &linearized + &scale(&shifted, weight * z_complement);
        weight *= nu;
    }
    let (final_quotient, remainder) = DenseOrSparsePolynomial::from(&linearized)
        .divide_with_q_and_r(&DenseOrSparsePolynomial::from(
            &DensePolynomial::from_coefficients_vec(vec![-mu, Fr::ONE]),
        ))
        .expect("X - mu is non-zero");
    assert!(remainder.is_zero(), "the batched claim must open at mu");
    let w_prime = commit(&final_quotient, circuit.secret);
    transcript.absorb_point(&w_prime);

    proof.w = w;
    proof.w_prime = w_prime;
    proof
}

fn encode(proof: &Proof) -> Vec<u8> {
    let mut bytes = Vec::new();
    for point in &proof.advice_commitments {
        bytes.extend_from_slice(&write_g1(point));
    }
    for (input, table) in &proof.lookup_permuted_commitments {
        bytes.extend_from_slice(&write_g1(input));
        bytes.extend_from_slice(&write_g1(table));
    }
    for point in proof
        .permutation_z_commitments
        .iter()
        .chain(proof.lookup_z_commitments.iter())
        .chain(proof.quotient_segment_commitments.iter())
    {
        bytes.extend_from_slice(&write_g1(point));
    }
    for evaluation in proof.evaluations() {
        bytes.extend_from_slice(&evaluation.into_be_bytes32());
    }
    bytes.extend_from_slice(&write_g1(&proof.w));
    bytes.extend_from_slice(&write_g1(&proof.w_prime));
    bytes
}

fn toy_params(secret: Fr) -> KzgParams {
    KzgParams::new(G2::generator(), (G2::generator() * secret).into_affine())
}

/// One multiplication gate: `q * (a0 * a1 - instance)` with 2 * 3 = 6.
fn circuit_a() -> TestCircuit {
    let secret = setup_secret();
    let n = 8usize;
    let domain = Radix2EvaluationDomain::<Fr>::new(n).unwrap();

    let mut a0 = vec![Fr::ZERO; n];
    a0[0] = Fr::from(2u64);
    let mut a1 = vec![Fr::ZERO; n];
    a1[0] = Fr::from(3u64);
    let mut q = vec![Fr::ZERO; n];
    q[0] = Fr::ONE;

    let fixed = vec![q];
    let fixed_commitments = fixed
        .iter()
        .map(|v| commit(&interpolate(v, domain), secret))
        .collect();
    let gate = Expression::Fixed(0)
        * (Expression::Advice(0) * Expression::Advice(1) - Expression::Instance);

    let vk = VerificationKey::new(
        3,
        2,
        1,
        2,
        vec![(0, 0), (1, 0)],
        vec![(0, 0)],
        2,
        1,
        vec![gate],
        vec![],
        vec![],
        fixed_commitments,
        vec![],
        toy_params(secret),
        None,
    )
    .unwrap();

    TestCircuit {
        vk,
        secret,
        advice: vec![a0, a1],
        fixed,
        sigmas: vec![],
        instances: vec![Fr::from(6u64)],
    }
}

/// The multiplication gate plus a two-chunk permutation (copying a0[1] into
/// a1[2]) and a lookup of a0 into a fixed table.
fn circuit_b() -> TestCircuit {
    let secret = setup_secret();
    let n = 8usize;
    let domain = Radix2EvaluationDomain::<Fr>::new(n).unwrap();
    let omega = Fr::get_root_of_unity(n as u64).unwrap();
    let delta = Fr::GENERATOR.pow([1u64 << Fr::TWO_ADICITY]);

    let mut a0 = vec![Fr::ZERO; n];
    a0[0] = Fr::from(2u64);
    a0[1] = Fr::from(7u64);
    let mut a1 = vec![Fr::ZERO; n];
    a1[0] = Fr::from(3u64);
    a1[2] = Fr::from(7u64);
    let mut q = vec![Fr::ZERO; n];
    q[0] = Fr::ONE;
    let mut table = vec![Fr::ZERO; n];
    table[1] = Fr::from(2u64);
    table[2] = Fr::from(7u64);
    table[3] = Fr::from(5u64);
    table[4] = Fr::from(9u64);

    // Identity labels delta^column * omega^row, with the two copied cells
    // swapped into one cycle.
    let mut sigma0: Vec<Fr> = (0..n).map(|r| omega.pow([r as u64])).collect();
    let mut sigma1: Vec<Fr> = (0..n).map(|r| delta * omega.pow([r as u64])).collect();
    sigma0[1] = delta * omega.pow([2]);
    sigma1[2] = omega;

    let fixed = vec![q, table];
    let sigmas = vec![sigma0, sigma1];
    let fixed_commitments: Vec<G1> = fixed
        .iter()
        .map(|v| commit(&interpolate(v, domain), secret))
        .collect();
    let permutation_commitments: Vec<G1> = sigmas
        .iter()
        .map(|v| commit(&interpolate(v, domain), secret))
        .collect();

    let gate = Expression::Fixed(0)
        * (Expression::Advice(0) * Expression::Advice(1) - Expression::Instance);
    let lookup = Lookup {
        input_expressions: vec![Expression::Advice(0)],
        table_expressions: vec![Expression::Fixed(1)],
    };

    let vk = VerificationKey::new(
        3,
        2,
        1,
        2,
        vec![(0, 0), (1, 0)],
        vec![(0, 0), (1, 0)],
        3,
        1,
        vec![gate],
        vec![lookup],
        vec![Column::Advice(0), Column::Advice(1)],
        fixed_commitments,
        permutation_commitments,
        toy_params(secret),
        None,
    )
    .unwrap();

    TestCircuit {
        vk,
        secret,
        advice: vec![a0, a1],
        fixed,
        sigmas,
        instances: vec![Fr::from(6u64)],
    }
}

fn limbs_of(value: Fq) -> [Fr; 4] {
    let raw = value.into_bigint().0;
    let mut limbs = [Fr::ZERO; 4];
    for (i, limb) in limbs.iter_mut().enumerate() {
        let offset = ACCUMULATOR_LIMB_BITS * i;
        let word = offset / 64;
        let shift = offset % 64;
        let mut v = (raw[word] as u128) >> shift;
        if word + 1 < raw.len() {
            v |= (raw[word + 1] as u128) << (64 - shift);
        }
        if word + 2 < raw.len() && shift > 0 {
            v |= (raw[word + 2] as u128) << (128 - shift);
        }
        *limb = Fr::from(v & ((1u128 << ACCUMULATOR_LIMB_BITS) - 1));
    }
    limbs
}

/// Circuit A on a 2^5 domain with a predecessor accumulator carried in the
/// instance vector right after the gate's public input.
fn circuit_recursive(honest_accumulator: bool) -> TestCircuit {
    let secret = setup_secret();
    let n = 32usize;
    let domain = Radix2EvaluationDomain::<Fr>::new(n).unwrap();

    let mut a0 = vec![Fr::ZERO; n];
    a0[0] = Fr::from(2u64);
    let mut a1 = vec![Fr::ZERO; n];
    a1[0] = Fr::from(3u64);
    let mut q = vec![Fr::ZERO; n];
    q[0] = Fr::ONE;

    let scalar = Fr::from(77u64);
    let acc_rhs = (G1::generator() * scalar).into_affine();
    let acc_lhs = if honest_accumulator {
        (G1::generator() * (secret * scalar)).into_affine()
    } else {
        acc_rhs
    };
    let mut instances = vec![Fr::from(6u64)];
    for coordinate in [acc_lhs.x, acc_lhs.y, acc_rhs.x, acc_rhs.y] {
        instances.extend_from_slice(&limbs_of(coordinate));
    }

    let fixed = vec![q];
    let fixed_commitments = fixed
        .iter()
        .map(|v| commit(&interpolate(v, domain), secret))
        .collect();
    let gate = Expression::Fixed(0)
        * (Expression::Advice(0) * Expression::Advice(1) - Expression::Instance);

    let vk = VerificationKey::new(
        5,
        2,
        instances.len(),
        2,
        vec![(0, 0), (1, 0)],
        vec![(0, 0)],
        2,
        1,
        vec![gate],
        vec![],
        vec![],
        fixed_commitments,
        vec![],
        toy_params(secret),
        Some(1),
    )
    .unwrap();

    TestCircuit {
        vk,
        secret,
        advice: vec![a0, a1],
        fixed,
        sigmas: vec![],
        instances,
    }
}

#[rstest]
#[case::gate_only(circuit_a())]
#[case::permutation_and_lookup(circuit_b())]
#[case::recursive(circuit_recursive(true))]
fn accept_an_honest_proof(#[case] circuit: TestCircuit) {
    let proof = encode(&prove(&circuit));
    assert_eq!(verify(&circuit.vk, &proof, &circuit.pubs()), Ok(()));
}

#[test]
fn accept_the_same_proof_twice() {
    let circuit = circuit_a();
    let proof = encode(&prove(&circuit));
    assert_eq!(verify(&circuit.vk, &proof, &circuit.pubs()), Ok(()));
    assert_eq!(verify(&circuit.vk, &proof, &circuit.pubs()), Ok(()));
}

#[test]
fn reject_a_tampered_instance() {
    let circuit = circuit_a();
    let proof = encode(&prove(&circuit));
    let mut pubs = circuit.pubs();
    pubs[0] = Fr::from(7u64).into_be_bytes32();
    assert_eq!(
        verify(&circuit.vk, &proof, &pubs),
        Err(VerifyError::PairingCheckFailed)
    );
}

#[rstest]
#[case::first_commitment(0)]
#[case::middle(1)]
#[case::last_byte(2)]
fn reject_a_tampered_proof(#[case] position: usize) {
    let circuit = circuit_b();
    let mut proof = encode(&prove(&circuit));
    let index = match position {
        0 => 5,
        1 => proof.len() / 2,
        _ => proof.len() - 1,
    };
    proof[index] ^= 0x01;
    assert!(verify(&circuit.vk, &proof, &circuit.pubs()).is_err());
}

#[test]
fn reject_every_sampled_single_bit_flip() {
    use ark_std::rand::Rng;

    let circuit = circuit_b();
    let proof = encode(&prove(&circuit));
    let mut rng = ark_std::test_rng();
    for _ in 0..64 {
        let byte = rng.gen_range(0..proof.len());
        let bit = rng.gen_range(0..8);
        let mut tampered = proof.clone();
        tampered[byte] ^= 1u8 << bit;
        assert!(
            verify(&circuit.vk, &tampered, &circuit.pubs()).is_err(),
            "flipping bit {bit} of byte {byte} was accepted"
        );
    }
}

#[test]
fn reject_a_truncated_proof() {
    let circuit = circuit_a();
    let mut proof = encode(&prove(&circuit));
    proof.pop();
    assert!(matches!(
        verify(&circuit.vk, &proof, &circuit.pubs()),
        Err(VerifyError::MalformedInput { .. })
    ));
}

#[test]
fn reject_a_wrong_instance_count() {
    let circuit = circuit_a();
    let proof = encode(&prove(&circuit));
    let mut pubs = circuit.pubs();
    pubs.push(Fr::from(1u64).into_be_bytes32());
    assert!(matches!(
        verify(&circuit.vk, &proof, &pubs),
        Err(VerifyError::MalformedInput { .. })
    ));
}

#[test]
fn reject_an_out_of_range_instance() {
    let circuit = circuit_a();
    let proof = encode(&prove(&circuit));
    let pubs = vec![Fr::MODULUS.into_be_bytes32()];
    assert!(matches!(
        verify(&circuit.vk, &proof, &pubs),
        Err(VerifyError::OutOfRangeFieldElement { .. })
    ));
}

#[test]
fn reject_a_forged_accumulator() {
    let circuit = circuit_recursive(false);
    let proof = encode(&prove(&circuit));
    assert_eq!(
        verify(&circuit.vk, &proof, &circuit.pubs()),
        Err(VerifyError::PairingCheckFailed)
    );
}

#[test]
fn reject_an_accumulator_limb_overflow() {
    let circuit = circuit_recursive(true);
    let proof = encode(&prove(&circuit));
    let mut pubs = circuit.pubs();
    pubs[1] = Fr::from(1u128 << ACCUMULATOR_LIMB_BITS).into_be_bytes32();
    assert!(matches!(
        verify(&circuit.vk, &proof, &pubs),
        Err(VerifyError::MalformedInput { .. })
    ));
}

#[test]
fn reject_an_accumulator_point_off_the_curve() {
    let circuit = circuit_recursive(true);
    let proof = encode(&prove(&circuit));
    let mut pubs = circuit.pubs();
    for (i, limb) in limbs_of(Fq::from(5u64))
        .iter()
        .chain(limbs_of(Fq::from(6u64)).iter())
        .enumerate()
    {
        pubs[1 + i] = limb.into_be_bytes32();
    }
    assert!(matches!(
        verify(&circuit.vk, &proof, &pubs),
        Err(VerifyError::PointNotOnCurve { .. })
    ));
}
