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
    domain::EvaluatedDomain,
    expression::{EvaluationContext, Expression},
    key::{Column, ColumnEval, VerificationKey},
    proof::Proof,
    transcript::Challenges,
    types::Fr,
};
use alloc::vec::Vec;
use ark_ff::{AdditiveGroup, Field};

/// Evaluate the quotient polynomial at the challenge point from the claimed
/// column evaluations.
///
/// Every constraint term is batched into one value by a Horner walk in `y`,
/// then divided by the vanishing value. The term order is part of the
/// protocol: gate identities first, then the permutation argument, then each
/// lookup argument, in key order.
pub(crate) fn evaluate_quotient(
    vk: &VerificationKey,
    proof: &Proof,
    challenges: &Challenges,
    domain: &EvaluatedDomain,
) -> Fr {
    let ctx = EvaluationContext {
        advice_evals: &proof.advice_evals,
        fixed_evals: &proof.fixed_evals,
        instance_eval: domain.instance_eval,
    };
    let active_rows = domain.active_rows();

    let mut terms = Vec::new();
    for gate in &vk.gates {
        terms.push(gate.evaluate(&ctx));
    }
    permutation_terms(vk, proof, challenges, domain, active_rows, &mut terms);
    lookup_terms(vk, proof, challenges, domain, active_rows, &ctx, &mut terms);

    let numerator = terms
        .iter()
        .fold(Fr::ZERO, |acc, term| acc * challenges.y + term);
    numerator * domain.vanishing_inv
}

/// The permutation argument, split across `z` chunks:
/// - `z_0` starts at one and the chunks chain into one product, checked at
///   row 0;
/// - the final value is boolean on the last usable row (blinding rows may
///   break the product, so only 0/1 survives);
/// - each chunk extends the product by its columns' ratio of shifted terms,
///   on active rows only.
fn permutation_terms(
    vk: &VerificationKey,
    proof: &Proof,
    challenges: &Challenges,
    domain: &EvaluatedDomain,
    active_rows: Fr,
    terms: &mut Vec<Fr>,
) {
    let chunks = &proof.permutation_z_evals;
    let Some(first) = chunks.first() else {
        return;
    };
    terms.push(domain.l_0 * (Fr::ONE - first.z));

    let last = &chunks[chunks.len() - 1];
    terms.push(domain.l_last * (last.z.square() - last.z));

    for (previous, current) in chunks.iter().zip(chunks.iter().skip(1)) {
        let wrapped = previous
            .z_last_rot
            .expect("every chunk but the last carries the wrap-around evaluation");
        terms.push(domain.l_0 * (current.z - wrapped));
    }

    let column_values: Vec<Fr> = vk
        .permutation_columns
        .iter()
        .map(|column| permutation_column_value(vk, proof, domain, column))
        .collect();

    let mut column = 0;
    let mut shifted_coset = challenges.beta * domain.x;
    for (z, values) in chunks
        .iter()
        .zip(column_values.chunks(vk.permutation_chunk_len))
    {
        let mut left = z.z_next;
        let mut right = z.z;
        for value in values {
            left *= *value + challenges.beta * proof.sigma_evals[column] + challenges.gamma;
            right *= *value + shifted_coset + challenges.gamma;
            shifted_coset *= vk.delta;
            column += 1;
        }
        terms.push((left - right) * active_rows);
    }
}

/// One lookup argument per key entry:
/// - the grand product starts at one and ends boolean, as for permutations;
/// - the product extends by the permuted pair against the theta-compressed
///   input and table rows;
/// - the permuted input column equals the permuted table entry or repeats
///   its own previous row, which pins every input row to a table row.
fn lookup_terms(
    vk: &VerificationKey,
    proof: &Proof,
    challenges: &Challenges,
    domain: &EvaluatedDomain,
    active_rows: Fr,
    ctx: &EvaluationContext,
    terms: &mut Vec<Fr>,
) {
    for (lookup, evals) in vk.lookups.iter().zip(proof.lookup_evals.iter()) {
        let input = compress(&lookup.input_expressions, challenges.theta, ctx);
        let table = compress(&lookup.table_expressions, challenges.theta, ctx);

        terms.push(domain.l_0 * (Fr::ONE - evals.z));
        terms.push(domain.l_last * (evals.z.square() - evals.z));
        terms.push(
            (evals.z_next
                * (evals.permuted_input + challenges.beta)
                * (evals.permuted_table + challenges.gamma)
                - evals.z * (input + challenges.beta) * (table + challenges.gamma))
                * active_rows,
        );
        terms.push(domain.l_0 * (evals.permuted_input - evals.permuted_table));
        terms.push(
            (evals.permuted_input - evals.permuted_table)
                * (evals.permuted_input - evals.permuted_input_prev)
                * active_rows,
        );
    }
}

fn compress(expressions: &[Expression], theta: Fr, ctx: &EvaluationContext) -> Fr {
    expressions
        .iter()
        .fold(Fr::ZERO, |acc, e| acc * theta + e.evaluate(ctx))
}

fn permutation_column_value(
    vk: &VerificationKey,
    proof: &Proof,
    domain: &EvaluatedDomain,
    column: &Column,
) -> Fr {
    match vk
        .column_eval_query(column)
        .expect("checked when the key was built")
    {
        ColumnEval::Advice(query) => proof.advice_evals[query],
        ColumnEval::Fixed(query) => proof.fixed_evals[query],
        ColumnEval::Instance => domain.instance_eval,
    }
}
