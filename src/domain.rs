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

use crate::{key::VerificationKey, types::Fr};
use alloc::vec::Vec;
use ark_ff::{batch_inversion, AdditiveGroup, Field};

/// Everything the evaluation domain contributes at the challenge point:
/// the vanishing polynomial, the boundary Lagrange basis values and the
/// public-instance polynomial evaluation.
///
/// `L_i(x) = omega^i * n^-1 * (x^n - 1) / (x - omega^i)`. All the
/// `(x - omega^i)` divisions, plus the division by the vanishing value
/// itself, are amortized into a single batched inversion (Montgomery's
/// trick): one modular exponentiation instead of one per denominator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EvaluatedDomain {
    pub(crate) x: Fr,
    pub(crate) x_n: Fr,
    pub(crate) vanishing: Fr,
    pub(crate) vanishing_inv: Fr,
    pub(crate) l_0: Fr,
    pub(crate) l_last: Fr,
    pub(crate) l_blind: Fr,
    pub(crate) instance_eval: Fr,
}

impl EvaluatedDomain {
    pub(crate) fn new(vk: &VerificationKey, x: Fr, instances: &[Fr]) -> Self {
        let blinding = vk.blinding_rows;

        // x^n by repeated squaring, n = 2^k.
        let mut x_n = x;
        for _ in 0..vk.k {
            x_n.square_in_place();
        }
        let vanishing = x_n - Fr::ONE;

        // Rows whose Lagrange value is needed: the instance rows (at least
        // row 0, which the permutation and lookup boundaries always use),
        // the last usable row and the blinding rows.
        let head = core::cmp::max(instances.len(), 1);
        let mut roots = Vec::with_capacity(head + blinding + 1);
        let mut omega_i = Fr::ONE;
        for _ in 0..head {
            roots.push(omega_i);
            omega_i *= vk.omega;
        }
        let mut omega_i = vk.omega_inv.pow([blinding as u64 + 1]);
        for _ in 0..=blinding {
            roots.push(omega_i);
            omega_i *= vk.omega;
        }

        let mut inverses: Vec<Fr> = roots.iter().map(|root| x - root).collect();
        // One extra slot so the vanishing inverse rides the same batch,
        // even when there are no public instances at all.
        inverses.push(vanishing);
        batch_inversion(&mut inverses);
        let vanishing_inv = inverses.pop().expect("the vanishing slot is always present");

        // On the domain itself the quotient form is 0/0; the basis
        // degenerates to an indicator of the matching root.
        let lagrange: Vec<Fr> = if vanishing == Fr::ZERO {
            roots
                .iter()
                .map(|root| if *root == x { Fr::ONE } else { Fr::ZERO })
                .collect()
        } else {
            let scaled_vanishing = vanishing * vk.n_inv;
            roots
                .iter()
                .zip(inverses.iter())
                .map(|(root, inv)| scaled_vanishing * root * inv)
                .collect()
        };

        let instance_eval = instances
            .iter()
            .zip(lagrange.iter())
            .map(|(instance, l)| *instance * l)
            .sum();

        Self {
            x,
            x_n,
            vanishing,
            vanishing_inv,
            l_0: lagrange[0],
            l_last: lagrange[head],
            l_blind: lagrange[head + 1..].iter().sum(),
            instance_eval,
        }
    }

    /// `1 - (l_last + l_blind)`: the polynomial that is one on every row
    /// the running-product constraints are active on, and zero elsewhere.
    pub(crate) fn active_rows(&self) -> Fr {
        Fr::ONE - (self.l_last + self.l_blind)
    }
}
