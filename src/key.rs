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
    constants::ACCUMULATOR_INSTANCES,
    expression::Expression,
    srs::KzgParams,
    types::{Fr, G1},
    utils::{write_g1, IntoBEBytes32},
};
use alloc::vec::Vec;
use ark_ff::{FftField, Field};
use sha3::{Digest, Keccak256};
use snafu::Snafu;

#[derive(Debug, PartialEq, Snafu)]
pub enum VerificationKeyError {
    #[snafu(display("Unsupported domain size 2^{k}"))]
    UnsupportedDomainSize { k: u32 },
    #[snafu(display("Blinding rows do not leave a usable domain"))]
    TooManyBlindingRows,
    #[snafu(display("Instance vector does not fit in the usable rows"))]
    TooManyInstances,
    #[snafu(display("Query {query} references a column out of range"))]
    QueryOutOfRange { query: usize },
    #[snafu(display("Expression references a query out of range"))]
    ExpressionQueryOutOfRange,
    #[snafu(display("Permutation column {column} is not queried at the current row"))]
    PermutationColumnNotQueried { column: usize },
    #[snafu(display("Permutation needs one sigma commitment per column"))]
    SigmaCommitmentMismatch,
    #[snafu(display("Invalid permutation chunk length"))]
    InvalidChunkLength,
    #[snafu(display("Quotient must be committed in at least one segment"))]
    NoQuotientSegments,
    #[snafu(display("Accumulator offset does not fit in the instance vector"))]
    AccumulatorOutOfRange,
}

/// A column under copy constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Advice(usize),
    Fixed(usize),
    Instance,
}

/// One lookup argument: each row of the theta-compressed input expressions
/// must appear among the rows of the compressed table expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub input_expressions: Vec<Expression>,
    pub table_expressions: Vec<Expression>,
}

/// Immutable, per-circuit verification key.
///
/// Constructed once at circuit-compile time and shared read-only across
/// verification calls. `VerificationKey::new` checks internal consistency;
/// the cached domain constants (`omega`, `n_inv`, `delta`, ...) are derived
/// from `k` and never supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKey {
    // Domain
    pub k: u32,
    pub blinding_rows: usize,
    // Layout
    pub num_instances: usize,
    pub num_advice: usize,
    pub advice_queries: Vec<(usize, i32)>,
    pub fixed_queries: Vec<(usize, i32)>,
    pub num_quotient_segments: usize,
    pub permutation_chunk_len: usize,
    // Arguments
    pub gates: Vec<Expression>,
    pub lookups: Vec<Lookup>,
    pub permutation_columns: Vec<Column>,
    // Commitments fixed at compile time
    pub fixed_commitments: Vec<G1>,
    pub permutation_commitments: Vec<G1>,
    // Trusted setup artifacts
    pub kzg: KzgParams,
    /// Offset into the instance vector where a predecessor accumulator is
    /// embedded, when the circuit supports recursion.
    pub accumulator_offset: Option<usize>,
    // Cached domain constants
    pub omega: Fr,
    pub omega_inv: Fr,
    pub n_inv: Fr,
    pub delta: Fr,
}

#[allow(clippy::too_many_arguments)]
impl VerificationKey {
    pub fn new(
        k: u32,
        blinding_rows: usize,
        num_instances: usize,
        num_advice: usize,
        advice_queries: Vec<(usize, i32)>,
        fixed_queries: Vec<(usize, i32)>,
        num_quotient_segments: usize,
        permutation_chunk_len: usize,
        gates: Vec<Expression>,
        lookups: Vec<Lookup>,
        permutation_columns: Vec<Column>,
        fixed_commitments: Vec<G1>,
        permutation_commitments: Vec<G1>,
        kzg: KzgParams,
        accumulator_offset: Option<usize>,
    ) -> Result<Self, VerificationKeyError> {
        if k == 0 || k > Fr::TWO_ADICITY {
            return Err(VerificationKeyError::UnsupportedDomainSize { k });
        }
        let n = 1u64 << k;
        if blinding_rows as u64 + 1 >= n {
            return Err(VerificationKeyError::TooManyBlindingRows);
        }

        let omega = Fr::get_root_of_unity(n)
            .ok_or(VerificationKeyError::UnsupportedDomainSize { k })?;
        let vk = Self {
            k,
            blinding_rows,
            num_instances,
            num_advice,
            advice_queries,
            fixed_queries,
            num_quotient_segments,
            permutation_chunk_len,
            gates,
            lookups,
            permutation_columns,
            fixed_commitments,
            permutation_commitments,
            kzg,
            accumulator_offset,
            omega,
            omega_inv: omega.inverse().expect("omega is non-zero"),
            n_inv: Fr::from(n).inverse().expect("n is non-zero mod r"),
            delta: Fr::GENERATOR.pow([1u64 << Fr::TWO_ADICITY]),
        };
        vk.validate()?;

        Ok(vk)
    }

    fn validate(&self) -> Result<(), VerificationKeyError> {
        // Instances occupy the leading rows; they must never reach the last
        // usable row or the blinding tail.
        if self.num_instances as u64 > self.n() - self.blinding_rows as u64 - 1 {
            return Err(VerificationKeyError::TooManyInstances);
        }

        for (query, (column, _)) in self.advice_queries.iter().enumerate() {
            if *column >= self.num_advice {
                return Err(VerificationKeyError::QueryOutOfRange { query });
            }
        }
        for (query, (column, _)) in self.fixed_queries.iter().enumerate() {
            if *column >= self.fixed_commitments.len() {
                return Err(VerificationKeyError::QueryOutOfRange { query });
            }
        }

        let expressions = self.gates.iter().chain(
            self.lookups
                .iter()
                .flat_map(|l| l.input_expressions.iter().chain(l.table_expressions.iter())),
        );
        for expression in expressions {
            if !self.expression_queries_in_range(expression) {
                return Err(VerificationKeyError::ExpressionQueryOutOfRange);
            }
        }

        if self.permutation_commitments.len() != self.permutation_columns.len() {
            return Err(VerificationKeyError::SigmaCommitmentMismatch);
        }
        for (i, column) in self.permutation_columns.iter().enumerate() {
            if self.column_eval_query(column).is_none() {
                return Err(VerificationKeyError::PermutationColumnNotQueried { column: i });
            }
        }
        if !self.permutation_columns.is_empty() && self.permutation_chunk_len == 0 {
            return Err(VerificationKeyError::InvalidChunkLength);
        }

        if self.num_quotient_segments == 0 {
            return Err(VerificationKeyError::NoQuotientSegments);
        }

        if let Some(offset) = self.accumulator_offset {
            if offset + ACCUMULATOR_INSTANCES > self.num_instances {
                return Err(VerificationKeyError::AccumulatorOutOfRange);
            }
        }

        Ok(())
    }

    fn expression_queries_in_range(&self, expression: &Expression) -> bool {
        match expression {
            Expression::Constant(_) | Expression::Instance => true,
            Expression::Fixed(query) => *query < self.fixed_queries.len(),
            Expression::Advice(query) => *query < self.advice_queries.len(),
            Expression::Negated(e) | Expression::Scaled(e, _) => {
                self.expression_queries_in_range(e)
            }
            Expression::Sum(lhs, rhs) | Expression::Product(lhs, rhs) => {
                self.expression_queries_in_range(lhs) && self.expression_queries_in_range(rhs)
            }
        }
    }

    pub fn n(&self) -> u64 {
        1u64 << self.k
    }

    /// Rotation of the last usable row: `-(blinding_rows + 1)`.
    pub fn last_rotation(&self) -> i32 {
        -(self.blinding_rows as i32 + 1)
    }

    /// Number of grand products the permutation argument is split into.
    pub fn permutation_chunks(&self) -> usize {
        if self.permutation_columns.is_empty() {
            0
        } else {
            self.permutation_columns.len().div_ceil(self.permutation_chunk_len)
        }
    }

    /// The advice/fixed query carrying the current-row evaluation of a
    /// permutation column, resolved against the query lists.
    pub(crate) fn column_eval_query(&self, column: &Column) -> Option<ColumnEval> {
        match column {
            Column::Advice(col) => self
                .advice_queries
                .iter()
                .position(|q| q == &(*col, 0))
                .map(ColumnEval::Advice),
            Column::Fixed(col) => self
                .fixed_queries
                .iter()
                .position(|q| q == &(*col, 0))
                .map(ColumnEval::Fixed),
            Column::Instance => Some(ColumnEval::Instance),
        }
    }

    /// Keccak digest of the full key; seeds every transcript bound to this
    /// circuit.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update(b"halo2-kzg-vk");
        hasher.update((self.k as u64).into_be_bytes32());
        hasher.update((self.blinding_rows as u64).into_be_bytes32());
        hasher.update((self.num_instances as u64).into_be_bytes32());
        hasher.update((self.num_advice as u64).into_be_bytes32());
        hasher.update((self.num_quotient_segments as u64).into_be_bytes32());
        hasher.update((self.permutation_chunk_len as u64).into_be_bytes32());
        match self.accumulator_offset {
            Some(offset) => {
                hasher.update([1u8]);
                hasher.update((offset as u64).into_be_bytes32());
            }
            None => hasher.update([0u8]),
        }

        for (column, rotation) in self.advice_queries.iter().chain(self.fixed_queries.iter()) {
            hasher.update((*column as u64).to_be_bytes());
            hasher.update((*rotation as i64).to_be_bytes());
        }

        hasher.update((self.gates.len() as u64).to_be_bytes());
        for gate in &self.gates {
            gate.absorb_into(&mut hasher);
        }
        hasher.update((self.lookups.len() as u64).to_be_bytes());
        for lookup in &self.lookups {
            hasher.update((lookup.input_expressions.len() as u64).to_be_bytes());
            for expression in lookup
                .input_expressions
                .iter()
                .chain(lookup.table_expressions.iter())
            {
                expression.absorb_into(&mut hasher);
            }
        }

        hasher.update((self.permutation_columns.len() as u64).to_be_bytes());
        for column in &self.permutation_columns {
            match column {
                Column::Advice(col) => {
                    hasher.update([0u8]);
                    hasher.update((*col as u64).to_be_bytes());
                }
                Column::Fixed(col) => {
                    hasher.update([1u8]);
                    hasher.update((*col as u64).to_be_bytes());
                }
                Column::Instance => hasher.update([2u8]),
            }
        }

        for commitment in self
            .fixed_commitments
            .iter()
            .chain(self.permutation_commitments.iter())
        {
            hasher.update(write_g1(commitment));
        }

        for point in [&self.kzg.g2, &self.kzg.neg_s_g2] {
            hasher.update(point.x.c0.into_be_bytes32());
            hasher.update(point.x.c1.into_be_bytes32());
            hasher.update(point.y.c0.into_be_bytes32());
            hasher.update(point.y.c1.into_be_bytes32());
        }

        hasher.finalize().into()
    }
}

/// Resolved evaluation source for a permutation column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnEval {
    Advice(usize),
    Fixed(usize),
    Instance,
}
