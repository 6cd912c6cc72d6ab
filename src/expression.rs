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

use crate::types::Fr;
use alloc::boxed::Box;
use core::ops::{Add, Mul, Neg, Sub};
use sha3::{Digest, Keccak256};

use crate::utils::IntoBEBytes32;

/// A polynomial identity over the committed columns, baked into the
/// verification key by the circuit compiler.
///
/// `Fixed` and `Advice` leaves index into the key's query lists, so an
/// expression evaluates directly against the evaluations carried by the
/// proof. `Instance` stands for the public-instance polynomial at the
/// evaluation point, which the verifier computes itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Constant(Fr),
    Fixed(usize),
    Advice(usize),
    Instance,
    Negated(Box<Expression>),
    Sum(Box<Expression>, Box<Expression>),
    Product(Box<Expression>, Box<Expression>),
    Scaled(Box<Expression>, Fr),
}

/// The evaluations an expression leaf can resolve to.
pub(crate) struct EvaluationContext<'a> {
    pub(crate) advice_evals: &'a [Fr],
    pub(crate) fixed_evals: &'a [Fr],
    pub(crate) instance_eval: Fr,
}

impl Expression {
    pub(crate) fn evaluate(&self, ctx: &EvaluationContext) -> Fr {
        match self {
            Expression::Constant(c) => *c,
            Expression::Fixed(query) => ctx.fixed_evals[*query],
            Expression::Advice(query) => ctx.advice_evals[*query],
            Expression::Instance => ctx.instance_eval,
            Expression::Negated(e) => -e.evaluate(ctx),
            Expression::Sum(lhs, rhs) => lhs.evaluate(ctx) + rhs.evaluate(ctx),
            Expression::Product(lhs, rhs) => lhs.evaluate(ctx) * rhs.evaluate(ctx),
            Expression::Scaled(e, f) => e.evaluate(ctx) * f,
        }
    }

    /// Feed an unambiguous encoding of the expression tree into the key
    /// digest: a tag byte per node, followed by the leaf payload.
    pub(crate) fn absorb_into(&self, hasher: &mut Keccak256) {
        match self {
            Expression::Constant(c) => {
                hasher.update(&[0u8]);
                hasher.update(&c.into_be_bytes32());
            }
            Expression::Fixed(query) => {
                hasher.update(&[1u8]);
                hasher.update(&(*query as u64).to_be_bytes());
            }
            Expression::Advice(query) => {
                hasher.update(&[2u8]);
                hasher.update(&(*query as u64).to_be_bytes());
            }
            Expression::Instance => hasher.update(&[3u8]),
            Expression::Negated(e) => {
                hasher.update(&[4u8]);
                e.absorb_into(hasher);
            }
            Expression::Sum(lhs, rhs) => {
                hasher.update(&[5u8]);
                lhs.absorb_into(hasher);
                rhs.absorb_into(hasher);
            }
            Expression::Product(lhs, rhs) => {
                hasher.update(&[6u8]);
                lhs.absorb_into(hasher);
                rhs.absorb_into(hasher);
            }
            Expression::Scaled(e, f) => {
                hasher.update(&[7u8]);
                e.absorb_into(hasher);
                hasher.update(&f.into_be_bytes32());
            }
        }
    }
}

impl Add for Expression {
    type Output = Expression;
    fn add(self, rhs: Expression) -> Expression {
        Expression::Sum(Box::new(self), Box::new(rhs))
    }
}

impl Sub for Expression {
    type Output = Expression;
    fn sub(self, rhs: Expression) -> Expression {
        Expression::Sum(Box::new(self), Box::new(Expression::Negated(Box::new(rhs))))
    }
}

impl Mul for Expression {
    type Output = Expression;
    fn mul(self, rhs: Expression) -> Expression {
        Expression::Product(Box::new(self), Box::new(rhs))
    }
}

impl Mul<Fr> for Expression {
    type Output = Expression;
    fn mul(self, rhs: Fr) -> Expression {
        Expression::Scaled(Box::new(self), rhs)
    }
}

impl Neg for Expression {
    type Output = Expression;
    fn neg(self) -> Expression {
        Expression::Negated(Box::new(self))
    }
}
