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

pub use ark_bn254::{Fq, Fq2, Fr};

/// Affine point on the BN254 G1 curve (`y^2 = x^3 + 3` over `Fq`).
pub type G1 = ark_bn254::G1Affine;
/// Affine point on the BN254 G2 twist.
pub type G2 = ark_bn254::G2Affine;
pub type G1Projective = ark_bn254::G1Projective;

/// 256-bit big integer, the raw form of every word read from an input buffer.
pub type U256 = ark_ff::BigInt<4>;
