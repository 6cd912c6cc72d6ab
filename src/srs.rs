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

use crate::{types::G2, utils::read_g2};
use ark_ec::AffineRepr;

/// The G2-side artifacts of the KZG trusted setup a verification key is
/// bound to: the G2 generator and `-s*G2`, where `s` is the setup secret.
///
/// The negated point lets the final bilinear equation run as a single
/// multi-pairing: `e(lhs, G2) * e(rhs, -s*G2) == 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KzgParams {
    pub g2: G2,
    pub neg_s_g2: G2,
}

impl KzgParams {
    pub fn new(g2: G2, s_g2: G2) -> Self {
        Self {
            g2,
            neg_s_g2: -s_g2,
        }
    }

    /// Parameters of the reference ceremony (`[s]G2` from the common BN254
    /// powers-of-tau transcript).
    pub fn reference() -> Self {
        let s_g2 = read_g2(&SRS_G2).expect("Parsing the SRS should always work");
        Self::new(G2::generator(), s_g2)
    }
}

// Fixed [s]G2 point of the reference setup, EIP-197 encoding.
pub static SRS_G2: [u8; 128] = hex_literal::hex!(
    "
    198e9393920d483a7260bfb731fb5d25f1aa493335a9e71297e485b7aef312c2
    1800deef121f1e76426a00665e5c4479674322d4f75edadd46debd5cd992f6ed
    090689d0585ff075ec9e99ad690c3395bc4b313370b38ef355acdadcd122975b
    12c85ea5db8c6deb4aab71808dcb408fe3d1e7690c43d37b4ce6cc0166fa7daa
    "
);
