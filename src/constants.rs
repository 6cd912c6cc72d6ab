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

// Scalar size (in bytes)
pub const FIELD_ELEMENT_SIZE: usize = 32;
// G1 point size (in bytes): two uncompressed base field coordinates
pub const GROUP_ELEMENT_SIZE: usize = 64;

// Domain separator byte appended to the transcript state when a second
// challenge is squeezed from the same absorbed data.
pub const TRANSCRIPT_REPEATED_SQUEEZE_SEPARATOR: u8 = 0x01;

// A recursive accumulator embedded in the instance vector encodes each base
// field coordinate as `ACCUMULATOR_LIMBS` scalars of `ACCUMULATOR_LIMB_BITS`
// bits, least significant limb first.
pub const ACCUMULATOR_LIMB_BITS: usize = 68;
pub const ACCUMULATOR_LIMBS: usize = 4;
// Two G1 points, two coordinates each.
pub const ACCUMULATOR_INSTANCES: usize = 4 * ACCUMULATOR_LIMBS;

// Evaluations carried per lookup argument: z(x), z(omega*x), a'(x),
// a'(omega^-1 * x), s'(x).
pub const LOOKUP_EVALS: usize = 5;
// Commitments carried per lookup argument: a', s' in phase 2 and z in phase 3.
pub const LOOKUP_COMMITMENTS: usize = 3;
