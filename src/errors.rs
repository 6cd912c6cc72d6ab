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

use alloc::string::String;
use core::fmt;
use snafu::Snafu;

/// The verification error type.
///
/// Every variant is a terminal rejection: callers must treat them all as
/// "proof invalid". The distinction only exists for diagnostic logging.
#[derive(Debug, PartialEq, Snafu)]
pub enum VerifyError {
    /// Wrong buffer length, instance count mismatch, or a structurally
    /// inconsistent input.
    #[snafu(display("Malformed input: {message}"))]
    MalformedInput { message: String },
    /// A scalar not below `r`, or a point coordinate not below `q`, appeared
    /// in the input.
    #[snafu(display("Out-of-range field element for \"{field}\""))]
    OutOfRangeFieldElement { field: String },
    /// A claimed G1 point does not satisfy the curve equation.
    #[snafu(display("Point not on curve for \"{field}\""))]
    PointNotOnCurve { field: String },
    /// Every structural check passed but the final bilinear equation does
    /// not hold.
    #[snafu(display("Pairing check failed"))]
    PairingCheckFailed,
}

/// Parse-level failure for a single scalar read.
#[derive(Debug, PartialEq)]
pub enum FieldError {
    InvalidSliceLength {
        actual_length: usize,
        expected_length: usize,
    },
    NotMember,
}

/// Parse-level failure for a single G1 point read.
#[derive(Debug, PartialEq)]
pub enum GroupError {
    InvalidSliceLength {
        actual_length: usize,
        expected_length: usize,
    },
    NotOnCurve,
    CoordinateNotMember,
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupError::InvalidSliceLength {
                actual_length,
                expected_length,
            } => {
                write!(
                    f,
                    "Invalid slice length. Actual length: {actual_length}, Expected length: {expected_length}",
                )
            }
            GroupError::NotOnCurve => write!(f, "Point not on curve"),
            GroupError::CoordinateNotMember => {
                write!(f, "Coordinate value exceeds the base field modulus")
            }
        }
    }
}

impl GroupError {
    /// Attach the name of the offending input field and lift into the
    /// public error type.
    pub(crate) fn into_verify_error(self, field: impl fmt::Display) -> VerifyError {
        use alloc::format;
        match self {
            GroupError::NotOnCurve => VerifyError::PointNotOnCurve {
                field: format!("{field}"),
            },
            GroupError::CoordinateNotMember => VerifyError::OutOfRangeFieldElement {
                field: format!("{field}"),
            },
            e @ GroupError::InvalidSliceLength { .. } => VerifyError::MalformedInput {
                message: format!("{field}: {e}"),
            },
        }
    }
}

impl FieldError {
    pub(crate) fn into_verify_error(self, field: impl fmt::Display) -> VerifyError {
        use alloc::format;
        match self {
            FieldError::NotMember => VerifyError::OutOfRangeFieldElement {
                field: format!("{field}"),
            },
            FieldError::InvalidSliceLength {
                actual_length,
                expected_length,
            } => VerifyError::MalformedInput {
                message: format!(
                    "{field}: invalid slice length. Actual length: {actual_length}, Expected length: {expected_length}"
                ),
            },
        }
    }
}
