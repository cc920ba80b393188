//! Evaluation of substitution values.
//!
//! Each call draws fresh values from the operating system's CSPRNG through
//! [`OsRng`], a stateless handle, so evaluation needs no shared generator
//! and no locking.

pub mod numeric;
pub mod timestamp;
pub mod uuid;

use crate::dsl::{self, Call};
use crate::error::EvaluationError;
use rand::rngs::OsRng;
use rand::RngCore;
use serde_json::{Map, Value};

/// Produce the value of a single function call.
pub fn evaluate_call<R: RngCore + ?Sized>(call: &Call, rng: &mut R) -> Result<String, rand::Error> {
    match call {
        Call::Guid => uuid::generate_guid(rng),
        Call::Uuid => uuid::generate_uuid_v4(rng),
        Call::Now(format) => Ok(timestamp::generate_now(format)),
        Call::Rnd(digits) => numeric::generate_random_digits(rng, *digits),
    }
}

/// Evaluate one substitution value.
///
/// A string carrying a function call is replaced as a whole by the call's
/// result; everything else is returned unchanged.
pub fn evaluate_value<R: RngCore + ?Sized>(value: &Value, rng: &mut R) -> Result<Value, rand::Error> {
    let Value::String(text) = value else {
        return Ok(value.clone());
    };
    match dsl::find_call(text) {
        Some(token) => Ok(Value::String(evaluate_call(&token.call, rng)?)),
        None => Ok(value.clone()),
    }
}

/// Evaluate every substitution into a fresh mapping with the same keys.
pub fn evaluate_substitutions(
    substitution: &Map<String, Value>,
) -> Result<Map<String, Value>, EvaluationError> {
    evaluate_substitutions_with(substitution, &mut OsRng)
}

/// Same as [`evaluate_substitutions`] with a caller-provided RNG.
pub fn evaluate_substitutions_with<R: RngCore + ?Sized>(
    substitution: &Map<String, Value>,
    rng: &mut R,
) -> Result<Map<String, Value>, EvaluationError> {
    substitution
        .iter()
        .map(|(key, value)| {
            evaluate_value(value, rng)
                .map(|evaluated| (key.clone(), evaluated))
                .map_err(|source| EvaluationError::Randomness {
                    key: key.clone(),
                    source,
                })
        })
        .collect()
}
