use environment::{Observation, Tensor};
use serde_json::{Number, Value};

/// Converts an observation into plain JSON: scalars stay numbers, tensors
/// become nested arrays following their shape.
pub fn encode_observation(observation: &Observation) -> Value {
    match observation {
        Observation::Scalar(value) => number(*value),
        Observation::Tensor(tensor) => encode_tensor(tensor),
    }
}

fn encode_tensor(tensor: &Tensor) -> Value {
    nest(tensor.shape(), tensor.data())
}

fn nest(shape: &[usize], data: &[f64]) -> Value {
    let Some((&len, inner)) = shape.split_first() else {
        return data.first().copied().map(number).unwrap_or(Value::Null);
    };
    let stride = inner.iter().product::<usize>();
    Value::Array(
        (0..len)
            .map(|i| nest(inner, &data[i * stride..(i + 1) * stride]))
            .collect(),
    )
}

// NaN and infinities have no JSON form.
fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
#[path = "tests/encode_tests.rs"]
mod tests;
