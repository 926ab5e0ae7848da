use crate::error::EnvironmentError;

#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Scalar(f64),
    Tensor(Tensor),
}

/// Dense row-major array. The data length always matches the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Tensor {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self, EnvironmentError> {
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(EnvironmentError::ShapeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn vector(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

impl From<f64> for Observation {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Tensor> for Observation {
    fn from(value: Tensor) -> Self {
        Self::Tensor(value)
    }
}
