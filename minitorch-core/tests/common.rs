use minitorch_core::nn::{read_param, Forward, Module, ModuleState};
use minitorch_core::MiniTorchError;

// Fully connected layer over flat `Vec<f64>` weights, used to build realistic trees.
#[derive(Debug)]
#[allow(dead_code)]
pub struct Linear {
    state: ModuleState<Vec<f64>>,
    in_features: usize,
    out_features: usize,
}

#[allow(dead_code)]
impl Linear {
    pub fn new(in_features: usize, out_features: usize) -> Result<Self, MiniTorchError> {
        let mut layer = Linear {
            state: ModuleState::new(),
            in_features,
            out_features,
        };
        layer.add_parameter("weight", vec![0.1; in_features * out_features])?;
        layer.add_parameter("bias", vec![0.0; out_features])?;
        Ok(layer)
    }
}

impl Module<Vec<f64>> for Linear {
    fn state(&self) -> &ModuleState<Vec<f64>> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ModuleState<Vec<f64>> {
        &mut self.state
    }
}

impl Forward<Vec<f64>> for Linear {
    type Output = Vec<f64>;

    fn forward(&self, input: Vec<f64>) -> Result<Vec<f64>, MiniTorchError> {
        let weight = read_param(&self.get_parameter("weight")?).value().clone();
        let bias = read_param(&self.get_parameter("bias")?).value().clone();
        let output = (0..self.out_features)
            .map(|o| {
                let row = &weight[o * self.in_features..(o + 1) * self.in_features];
                row.iter().zip(&input).map(|(w, x)| w * x).sum::<f64>() + bias[o]
            })
            .collect();
        Ok(output)
    }
}

// Two linear layers under `fc1` / `fc2`.
#[derive(Debug)]
#[allow(dead_code)]
pub struct Mlp {
    state: ModuleState<Vec<f64>>,
}

#[allow(dead_code)]
impl Mlp {
    pub fn new(in_features: usize, hidden: usize, out_features: usize) -> Result<Self, MiniTorchError> {
        let mut mlp = Mlp {
            state: ModuleState::new(),
        };
        mlp.state.insert("fc1", Box::new(Linear::new(in_features, hidden)?) as Box<dyn Module<Vec<f64>>>)?;
        mlp.state.insert("fc2", Box::new(Linear::new(hidden, out_features)?) as Box<dyn Module<Vec<f64>>>)?;
        Ok(mlp)
    }
}

impl Module<Vec<f64>> for Mlp {
    fn state(&self) -> &ModuleState<Vec<f64>> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ModuleState<Vec<f64>> {
        &mut self.state
    }
}
