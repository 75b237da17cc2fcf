// examples/module_tree.rs
//!
//! Builds a small module tree, lists its parameters by dotted path, switches it
//! to evaluation mode and round-trips its state dict.
//!
//! Run with `RUST_LOG=debug` to see the registry's log output.

use minitorch_core::nn::{read_param, write_param, Attribute, Module, ModuleState};
use minitorch_core::MiniTorchError;

#[derive(Debug)]
struct Block {
    state: ModuleState<f64>,
}

impl Block {
    fn new(scale: f64) -> Result<Self, MiniTorchError> {
        let mut block = Block {
            state: ModuleState::new(),
        };
        block.add_parameter("scale", scale)?;
        block.add_parameter("shift", 0.0)?;
        Ok(block)
    }
}

impl Module<f64> for Block {
    fn state(&self) -> &ModuleState<f64> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ModuleState<f64> {
        &mut self.state
    }
}

#[derive(Debug)]
struct Network {
    state: ModuleState<f64>,
}

impl Module<f64> for Network {
    fn state(&self) -> &ModuleState<f64> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ModuleState<f64> {
        &mut self.state
    }
}

fn main() -> Result<(), MiniTorchError> {
    env_logger::init();

    let mut encoder = Network {
        state: ModuleState::new(),
    };
    encoder.set_attr("block1", Attribute::module(Block::new(1.0)?))?;
    encoder.set_attr("block2", Attribute::module(Block::new(2.0)?))?;

    let mut model = Network {
        state: ModuleState::new(),
    };
    model.set_attr("encoder", Attribute::module(encoder))?;
    model.set_attr("head", Attribute::module(Block::new(0.5)?))?;
    model.add_parameter("temperature", 1.0)?;

    println!("{}", model.repr());
    for (name, param) in model.named_parameters() {
        println!("{:<24} = {}", name, read_param(&param));
    }

    model.eval();
    println!("training after eval(): {}", model.is_training());

    let snapshot = model.state_dict();
    write_param(&model.get_parameter("encoder.block2.scale")?).update(-1.0);
    model.load_state_dict(&snapshot, true)?;
    println!(
        "encoder.block2.scale restored to {}",
        read_param(&model.get_parameter("encoder.block2.scale")?)
    );
    Ok(())
}
