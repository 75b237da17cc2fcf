use crate::nn::{Module, ModuleState, ParameterValue};

/// Routes `log` output through the test harness. Safe to call from every test.
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Tensor-like stand-in that records the parameter hooks it received.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct TracedValue {
    pub data: f64,
    pub requires_grad: bool,
    pub name: Option<String>,
}

impl TracedValue {
    pub fn new(data: f64) -> Self {
        TracedValue {
            data,
            ..Default::default()
        }
    }
}

impl ParameterValue for TracedValue {
    fn set_requires_grad(&mut self, requires_grad: bool) {
        self.requires_grad = requires_grad;
    }

    fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }
}

/// Module with no behavior of its own, used to build trees in tests.
#[derive(Debug)]
pub(crate) struct MockModule<V: ParameterValue> {
    state: ModuleState<V>,
}

impl<V: ParameterValue> MockModule<V> {
    pub fn new() -> Self {
        MockModule {
            state: ModuleState::new(),
        }
    }

    /// A module holding a single parameter `name` set to `value`.
    pub fn with_parameter(name: &str, value: V) -> Self {
        let mut module = Self::new();
        module
            .state
            .add_parameter(name, value)
            .expect("Failed to add parameter to mock module");
        module
    }
}

impl<V> Module<V> for MockModule<V>
where
    V: ParameterValue + std::fmt::Debug + Send + Sync + 'static,
{
    fn state(&self) -> &ModuleState<V> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ModuleState<V> {
        &mut self.state
    }
}

/// Builds `root(a: leaf{p}, b: mid{q}(c: leaf{r}))` with values 1.0, 2.0, 3.0.
pub(crate) fn build_tree() -> MockModule<f64> {
    let mut mid = MockModule::with_parameter("q", 2.0);
    mid.state
        .insert("c", Box::new(MockModule::with_parameter("r", 3.0)) as Box<dyn Module<f64>>)
        .expect("Failed to register c");

    let mut root = MockModule::new();
    root.state
        .insert("a", Box::new(MockModule::with_parameter("p", 1.0)) as Box<dyn Module<f64>>)
        .expect("Failed to register a");
    root.state
        .insert("b", Box::new(mid) as Box<dyn Module<f64>>)
        .expect("Failed to register b");
    root
}
