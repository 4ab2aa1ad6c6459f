//! Runtime flags with scoped overrides.

use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    /// Enables diagnostics that only matter while developing.
    pub dev_mode: bool,
    /// Forces element interception regardless of the current owner.
    pub force_intercept: bool,
}

thread_local! {
    static BASE_CONFIG: Cell<Config> = Cell::new(Config::default());
    static CONFIG_OVERRIDES: RefCell<Vec<Config>> = RefCell::new(Vec::new());
}

/// The active configuration: the innermost `run_in_context` override, or the
/// process-wide base.
pub fn current_config() -> Config {
    CONFIG_OVERRIDES
        .with(|stack| stack.borrow().last().copied())
        .unwrap_or_else(|| BASE_CONFIG.with(|base| base.get()))
}

/// Replaces the base configuration seen outside any `run_in_context` scope.
pub fn set_config(config: Config) {
    BASE_CONFIG.with(|base| base.set(config));
}

/// Runs `body` with `config` active, restoring the previous configuration on
/// exit, including on unwind.
pub fn run_in_context<R>(config: Config, body: impl FnOnce() -> R) -> R {
    struct Scope;

    impl Drop for Scope {
        fn drop(&mut self) {
            CONFIG_OVERRIDES.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }

    CONFIG_OVERRIDES.with(|stack| stack.borrow_mut().push(config));
    let _scope = Scope;
    body()
}
