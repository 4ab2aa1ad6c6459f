//! Before/after interception over a uniform dynamic calling convention.
//!
//! Calls are modeled as an argument tuple going in and a single value coming
//! out, both dynamically typed. Before hooks may replace the tuple, after
//! hooks may replace the value; a hook that returns nothing breaks the
//! contract and aborts the call.

use std::any::Any;
use std::rc::Rc;

/// Argument tuple of an intercepted call.
pub type CallArgs = Vec<Rc<dyn Any>>;

/// Return value of an intercepted call.
pub type CallValue = Rc<dyn Any>;

/// Runs before the wrapped body and yields the argument tuple to continue
/// with.
pub type BeforeHook<S> = dyn Fn(&S, CallArgs) -> Option<CallArgs>;

/// Runs after the wrapped body and yields the value to continue with.
pub type AfterHook<S> = dyn Fn(&S, CallValue) -> Option<CallValue>;

/// A hook broke the interception contract by returning no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterceptError {
    #[error("before hook for `{method}` returned no argument tuple")]
    BeforeHookNoValue { method: &'static str },
    #[error("after hook for `{method}` returned no value")]
    AfterHookNoValue { method: &'static str },
}

/// Runs `body` under the given hook chains.
///
/// Each before hook receives the tuple produced by its predecessor; each
/// after hook receives the value produced by its predecessor. Both chains run
/// in the order given, exactly once per call. A failing body skips the after
/// chain.
pub fn intercept_call<S, E>(
    subject: &S,
    method: &'static str,
    before: &[Rc<BeforeHook<S>>],
    after: &[Rc<AfterHook<S>>],
    args: CallArgs,
    body: impl FnOnce(&S, CallArgs) -> Result<CallValue, E>,
) -> Result<CallValue, E>
where
    E: From<InterceptError>,
{
    let mut args = args;
    for hook in before {
        args = hook(subject, args)
            .ok_or(InterceptError::BeforeHookNoValue { method })
            .map_err(E::from)?;
    }
    let mut value = body(subject, args)?;
    for hook in after {
        value = hook(subject, value)
            .ok_or(InterceptError::AfterHookNoValue { method })
            .map_err(E::from)?;
    }
    Ok(value)
}
