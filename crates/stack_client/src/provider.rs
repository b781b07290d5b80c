//! Leptos context plumbing for the bar's [`Stack`].

use leptos::*;

use crate::stack::Stack;

/// Makes `stack` available to every component below the current owner.
pub fn provide_stack(stack: Stack) {
    provide_context(stack);
}

/// Returns the [`Stack`] provided by the bar root.
///
/// # Panics
///
/// Panics if called outside a tree where [`provide_stack`] ran.
pub fn use_stack() -> Stack {
    use_context::<Stack>().expect("Stack not provided")
}
