/// Recommended error type for a scenario's `main` function and any shared code called from
/// hooks or actions. Compatible with [crate::definition::HookResult] so `?` can be used.
pub type SquallResult<T> = anyhow::Result<T>;
