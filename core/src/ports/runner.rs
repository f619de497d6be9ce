//! Command runner port (interface).

/// Port for executing external OS commands.
///
/// Implementations return the command's captured standard output, or an
/// empty string when the command cannot be spawned, exits non-zero or is
/// killed by a signal. Callers treat empty as "no data".
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and capture its output.
    fn run(&self, program: &str, args: &[&str]) -> impl std::future::Future<Output = String> + Send;
}
