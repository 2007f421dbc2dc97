// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

/// Warmup/timed iteration counts for benchmark-mode emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkConfig {
    pub warmup_iters: u32,
    pub timed_iters: u32,
}

/// Configures one [`crate::Emitter::emit`] call: the source file named
/// in the emitted header comment, whether the root result is printed
/// or returned as a row count, and an optional warmup/timed loop
/// around the query for benchmark builds.
///
/// A builder, in the style of `Query::with_limit`/`with_offset`, so
/// callers configure emission the way IR query types are configured
/// elsewhere in this workspace.
#[derive(Debug, Clone, Default)]
pub struct EmitOptions {
    source_name: Option<String>,
    print_root: bool,
    benchmark: Option<BenchmarkConfig>,
}

impl EmitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn with_print_root(mut self, print_root: bool) -> Self {
        self.print_root = print_root;
        self
    }

    pub fn with_benchmark(mut self, warmup_iters: u32, timed_iters: u32) -> Self {
        self.benchmark = Some(BenchmarkConfig { warmup_iters, timed_iters });
        self
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn print_root(&self) -> bool {
        self.print_root
    }

    pub fn benchmark(&self) -> Option<BenchmarkConfig> {
        self.benchmark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_returning_not_printing() {
        let options = EmitOptions::new();
        assert!(!options.print_root());
        assert!(options.benchmark().is_none());
        assert!(options.source_name().is_none());
    }

    #[test]
    fn builder_methods_chain() {
        let options = EmitOptions::new()
            .with_source_name("query.ibex")
            .with_print_root(true)
            .with_benchmark(10, 100);
        assert_eq!(options.source_name(), Some("query.ibex"));
        assert!(options.print_root());
        assert_eq!(
            options.benchmark(),
            Some(BenchmarkConfig { warmup_iters: 10, timed_iters: 100 })
        );
    }
}
