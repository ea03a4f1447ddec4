//! Configuration for the built-in stencil compiler.
//!
//! Option loading is the caller's concern; this struct is plain data,
//! injected through the engine builder like every other dependency.
//!
//! # Examples
//!
//! ```
//! use quern_core::StencilConfig;
//!
//! let config = StencilConfig::default();
//! assert_eq!(config.max_include_depth, 16);
//! assert!(!config.lenient_bindings);
//!
//! let lenient = StencilConfig::default().with_lenient_bindings(true);
//! assert!(lenient.lenient_bindings);
//! ```

/// Default cap on nested includes.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 16;

/// Rendering options for the stencil runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilConfig {
    /// Maximum depth of the include stack, root template included.
    ///
    /// Rendering fails once an include would nest deeper; this bounds
    /// cyclic includes, which are not detected otherwise.
    /// Default: 16
    pub max_include_depth: usize,

    /// Render missing bindings as `null` instead of failing.
    ///
    /// Default: false (missing bindings are render errors)
    pub lenient_bindings: bool,
}

impl Default for StencilConfig {
    fn default() -> Self {
        Self {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            lenient_bindings: false,
        }
    }
}

impl StencilConfig {
    /// Sets the include depth cap.
    #[must_use]
    pub const fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Enables or disables lenient missing-binding handling.
    #[must_use]
    pub const fn with_lenient_bindings(mut self, lenient: bool) -> Self {
        self.lenient_bindings = lenient;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StencilConfig::default();
        assert_eq!(config.max_include_depth, DEFAULT_MAX_INCLUDE_DEPTH);
        assert!(!config.lenient_bindings);
    }

    #[test]
    fn test_with_setters() {
        let config = StencilConfig::default()
            .with_max_include_depth(4)
            .with_lenient_bindings(true);
        assert_eq!(config.max_include_depth, 4);
        assert!(config.lenient_bindings);
    }
}
