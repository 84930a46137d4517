//! Generator configuration.

/// Module path prepended to `stdlib/...` imports. Compiled-in default,
/// overridable through [`GenOptions::module_base`] before generation.
pub const DEFAULT_MODULE_BASE: &str = "github.com/kukicha-lang/kukicha";

/// Options steering code generation.
#[derive(Debug, Clone)]
pub struct GenOptions {
    /// Base module path used when rewriting `stdlib/X` import paths.
    pub module_base: String,
    /// MCP tool mode: the `print` builtin writes to stderr so stdout stays
    /// free for the protocol stream. Set explicitly or implied by a `skill`
    /// declaration.
    pub mcp_target: bool,
}

impl Default for GenOptions {
    fn default() -> Self {
        GenOptions {
            module_base: DEFAULT_MODULE_BASE.to_string(),
            mcp_target: false,
        }
    }
}

impl GenOptions {
    /// Returns options with a different stdlib module base.
    pub fn with_module_base(mut self, base: impl Into<String>) -> Self {
        self.module_base = base.into();
        self
    }

    /// Returns options with MCP target mode enabled.
    pub fn for_mcp(mut self) -> Self {
        self.mcp_target = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_module_base_is_compiled_in() {
        let options = GenOptions::default();
        assert_eq!(options.module_base, DEFAULT_MODULE_BASE);
        assert!(!options.mcp_target);
    }

    #[test]
    fn builders_override_fields() {
        let options = GenOptions::default()
            .with_module_base("example.com/fork")
            .for_mcp();
        assert_eq!(options.module_base, "example.com/fork");
        assert!(options.mcp_target);
    }
}
