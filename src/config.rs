//! Compiler settings
//!
//! [`Config`] controls how diagnostics are rendered and which semantic
//! issues a successful compilation reports. Build one from the default and
//! adjust it with the `with_*` setters.

/// Default column at which diagnostic text wraps
pub const DEFAULT_WRAP_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Column at which diagnostic text wraps
    pub wrap_width: usize,
    /// Quote the offending source line under positioned diagnostics
    pub show_source_line: bool,
    /// Report semantic warnings next to errors
    pub emit_warnings: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
            show_source_line: true,
            emit_warnings: true,
        }
    }

    pub fn with_wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width.max(1);
        self
    }

    pub fn with_source_line(mut self, show: bool) -> Self {
        self.show_source_line = show;
        self
    }

    pub fn with_warnings(mut self, emit: bool) -> Self {
        self.emit_warnings = emit;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.wrap_width, 80);
        assert!(config.show_source_line);
        assert!(config.emit_warnings);
    }

    #[test]
    fn test_setters_chain() {
        let config = Config::new()
            .with_wrap_width(40)
            .with_source_line(false)
            .with_warnings(false);
        assert_eq!(
            config,
            Config {
                wrap_width: 40,
                show_source_line: false,
                emit_warnings: false,
            }
        );
    }

    #[test]
    fn test_zero_width_is_clamped() {
        assert_eq!(Config::new().with_wrap_width(0).wrap_width, 1);
    }
}
