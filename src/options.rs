//! `SerializeOptions` (§6) and its builder.
//!
//! This is the crate's only configuration surface, built the way the
//! teacher crate's `ProverBuilder`/`VerifierBuilder` gate a run behind a
//! fallible `.build()`: options are free to set in any combination, but
//! conflicts are caught once, in one place, before tracing ever starts.

use crate::error::{Error, Result};

/// Outer wrapping of the emitted program (§6 `format`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// A plain expression; no statement wrapper.
    Expression,
    /// CommonJS module-export form (`module.exports = ...`).
    ScriptCjs,
    /// ES module default-export form (`export default ...`).
    ScriptEsm,
}

#[derive(Clone, Debug)]
pub struct SerializeOptions {
    pub format: OutputFormat,
    pub ext: String,
    pub map_ext: String,
    pub exec: bool,
    pub compact: bool,
    pub inline: bool,
    pub mangle: bool,
    pub keep_comments: bool,
    pub produce_source_map: bool,
    pub assume_strict_env: bool,
}

impl SerializeOptions {
    pub fn builder() -> SerializeOptionsBuilder {
        SerializeOptionsBuilder::default()
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptionsBuilder::default().build().expect("default options never conflict")
    }
}

/// Builder for [`SerializeOptions`]; mirrors the teacher's `ProverBuilder`
/// chainable-setter-then-`build()` shape.
#[derive(Clone, Debug)]
pub struct SerializeOptionsBuilder {
    format: OutputFormat,
    ext: String,
    map_ext: String,
    exec: bool,
    compact: bool,
    inline: bool,
    mangle: bool,
    keep_comments: bool,
    produce_source_map: bool,
    assume_strict_env: bool,
}

impl Default for SerializeOptionsBuilder {
    fn default() -> Self {
        SerializeOptionsBuilder {
            format: OutputFormat::Expression,
            ext: "js".to_string(),
            map_ext: "js.map".to_string(),
            exec: false,
            compact: false,
            inline: true,
            mangle: true,
            keep_comments: false,
            produce_source_map: false,
            assume_strict_env: false,
        }
    }
}

impl SerializeOptionsBuilder {
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    pub fn map_ext(mut self, map_ext: impl Into<String>) -> Self {
        self.map_ext = map_ext.into();
        self
    }

    pub fn exec(mut self, exec: bool) -> Self {
        self.exec = exec;
        self
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    pub fn mangle(mut self, mangle: bool) -> Self {
        self.mangle = mangle;
        self
    }

    pub fn keep_comments(mut self, keep_comments: bool) -> Self {
        self.keep_comments = keep_comments;
        self
    }

    pub fn produce_source_map(mut self, produce_source_map: bool) -> Self {
        self.produce_source_map = produce_source_map;
        self
    }

    pub fn assume_strict_env(mut self, assume_strict_env: bool) -> Self {
        self.assume_strict_env = assume_strict_env;
        self
    }

    /// Validates the option-conflict rules of §7 kind 3 and produces the
    /// final, immutable options. Called once, before tracing starts.
    pub fn build(self) -> Result<SerializeOptions> {
        if self.exec && matches!(self.format, OutputFormat::Expression) {
            return Err(Error::OptionConflict("exec=true is incompatible with format=expression"));
        }
        if self.assume_strict_env && matches!(self.format, OutputFormat::ScriptCjs) {
            return Err(Error::OptionConflict(
                "assume-strict-env may not be set for CommonJS module-export format: ES modules (format=script-esm) are always strict, CommonJS is not",
            ));
        }

        Ok(SerializeOptions {
            format: self.format,
            ext: self.ext,
            map_ext: self.map_ext,
            exec: self.exec,
            compact: self.compact,
            inline: self.inline,
            mangle: self.mangle,
            keep_comments: self.keep_comments,
            produce_source_map: self.produce_source_map,
            assume_strict_env: self.assume_strict_env,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_build_cleanly() {
        let opts = SerializeOptions::builder().build().unwrap();
        assert_eq!(opts.format, OutputFormat::Expression);
        assert!(opts.mangle);
    }

    #[test]
    fn exec_with_expression_format_is_rejected() {
        let err = SerializeOptions::builder().exec(true).build().unwrap_err();
        assert!(matches!(err, Error::OptionConflict(_)));
    }

    #[test]
    fn assume_strict_env_with_cjs_is_rejected() {
        let err = SerializeOptions::builder()
            .format(OutputFormat::ScriptCjs)
            .assume_strict_env(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::OptionConflict(_)));
    }

    #[test]
    fn assume_strict_env_with_esm_is_accepted() {
        let opts = SerializeOptions::builder()
            .format(OutputFormat::ScriptEsm)
            .assume_strict_env(true)
            .build()
            .unwrap();
        assert!(opts.assume_strict_env);
    }

    #[test]
    fn exec_with_cjs_format_is_accepted() {
        let opts = SerializeOptions::builder().format(OutputFormat::ScriptCjs).exec(true).build().unwrap();
        assert!(opts.exec);
    }
}
