//! Process-wide entry points
//!
//! Everything else hangs off two globals: the `main_loop` structure, whose
//! `current_configuration` leads to the running `GlobalConfig`, and
//! `resolvedConfigurablePaths`.

use crate::address::{kind, Address};
use crate::error::{Error, Result};
use crate::target::Target;

pub const MAIN_LOOP_SYMBOL: &str = "main_loop";
pub const RESOLVED_PATHS_SYMBOL: &str = "resolvedConfigurablePaths";

/// Check that the target looks like a syslog-ng process
///
/// Both entry-point symbols must resolve; nothing is read.
pub fn probe(target: &Target<'_>) -> Result<()> {
    target.resolve_symbol::<kind::MainLoop>(MAIN_LOOP_SYMBOL)?;
    target.resolve_symbol::<kind::ResolvedPaths>(RESOLVED_PATHS_SYMBOL)?;
    Ok(())
}

pub fn main_loop(target: &Target<'_>) -> Result<Address<kind::MainLoop>> {
    target.resolve_symbol(MAIN_LOOP_SYMBOL)
}

/// The running configuration
pub fn current_config(target: &Target<'_>) -> Result<Address<kind::GlobalConfig>> {
    let main_loop = main_loop(target)?;
    target.read_non_null(
        main_loop,
        target.layout().main_loop.current_configuration,
        "current configuration",
    )
}

/// Paths the daemon resolved at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub cfgfilename: Option<String>,
    pub persist_file: Option<String>,
    pub ctlfilename: Option<String>,
    pub initial_module_path: Option<String>,
}

impl ResolvedPaths {
    pub fn read(target: &Target<'_>) -> Result<Self> {
        let paths: Address<kind::ResolvedPaths> = target.resolve_symbol(RESOLVED_PATHS_SYMBOL)?;
        let layout = &target.layout().resolved_paths;

        Ok(Self {
            cfgfilename: target.read_string_field(paths, layout.cfgfilename)?,
            persist_file: target.read_string_field(paths, layout.persist_file)?,
            ctlfilename: target.read_string_field(paths, layout.ctlfilename)?,
            initial_module_path: target.read_string_field(paths, layout.initial_module_path)?,
        })
    }

    /// Name/value pairs in declaration order
    pub fn entries(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("cfgfilename", self.cfgfilename.as_deref()),
            ("persist_file", self.persist_file.as_deref()),
            ("ctlfilename", self.ctlfilename.as_deref()),
            ("initial_module_path", self.initial_module_path.as_deref()),
        ]
    }
}

/// Short summary of the instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    pub main_loop: Address<kind::MainLoop>,
    pub config: Address<kind::GlobalConfig>,
    pub paths: ResolvedPaths,
}

impl InstanceInfo {
    pub fn read(target: &Target<'_>) -> Result<Self> {
        probe(target)?;

        Ok(Self {
            main_loop: main_loop(target)?,
            config: current_config(target)?,
            paths: ResolvedPaths::read(target)?,
        })
    }
}

/// Which copy of the configuration text to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigText {
    /// As written by the operator
    Original,
    /// After include and macro expansion
    Preprocessed,
}

/// Configuration text held by the running configuration
pub fn config_text(target: &Target<'_>, which: ConfigText) -> Result<Option<String>> {
    let config = current_config(target)?;
    let layout = &target.layout().global_config;
    let offset = match which {
        ConfigText::Original => layout.original_config,
        ConfigText::Preprocessed => layout.preprocess_config,
    };

    let gstring: Address<kind::GString> = target.read_ptr(config, offset)?;
    if gstring.is_null() {
        return Ok(None);
    }
    read_gstring(target, gstring)
}

/// Read exactly `len` bytes of a `GString`; a null `str` reads as `None`
fn read_gstring(
    target: &Target<'_>,
    gstring: Address<kind::GString>,
) -> Result<Option<String>> {
    let layout = &target.layout().gstring;
    let text: Address<kind::Raw> = target.read_ptr(gstring, layout.str)?;
    if text.is_null() {
        return Ok(None);
    }

    let len = target.read_u64(gstring, layout.len)?;
    let limit = target.limits().max_text_len;
    let len = usize::try_from(len)
        .ok()
        .filter(|&len| len <= limit)
        .ok_or(Error::StringTooLong {
            address: text.value(),
            limit,
        })?;

    if len == 0 {
        return Ok(Some(String::new()));
    }

    let bytes = target.read_bytes(text, len)?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}
