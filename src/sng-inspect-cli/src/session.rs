//! Target session setup
//!
//! Opens the memory source, loads symbols and layout, and hands out a
//! [`Target`] for the duration of one command.

use anyhow::{bail, Context, Result};
use sng_inspect::{
    Cancellation, DumpFile, Layout, Limits, LiveProcess, MemorySource, SymbolTable, Target,
};

use crate::cli::TargetArgs;
use crate::config::{self, Config};

/// How symbol addresses are relocated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBias {
    Fixed(usize),
    /// Image base of the attached process
    Auto,
}

/// Parse a hex or decimal address string
pub fn parse_address(address: &str) -> Result<usize> {
    let address = address.trim();
    if let Some(hex) = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
    {
        usize::from_str_radix(hex, 16).with_context(|| format!("Invalid hex address: {}", address))
    } else {
        address
            .parse::<usize>()
            .with_context(|| format!("Invalid address: {}", address))
    }
}

pub fn parse_load_bias(value: &str) -> Result<LoadBias> {
    if value.eq_ignore_ascii_case("auto") {
        return Ok(LoadBias::Auto);
    }
    parse_address(value).map(LoadBias::Fixed)
}

enum Source {
    Dump(DumpFile),
    Live(LiveProcess),
}

impl Source {
    fn as_memory(&self) -> &dyn MemorySource {
        match self {
            Source::Dump(dump) => dump,
            Source::Live(process) => process,
        }
    }
}

pub struct Session {
    source: Source,
    symbols: SymbolTable,
    layout: Layout,
    limits: Limits,
    pub cancel: Cancellation,
}

impl Session {
    pub fn open(args: &TargetArgs, config: &Config) -> Result<Self> {
        let symbols_path = args
            .symbols
            .as_ref()
            .or(config.symbols.as_ref())
            .context(
                "No symbol table. Pass --symbols <nm listing> or run \
                 `sng-inspect configure --symbols <path>`",
            )?;

        let source = match (&args.dump, &args.maps) {
            (Some(dump), Some(maps)) => Source::Dump(
                DumpFile::open_with_maps(dump, maps)
                    .with_context(|| format!("Failed to open dump {}", dump.display()))?,
            ),
            (Some(dump), None) => Source::Dump(
                DumpFile::open(dump)
                    .with_context(|| format!("Failed to open dump {}", dump.display()))?,
            ),
            (None, Some(_)) => bail!("--maps requires --dump"),
            (None, None) => Source::Live(
                LiveProcess::attach(args.pid)
                    .context("Failed to attach to process. Try running with sudo.")?,
            ),
        };

        let bias = match args.load_bias.as_deref().or(config.load_bias.as_deref()) {
            Some(value) => parse_load_bias(value)?,
            None => LoadBias::Fixed(0),
        };
        let bias = match (bias, &source) {
            (LoadBias::Fixed(value), _) => value,
            (LoadBias::Auto, Source::Live(process)) => process
                .image_base()
                .context("Could not find the executable's mapping for --load-bias auto")?,
            (LoadBias::Auto, Source::Dump(_)) => {
                bail!("--load-bias auto needs a live process; pass a hex value for dumps")
            }
        };

        let symbols = SymbolTable::load(symbols_path)
            .with_context(|| format!("Failed to load symbols from {}", symbols_path.display()))?
            .with_load_bias(bias);

        let layout = match &args.layout {
            Some(path) => config::load_layout(path)?,
            None => config.layout.clone(),
        };

        let mut limits = Limits::default();
        if let Some(max) = args.max_queue_length.or(config.max_queue_length) {
            limits.max_queue_length = max;
        }

        tracing::debug!(symbols = symbols.len(), load_bias = bias, "session ready");

        Ok(Self {
            source,
            symbols,
            layout,
            limits,
            cancel: Cancellation::new(),
        })
    }

    pub fn target(&self) -> Target<'_> {
        Target::new(self.source.as_memory(), &self.symbols, &self.layout).with_limits(self.limits)
    }

    /// Let Ctrl-C abort long traversals instead of killing the process
    pub fn install_interrupt_handler(&self) -> Result<()> {
        let cancel = self.cancel.clone();
        ctrlc::set_handler(move || cancel.cancel())
            .context("signal handler setup failed")
    }
}
