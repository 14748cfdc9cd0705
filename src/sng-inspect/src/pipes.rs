//! Pipeline object registry
//!
//! The running configuration keeps every initialized `LogPipe` in
//! `tree.initialized_pipes`, a `GPtrArray` whose slots may be null. Pipes
//! that carry a plugin name are drivers (`LogDriver` embeds `LogPipe`) and
//! have an id and a source location worth showing.

use crate::address::{kind, Address};
use crate::error::{Error, Result};
use crate::instance::current_config;
use crate::target::Target;
use crate::walk::Cancellation;
use std::fmt;

const POINTER_SIZE: usize = 8;

/// The `initialized_pipes` array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeTable {
    pub pdata: Address<kind::Raw>,
    pub len: usize,
}

impl PipeTable {
    /// Find the table of the running configuration
    pub fn locate(target: &Target<'_>) -> Result<Self> {
        let config = current_config(target)?;
        let layout = &target.layout().global_config;
        let array = target.read_non_null(
            config,
            layout.tree + layout.tree_initialized_pipes,
            "initialized_pipes",
        )?;
        Self::read(target, array)
    }

    pub fn read(target: &Target<'_>, array: Address<kind::PtrArray>) -> Result<Self> {
        let layout = &target.layout().ptr_array;
        let pdata = target.read_ptr(array, layout.pdata)?;
        let len = target.read_u32(array, layout.len)? as usize;

        if pdata.is_null() && len > 0 {
            return Err(Error::NullPointer {
                what: "initialized_pipes pdata",
            });
        }

        Ok(Self { pdata, len })
    }

    fn slot(&self, index: usize) -> Address<kind::Raw> {
        self.pdata.field(index * POINTER_SIZE)
    }
}

/// Whether a pipe is a plain pipe or a plugin-backed driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeKind {
    Plain,
    Plugin(String),
}

impl PipeKind {
    /// A pipe is a driver exactly when it has a non-empty plugin name
    pub fn classify(plugin_name: Option<String>) -> Self {
        match plugin_name {
            Some(name) if !name.is_empty() => PipeKind::Plugin(name),
            _ => PipeKind::Plain,
        }
    }
}

/// Where a driver was declared in the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: i32,
    pub column: i32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Identity of a plugin-backed pipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverView {
    pub id: Option<String>,
    pub plugin_name: String,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeView {
    Plain,
    Driver(DriverView),
}

impl PipeView {
    /// Classify the pipe at `pipe` and, for drivers, read their identity
    pub fn read(target: &Target<'_>, pipe: Address<kind::LogPipe>) -> Result<Self> {
        let layout = target.layout();
        let plugin_name = target.read_string_field(pipe, layout.log_pipe.plugin_name)?;

        let plugin_name = match PipeKind::classify(plugin_name) {
            PipeKind::Plain => return Ok(PipeView::Plain),
            PipeKind::Plugin(name) => name,
        };

        let driver: Address<kind::LogDriver> = pipe.cast();
        let id = target.read_string_field(driver, layout.log_driver.id)?;
        let location = read_location(target, pipe)?;

        Ok(PipeView::Driver(DriverView {
            id,
            plugin_name,
            location,
        }))
    }
}

fn read_location(
    target: &Target<'_>,
    pipe: Address<kind::LogPipe>,
) -> Result<Option<SourceLocation>> {
    let layout = target.layout();
    let node: Address<kind::ExprNode> = target.read_ptr(pipe, layout.log_pipe.expr_node)?;
    if node.is_null() {
        return Ok(None);
    }

    let file = match target.read_string_field(node, layout.expr_node.filename)? {
        Some(file) if !file.is_empty() => file,
        _ => return Ok(None),
    };

    Ok(Some(SourceLocation {
        file,
        line: target.read_i32(node, layout.expr_node.line)?,
        column: target.read_i32(node, layout.expr_node.column)?,
    }))
}

/// One listed driver, or the reason its slot could not be read
#[derive(Debug)]
pub struct PipeRow {
    pub index: usize,
    pub driver: Result<DriverView>,
}

/// List the driver slots of `table` in index order
///
/// Null slots and plain pipes are skipped, so indices are sparse. A slot
/// that cannot be read, either the slot pointer or the pipe behind it, is
/// listed with its error and the listing carries on.
pub fn list_pipes(
    target: &Target<'_>,
    table: &PipeTable,
    cancel: &Cancellation,
) -> Result<Vec<PipeRow>> {
    let mut rows = Vec::new();

    for index in 0..table.len {
        cancel.check()?;

        match read_slot(target, table, index) {
            Ok(None) => {}
            Ok(Some(driver)) => rows.push(PipeRow {
                index,
                driver: Ok(driver),
            }),
            Err(e) => {
                let slot = table.slot(index);
                tracing::warn!(index, slot = %slot, error = %e, "unreadable pipe slot");
                rows.push(PipeRow {
                    index,
                    driver: Err(e),
                });
            }
        }
    }

    Ok(rows)
}

/// The driver stored in slot `index`, or `None` for null slots and plain pipes
fn read_slot(
    target: &Target<'_>,
    table: &PipeTable,
    index: usize,
) -> Result<Option<DriverView>> {
    let pipe: Address<kind::LogPipe> = target.read_ptr(table.slot(index), 0)?;
    if pipe.is_null() {
        return Ok(None);
    }

    match PipeView::read(target, pipe)? {
        PipeView::Plain => Ok(None),
        PipeView::Driver(driver) => Ok(Some(driver)),
    }
}

/// Raw slot `index` of `table`, not reinterpreted
///
/// The index is checked before any memory is touched. Plain pipes are
/// reachable here even though `list_pipes` hides them.
pub fn get_pipe(
    target: &Target<'_>,
    table: &PipeTable,
    index: usize,
) -> Result<Address<kind::LogPipe>> {
    if index >= table.len {
        return Err(Error::InvalidIndex {
            index,
            len: table.len,
        });
    }

    target.read_ptr(table.slot(index), 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::fixtures::{write_instance, CONFIG};
    use crate::layout::Layout;
    use crate::source::MockMemorySource;
    use crate::symbols::SymbolTable;

    const BASE: usize = 0x10000;
    const ARRAY: usize = 0x12000;
    const PDATA: usize = 0x12100;

    struct PipeFixture<'a> {
        plugin: Option<&'a str>,
        id: Option<&'a str>,
        location: Option<(&'a str, i32, i32)>,
    }

    fn write_pipe(
        source: &mut MockMemorySource,
        layout: &Layout,
        at: usize,
        pipe: &PipeFixture<'_>,
    ) {
        let strings = at + 0x200;
        if let Some(plugin) = pipe.plugin {
            source.write_ptr(at + layout.log_pipe.plugin_name, strings);
            source.write_cstring(strings, plugin);
        }
        if let Some(id) = pipe.id {
            source.write_ptr(at + layout.log_driver.id, strings + 0x40);
            source.write_cstring(strings + 0x40, id);
        }
        if let Some((file, line, column)) = pipe.location {
            let node = at + 0x100;
            source.write_ptr(at + layout.log_pipe.expr_node, node);
            source.write_ptr(node + layout.expr_node.filename, strings + 0x80);
            source.write_cstring(strings + 0x80, file);
            source.write_i32(node + layout.expr_node.line, line);
            source.write_i32(node + layout.expr_node.column, column);
        }
    }

    /// Build the five-slot table
    /// `[null, pluginA/id="x", null, plain, pluginB/no id]`
    fn scenario() -> (MockMemorySource, SymbolTable, Layout) {
        let layout = Layout::default();
        let mut source = MockMemorySource::zeroed(BASE, 0x8000);
        let symbols = write_instance(&mut source, &layout);

        let g = &layout.global_config;
        source.write_ptr(CONFIG + g.tree + g.tree_initialized_pipes, ARRAY);
        source.write_ptr(ARRAY + layout.ptr_array.pdata, PDATA);
        source.write_u32(ARRAY + layout.ptr_array.len, 5);

        let pipes = [
            (
                1,
                0x13000,
                PipeFixture {
                    plugin: Some("pluginA"),
                    id: Some("x"),
                    location: Some(("/etc/syslog-ng.conf", 12, 5)),
                },
            ),
            (
                3,
                0x14000,
                PipeFixture {
                    plugin: None,
                    id: None,
                    location: None,
                },
            ),
            (
                4,
                0x15000,
                PipeFixture {
                    plugin: Some("pluginB"),
                    id: None,
                    location: None,
                },
            ),
        ];
        for (slot, at, pipe) in &pipes {
            source.write_ptr(PDATA + slot * 8, *at);
            write_pipe(&mut source, &layout, *at, pipe);
        }

        (source, symbols, layout)
    }

    #[test]
    fn test_classify() {
        assert_eq!(PipeKind::classify(None), PipeKind::Plain);
        assert_eq!(PipeKind::classify(Some(String::new())), PipeKind::Plain);
        assert_eq!(
            PipeKind::classify(Some("file".to_string())),
            PipeKind::Plugin("file".to_string())
        );
    }

    #[test]
    fn test_list_skips_null_and_plain_slots() {
        let (source, symbols, layout) = scenario();
        let target = Target::new(&source, &symbols, &layout);
        let table = PipeTable::locate(&target).unwrap();
        assert_eq!(table.len, 5);

        let rows = list_pipes(&target, &table, &Cancellation::new()).unwrap();
        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 4]);

        let first = rows[0].driver.as_ref().unwrap();
        assert_eq!(first.id.as_deref(), Some("x"));
        assert_eq!(first.plugin_name, "pluginA");
        assert_eq!(
            first.location.as_ref().map(|l| l.to_string()).as_deref(),
            Some("/etc/syslog-ng.conf:12:5")
        );

        let second = rows[1].driver.as_ref().unwrap();
        assert_eq!(second.id, None);
        assert_eq!(second.plugin_name, "pluginB");
        assert_eq!(second.location, None);
    }

    #[test]
    fn test_empty_filename_means_unknown_location() {
        let (mut source, symbols, layout) = scenario();
        let node = 0x15000 + 0x100;
        source.write_ptr(0x15000 + layout.log_pipe.expr_node, node);
        source.write_ptr(node + layout.expr_node.filename, 0x15300);
        source.write_cstring(0x15300, "");

        let target = Target::new(&source, &symbols, &layout);
        let view = PipeView::read(&target, Address::new(0x15000)).unwrap();
        match view {
            PipeView::Driver(driver) => assert_eq!(driver.location, None),
            PipeView::Plain => panic!("expected a driver"),
        }
    }

    #[test]
    fn test_unreadable_slot_does_not_abort_listing() {
        let (mut source, symbols, layout) = scenario();
        // Slot 2 now points outside the image
        source.write_ptr(PDATA + 2 * 8, 0xdead_0000);

        let target = Target::new(&source, &symbols, &layout);
        let table = PipeTable::locate(&target).unwrap();
        let rows = list_pipes(&target, &table, &Cancellation::new()).unwrap();

        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 4]);
        assert!(rows[1].driver.as_ref().unwrap_err().is_memory_access());
    }

    #[test]
    fn test_unmapped_slot_array_reports_every_row() {
        let (source, symbols, layout) = scenario();
        let target = Target::new(&source, &symbols, &layout);
        let table = PipeTable {
            pdata: Address::new(0xdead_0000),
            len: 2,
        };

        let rows = list_pipes(&target, &table, &Cancellation::new()).unwrap();
        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert!(rows.iter().all(|r| r.driver.is_err()));
    }

    #[test]
    fn test_slots_past_mapping_keep_earlier_rows() {
        let layout = Layout::default();
        let mut source = MockMemorySource::zeroed(BASE, 0x1000);
        let symbols = SymbolTable::new();

        // Two slots fit before the end of the image, the third does not
        let pdata = BASE + 0x1000 - 16;
        let driver = BASE + 0x100;
        source.write_ptr(pdata + 8, driver);
        write_pipe(
            &mut source,
            &layout,
            driver,
            &PipeFixture {
                plugin: Some("file"),
                id: Some("d_file"),
                location: None,
            },
        );

        let target = Target::new(&source, &symbols, &layout);
        let table = PipeTable {
            pdata: Address::new(pdata),
            len: 3,
        };

        let rows = list_pipes(&target, &table, &Cancellation::new()).unwrap();
        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2]);

        let first = rows[0].driver.as_ref().unwrap();
        assert_eq!(first.plugin_name, "file");
        assert_eq!(first.id.as_deref(), Some("d_file"));
        assert!(rows[1].driver.as_ref().unwrap_err().is_memory_access());
    }

    #[test]
    fn test_cancelled_listing() {
        let (source, symbols, layout) = scenario();
        let target = Target::new(&source, &symbols, &layout);
        let table = PipeTable::locate(&target).unwrap();
        let cancel = Cancellation::new();
        cancel.cancel();

        assert!(matches!(
            list_pipes(&target, &table, &cancel),
            Err(Error::Interrupted)
        ));
    }

    #[test]
    fn test_get_pipe_returns_raw_slot_including_plain() {
        let (source, symbols, layout) = scenario();
        let target = Target::new(&source, &symbols, &layout);
        let table = PipeTable::locate(&target).unwrap();

        assert_eq!(get_pipe(&target, &table, 3).unwrap().value(), 0x14000);
        assert!(get_pipe(&target, &table, 0).unwrap().is_null());
    }

    #[test]
    fn test_get_pipe_out_of_range_reads_nothing() {
        let (source, symbols, layout) = scenario();
        let target = Target::new(&source, &symbols, &layout);
        let table = PipeTable::locate(&target).unwrap();
        let before = source.read_count();

        let err = get_pipe(&target, &table, 7).unwrap_err();
        assert!(matches!(err, Error::InvalidIndex { index: 7, len: 5 }));
        assert_eq!(source.read_count(), before);
    }

    #[test]
    fn test_null_pdata_with_entries_is_rejected() {
        let layout = Layout::default();
        let mut source = MockMemorySource::zeroed(BASE, 0x100);
        source.write_u32(BASE + layout.ptr_array.len, 3);

        let symbols = SymbolTable::new();
        let target = Target::new(&source, &symbols, &layout);
        assert!(matches!(
            PipeTable::read(&target, Address::new(BASE)),
            Err(Error::NullPointer { .. })
        ));
    }

    #[test]
    fn test_listing_is_idempotent() {
        let (source, symbols, layout) = scenario();
        let target = Target::new(&source, &symbols, &layout);
        let table = PipeTable::locate(&target).unwrap();

        let once: Vec<_> = list_pipes(&target, &table, &Cancellation::new())
            .unwrap()
            .into_iter()
            .map(|r| (r.index, r.driver.ok()))
            .collect();
        let twice: Vec<_> = list_pipes(&target, &table, &Cancellation::new())
            .unwrap()
            .into_iter()
            .map(|r| (r.index, r.driver.ok()))
            .collect();
        assert_eq!(once, twice);
    }
}
