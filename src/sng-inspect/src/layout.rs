//! syslog-ng structure layouts
//!
//! Field offsets for the structures the decoders walk. The defaults match
//! an x86_64 (LP64) build of syslog-ng 4.x; a different build can override
//! any subset of them from a TOML table, e.g.
//!
//! ```toml
//! [main_loop]
//! current_configuration = 0x2f0
//!
//! [log_pipe]
//! plugin_name = 0x50
//! ```

use serde::{Deserialize, Serialize};

/// Every known structure layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub main_loop: MainLoopLayout,
    pub global_config: GlobalConfigLayout,
    pub ptr_array: PtrArrayLayout,
    pub gstring: GStringLayout,
    pub log_message: LogMessageLayout,
    pub nv_table: NvTableLayout,
    pub nv_entry: NvEntryLayout,
    pub queue_fifo: QueueFifoLayout,
    pub queue_node: QueueNodeLayout,
    pub log_pipe: LogPipeLayout,
    pub log_driver: LogDriverLayout,
    pub expr_node: ExprNodeLayout,
    pub resolved_paths: ResolvedPathsLayout,
}

// struct MainLoop {
//   ...signal/event/timer watches...
//   GlobalConfig *current_configuration;   // +0x2e8
// };
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainLoopLayout {
    pub current_configuration: usize,
}

impl Default for MainLoopLayout {
    fn default() -> Self {
        Self {
            current_configuration: 0x2e8,
        }
    }
}

/// `GlobalConfig`, with `tree` embedded by value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfigLayout {
    /// `GString *preprocess_config`
    pub preprocess_config: usize,
    /// `GString *original_config`
    pub original_config: usize,
    /// Start of the embedded `CfgTree tree`
    pub tree: usize,
    /// `GPtrArray *initialized_pipes`, relative to `tree`
    pub tree_initialized_pipes: usize,
}

impl Default for GlobalConfigLayout {
    fn default() -> Self {
        Self {
            preprocess_config: 0x1c8,
            original_config: 0x1d0,
            tree: 0x218,
            tree_initialized_pipes: 0x30,
        }
    }
}

// struct GPtrArray { gpointer *pdata; guint len; };
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PtrArrayLayout {
    pub pdata: usize,
    pub len: usize,
}

impl Default for PtrArrayLayout {
    fn default() -> Self {
        Self { pdata: 0x0, len: 0x8 }
    }
}

// struct GString { gchar *str; gsize len; gsize allocated_len; };
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GStringLayout {
    pub str: usize,
    /// `gsize len`, bytes in `str` excluding the terminator
    pub len: usize,
}

impl Default for GStringLayout {
    fn default() -> Self {
        Self { str: 0x0, len: 0x8 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogMessageLayout {
    /// `NVTable *payload`
    pub payload: usize,
}

impl Default for LogMessageLayout {
    fn default() -> Self {
        Self { payload: 0x60 }
    }
}

// struct NVTable {
//   guint32 size;                       // +0x00
//   guint32 used;                       // +0x04
//   guint16 index_size;                 // +0x08
//   guint8 num_static_entries;          // +0x0A
//   guint8 ref_cnt:7, borrowed:1;       // +0x0B
//   NVEntryOffset static_entries[0];    // +0x0C (guint32 each)
// };
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NvTableLayout {
    pub size: usize,
    pub static_entries: usize,
    /// Number of statically indexed fields the table always carries
    pub static_entry_count: usize,
}

impl Default for NvTableLayout {
    fn default() -> Self {
        Self {
            size: 0x0,
            static_entries: 0xc,
            static_entry_count: 8,
        }
    }
}

// struct NVEntry {
//   guint8 indirect:1, referenced:1, unset:1, __pad:5;  // +0x00
//   guint8 name_len;                                    // +0x01
//   guint8 type;                                        // +0x02
//   guint32 alloc_len;                                  // +0x04
//   union {
//     struct { guint32 value_len; gchar data[0]; } vdirect;  // data at +0x0C
//     struct { NVHandle handle; ... } vindirect;
//   };
// };
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NvEntryLayout {
    pub flags: usize,
    pub indirect_mask: u8,
    pub unset_mask: u8,
    pub name_len: usize,
    /// `vdirect.data`: the inline `name NUL value NUL` bytes
    pub data: usize,
}

impl Default for NvEntryLayout {
    fn default() -> Self {
        Self {
            flags: 0x0,
            indirect_mask: 0x01,
            unset_mask: 0x04,
            name_len: 0x1,
            data: 0xc,
        }
    }
}

/// `LogQueueFifo`: two `iv_list_head` subqueues and their `gint` counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueFifoLayout {
    pub qoverflow_output: usize,
    pub qoverflow_wait: usize,
    pub qoverflow_wait_len: usize,
    pub qoverflow_output_len: usize,
}

impl Default for QueueFifoLayout {
    fn default() -> Self {
        Self {
            qoverflow_output: 0x118,
            qoverflow_wait: 0x128,
            qoverflow_wait_len: 0x138,
            qoverflow_output_len: 0x13c,
        }
    }
}

// struct LogMessageQueueNode {
//   struct iv_list_head list;   // +0x00 (next, prev)
//   LogMessage *msg;            // +0x10
//   ...
// };
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueNodeLayout {
    pub next: usize,
    pub msg: usize,
}

impl Default for QueueNodeLayout {
    fn default() -> Self {
        Self {
            next: 0x0,
            msg: 0x10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogPipeLayout {
    /// `const gchar *plugin_name`
    pub plugin_name: usize,
    /// `LogExprNode *expr_node`
    pub expr_node: usize,
}

impl Default for LogPipeLayout {
    fn default() -> Self {
        Self {
            plugin_name: 0x48,
            expr_node: 0x40,
        }
    }
}

/// `LogDriver` starts with an embedded `LogPipe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogDriverLayout {
    /// `gchar *id`
    pub id: usize,
}

impl Default for LogDriverLayout {
    fn default() -> Self {
        Self { id: 0xa8 }
    }
}

// struct LogExprNode {
//   gint layout, content; guint32 flags;
//   gchar *name;
//   LogExprNode *children, *next, *parent;
//   gpointer object, aux; GDestroyNotify aux_destroy;
//   gchar *filename;            // +0x48
//   gint line, column;          // +0x50, +0x54
// };
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExprNodeLayout {
    pub filename: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for ExprNodeLayout {
    fn default() -> Self {
        Self {
            filename: 0x48,
            line: 0x50,
            column: 0x54,
        }
    }
}

/// `resolvedConfigurablePaths`: four `const gchar *` members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvedPathsLayout {
    pub cfgfilename: usize,
    pub persist_file: usize,
    pub ctlfilename: usize,
    pub initial_module_path: usize,
}

impl Default for ResolvedPathsLayout {
    fn default() -> Self {
        Self {
            cfgfilename: 0x0,
            persist_file: 0x8,
            ctlfilename: 0x10,
            initial_module_path: 0x18,
        }
    }
}
