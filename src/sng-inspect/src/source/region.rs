//! Memory Region Types
//!
//! Mapped ranges of the target address space, parsed from `/proc/<pid>/maps`
//! or from the sidecar file written next to a memory image.

/// A mapped memory region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    pub start: usize,
    pub end: usize,
    pub perms: String,
    /// File offset (for dumps: offset of this region inside the image)
    pub offset: usize,
    pub path: Option<String>,
}

impl MemoryRegion {
    pub fn contains(&self, address: usize) -> bool {
        address >= self.start && address < self.end
    }

    pub fn is_readable(&self) -> bool {
        self.perms.starts_with('r')
    }

    /// Parse one line of a maps listing
    ///
    /// Accepts the kernel format (`start-end perms offset dev inode path`)
    /// and the dump sidecar format (`0xSTART 0xEND SIZE FILE_OFFSET`).
    /// Blank lines and `#` comments yield `None`.
    pub fn parse_maps_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts[0].starts_with("0x") {
            if parts.len() < 4 {
                return None;
            }

            return Some(MemoryRegion {
                start: parse_hex(parts[0])?,
                end: parse_hex(parts[1])?,
                perms: "r--p".to_string(),
                offset: parse_hex(parts[3])?,
                path: None,
            });
        }

        let (start, end) = parts[0].split_once('-')?;
        Some(MemoryRegion {
            start: parse_hex(start)?,
            end: parse_hex(end)?,
            perms: parts.get(1).unwrap_or(&"").to_string(),
            offset: parts.get(2).and_then(|s| parse_hex(s)).unwrap_or(0),
            path: parts.get(5).map(|s| s.to_string()),
        })
    }
}

fn parse_hex(s: &str) -> Option<usize> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    usize::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_proc_maps_line() {
        let region = MemoryRegion::parse_maps_line(
            "55d4c2a00000-55d4c2a21000 r--p 00001000 fd:01 1234 /usr/sbin/syslog-ng",
        )
        .unwrap();

        assert_eq!(region.start, 0x55d4c2a00000);
        assert_eq!(region.end, 0x55d4c2a21000);
        assert_eq!(region.offset, 0x1000);
        assert_eq!(region.path.as_deref(), Some("/usr/sbin/syslog-ng"));
        assert!(region.is_readable());
    }

    #[test]
    fn test_parse_sidecar_line() {
        let region = MemoryRegion::parse_maps_line("0x7000 0x8000 4096 0x200").unwrap();

        assert_eq!(region.start, 0x7000);
        assert_eq!(region.end, 0x8000);
        assert_eq!(region.offset, 0x200);
        assert!(region.contains(0x7fff));
        assert!(!region.contains(0x8000));
    }

    #[test]
    fn test_parse_skips_comments_and_garbage() {
        assert!(MemoryRegion::parse_maps_line("").is_none());
        assert!(MemoryRegion::parse_maps_line("# start end size offset").is_none());
        assert!(MemoryRegion::parse_maps_line("0x7000 0x8000").is_none());
        assert!(MemoryRegion::parse_maps_line("not-a-range r--p").is_none());
    }

    #[test]
    fn test_unreadable_region() {
        let region = MemoryRegion::parse_maps_line("1000-2000 ---p 00000000 00:00 0").unwrap();
        assert!(!region.is_readable());
        assert!(region.path.is_none());
    }
}
