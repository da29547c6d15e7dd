//! Host platform detection and logical platform naming.
//!
//! The raw platform is expressed as `cpu-os[-version]` (e.g. `x86_64-linux`,
//! `arm64-darwin-21`, `x64-mswin64`). Download locations rarely use those raw
//! names, so both parts are mapped through caller-configurable [`NameTable`]s
//! to the logical names used in templates (`x86_64` becomes `amd64`, and so on).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The raw platform of a host, as reported by the toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostPlatform {
    cpu: String,
    os: String,
    version: Option<String>,
}

impl HostPlatform {
    /// Create a platform from raw CPU and OS identifiers.
    #[must_use]
    pub fn new(cpu: impl Into<String>, os: impl Into<String>) -> Self {
        Self {
            cpu: cpu.into(),
            os: os.into(),
            version: None,
        }
    }

    /// Attach an OS version (e.g. `21` for `arm64-darwin-21`).
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Detect the platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        let cpu = match std::env::consts::ARCH {
            "aarch64" => "arm64",
            "x86" => "x86",
            "arm" => "arm",
            other => other,
        };
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            "windows" if cfg!(target_pointer_width = "64") => "mswin64",
            "windows" => "mswin32",
            other => other,
        };
        Self::new(cpu, os)
    }

    /// Parse a `cpu-os[-version]` platform string.
    ///
    /// A version glued to the OS name (`darwin21`) is split off the same way
    /// as a dash-separated one. Returns `None` when either part is missing.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().splitn(3, '-');
        let cpu = parts.next().filter(|p| !p.is_empty())?;
        let os = parts.next().filter(|p| !p.is_empty())?;
        let version = parts.next().filter(|p| !p.is_empty());

        let (os, glued_version) = split_os_version(os);
        if os.is_empty() {
            return None;
        }

        let platform = Self::new(cpu.to_lowercase(), os.to_lowercase());
        Some(match version.or(glued_version) {
            Some(v) => platform.with_version(v),
            None => platform,
        })
    }

    /// The raw CPU identifier.
    #[must_use]
    pub fn cpu(&self) -> &str {
        &self.cpu
    }

    /// The raw OS identifier.
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// The OS version, if known.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.cpu, self.os)?;
        if let Some(version) = &self.version {
            write!(f, "-{version}")?;
        }
        Ok(())
    }
}

fn split_os_version(os: &str) -> (&str, Option<&str>) {
    let split = os.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    // mswin32/mswin64 and mingw32 carry their word size in the name, not a version
    if split == os.len() || os.starts_with("mswin") || os.starts_with("mingw") {
        (os, None)
    } else {
        (&os[..split], Some(&os[split..]))
    }
}

/// Lookup table from a raw platform identifier to a logical name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameTable(BTreeMap<String, String>);

impl NameTable {
    /// Build a table from `(raw, logical)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Built-in CPU names.
    #[must_use]
    pub fn default_cpu() -> Self {
        Self::from_pairs([
            ("x86_64", "amd64"),
            ("x64", "amd64"),
            ("x86", "386"),
            ("arm", "arm"),
            ("arm64", "arm64"),
        ])
    }

    /// Built-in OS names.
    #[must_use]
    pub fn default_os() -> Self {
        Self::from_pairs([
            ("darwin", "darwin"),
            ("linux", "linux"),
            ("mswin32", "windows"),
            ("mswin64", "windows"),
        ])
    }

    /// Look up the logical name for a raw identifier.
    #[must_use]
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        self.0.get(raw).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The pair of lookup tables used to name a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformNames {
    cpu: NameTable,
    os: NameTable,
}

impl Default for PlatformNames {
    fn default() -> Self {
        Self {
            cpu: NameTable::default_cpu(),
            os: NameTable::default_os(),
        }
    }
}

impl PlatformNames {
    /// Replace the CPU table. The built-in entries are discarded, not merged.
    #[must_use]
    pub fn with_cpu_names(self, cpu: NameTable) -> Self {
        Self { cpu, ..self }
    }

    /// Replace the OS table. The built-in entries are discarded, not merged.
    #[must_use]
    pub fn with_os_names(self, os: NameTable) -> Self {
        Self { os, ..self }
    }

    /// Apply optional overrides on top of the defaults.
    #[must_use]
    pub fn from_overrides(cpu: Option<NameTable>, os: Option<NameTable>) -> Self {
        let names = Self::default();
        let names = match cpu {
            Some(cpu) => names.with_cpu_names(cpu),
            None => names,
        };
        match os {
            Some(os) => names.with_os_names(os),
            None => names,
        }
    }

    /// Resolve the logical names for a host.
    ///
    /// Missing entries resolve to `None`; they render as empty strings.
    #[must_use]
    pub fn resolve(&self, platform: &HostPlatform) -> ResolvedPlatform {
        ResolvedPlatform {
            os_name: self.os.lookup(platform.os()).map(str::to_string),
            cpu_name: self.cpu.lookup(platform.cpu()).map(str::to_string),
        }
    }
}

/// Logical platform names for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlatform {
    /// Logical OS name (e.g. `windows` for `mswin64`).
    pub os_name: Option<String>,
    /// Logical CPU name (e.g. `amd64` for `x86_64`).
    pub cpu_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let p = HostPlatform::parse("x86_64-linux").unwrap();
        assert_eq!(p.cpu(), "x86_64");
        assert_eq!(p.os(), "linux");
        assert_eq!(p.version(), None);
    }

    #[test]
    fn test_parse_with_version() {
        let p = HostPlatform::parse("arm64-darwin-21").unwrap();
        assert_eq!(p.os(), "darwin");
        assert_eq!(p.version(), Some("21"));
        assert_eq!(p.to_string(), "arm64-darwin-21");
    }

    #[test]
    fn test_parse_glued_version() {
        let p = HostPlatform::parse("universal-darwin19").unwrap();
        assert_eq!(p.os(), "darwin");
        assert_eq!(p.version(), Some("19"));
    }

    #[test]
    fn test_parse_mswin_keeps_word_size() {
        let p = HostPlatform::parse("x64-mswin64-140").unwrap();
        assert_eq!(p.os(), "mswin64");
        assert_eq!(p.version(), Some("140"));
    }

    #[test]
    fn test_parse_mingw_keeps_word_size() {
        let p = HostPlatform::parse("x64-mingw32").unwrap();
        assert_eq!(p.cpu(), "x64");
        assert_eq!(p.os(), "mingw32");
        assert_eq!(p.version(), None);

        let p = HostPlatform::parse("x64-mingw-ucrt").unwrap();
        assert_eq!(p.os(), "mingw");
        assert_eq!(p.version(), Some("ucrt"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(HostPlatform::parse("linux").is_none());
        assert!(HostPlatform::parse("-linux").is_none());
        assert!(HostPlatform::parse("x86_64-").is_none());
    }

    #[test]
    fn test_current_platform() {
        let p = HostPlatform::current();
        assert!(!p.cpu().is_empty());
        assert!(!p.os().is_empty());
    }

    #[test]
    fn test_default_tables() {
        let names = PlatformNames::default();
        let resolved = names.resolve(&HostPlatform::new("x86_64", "linux"));
        assert_eq!(resolved.cpu_name.as_deref(), Some("amd64"));
        assert_eq!(resolved.os_name.as_deref(), Some("linux"));

        let resolved = names.resolve(&HostPlatform::new("x86", "mswin32"));
        assert_eq!(resolved.cpu_name.as_deref(), Some("386"));
        assert_eq!(resolved.os_name.as_deref(), Some("windows"));
    }

    #[test]
    fn test_missing_entry_is_none() {
        let names = PlatformNames::default();
        let resolved = names.resolve(&HostPlatform::new("riscv64", "freebsd"));
        assert_eq!(resolved.cpu_name, None);
        assert_eq!(resolved.os_name, None);
    }

    #[test]
    fn test_caller_table_replaces_defaults() {
        let names = PlatformNames::default()
            .with_cpu_names(NameTable::from_pairs([("arm64", "aarch64")]));
        let arm = names.resolve(&HostPlatform::new("arm64", "darwin"));
        assert_eq!(arm.cpu_name.as_deref(), Some("aarch64"));

        // x86_64 was only in the built-in table
        let intel = names.resolve(&HostPlatform::new("x86_64", "darwin"));
        assert_eq!(intel.cpu_name, None);
        assert_eq!(intel.os_name.as_deref(), Some("darwin"));
    }

    #[test]
    fn test_from_overrides_without_overrides() {
        assert_eq!(
            PlatformNames::from_overrides(None, None),
            PlatformNames::default()
        );
    }
}
