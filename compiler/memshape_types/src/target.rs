//! Target configuration.
//!
//! A [`Target`] fixes the machine word size, the largest alignment any
//! scalar may demand, and the cache line size used by layout analysis.
//! One target is chosen per registry/cache and never changes afterwards.

use std::fmt;
use std::str::FromStr;

/// Environment variable consulted by [`Target::from_env`].
pub const ARCH_ENV_VAR: &str = "MEMSHAPE_ARCH";

/// Default cache line size in bytes.
pub const DEFAULT_CACHE_LINE: u64 = 64;

/// Machine word size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WordSize {
    /// 32-bit targets.
    Four,
    /// 64-bit targets.
    Eight,
}

impl WordSize {
    /// Word size in bytes.
    #[inline]
    pub const fn bytes(self) -> u64 {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }
}

/// Named architecture presets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Arch {
    Amd64,
    Arm64,
    /// 32-bit x86. 8-byte scalars are only 4-byte aligned.
    I386,
}

impl Arch {
    /// Canonical short name (`amd64`, `arm64`, `386`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::I386 => "386",
        }
    }

    pub const fn word_size(self) -> WordSize {
        match self {
            Self::Amd64 | Self::Arm64 => WordSize::Eight,
            Self::I386 => WordSize::Four,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amd64" | "x86_64" | "x86-64" => Ok(Self::Amd64),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            "386" | "i386" | "i686" | "x86" => Ok(Self::I386),
            _ => Err(TargetError::UnknownArch(s.to_owned())),
        }
    }
}

/// Errors building a [`Target`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("unknown architecture `{0}` (expected amd64, arm64 or 386)")]
    UnknownArch(String),
    #[error("cache line size must be a non-zero power of two, got {0}")]
    InvalidCacheLine(u64),
}

/// Layout target: word size, scalar alignment cap, cache line size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    arch: Option<Arch>,
    word_size: WordSize,
    max_align: u64,
    cache_line: u64,
}

impl Target {
    /// Generic target for a word size.
    ///
    /// Scalars keep their natural alignment: `int64` is size 8, align 8
    /// whatever the word size.
    pub const fn new(word_size: WordSize) -> Self {
        Self {
            arch: None,
            word_size,
            max_align: 8,
            cache_line: DEFAULT_CACHE_LINE,
        }
    }

    /// Target for a named architecture. On `386` scalar alignment is
    /// capped at the word, so `int64` is size 8, align 4.
    pub const fn for_arch(arch: Arch) -> Self {
        let word_size = arch.word_size();
        Self {
            arch: Some(arch),
            word_size,
            max_align: word_size.bytes(),
            cache_line: DEFAULT_CACHE_LINE,
        }
    }

    /// Target matching the host this crate was compiled for.
    pub const fn host() -> Self {
        if cfg!(target_pointer_width = "64") {
            Self::new(WordSize::Eight)
        } else {
            Self::new(WordSize::Four)
        }
    }

    /// Target named by `MEMSHAPE_ARCH`, or the host target when unset.
    pub fn from_env() -> Result<Self, TargetError> {
        match std::env::var(ARCH_ENV_VAR) {
            Ok(value) => {
                let arch: Arch = value.parse()?;
                tracing::debug!(%arch, "target selected from environment");
                Ok(Self::for_arch(arch))
            }
            Err(_) => Ok(Self::host()),
        }
    }

    /// Override the cache line size used by layout analysis.
    pub fn with_cache_line(mut self, bytes: u64) -> Result<Self, TargetError> {
        if !bytes.is_power_of_two() {
            return Err(TargetError::InvalidCacheLine(bytes));
        }
        self.cache_line = bytes;
        Ok(self)
    }

    #[inline]
    pub const fn arch(&self) -> Option<Arch> {
        self.arch
    }

    #[inline]
    pub const fn word_size(&self) -> WordSize {
        self.word_size
    }

    /// Word size in bytes.
    #[inline]
    pub const fn word(&self) -> u64 {
        self.word_size.bytes()
    }

    /// Largest alignment a scalar may require on this target.
    #[inline]
    pub const fn max_align(&self) -> u64 {
        self.max_align
    }

    #[inline]
    pub const fn cache_line(&self) -> u64 {
        self.cache_line
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::host()
    }
}
