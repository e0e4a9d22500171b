//! Catalogue of the input streams a sweep can run against.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A named input stream: a packet/video trace file, or the executable's
/// synthetic Zipfian generator at a given skew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    UclaUdp,
    UclaTcp,
    YouTube,
    Zipf1,
    Zipf07,
    Zipf13,
    Caida,
    SanJose,
}

/// What a dataset adds to every invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationParameters {
    /// `None` means synthetic input.
    pub trace: Option<PathBuf>,
    /// `None` keeps the executable's default skew of 1.0.
    pub skew: Option<f64>,
}

impl Dataset {
    pub const ALL: [Dataset; 8] = [
        Dataset::UclaUdp,
        Dataset::UclaTcp,
        Dataset::YouTube,
        Dataset::Zipf1,
        Dataset::Zipf07,
        Dataset::Zipf13,
        Dataset::Caida,
        Dataset::SanJose,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dataset::UclaUdp => "UCLA-UDP",
            Dataset::UclaTcp => "UCLA-TCP",
            Dataset::YouTube => "YouTube",
            Dataset::Zipf1 => "Zipf1",
            Dataset::Zipf07 => "Zipf0.7",
            Dataset::Zipf13 => "Zipf1.3",
            Dataset::Caida => "CAIDA",
            Dataset::SanJose => "SanJose",
        }
    }

    fn trace_file(&self) -> Option<&'static str> {
        match self {
            Dataset::UclaUdp => Some("UCLA_UDP_trace"),
            Dataset::UclaTcp => Some("UCLA_TCP_trace"),
            Dataset::YouTube => Some("YoutubeDS.txt"),
            Dataset::Caida => Some("equinix-chicago.dirA.20151217-125911.UTC.anon.trace"),
            Dataset::SanJose => Some("equinix-sanjose.dirA.20140619-125904.UTC.anon.trace"),
            Dataset::Zipf1 | Dataset::Zipf07 | Dataset::Zipf13 => None,
        }
    }

    pub fn invocation_parameters(&self, data_dir: &Path) -> InvocationParameters {
        let skew = match self {
            Dataset::Zipf07 => Some(0.7),
            Dataset::Zipf13 => Some(1.3),
            _ => None,
        };
        InvocationParameters {
            trace: self.trace_file().map(|file| data_dir.join(file)),
            skew,
        }
    }

    /// Resolve a user-supplied name, falling back to `Zipf1`.
    pub fn select(name: &str) -> Dataset {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(dataset = name, "unknown dataset, using Zipf1");
            Dataset::Zipf1
        })
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDataset(pub String);

impl fmt::Display for UnknownDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown dataset `{}`", self.0)
    }
}

impl std::error::Error for UnknownDataset {}

impl FromStr for Dataset {
    type Err = UnknownDataset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Dataset::ALL
            .into_iter()
            .find(|dataset| dataset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDataset(s.to_owned()))
    }
}
