//! Bundle catalog: hardware families and the bundle filenames they require.
//!
//! The infrastructure bundle filename depends on the controller's hardware
//! family; B-series and C-series bundle filenames are fixed. The catalog
//! never guesses: an unmapped family code is a typed error that fails only
//! that target's infrastructure handling.

use serde::Serialize;
use thiserror::Error;

use crate::version::VersionSpec;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown hardware family code {0}")]
    UnknownFamily(u32),
}

/// Product lines with distinct infrastructure bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HardwareFamily {
    Series6200,
    Series6300,
    Series6400,
}

impl HardwareFamily {
    /// Resolve a raw family code reported by a managed domain.
    pub fn from_code(code: u32) -> Result<Self, CatalogError> {
        match code {
            6200 => Ok(Self::Series6200),
            6300 => Ok(Self::Series6300),
            6400 => Ok(Self::Series6400),
            other => Err(CatalogError::UnknownFamily(other)),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::Series6200 => 6200,
            Self::Series6300 => 6300,
            Self::Series6400 => 6400,
        }
    }

    pub const ALL: [HardwareFamily; 3] = [
        HardwareFamily::Series6200,
        HardwareFamily::Series6300,
        HardwareFamily::Series6400,
    ];
}

/// Logical bundle kinds, in submission priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleKind {
    Infrastructure,
    BSeries,
    CSeries,
}

impl BundleKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Infrastructure => "infra",
            Self::BSeries => "b-series",
            Self::CSeries => "c-series",
        }
    }
}

/// Which bundle kinds a run should stage. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleSelection {
    pub infrastructure: bool,
    pub b_series: bool,
    pub c_series: bool,
}

impl Default for BundleSelection {
    fn default() -> Self {
        Self {
            infrastructure: true,
            b_series: true,
            c_series: true,
        }
    }
}

impl BundleSelection {
    pub fn is_empty(&self) -> bool {
        !self.infrastructure && !self.b_series && !self.c_series
    }
}

/// One bundle a target requires, with its resolved filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    pub kind: BundleKind,
    pub filename: String,
}

/// Infrastructure bundle filename for a hardware family.
pub fn infra_filename(family: HardwareFamily, version: &VersionSpec) -> String {
    let version = version.filename_notation();
    match family {
        HardwareFamily::Series6200 => format!("fw-k9-bundle-infra.{version}.A.bin"),
        HardwareFamily::Series6300 => format!("fw-6300-k9-bundle-infra.{version}.A.bin"),
        HardwareFamily::Series6400 => format!("fw-6400-k9-bundle-infra.{version}.A.bin"),
    }
}

/// B-series bundle filename. Independent of hardware family.
pub fn b_series_filename(version: &VersionSpec) -> String {
    format!("fw-k9-bundle-b-series.{}.B.bin", version.filename_notation())
}

/// C-series bundle filename. Independent of hardware family.
pub fn c_series_filename(version: &VersionSpec) -> String {
    format!("fw-k9-bundle-c-series.{}.C.bin", version.filename_notation())
}

/// Compute the ordered bundle requests for one target.
///
/// The returned order is fixed (infrastructure, B-series, C-series) and
/// governs submission order. The infrastructure bundle is included only when
/// selected and the target's family is known; callers that failed to resolve
/// the family record that failure separately and still receive the
/// family-independent bundles.
pub fn required_bundles(
    selection: &BundleSelection,
    family: Option<HardwareFamily>,
    version: &VersionSpec,
) -> Vec<BundleRequest> {
    let mut bundles = Vec::new();

    if selection.infrastructure
        && let Some(family) = family
    {
        bundles.push(BundleRequest {
            kind: BundleKind::Infrastructure,
            filename: infra_filename(family, version),
        });
    }
    if selection.b_series {
        bundles.push(BundleRequest {
            kind: BundleKind::BSeries,
            filename: b_series_filename(version),
        });
    }
    if selection.c_series {
        bundles.push(BundleRequest {
            kind: BundleKind::CSeries,
            filename: c_series_filename(version),
        });
    }

    bundles
}
