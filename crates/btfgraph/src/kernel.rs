//! Kernel and module spec loading with a cached base spec.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use btfgraph_format::decode_split;

use crate::{Error, Result, Spec, SpecOptions, compose_module};

/// Where the sysfs BTF files of a running kernel live.
pub const SYSFS_BTF_DIR: &str = "/sys/kernel/btf";

/// Supplies raw BTF bytes for the kernel and its modules.
pub trait KernelSource: Send + Sync {
    /// Self-contained BTF of the kernel image.
    fn kernel_btf(&self) -> Result<Vec<u8>>;

    /// Split BTF of module `name`, layered on the kernel BTF.
    fn module_btf(&self, name: &str) -> Result<Vec<u8>>;
}

/// Reads `<dir>/vmlinux` and `<dir>/<module>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsSource {
    dir: PathBuf,
}

impl SysfsSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self, file: &str) -> Result<Vec<u8>> {
        let path = self.dir.join(file);
        fs::read(&path).map_err(|source| Error::Io {
            what: path.display().to_string(),
            source,
        })
    }
}

impl Default for SysfsSource {
    fn default() -> Self {
        Self::new(SYSFS_BTF_DIR)
    }
}

impl KernelSource for SysfsSource {
    fn kernel_btf(&self) -> Result<Vec<u8>> {
        self.read("vmlinux")
    }

    /// Reads `<dir>/<name>`. Names that could leave `dir` are rejected.
    fn module_btf(&self, name: &str) -> Result<Vec<u8>> {
        if matches!(name, "" | "." | "..") || name.contains(std::path::is_separator) {
            return Err(Error::InvalidModuleName(name.to_owned()));
        }
        self.read(name)
    }
}

/// Loads kernel and module specs from a [`KernelSource`], decoding the
/// kernel spec at most once until [`flush`](Self::flush).
///
/// The lock is held across the decode, so concurrent first callers wait for
/// one load and then share its result. Failed loads are not cached.
pub struct KernelSpecs<S> {
    source: S,
    base: Mutex<Option<Arc<Spec>>>,
}

impl<S: KernelSource> KernelSpecs<S> {
    pub const fn new(source: S) -> Self {
        Self {
            source,
            base: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The full kernel spec, decoded on first use.
    pub fn kernel_spec(&self) -> Result<Arc<Spec>> {
        let mut base = self.base.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(spec) = base.as_ref() {
            return Ok(Arc::clone(spec));
        }

        let bytes = self.source.kernel_btf()?;
        let spec = Arc::new(Spec::from_bytes(&bytes, &SpecOptions::default())?);
        log::debug!("loaded kernel spec with {} types", spec.len());

        *base = Some(Arc::clone(&spec));
        Ok(spec)
    }

    /// The kernel spec filtered by `options`. Only the full spec is cached.
    pub fn kernel_spec_with_options(&self, options: &SpecOptions) -> Result<Spec> {
        self.kernel_spec()?.filtered(options)
    }

    /// The spec of module `name`: kernel types followed by the module's own.
    pub fn module_spec(&self, name: &str) -> Result<Spec> {
        let base = self.kernel_spec()?;
        let bytes = self.source.module_btf(name)?;
        let split = decode_split(&bytes)?;
        compose_module(&base, &split)
    }

    /// Drop the cached kernel spec. Specs handed out earlier stay valid.
    pub fn flush(&self) {
        let mut base = self.base.lock().unwrap_or_else(PoisonError::into_inner);
        *base = None;
    }
}

static KERNEL: LazyLock<KernelSpecs<SysfsSource>> =
    LazyLock::new(|| KernelSpecs::new(SysfsSource::default()));

/// The running kernel's spec from sysfs, cached for the process.
pub fn load_kernel_spec() -> Result<Arc<Spec>> {
    KERNEL.kernel_spec()
}

pub fn load_kernel_spec_with_options(options: &SpecOptions) -> Result<Spec> {
    KERNEL.kernel_spec_with_options(options)
}

/// The spec of a loaded module, composed on the cached kernel spec.
pub fn load_kernel_module_spec(name: &str) -> Result<Spec> {
    KERNEL.module_spec(name)
}

pub fn flush_kernel_spec() {
    KERNEL.flush();
}
