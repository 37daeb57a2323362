//! 后端选择：路径 + 后端类型 -> 字节源
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::options::Backend;
use crate::source::{ensure_regular_file, ByteSource, FlatSource, MappedSource};
use crate::store::StoreSource;

/// 打开字节源；先做存在性与普通文件检查，再交给具体适配器
pub fn open_source(path: &Path, backend: Backend, store_table: &str) -> Result<Box<dyn ByteSource>> {
    ensure_regular_file(path)?;
    debug!(path = %path.display(), ?backend, "opening byte source");
    Ok(match backend {
        Backend::Flat => Box::new(FlatSource::open(path)?),
        Backend::Mapped => Box::new(MappedSource::open(path)?),
        Backend::Store => Box::new(StoreSource::open_table(path, store_table)?),
    })
}
