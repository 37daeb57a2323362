//! 字节源抽象与文件类适配器（整读 / 内存映射）
//!
//! 所有策略只通过 `ByteSource` 读取数据，不关心字节来自哪种后端：
//! - `FlatSource`：整文件读入自有缓冲区
//! - `MappedSource`：只读内存映射，映射随值析构释放
//! - `StoreSource`（见 store.rs）：B-tree 键值存储的记录值按迭代顺序拼接
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::error::{Result, ScanError};

/// 字节源的来源类型（仅用于诊断输出）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Flat,
    Mapped,
    Store,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Flat => "flat",
            SourceKind::Mapped => "mmap",
            SourceKind::Store => "store",
        }
    }
}

/// 只读、定长、可随机访问的字节序列
///
/// 实现者只需提供 `as_bytes`；长度与带边界检查的访问由默认方法给出。
/// 长度为 0 的字节源合法，所有访问都返回 `OutOfRange`。
pub trait ByteSource: Send + Sync {
    fn as_bytes(&self) -> &[u8];

    fn kind(&self) -> SourceKind;

    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 取 `[offset, offset + count)`；越界（含加法溢出）返回 `OutOfRange`
    fn slice(&self, offset: usize, count: usize) -> Result<&[u8]> {
        let len = self.len();
        match offset.checked_add(count) {
            Some(end) if end <= len => Ok(&self.as_bytes()[offset..end]),
            _ => Err(ScanError::OutOfRange { offset, count, len }),
        }
    }

    fn byte_at(&self, offset: usize) -> Result<u8> {
        self.as_bytes()
            .get(offset)
            .copied()
            .ok_or(ScanError::OutOfRange { offset, count: 1, len: self.len() })
    }
}

/// 确认路径存在且为普通文件
pub(crate) fn ensure_regular_file(path: &Path) -> Result<()> {
    let md = std::fs::metadata(path).map_err(|e| ScanError::io(path, e))?;
    if !md.is_file() {
        return Err(ScanError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }
    Ok(())
}

/// 整读适配器：文件内容全部进入自有缓冲区
#[derive(Debug, Clone)]
pub struct FlatSource {
    path: Option<PathBuf>,
    buf: Vec<u8>,
}

impl FlatSource {
    pub fn open(path: &Path) -> Result<Self> {
        ensure_regular_file(path)?;
        let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).map_err(|e| ScanError::io(path, e))?;
        debug!(path = %path.display(), len = buf.len(), "flat source loaded");
        Ok(Self { path: Some(path.to_path_buf()), buf })
    }

    /// 直接包装内存缓冲区（测试与嵌入调用使用）
    pub fn from_bytes(buf: Vec<u8>) -> Self {
        Self { path: None, buf }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl ByteSource for FlatSource {
    fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Flat
    }
}

/// 内存映射适配器
///
/// 零长度文件直接拒绝：空映射在部分平台上会失败，且空结果应与映射失败区分开。
#[derive(Debug)]
pub struct MappedSource {
    path: PathBuf,
    mmap: Mmap,
}

impl MappedSource {
    pub fn open(path: &Path) -> Result<Self> {
        ensure_regular_file(path)?;
        let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
        let len = file.metadata().map_err(|e| ScanError::io(path, e))?.len();
        if len == 0 {
            return Err(ScanError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "refusing zero-length mapping"),
            ));
        }
        // SAFETY: 映射只读；外部进程并发截断文件属于调用方约定之外的情况
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| ScanError::io(path, e))?;
        debug!(path = %path.display(), len = mmap.len(), "mapped source ready");
        Ok(Self { path: path.to_path_buf(), mmap })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for MappedSource {
    fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Mapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use std::io::Write;

    #[test]
    fn slice_and_byte_at_are_bounds_checked() {
        let src = FlatSource::from_bytes(vec![1, 2, 3, 4]);
        assert_eq!(src.len(), 4);
        assert_eq!(src.slice(1, 3).unwrap(), &[2, 3, 4]);
        assert_eq!(src.slice(4, 0).unwrap(), &[] as &[u8]);
        assert_eq!(src.byte_at(3).unwrap(), 4);

        let err = src.slice(2, 3).unwrap_err();
        assert_eq!(err.class(), ErrorClass::OutOfRange);
        assert!(matches!(src.byte_at(4), Err(ScanError::OutOfRange { offset: 4, .. })));
        assert!(matches!(src.slice(usize::MAX, 2), Err(ScanError::OutOfRange { .. })));
    }

    #[test]
    fn empty_source_is_valid_but_unreadable() {
        let src = FlatSource::from_bytes(Vec::new());
        assert!(src.is_empty());
        assert!(src.byte_at(0).is_err());
        assert!(src.slice(0, 1).is_err());
    }

    #[test]
    fn flat_source_reads_whole_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wallet.dat");
        std::fs::write(&path, [0xFFu8, 0xA1, 0xB2, 0xC3, 0xD4, 0xE5]).unwrap();

        let src = FlatSource::open(&path).expect("open");
        assert_eq!(src.kind(), SourceKind::Flat);
        assert_eq!(src.as_bytes(), &[0xFF, 0xA1, 0xB2, 0xC3, 0xD4, 0xE5]);
        assert_eq!(src.path(), Some(path.as_path()));
    }

    #[test]
    fn flat_source_rejects_directory_and_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = FlatSource::open(dir.path()).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Io);

        let err = FlatSource::open(&dir.path().join("missing.dat")).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Io);
    }

    #[test]
    fn mapped_source_matches_file_contents() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"\x00\x01\x02\x03\x04\x05\x06").unwrap();
        file.flush().unwrap();

        let src = MappedSource::open(file.path()).expect("map");
        assert_eq!(src.kind(), SourceKind::Mapped);
        assert_eq!(src.len(), 7);
        assert_eq!(src.slice(2, 5).unwrap(), &[2, 3, 4, 5, 6]);
    }

    #[test]
    fn mapped_source_rejects_zero_length_file() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let err = MappedSource::open(file.path()).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Io);
        assert!(matches!(err, ScanError::Io { .. }));
    }
}
