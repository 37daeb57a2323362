//! 结构化存储适配器（SQLite 键值表，B-tree 组织）
//!
//! 以只读方式打开存储，按表的迭代顺序读取每条记录的 value，
//! 拼接成一个逻辑缓冲区。迭代开始后任意一条记录读取失败即整体失败，
//! 已拼接的部分结果直接丢弃。
use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::{Result, ScanError};
use crate::source::{ensure_regular_file, ByteSource, SourceKind};

/// 默认记录表名（钱包文件的键值表）
pub const DEFAULT_STORE_TABLE: &str = "main";

#[derive(Debug, Clone)]
pub struct StoreSource {
    path: PathBuf,
    buf: Vec<u8>,
    records: usize,
}

impl StoreSource {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_table(path, DEFAULT_STORE_TABLE)
    }

    pub fn open_table(path: &Path, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        ensure_regular_file(path)?;

        let store_err = |source: rusqlite::Error| ScanError::StoreOpen { path: path.to_path_buf(), source };
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(store_err)?;

        // 非数据库文件在 prepare 时才会报错（file is not a database），同样归为打开失败
        let sql = format!("SELECT value FROM \"{table}\"");
        let mut stmt = conn.prepare(&sql).map_err(store_err)?;
        let mut rows = stmt.query([]).map_err(store_err)?;

        let mut buf: Vec<u8> = Vec::new();
        let mut records = 0usize;
        loop {
            let row = match rows.next() {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(e) => return Err(ScanError::CorruptStore { record: records, reason: e.to_string() }),
            };
            let value = row
                .get_ref(0)
                .map_err(|e| ScanError::CorruptStore { record: records, reason: e.to_string() })?;
            match value {
                ValueRef::Blob(b) | ValueRef::Text(b) => buf.extend_from_slice(b),
                ValueRef::Null => {}
                other => {
                    return Err(ScanError::CorruptStore {
                        record: records,
                        reason: format!("value has non-byte type {:?}", other.data_type()),
                    })
                }
            }
            records += 1;
        }

        debug!(path = %path.display(), table, records, len = buf.len(), "store source materialized");
        Ok(Self { path: path.to_path_buf(), buf, records })
    }

    /// 迭代到的记录条数
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for StoreSource {
    fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Store
    }
}

/// 表名只允许普通标识符，避免拼接 SQL 时被注入
pub(crate) fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(ScanError::Config(format!("invalid store table name: {table:?}")))
    }
}
