//! 扫描配置加载（TOML）
//!
//! 配置文件全部字段可选，缺省时使用内置默认值：
//!
//! ```toml
//! [magic]
//! markers = ["a1b2", "5aa5"]
//!
//! [hex_regex]
//! pattern = "(?i)[0-9a-f]{10}"
//!
//! [store]
//! table = "main"
//! ```
use serde::Deserialize;
use std::path::Path;

use crate::engine_hex::DEFAULT_HEX_PATTERN;
use crate::engine_magic::{parse_marker, DEFAULT_MARKERS, MARKER_LEN};
use crate::error::{Result, ScanError};
use crate::store::{validate_table_name, DEFAULT_STORE_TABLE};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MagicSection {
    markers: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct HexRegexSection {
    pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StoreSection {
    table: Option<String>,
}

/// 顶层配置文件结构
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    magic: MagicSection,
    hex_regex: HexRegexSection,
    store: StoreSection,
}

/// 归一化后的扫描配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// 魔数前缀策略使用的 2 字节标记集合
    pub markers: Vec<[u8; MARKER_LEN]>,
    /// 十六进制正则策略使用的模式
    pub hex_pattern: String,
    /// 结构化存储中的记录表名
    pub store_table: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            markers: DEFAULT_MARKERS.to_vec(),
            hex_pattern: DEFAULT_HEX_PATTERN.to_string(),
            store_table: DEFAULT_STORE_TABLE.to_string(),
        }
    }
}

/// 从 TOML 配置文件加载
pub fn load_config(path: &Path) -> Result<ScanConfig> {
    let txt = std::fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
    parse_config(&txt)
}

/// 解析 TOML 文本；未给出的字段保持默认值
pub fn parse_config(txt: &str) -> Result<ScanConfig> {
    let parsed: ConfigFile = toml::from_str(txt).map_err(|e| ScanError::Config(e.to_string()))?;
    let mut cfg = ScanConfig::default();

    if let Some(markers) = parsed.magic.markers {
        if markers.is_empty() {
            return Err(ScanError::Config("magic.markers must not be empty".into()));
        }
        cfg.markers = markers.iter().map(|m| parse_marker(m)).collect::<Result<Vec<_>>>()?;
    }
    if let Some(pattern) = parsed.hex_regex.pattern {
        cfg.hex_pattern = pattern;
    }
    if let Some(table) = parsed.store.table {
        validate_table_name(&table)?;
        cfg.store_table = table;
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), ScanConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = parse_config(
            r#"
            [magic]
            markers = ["0102", "FEFF"]

            [store]
            table = "records"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.markers, vec![[0x01, 0x02], [0xFE, 0xFF]]);
        assert_eq!(cfg.store_table, "records");
        assert_eq!(cfg.hex_pattern, DEFAULT_HEX_PATTERN);
    }

    #[test]
    fn malformed_values_are_config_errors() {
        for txt in [
            "[magic]\nmarkers = [\"a1b\"]",
            "[magic]\nmarkers = []",
            "[store]\ntable = \"x; drop\"",
            "[unknown]\nkey = 1",
            "not toml at all ===",
        ] {
            let err = parse_config(txt).unwrap_err();
            assert_eq!(err.class(), ErrorClass::Config, "{txt}");
        }
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.toml");
        std::fs::write(&path, "[hex_regex]\npattern = \"ff[0-9a-f]{8}\"\n").unwrap();
        assert_eq!(load_config(&path).unwrap().hex_pattern, "ff[0-9a-f]{8}");

        let err = load_config(&dir.path().join("missing.toml")).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Io);
    }
}
