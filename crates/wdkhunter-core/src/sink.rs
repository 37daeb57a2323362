//! 结果输出：文本（每行一个候选）或流式 JSON 数组
use std::io::Write;

use crate::error::{Result, ScanError};
use crate::options::OutputFormat;
use crate::types::ScanReport;

pub struct ReportWriter<'w> {
    out: &'w mut dyn Write,
    format: OutputFormat,
    /// 目录模式下每行带上来源文件
    label_sources: bool,
    first: bool,
}

impl<'w> ReportWriter<'w> {
    pub fn new(out: &'w mut dyn Write, format: OutputFormat, label_sources: bool) -> Self {
        Self { out, format, label_sources, first: true }
    }

    /// 写 JSON 开始符（文本格式无操作）
    pub fn begin(&mut self) -> Result<()> {
        if self.format == OutputFormat::Json {
            write!(self.out, "[").map_err(ScanError::Output)?;
        }
        Ok(())
    }

    /// 写出一个字节源的全部候选，返回写出条数
    pub fn write_report(&mut self, report: &ScanReport) -> Result<usize> {
        let mut written = 0usize;
        match self.format {
            OutputFormat::Text => {
                for c in &report.candidates {
                    if self.label_sources {
                        writeln!(self.out, "{}\t{}", report.source, c).map_err(ScanError::Output)?;
                    } else {
                        writeln!(self.out, "{c}").map_err(ScanError::Output)?;
                    }
                    written += 1;
                }
            }
            OutputFormat::Json => {
                for item in report.output_items() {
                    if !self.first {
                        write!(self.out, ",").map_err(ScanError::Output)?;
                    } else {
                        self.first = false;
                    }
                    serde_json::to_writer(&mut *self.out, &item).map_err(|e| ScanError::Output(e.into()))?;
                    written += 1;
                }
            }
        }
        Ok(written)
    }

    /// 写 JSON 结束符并刷新
    pub fn end(&mut self) -> Result<()> {
        if self.format == OutputFormat::Json {
            writeln!(self.out, "]").map_err(ScanError::Output)?;
        }
        self.out.flush().map_err(ScanError::Output)
    }
}
