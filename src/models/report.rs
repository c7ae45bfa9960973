use serde::Deserialize;

/// 导出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ReportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ReportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// 生成好的可下载报表
#[derive(Debug, Clone)]
pub struct Report {
    pub filename: String,
    pub format: ReportFormat,
    pub bytes: Vec<u8>,
}

impl Report {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}
