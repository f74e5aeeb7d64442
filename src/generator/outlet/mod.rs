use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::ComparisonResult;

pub trait Outlet {
    async fn save(&self, result: &ComparisonResult) -> Result<Vec<PathBuf>>;
}

/// 把对比结果写到磁盘
pub struct DiskOutlet {
    readme_path: PathBuf,
    /// 同时保存完整结果（含日志）的JSON
    json_path: Option<PathBuf>,
}

impl DiskOutlet {
    pub fn new(readme_path: impl Into<PathBuf>) -> Self {
        Self {
            readme_path: readme_path.into(),
            json_path: None,
        }
    }

    pub fn with_json(mut self, json_path: impl Into<PathBuf>) -> Self {
        self.json_path = Some(json_path.into());
        self
    }
}

impl Outlet for DiskOutlet {
    async fn save(&self, result: &ComparisonResult) -> Result<Vec<PathBuf>> {
        println!("\n🖊️ 文档存储中...");
        let mut saved = Vec::new();

        write_file(&self.readme_path, &result.readme)?;
        println!("💾 已保存文档: {}", self.readme_path.display());
        saved.push(self.readme_path.clone());

        if let Some(json_path) = &self.json_path {
            let content = serde_json::to_string_pretty(result)?;
            write_file(json_path, &content)?;
            println!("💾 已保存对比数据: {}", json_path.display());
            saved.push(json_path.clone());
        }

        Ok(saved)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    // 确保父目录存在
    if let Some(parent_dir) = path.parent()
        && !parent_dir.as_os_str().is_empty()
        && !parent_dir.exists()
    {
        fs::create_dir_all(parent_dir)
            .with_context(|| format!("Failed to create directory {:?}", parent_dir))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
}
