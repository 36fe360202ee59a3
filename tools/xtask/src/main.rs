//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 invitation-runtime 覆盖率
//! - `doc-check`: 检查邀请函文档（解析、诊断、本地图片引用）

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use invitation_runtime::{DiagnosticResult, Document, ElementType, analyze_document};
use serde_json::Value;
use walkdir::WalkDir;
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask", about = "开发辅助工具")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand)]
enum Task {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,
    /// 运行 invitation-runtime 覆盖率报告
    CovRuntime,
    /// 检查文档文件或目录（缺省：documents/）
    DocCheck { path: Option<PathBuf> },
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    match cli.command {
        Task::CheckAll => {
            eprintln!("\n==> cargo fmt");
            cmd!(sh, "cargo fmt --all -- --check").run()?;
            eprintln!("\n==> cargo clippy");
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;
            eprintln!("\n==> cargo test");
            cmd!(sh, "cargo test --workspace").run()?;
        }
        Task::CovRuntime => {
            if cmd!(sh, "cargo llvm-cov --version").quiet().run().is_err() {
                bail!(
                    "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview"
                );
            }
            cmd!(sh, "cargo llvm-cov -p invitation-runtime --html").run()?;
            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Task::DocCheck { path } => doc_check(path.as_deref())?,
    }

    Ok(())
}

//=============================================================================
// doc-check 命令实现
//=============================================================================

const DEFAULT_DOCUMENTS_DIR: &str = "documents";

/// 文档检查结果
#[derive(Default)]
struct DocCheckResult {
    documents_checked: usize,
    parse_errors: usize,
    diagnostics: DiagnosticResult,
    missing_images: Vec<MissingImage>,
}

struct MissingImage {
    document: String,
    element: String,
    path: String,
}

fn doc_check(path: Option<&Path>) -> anyhow::Result<()> {
    let root = path.unwrap_or(Path::new(DEFAULT_DOCUMENTS_DIR));
    let files = if root.is_file() {
        vec![root.to_path_buf()]
    } else if root.is_dir() {
        collect_documents(root)
    } else {
        bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定文档路径",
            root.display()
        );
    };

    if files.is_empty() {
        eprintln!("未找到文档文件（.json）");
        return Ok(());
    }
    eprintln!("==> 检查 {} 个文档...\n", files.len());

    let mut result = DocCheckResult::default();
    for file in &files {
        check_document_file(file, &mut result)?;
    }
    print_check_result(&result);

    if result.parse_errors > 0 || result.diagnostics.has_errors() {
        bail!("文档检查发现错误");
    }
    Ok(())
}

fn collect_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

fn check_document_file(file: &Path, result: &mut DocCheckResult) -> anyhow::Result<()> {
    let name = file.display().to_string();
    result.documents_checked += 1;

    let text = std::fs::read_to_string(file).with_context(|| format!("无法读取 {name}"))?;
    let document = match Document::from_json(&text) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("[ERROR] {name}: {e}");
            result.parse_errors += 1;
            return Ok(());
        }
    };

    result.diagnostics.merge(analyze_document(&document));

    let base = file.parent().unwrap_or(Path::new("."));
    for block in &document.blocks {
        for element in block.walk_elements() {
            if element.element_type != ElementType::Image {
                continue;
            }
            let Some(Value::String(src)) = &element.value else {
                continue;
            };
            if is_remote(src) || base.join(src).exists() {
                continue;
            }
            result.missing_images.push(MissingImage {
                document: name.clone(),
                element: element.id.clone(),
                path: src.clone(),
            });
        }
    }
    Ok(())
}

fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://") || src.starts_with("data:")
}

fn print_check_result(result: &DocCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个文档", result.documents_checked);
    eprintln!();

    for diag in &result.diagnostics.diagnostics {
        eprintln!("{diag}");
    }
    for missing in &result.missing_images {
        eprintln!(
            "[WARN] {}: 图片不存在 [{}] {}",
            missing.document, missing.element, missing.path
        );
    }

    let error_count = result.parse_errors + result.diagnostics.error_count();
    let warn_count = result.diagnostics.warn_count() + result.missing_images.len();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {error_count} 个错误, {warn_count} 个警告");
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {warn_count} 个警告");
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
