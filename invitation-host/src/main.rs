//! # invitation-render
//!
//! Headless 渲染工具：读取邀请函文档，输出节点树、诊断或解析后的样式变量。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p invitation-host -- render doc.json
//! cargo run -p invitation-host -- render doc.json --frames 60 --scroll --pretty --output tree.json
//! cargo run -p invitation-host -- render doc.json --width 428 --reduced-motion
//! cargo run -p invitation-host -- check doc.json
//! cargo run -p invitation-host -- tokens doc.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use invitation_host::renderer::DocumentRenderer;
use invitation_host::{AnimationRuntime, RendererConfig};
use invitation_runtime::style::style_to_css_variables;
use invitation_runtime::{DiagnosticLevel, Document, analyze_document};
use tracing::{Level, info, warn};

#[derive(Parser)]
#[command(name = "invitation-render")]
#[command(about = "邀请函 headless 渲染工具")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 渲染器配置文件（默认：renderer.json）
    #[arg(short, long, default_value = "renderer.json", global = true)]
    config: PathBuf,

    /// 覆盖配置中的视口宽度（CSS px）
    #[arg(long, global = true)]
    width: Option<f64>,

    /// 覆盖配置中的视口高度（CSS px）
    #[arg(long, global = true)]
    height: Option<f64>,

    /// 覆盖配置中的减弱动效偏好
    #[arg(long, global = true)]
    reduced_motion: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 渲染文档并输出节点树（JSON）
    Render {
        /// 文档路径
        document: PathBuf,

        /// 输出文件，缺省时打印到标准输出
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 渲染后模拟的帧数
        #[arg(short, long, default_value = "0")]
        frames: u32,

        /// 模拟前让所有 block 依次进入视口
        #[arg(long)]
        scroll: bool,

        /// 格式化输出
        #[arg(long)]
        pretty: bool,
    },

    /// 检查文档，存在错误时以非零状态退出
    Check {
        /// 文档路径
        document: PathBuf,
    },

    /// 输出解析后的全局 CSS 变量
    Tokens {
        /// 文档路径
        document: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RendererConfig::load(&cli.config);
    if let Some(width) = cli.width {
        config.viewport.width = width;
    }
    if let Some(height) = cli.height {
        config.viewport.height = height;
    }
    if cli.reduced_motion {
        config.animation.reduced_motion = true;
    }
    config.validate()?;
    init_logging(&config);

    match cli.command {
        Commands::Render {
            document,
            output,
            frames,
            scroll,
            pretty,
        } => render(
            &config,
            &document,
            RenderOptions {
                output: output.as_deref(),
                frames,
                scroll,
                pretty,
            },
        ),
        Commands::Check { document } => check(&document),
        Commands::Tokens { document } => tokens(&config, &document),
    }
}

fn init_logging(config: &RendererConfig) {
    let level = config
        .logging
        .level
        .parse::<Level>()
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_document(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("无法读取文档: {}", path.display()))?;
    let document = Document::from_json(&text)
        .with_context(|| format!("无法解析文档: {}", path.display()))?;
    Ok(document)
}

struct RenderOptions<'a> {
    output: Option<&'a Path>,
    frames: u32,
    scroll: bool,
    pretty: bool,
}

fn render(config: &RendererConfig, path: &Path, options: RenderOptions<'_>) -> Result<()> {
    let RenderOptions {
        output,
        frames,
        scroll,
        pretty,
    } = options;
    let document = load_document(path)?;
    let renderer = DocumentRenderer::new(config);
    let mut runtime = renderer.create_runtime(&document);
    let mut rendered = renderer.render(&document, &mut runtime);

    if scroll {
        simulate_scroll(&document, config, &mut runtime);
    }
    let frame_ms = config.frame_ms();
    for _ in 0..frames {
        runtime.tick(frame_ms);
    }
    if frames > 0 {
        info!(
            frames,
            elapsed_ms = runtime.now_ms(),
            active = runtime.active_actions(),
            "模拟完成"
        );
    }

    let json = if pretty {
        serde_json::to_string_pretty(&rendered.root)?
    } else {
        serde_json::to_string(&rendered.root)?
    };
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("无法写入: {}", path.display()))?;
            info!(path = %path.display(), "节点树已写入");
        }
        None => println!("{json}"),
    }

    if !rendered.failed_blocks().is_empty() {
        warn!(blocks = ?rendered.failed_blocks(), "部分 block 以兜底节点显示");
    }
    rendered.unmount(&mut runtime);
    Ok(())
}

/// 依次把每个 block 滚动到视口顶部
fn simulate_scroll(document: &Document, config: &RendererConfig, runtime: &mut AnimationRuntime) {
    let viewport = config.viewport();
    for block in document.enabled_blocks() {
        let height = invitation_runtime::size::block_height_px(&block.height, viewport);
        runtime.observe_scroll(&block.id, viewport.height, height, viewport.height);
        runtime.observe_scroll(&block.id, 0.0, height, viewport.height);
        for element in block.walk_elements() {
            runtime.observe_scroll(&element.id, 0.0, height, viewport.height);
        }
    }
}

fn check(path: &Path) -> Result<()> {
    let document = load_document(path)?;
    let result = analyze_document(&document);

    for diagnostic in &result.diagnostics {
        println!("{diagnostic}");
    }
    println!(
        "{} 个错误，{} 个警告",
        result.error_count(),
        result.warn_count()
    );

    if result.has_errors() {
        bail!("文档检查未通过");
    }
    if result.filter_by_level(DiagnosticLevel::Warn).is_empty() {
        info!("文档检查通过");
    }
    Ok(())
}

fn tokens(config: &RendererConfig, path: &Path) -> Result<()> {
    let document = load_document(path)?;
    let style = DocumentRenderer::new(config).resolve_style(&document);
    for (name, value) in style_to_css_variables(&style) {
        println!("{name}: {value};");
    }
    Ok(())
}
